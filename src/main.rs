use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ytresolve::{AppConfig, Resolver, server};

#[derive(Parser)]
#[command(
    name = "ytresolve",
    about = "Resolve YouTube links into direct download links",
    long_about = "Queries a chain of link-resolution providers for a YouTube video and\n\
    falls back to generated links when every provider fails.\n\n\
    Examples:\n\
      ytresolve resolve https://youtu.be/dQw4w9WgXcQ          # Print result JSON\n\
      ytresolve resolve -f 22 https://youtu.be/dQw4w9WgXcQ    # Request format 22\n\
      ytresolve serve --bind 127.0.0.1:8080                   # Run the HTTP API"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one URL and print the result as JSON
    Resolve {
        #[arg(help = "YouTube URL (watch, shorts, youtu.be, embed or /v/)")]
        url: String,

        #[arg(short = 'f', long = "format-code", help = "Format code (itag), defaults to 18")]
        format_code: Option<String>,

        #[arg(short = 'q', long = "quality", help = "Quality label, passed through")]
        quality: Option<String>,
    },
    /// Serve the resolver over HTTP
    Serve {
        #[arg(long, help = "Listen address, overrides YTRESOLVE_BIND")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ytresolve=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("reading configuration")?;

    match cli.command {
        Command::Resolve {
            url,
            format_code,
            quality,
        } => resolve(&config, &url, format_code, quality).await,
        Command::Serve { bind } => serve(config, bind).await,
    }
}

async fn resolve(
    config: &AppConfig,
    url: &str,
    format_code: Option<String>,
    quality: Option<String>,
) -> Result<()> {
    let resolver = Resolver::from_config(config).context("building resolver")?;
    let request = resolver.request(Some(url), format_code.as_deref(), quality.as_deref())?;
    let result = resolver.resolve(&request).await;
    println!("{}", serde_json::to_string_pretty(&result.to_wire())?);
    Ok(())
}

async fn serve(mut config: AppConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind_address = bind;
    }

    let resolver = Resolver::from_config(&config).context("building resolver")?;
    let app = server::router(resolver);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding to {}", config.bind_address))?;
    info!(address = %config.bind_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    }
}
