pub mod assemble;
pub mod config;
pub mod core;
mod download;
pub mod error;
pub mod provider;
pub mod resolver;
#[cfg(feature = "server")]
pub mod server;
pub mod synthetic;
#[cfg(test)]
mod testing;
pub mod youtube;

pub use assemble::{ResolutionAssembler, ResolutionResult};
pub use config::AppConfig;
pub use crate::core::{
    DownloadBundle, MetadataSource, ProviderClient, ResolveRequest, Source, Status,
    VideoReference,
};
use error::Result;
pub use provider::{ChainResult, ProviderChain, ProviderOutcome, ProviderSpec};
pub use resolver::Resolver;
pub use synthetic::SyntheticLinkGenerator;

/// Resolve a YouTube URL with the default providers, falling back to
/// generated links when none of them answers with a direct link
pub async fn resolve(url: &str, format_code: Option<&str>) -> Result<ResolutionResult> {
    let resolver = Resolver::from_config(&AppConfig::default())?;
    resolver.resolve_url(url, format_code).await
}
