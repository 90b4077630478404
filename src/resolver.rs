use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::assemble::{ResolutionAssembler, ResolutionResult};
use crate::config::AppConfig;
use crate::core::{DEFAULT_FORMAT_CODE, MetadataSource, ProviderClient, ResolveRequest};
use crate::error::Result;
use crate::provider::{HttpProviderClient, ProviderChain, ProviderSpec, default_providers};
use crate::youtube::OembedFetcher;

/// Source of randomness for fallback tokens, called once per resolution
pub type RngFactory = fn() -> StdRng;

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// The resolution pipeline: metadata lookup, provider chain, assembly.
///
/// Cheap to clone; all parts are shared read-only between requests.
#[derive(Clone)]
pub struct Resolver {
    chain: ProviderChain,
    metadata: Arc<dyn MetadataSource>,
    assembler: ResolutionAssembler,
    rng_factory: RngFactory,
    default_format: String,
}

impl Resolver {
    pub fn new(
        providers: Arc<[ProviderSpec]>,
        client: Arc<dyn ProviderClient>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        Self {
            chain: ProviderChain::new(providers, client),
            metadata,
            assembler: ResolutionAssembler::default(),
            rng_factory: entropy_rng,
            default_format: DEFAULT_FORMAT_CODE.to_string(),
        }
    }

    /// Production wiring: HTTP providers and oEmbed metadata
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers: Arc<[ProviderSpec]> = default_providers()?.into();
        let client = HttpProviderClient::with_timeout(config.provider_timeout)?;
        let metadata = OembedFetcher::with_timeout(config.metadata_timeout)?;

        Ok(Self::new(providers, Arc::new(client), Arc::new(metadata))
            .with_default_format(&config.default_format))
    }

    pub fn with_rng_factory(mut self, rng_factory: RngFactory) -> Self {
        self.rng_factory = rng_factory;
        self
    }

    pub fn with_default_format(mut self, format_code: &str) -> Self {
        self.default_format = format_code.to_string();
        self
    }

    /// Validate raw inbound parameters
    pub fn request(
        &self,
        url: Option<&str>,
        format_code: Option<&str>,
        quality: Option<&str>,
    ) -> Result<ResolveRequest> {
        ResolveRequest::new(url, format_code, quality, &self.default_format)
    }

    /// Resolve a validated request. Never fails: exhausting the chain falls
    /// back to generated links.
    pub async fn resolve(&self, request: &ResolveRequest) -> ResolutionResult {
        let video = &request.video;
        info!(
            video_id = video.video_id(),
            format_code = %request.format_code,
            quality = %request.quality,
            "resolving"
        );

        let (metadata, chain) = futures_util::join!(
            self.metadata.fetch(video.video_id()),
            self.chain.resolve(video, &request.format_code)
        );

        let mut rng = (self.rng_factory)();
        self.assembler.assemble(
            video,
            &request.format_code,
            chain,
            metadata,
            Utc::now(),
            &mut rng,
        )
    }

    /// Validate and resolve in one step
    pub async fn resolve_url(&self, url: &str, format_code: Option<&str>) -> Result<ResolutionResult> {
        let request = self.request(Some(url), format_code, None)?;
        Ok(self.resolve(&request).await)
    }
}
