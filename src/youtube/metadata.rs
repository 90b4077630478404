use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::debug;

use crate::core::MetadataSource;
use crate::download::{METADATA_TIMEOUT, build_client, download_json};
use crate::error::Result;

use super::types::VideoInfo;
use super::utils::{OEMBED_USER_AGENT, build_oembed_url};

/// Looks up title, author and thumbnail through YouTube's oEmbed endpoint
#[derive(Debug, Clone)]
pub struct OembedFetcher {
    client: reqwest::Client,
}

impl OembedFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(METADATA_TIMEOUT)
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, OEMBED_USER_AGENT)?,
        })
    }
}

#[async_trait]
impl MetadataSource for OembedFetcher {
    async fn fetch(&self, video_id: &str) -> Option<VideoInfo> {
        let url = build_oembed_url(video_id);
        match download_json::<VideoInfo>(&self.client, &url, HeaderMap::new()).await {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(video_id, error = %e, "metadata lookup failed");
                None
            }
        }
    }
}
