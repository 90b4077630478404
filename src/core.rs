use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::error::{ResolveError, Result};
use crate::provider::{ProviderOutcome, ProviderSpec};
use crate::youtube::{VideoInfo, is_youtube_url, parse_id};

pub const DEFAULT_FORMAT_CODE: &str = "18";
pub const DEFAULT_QUALITY: &str = "medium";

/// A YouTube URL together with the video id extracted from it.
///
/// Only constructed through [`VideoReference::parse`], so `video_id` is never
/// empty and only holds `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReference {
    source_url: String,
    video_id: String,
}

impl VideoReference {
    /// Extract the video id from `url`.
    pub fn parse(url: &str) -> Result<Self> {
        let video_id = parse_id(url)?;
        Ok(Self {
            source_url: url.to_string(),
            video_id,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

/// Where the primary link of a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Api,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Candidate links for one video, regardless of their origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadBundle {
    pub primary: String,
    pub alternatives: Vec<String>,
}

/// Validated inbound parameters, ready to be handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub video: VideoReference,
    pub format_code: String,
    /// Accepted and logged, not used for resolution.
    pub quality: String,
}

impl ResolveRequest {
    /// Apply the inbound validation rules in order: presence, host, video id.
    pub fn new(
        url: Option<&str>,
        format_code: Option<&str>,
        quality: Option<&str>,
        default_format: &str,
    ) -> Result<Self> {
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or(ResolveError::MissingUrl)?;

        if !is_youtube_url(url) {
            return Err(ResolveError::InvalidUrl);
        }

        let video = VideoReference::parse(url)?;
        // An empty format_code counts as absent
        let format_code = format_code
            .filter(|f| !f.is_empty())
            .unwrap_or(default_format)
            .to_string();
        let quality = quality
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUALITY)
            .to_string();

        Ok(Self {
            video,
            format_code,
            quality,
        })
    }
}

/// Performs a single outbound call to one link-resolution provider.
///
/// Implementations never fail: every problem is folded into
/// [`ProviderOutcome::Failure`].
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    async fn call(
        &self,
        spec: &ProviderSpec,
        video: &VideoReference,
        format_code: &str,
    ) -> ProviderOutcome;
}

/// Best-effort lookup of display metadata; `None` on any failure.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Option<VideoInfo>;
}
