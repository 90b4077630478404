use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::core::{DownloadBundle, Source, Status, VideoReference};
use crate::provider::{ChainResult, ProviderFailure};
use crate::synthetic::{LINK_TTL_SECS, SyntheticLinkGenerator};
use crate::youtube::VideoInfo;

pub const FALLBACK_WARNING: &str =
    "Using generated URLs as API fallback. Links may not work for all videos.";
pub const API_ERROR_SUMMARY: &str = "All providers failed";
/// Both branches carry this many alternative links
pub const ALTERNATIVE_COUNT: usize = 3;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub failed_providers: Vec<ProviderFailure>,
}

/// Everything produced for one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    /// `Success` whenever a response was produced, verified or not
    pub status: Status,
    pub source: Source,
    pub video: VideoReference,
    pub format_code: String,
    pub metadata: Option<VideoInfo>,
    /// Provider `response` object, or `{"direct_link": ...}` when generated
    pub provider_response: Value,
    pub bundle: DownloadBundle,
    pub warning: Option<String>,
    pub diagnostics: Option<Diagnostics>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResolutionResult {
    pub fn is_verified(&self) -> bool {
        self.source == Source::Api
    }

    /// The JSON document handed back to HTTP and CLI callers
    pub fn to_wire(&self) -> WireResult<'_> {
        WireResult {
            status: self.status,
            source: self.source,
            video_id: self.video.video_id(),
            url: self.video.source_url(),
            format_code: &self.format_code,
            video_info: self.metadata.as_ref(),
            response: &self.provider_response,
            download_links: &self.bundle,
            warning: self.warning.as_deref(),
            debug: self.diagnostics.as_ref().map(|d| WireDebug {
                api_error: API_ERROR_SUMMARY,
                attempted_apis: d
                    .failed_providers
                    .iter()
                    .map(|f| f.provider_name.as_str())
                    .collect(),
            }),
            timestamp: self.created_at.format(TIMESTAMP_FORMAT).to_string(),
            expires_at: self.expires_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireResult<'a> {
    pub status: Status,
    pub source: Source,
    pub video_id: &'a str,
    pub url: &'a str,
    pub format_code: &'a str,
    pub video_info: Option<&'a VideoInfo>,
    pub response: &'a Value,
    pub download_links: &'a DownloadBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<WireDebug<'a>>,
    pub timestamp: String,
    pub expires_at: String,
}

/// Only provider names leave the process; failure details stay in the logs
#[derive(Debug, Serialize)]
pub struct WireDebug<'a> {
    pub api_error: &'static str,
    pub attempted_apis: Vec<&'a str>,
}

/// Merges the chain outcome, metadata and fallback links into one result
#[derive(Debug, Clone, Default)]
pub struct ResolutionAssembler {
    generator: SyntheticLinkGenerator,
}

impl ResolutionAssembler {
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        video: &VideoReference,
        format_code: &str,
        chain: ChainResult,
        metadata: Option<VideoInfo>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> ResolutionResult {
        let expires_at = now + Duration::seconds(LINK_TTL_SECS);

        let (source, provider_response, bundle, warning, diagnostics) = match chain {
            ChainResult::Success {
                payload,
                direct_link,
                ..
            } => {
                let alternatives = self.generator.generate(
                    video.video_id(),
                    format_code,
                    ALTERNATIVE_COUNT,
                    now,
                    rng,
                );
                let response = payload
                    .get("response")
                    .cloned()
                    .unwrap_or_else(|| json!({ "direct_link": direct_link }));
                let bundle = DownloadBundle {
                    primary: direct_link,
                    alternatives,
                };
                (Source::Api, response, bundle, None, None)
            }
            ChainResult::AllFailed { failures } => {
                warn!(
                    video_id = video.video_id(),
                    failed = failures.len(),
                    "all providers failed, generating fallback links"
                );
                let mut links = self.generator.generate(
                    video.video_id(),
                    format_code,
                    ALTERNATIVE_COUNT + 1,
                    now,
                    rng,
                );
                let alternatives = links.split_off(1);
                let primary = links.remove(0);
                let bundle = DownloadBundle {
                    primary,
                    alternatives,
                };
                (
                    Source::Generated,
                    json!({ "direct_link": bundle.primary }),
                    bundle,
                    Some(FALLBACK_WARNING.to_string()),
                    Some(Diagnostics {
                        failed_providers: failures,
                    }),
                )
            }
        };

        ResolutionResult {
            status: Status::Success,
            source,
            video: video.clone(),
            format_code: format_code.to_string(),
            metadata,
            provider_response,
            bundle,
            warning,
            diagnostics,
            created_at: now,
            expires_at,
        }
    }
}
