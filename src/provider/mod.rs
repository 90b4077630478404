//! Third-party link-resolution providers.
//!
//! A provider is described by a static [`ProviderSpec`]; the list is built once
//! at startup and shared read-only between requests.

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;
use strum_macros::Display;
use url::Url;

use crate::core::VideoReference;
use crate::error::Result;

pub mod chain;
pub mod client;

pub use chain::{ChainResult, ProviderChain, direct_link};
pub use client::HttpProviderClient;

/// Builds the request body for one provider call
pub type PayloadBuilder = fn(&VideoReference, &str) -> String;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: String,
    pub endpoint: Url,
    pub method: Method,
    pub build_payload: PayloadBuilder,
    /// Applied on top of [`default_headers`]
    pub header_overrides: HeaderMap,
}

impl ProviderSpec {
    /// Create a provider that sends a JSON body and no header overrides
    pub fn new(name: impl Into<String>, endpoint: &str, method: Method) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            endpoint: Url::parse(endpoint)?,
            method,
            build_payload: json_payload,
            header_overrides: HeaderMap::new(),
        })
    }

    pub fn with_payload(mut self, build_payload: PayloadBuilder) -> Self {
        self.build_payload = build_payload;
        self
    }

    /// Send the body as an urlencoded form
    pub fn with_form_content_type(mut self) -> Self {
        self.header_overrides
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        self
    }
}

/// Why a provider attempt did not produce a usable link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Connection, TLS or timeout failure
    Transport,
    /// Any status other than 200
    HttpStatus,
    /// Body was not JSON
    Decode,
    /// JSON came back but carried no direct link
    MissingLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider_name: String,
    pub kind: FailureKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Success { payload: Value },
    Failure(ProviderFailure),
}

impl ProviderOutcome {
    pub fn failure(provider_name: &str, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure(ProviderFailure {
            provider_name: provider_name.to_string(),
            kind,
            detail: detail.into(),
        })
    }
}

/// Headers sent to every provider before per-provider overrides
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.youtube.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.youtube.com"));
    headers
}

/// `{"url": ..., "format_code": ...}`
pub fn json_payload(video: &VideoReference, format_code: &str) -> String {
    serde_json::json!({
        "url": video.source_url(),
        "format_code": format_code,
    })
    .to_string()
}

fn analyze_v2_payload(video: &VideoReference, _format_code: &str) -> String {
    format!(
        "k_query={}&k_page=home&hl=en&q_auto=0",
        urlencoding::encode(video.source_url())
    )
}

fn analyze_payload(video: &VideoReference, _format_code: &str) -> String {
    format!("url={}", urlencoding::encode(video.source_url()))
}

/// The production provider list, in the order it is tried
pub fn default_providers() -> Result<Vec<ProviderSpec>> {
    Ok(vec![
        ProviderSpec::new(
            "bizft-v1",
            "https://yt.savetube.me/api/v1/video-downloader",
            Method::POST,
        )?,
        ProviderSpec::new(
            "bizft-v2",
            "https://www.y2mate.com/mates/analyzeV2/ajax",
            Method::POST,
        )?
        .with_payload(analyze_v2_payload)
        .with_form_content_type(),
        ProviderSpec::new(
            "bizft-v3",
            "https://sfrom.net/mates/en/analyze/ajax",
            Method::POST,
        )?
        .with_payload(analyze_payload)
        .with_form_content_type(),
    ])
}
