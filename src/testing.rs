//! In-memory stand-ins for the network seams, shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use crate::core::{MetadataSource, ProviderClient, VideoReference};
use crate::provider::{FailureKind, ProviderOutcome, ProviderSpec};
use crate::youtube::VideoInfo;

/// Answers from a fixed table and records every provider it was asked about
#[derive(Default)]
pub struct FakeProviderClient {
    outcomes: HashMap<String, ProviderOutcome>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: &str, outcome: ProviderOutcome) -> Self {
        self.outcomes.insert(provider.to_string(), outcome);
        self
    }

    pub fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ProviderClient for FakeProviderClient {
    async fn call(
        &self,
        spec: &ProviderSpec,
        _video: &VideoReference,
        format_code: &str,
    ) -> ProviderOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((spec.name.clone(), format_code.to_string()));
        self.outcomes.get(&spec.name).cloned().unwrap_or_else(|| {
            ProviderOutcome::failure(&spec.name, FailureKind::Transport, "connection refused")
        })
    }
}

pub struct FakeMetadata(pub Option<VideoInfo>);

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn fetch(&self, _video_id: &str) -> Option<VideoInfo> {
        self.0.clone()
    }
}

pub fn providers(names: &[&str]) -> Arc<[ProviderSpec]> {
    names
        .iter()
        .map(|name| {
            ProviderSpec::new(*name, &format!("https://{name}.invalid/api"), Method::POST).unwrap()
        })
        .collect()
}

pub fn link_payload(link: &str) -> ProviderOutcome {
    ProviderOutcome::Success {
        payload: json!({ "response": { "direct_link": link, "title": "video" } }),
    }
}

pub fn payload(value: Value) -> ProviderOutcome {
    ProviderOutcome::Success { payload: value }
}

pub fn sample_info() -> VideoInfo {
    serde_json::from_value(json!({
        "title": "Never Gonna Give You Up",
        "author_name": "Rick Astley",
        "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
    }))
    .unwrap()
}
