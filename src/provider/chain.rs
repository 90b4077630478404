use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{ProviderClient, VideoReference};

use super::{FailureKind, ProviderFailure, ProviderOutcome, ProviderSpec};

/// Outcome of walking the whole provider list
#[derive(Debug, Clone, PartialEq)]
pub enum ChainResult {
    Success {
        provider_name: String,
        payload: Value,
        direct_link: String,
    },
    /// Every failure and near-miss, in attempt order
    AllFailed { failures: Vec<ProviderFailure> },
}

/// Ordered provider list; the first provider returning a direct link wins.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Arc<[ProviderSpec]>,
    client: Arc<dyn ProviderClient>,
}

impl ProviderChain {
    pub fn new(providers: Arc<[ProviderSpec]>, client: Arc<dyn ProviderClient>) -> Self {
        Self { providers, client }
    }

    pub async fn resolve(&self, video: &VideoReference, format_code: &str) -> ChainResult {
        let mut failures = Vec::with_capacity(self.providers.len());

        for spec in self.providers.iter() {
            debug!(provider = %spec.name, video_id = video.video_id(), "trying provider");

            let failure = match self.client.call(spec, video, format_code).await {
                ProviderOutcome::Success { payload } => match direct_link(&payload) {
                    Some(link) => {
                        info!(provider = %spec.name, video_id = video.video_id(), "provider returned a direct link");
                        let direct_link = link.to_string();
                        return ChainResult::Success {
                            provider_name: spec.name.clone(),
                            payload,
                            direct_link,
                        };
                    }
                    None => near_miss(&spec.name, &payload),
                },
                ProviderOutcome::Failure(failure) => failure,
            };

            warn!(
                provider = %failure.provider_name,
                kind = %failure.kind,
                detail = %failure.detail,
                "provider failed"
            );
            failures.push(failure);
        }

        ChainResult::AllFailed { failures }
    }
}

/// The usable link in a provider payload, if there is one.
///
/// A payload reporting a non-null `error` never counts, even alongside a link.
pub fn direct_link(payload: &Value) -> Option<&str> {
    if reported_error(payload).is_some() {
        return None;
    }
    payload
        .get("response")?
        .get("direct_link")?
        .as_str()
        .map(str::trim)
        .filter(|link| !link.is_empty())
}

fn reported_error(payload: &Value) -> Option<&Value> {
    payload.get("error").filter(|e| !e.is_null())
}

fn near_miss(provider_name: &str, payload: &Value) -> ProviderFailure {
    let detail = match reported_error(payload) {
        Some(Value::String(message)) => format!("Provider error ({}): {}", provider_name, message),
        Some(other) => format!("Provider error ({}): {}", provider_name, other),
        None => format!("No direct link in response ({})", provider_name),
    };
    ProviderFailure {
        provider_name: provider_name.to_string(),
        kind: FailureKind::MissingLink,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProviderClient, link_payload, payload, providers};
    use serde_json::json;

    fn video() -> VideoReference {
        VideoReference::parse("https://www.youtube.com/watch?v=abc123").unwrap()
    }

    #[test]
    fn direct_link_predicate() {
        assert_eq!(
            direct_link(&json!({"response": {"direct_link": "https://cdn/x"}})),
            Some("https://cdn/x")
        );
        assert_eq!(direct_link(&json!({"response": {"direct_link": ""}})), None);
        assert_eq!(direct_link(&json!({"response": {"direct_link": 5}})), None);
        assert_eq!(direct_link(&json!({"response": {}})), None);
        assert_eq!(direct_link(&json!({"status": "ok"})), None);
        assert_eq!(
            direct_link(&json!({"error": "quota", "response": {"direct_link": "https://cdn/x"}})),
            None
        );
        assert_eq!(
            direct_link(&json!({"error": null, "response": {"direct_link": "https://cdn/x"}})),
            Some("https://cdn/x")
        );
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let client = Arc::new(
            FakeProviderClient::new()
                .with("p2", link_payload("https://cdn.example/p2.mp4"))
                .with("p3", link_payload("https://cdn.example/p3.mp4")),
        );
        let chain = ProviderChain::new(providers(&["p1", "p2", "p3"]), client.clone());

        let result = chain.resolve(&video(), "22").await;
        match result {
            ChainResult::Success {
                provider_name,
                direct_link,
                ..
            } => {
                assert_eq!(provider_name, "p2");
                assert_eq!(direct_link, "https://cdn.example/p2.mp4");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(client.called(), ["p1", "p2"]);
        assert!(client.calls.lock().unwrap().iter().all(|(_, f)| f == "22"));
    }

    #[tokio::test]
    async fn success_without_link_advances() {
        let client = Arc::new(
            FakeProviderClient::new()
                .with("p1", payload(json!({"error": "rate limited"})))
                .with("p2", payload(json!({"response": {"title": "no link"}})))
                .with(
                    "p3",
                    ProviderOutcome::failure("p3", FailureKind::HttpStatus, "HTTP Error (p3): 500"),
                ),
        );
        let chain = ProviderChain::new(providers(&["p1", "p2", "p3"]), client.clone());

        let ChainResult::AllFailed { failures } = chain.resolve(&video(), "18").await else {
            panic!("chain should fail");
        };
        assert_eq!(client.called(), ["p1", "p2", "p3"]);

        let summary: Vec<_> = failures
            .iter()
            .map(|f| (f.provider_name.as_str(), f.kind))
            .collect();
        assert_eq!(
            summary,
            [
                ("p1", FailureKind::MissingLink),
                ("p2", FailureKind::MissingLink),
                ("p3", FailureKind::HttpStatus),
            ]
        );
        assert_eq!(failures[0].detail, "Provider error (p1): rate limited");
        assert_eq!(failures[1].detail, "No direct link in response (p2)");
    }

    #[tokio::test]
    async fn empty_chain_fails_without_calls() {
        let client = Arc::new(FakeProviderClient::new());
        let chain = ProviderChain::new(providers(&[]), client.clone());

        assert_eq!(
            chain.resolve(&video(), "18").await,
            ChainResult::AllFailed { failures: vec![] }
        );
        assert!(client.called().is_empty());
    }
}
