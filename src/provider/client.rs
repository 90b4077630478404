use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::core::{ProviderClient, VideoReference};
use crate::download::{PROVIDER_TIMEOUT, build_client, execute_request, merge_headers, read_json};
use crate::error::{ResolveError, Result};
use crate::youtube::utils::WEB_USER_AGENT;

use super::{FailureKind, ProviderOutcome, ProviderSpec, default_headers};

/// Calls providers over HTTP with one shared connection pool
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: reqwest::Client,
}

impl HttpProviderClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(PROVIDER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, WEB_USER_AGENT)?,
        })
    }

    async fn send(&self, spec: &ProviderSpec, video: &VideoReference, format_code: &str) -> Result<Value> {
        let headers = merge_headers(&default_headers(), &spec.header_overrides);
        let body = (spec.method == Method::POST).then(|| (spec.build_payload)(video, format_code));

        let response = execute_request(
            &self.client,
            spec.method.clone(),
            spec.endpoint.as_str(),
            headers,
            body,
        )
        .await?;
        read_json(response).await
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn call(
        &self,
        spec: &ProviderSpec,
        video: &VideoReference,
        format_code: &str,
    ) -> ProviderOutcome {
        debug!(provider = %spec.name, endpoint = %spec.endpoint, "calling provider");
        match self.send(spec, video, format_code).await {
            Ok(payload) => ProviderOutcome::Success { payload },
            Err(e) => classify(&spec.name, e),
        }
    }
}

/// Map a request error onto the provider failure taxonomy.
///
/// Status is checked before the body is read, so an HTTP error always wins
/// over a decode error; anything that is neither is a transport failure.
pub fn classify(provider_name: &str, error: ResolveError) -> ProviderOutcome {
    match error {
        ResolveError::HttpError { status, .. } => ProviderOutcome::failure(
            provider_name,
            FailureKind::HttpStatus,
            format!("HTTP Error ({}): {}", provider_name, status),
        ),
        ResolveError::JsonError(e) => ProviderOutcome::failure(
            provider_name,
            FailureKind::Decode,
            format!("JSON Decode Error ({}): {}", provider_name, e),
        ),
        e => ProviderOutcome::failure(
            provider_name,
            FailureKind::Transport,
            format!("Transport error ({}): {}", provider_name, e),
        ),
    }
}
