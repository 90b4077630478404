use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::{ResolveError, Result};

pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client for third-party endpoints.
///
/// Certificate validation is disabled: a provider with a broken chain must not
/// block resolution.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Merge `overrides` on top of `base`, replacing headers with the same name
pub fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut headers = base.clone();
    for (name, value) in overrides {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

/// Execute HTTP request, turning non-200 statuses into [`ResolveError::HttpError`]
pub async fn execute_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: &str,
    headers: HeaderMap,
    body: Option<String>,
) -> Result<reqwest::Response> {
    let mut request = client.request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = request.send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::OK {
        Ok(response)
    } else {
        Err(ResolveError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Read the whole body and parse it as JSON
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// GET a URL and parse the JSON response
pub async fn download_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<T> {
    let response = execute_request(client, reqwest::Method::GET, url, headers, None).await?;
    read_json(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderValue, REFERER};

    #[test]
    fn overrides_replace_matching_headers() {
        let mut base = HeaderMap::new();
        base.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        base.insert(REFERER, HeaderValue::from_static("https://www.youtube.com/"));

        let mut overrides = HeaderMap::new();
        overrides.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let merged = merge_headers(&base, &overrides);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(merged[REFERER], "https://www.youtube.com/");
    }

    #[test]
    fn client_builds() {
        assert!(build_client(PROVIDER_TIMEOUT, "test-agent").is_ok());
    }
}
