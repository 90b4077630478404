//! HTTP boundary: query parsing, input errors, CORS and advisory headers.

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use url::form_urlencoded;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::ResolveError;
use crate::resolver::Resolver;

const RATE_LIMIT: &str = "60";
const RATE_LIMIT_REMAINING: &str = "59";
const RATE_LIMIT_WINDOW_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AppState {
    resolver: Resolver,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolveParams {
    pub url: Option<String>,
    pub format_code: Option<String>,
    pub quality: Option<String>,
}

impl ResolveParams {
    /// Decode a raw query string; a repeated key keeps its last value.
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "url" => &mut params.url,
                "format_code" => &mut params.format_code,
                "quality" => &mut params.quality,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        params
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let status = match &err {
            ResolveError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(resolver: Resolver) -> Router {
    let state = AppState { resolver };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let endpoint = get(resolve).options(preflight).fallback(method_not_allowed);

    Router::new()
        .route("/", endpoint.clone())
        .route("/resolve", endpoint)
        .layer(cors)
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ResolveError::MethodNotAllowed.into()
}

async fn resolve(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    // The GET route also receives HEAD
    if method != Method::GET {
        return Err(ResolveError::MethodNotAllowed.into());
    }

    let params = ResolveParams::parse(query.as_deref());
    let request = state.resolver.request(
        params.url.as_deref(),
        params.format_code.as_deref(),
        params.quality.as_deref(),
    )?;

    let result = state.resolver.resolve(&request).await;

    let body = serde_json::to_string_pretty(&result.to_wire()).map_err(|e| {
        error!(error = %e, "failed to serialize result");
        ApiError::from(ResolveError::from(e))
    })?;

    info!(
        url = request.video.source_url(),
        format_code = %request.format_code,
        ip = client_addr(&headers),
        status = %result.status,
        source = %result.source,
        "request served"
    );

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response();
    insert_rate_limit_headers(response.headers_mut());
    Ok(response)
}

/// Static, advisory values; nothing counts requests.
fn insert_rate_limit_headers(headers: &mut HeaderMap) {
    let reset = (Utc::now().timestamp() + RATE_LIMIT_WINDOW_SECS).to_string();
    headers.insert("x-ratelimit-limit", HeaderValue::from_static(RATE_LIMIT));
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from_static(RATE_LIMIT_REMAINING),
    );
    if let Ok(value) = HeaderValue::from_str(&reset) {
        headers.insert("x-ratelimit-reset", value);
    }
}

fn client_addr(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
}
