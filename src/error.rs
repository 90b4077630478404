use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Could not extract video ID from URL")]
    VideoIdNotFound,

    #[error("Method not allowed. Use GET method.")]
    MethodNotAllowed,

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("HTTP error {status} for URL: {url}")]
    HttpError { status: u16, url: String },

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ResolveError {
    /// Errors caused by the caller's input rather than by this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingUrl | Self::InvalidUrl | Self::VideoIdNotFound | Self::MethodNotAllowed
        )
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
