use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ResolveError, Result};

pub const WEB_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const OEMBED_USER_AGENT: &str = "Mozilla/5.0 (compatible; YouTubeDownloader/1.0)";

static HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?(youtube\.com|youtu\.be)").expect("host pattern is valid")
});

// First match wins, so the order here is part of the contract.
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtube\.com/watch\?v=([a-zA-Z0-9_-]+)",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]+)",
        r"youtu\.be/([a-zA-Z0-9_-]+)",
        r"youtube\.com/embed/([a-zA-Z0-9_-]+)",
        r"youtube\.com/v/([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("id pattern is valid"))
    .collect()
});

/// Parse video ID from any of the accepted YouTube URL shapes
pub fn parse_id(url: &str) -> Result<String> {
    ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| is_valid_video_id(id))
        .ok_or(ResolveError::VideoIdNotFound)
}

/// Non-empty and made only of alphanumerics, `-` and `_`
pub fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Check that the URL points at youtube.com or youtu.be over http(s)
pub fn is_youtube_url(url: &str) -> bool {
    HOST_RE.is_match(url)
}

/// Construct YouTube watch URL from video ID
pub fn build_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Construct the oEmbed lookup URL for a video ID
pub fn build_oembed_url(video_id: &str) -> String {
    format!(
        "https://www.youtube.com/oembed?url={}&format=json",
        build_watch_url(video_id)
    )
}
