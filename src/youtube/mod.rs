pub mod metadata;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use metadata::OembedFetcher;
pub use types::VideoInfo;
pub use utils::{build_oembed_url, build_watch_url, is_youtube_url, parse_id};
