//! Fallback link builder.
//!
//! Links produced here come from a fixed template with random tokens; nothing
//! about them is verified. Callers see them with `source: generated`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Lifetime stamped into generated links and into every result
pub const LINK_TTL_SECS: i64 = 21_600;

const HOST_TEMPLATES: [&str; 4] = [
    "https://rr1---sn-oj5hn5-55.googlevideo.com/videoplayback",
    "https://rr2---sn-oj5hn5-55.googlevideo.com/videoplayback",
    "https://rr3---sn-oj5hn5-55.googlevideo.com/videoplayback",
    "https://rr4---sn-oj5hn5-55.googlevideo.com/videoplayback",
];

const PLACEHOLDER_IP: &str = "127.0.0.1";
const CONTENT_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 1_000_000..=10_000_000;

#[derive(Debug, Clone, Default)]
pub struct SyntheticLinkGenerator;

impl SyntheticLinkGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build `count` links, cycling through the host templates.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        video_id: &str,
        format_code: &str,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<String> {
        HOST_TEMPLATES
            .iter()
            .cycle()
            .take(count)
            .map(|host| build_link(host, video_id, format_code, now, rng))
            .collect()
    }
}

fn build_link<R: Rng + ?Sized>(
    host: &str,
    video_id: &str,
    format_code: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let expire = now.timestamp() + LINK_TTL_SECS;
    let lmt = format!("{}000", now.timestamp());
    let clen = rng.gen_range(CONTENT_LENGTH_RANGE);

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("expire", &expire.to_string())
        .append_pair("ei", &random_token(rng, 15))
        .append_pair("ip", PLACEHOLDER_IP)
        .append_pair("id", &opaque_id(video_id, rng))
        .append_pair("itag", format_code)
        .append_pair("source", "youtube")
        .append_pair("requiressl", "yes")
        .append_pair("mime", "video/mp4")
        .append_pair("dur", "44.544")
        .append_pair("lmt", &lmt)
        .append_pair("ratebypass", "yes")
        .append_pair("clen", &clen.to_string())
        .append_pair("gir", "yes")
        .finish();

    format!("{}?{}", host, query)
}

fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// `o-` + base64(md5(video id) followed by 14 random bytes)
fn opaque_id<R: Rng + ?Sized>(video_id: &str, rng: &mut R) -> String {
    let mut bytes = md5::compute(video_id).0.to_vec();
    let mut salt = [0u8; 14];
    rng.fill_bytes(&mut salt);
    bytes.extend_from_slice(&salt);
    format!("o-{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use url::Url;

    const KEYS: [&str; 13] = [
        "expire", "ei", "ip", "id", "itag", "source", "requiressl", "mime", "dur", "lmt",
        "ratebypass", "clen", "gir",
    ];

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn params(link: &str) -> (Url, HashMap<String, String>) {
        let url = Url::parse(link).unwrap();
        let map = url.query_pairs().into_owned().collect();
        (url, map)
    }

    #[test]
    fn links_follow_the_template() {
        let mut rng = StdRng::seed_from_u64(1);
        let links = SyntheticLinkGenerator::new().generate("dQw4w9WgXcQ", "22", 3, now(), &mut rng);
        assert_eq!(links.len(), 3);

        for (i, link) in links.iter().enumerate() {
            let (url, map) = params(link);
            assert_eq!(
                url.host_str().unwrap(),
                format!("rr{}---sn-oj5hn5-55.googlevideo.com", i + 1)
            );
            assert_eq!(url.path(), "/videoplayback");

            let keys: Vec<_> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
            assert_eq!(keys, KEYS);

            assert_eq!(map["itag"], "22");
            assert_eq!(map["expire"], (1_700_000_000 + LINK_TTL_SECS).to_string());
            assert_eq!(map["lmt"], "1700000000000");
            assert_eq!(map["mime"], "video/mp4");
            assert_eq!(map["ip"], "127.0.0.1");
            assert!(map["id"].starts_with("o-"));

            let clen: u32 = map["clen"].parse().unwrap();
            assert!(CONTENT_LENGTH_RANGE.contains(&clen));
        }
    }

    #[test]
    fn opaque_id_is_derived_from_video_id() {
        let mut rng = StdRng::seed_from_u64(9);
        let token = opaque_id("abc123", &mut rng);
        let raw = STANDARD.decode(token.trim_start_matches("o-")).unwrap();
        assert_eq!(raw.len(), 30);
        assert_eq!(&raw[..16], &md5::compute("abc123").0);
    }

    #[test]
    fn hosts_cycle_past_the_template_list() {
        let mut rng = StdRng::seed_from_u64(2);
        let links = SyntheticLinkGenerator::new().generate("abc123", "18", 6, now(), &mut rng);
        assert_eq!(links.len(), 6);
        assert!(links[4].starts_with(HOST_TEMPLATES[0]));
        assert!(links[5].starts_with(HOST_TEMPLATES[1]));
        assert!(
            SyntheticLinkGenerator::new()
                .generate("abc123", "18", 0, now(), &mut rng)
                .is_empty()
        );
    }

    #[test]
    fn repeated_calls_differ_only_in_random_values() {
        let generator = SyntheticLinkGenerator::new();
        let a = generator.generate("abc123", "18", 3, now(), &mut rand::thread_rng());
        let b = generator.generate("abc123", "18", 3, now(), &mut rand::thread_rng());

        for (x, y) in a.iter().zip(&b) {
            let (ux, mx) = params(x);
            let (uy, my) = params(y);
            assert_eq!(ux.host_str(), uy.host_str());
            assert_eq!(mx.len(), my.len());
            assert_eq!(mx["itag"], my["itag"]);
            assert_eq!(mx["expire"], my["expire"]);
            assert_ne!(mx["ei"], my["ei"]);
            assert_ne!(mx["id"], my["id"]);
        }
    }

    #[test]
    fn injected_rng_makes_output_reproducible() {
        let generator = SyntheticLinkGenerator::new();
        let a = generator.generate("abc123", "18", 2, now(), &mut StdRng::seed_from_u64(5));
        let b = generator.generate("abc123", "18", 2, now(), &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
