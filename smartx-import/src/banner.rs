//! Legacy video banner path normalization
//!
//! Older exports stored banner videos as bare paths without a bucket, or
//! with a leading slash. Paths are rewritten to live in the video bucket;
//! paths that name a different bucket are discarded.

use smartx_common::storage::{is_absolute_url, BucketConfig};

/// Outcome of normalizing one banner cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerPath {
    /// No value
    Empty,
    /// Usable as-is: absolute URL or already in the video bucket
    Valid(String),
    /// Points into another known bucket; discarded
    Invalid(String),
    /// Prefixed with the video bucket
    Normalized(String),
}

impl BannerPath {
    /// Value to store, if any
    pub fn into_value(self) -> Option<String> {
        match self {
            BannerPath::Valid(path) | BannerPath::Normalized(path) => Some(path),
            BannerPath::Empty | BannerPath::Invalid(_) => None,
        }
    }
}

pub fn normalize_video_banner(raw: Option<&str>, buckets: &BucketConfig) -> BannerPath {
    let value = raw.map(str::trim).unwrap_or_default();
    if is_absolute_url(value) {
        return BannerPath::Valid(value.to_string());
    }

    let path = value.trim_start_matches('/').trim();
    if path.is_empty() {
        return BannerPath::Empty;
    }

    let first = path.split('/').next().unwrap_or_default();
    if first == buckets.video_bucket() {
        BannerPath::Valid(path.to_string())
    } else if buckets.is_known(first) {
        BannerPath::Invalid(path.to_string())
    } else {
        BannerPath::Normalized(format!("{}/{}", buckets.video_bucket(), path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets() -> BucketConfig {
        BucketConfig::new(
            ["videos".to_string(), "photos".to_string(), "avatars".to_string()],
            "artist-media",
            "videos",
        )
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(normalize_video_banner(None, &buckets()), BannerPath::Empty);
        assert_eq!(normalize_video_banner(Some("  "), &buckets()), BannerPath::Empty);
        assert_eq!(normalize_video_banner(Some("///"), &buckets()), BannerPath::Empty);
    }

    #[test]
    fn test_absolute_url_kept() {
        assert_eq!(
            normalize_video_banner(Some("https://cdn.example.com/b.mp4"), &buckets()),
            BannerPath::Valid("https://cdn.example.com/b.mp4".to_string())
        );
    }

    #[test]
    fn test_video_bucket_path_valid() {
        assert_eq!(
            normalize_video_banner(Some("/videos/m-1/banner.mp4"), &buckets()),
            BannerPath::Valid("videos/m-1/banner.mp4".to_string())
        );
    }

    #[test]
    fn test_other_bucket_discarded() {
        let result = normalize_video_banner(Some("photos/m-1/banner.mp4"), &buckets());
        assert_eq!(result, BannerPath::Invalid("photos/m-1/banner.mp4".to_string()));
        assert_eq!(result.into_value(), None);
    }

    #[test]
    fn test_bare_path_prefixed() {
        let result = normalize_video_banner(Some("/m-1/banner.mp4"), &buckets());
        assert_eq!(result, BannerPath::Normalized("videos/m-1/banner.mp4".to_string()));
        assert_eq!(result.into_value().as_deref(), Some("videos/m-1/banner.mp4"));
    }
}
