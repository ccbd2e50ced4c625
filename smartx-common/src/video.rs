//! Video provider classification
//!
//! Decides how a video link is rendered: an embedded platform player
//! (YouTube, Vimeo) or direct file playback. Classification never fails;
//! an unrecognized link is simply left unclassified and renderers fall back
//! to a generic frame.

use serde::{Deserialize, Serialize};
use url::Url;

/// Rendering strategy for a video link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    Youtube,
    Vimeo,
    File,
}

const FILE_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".ogg"];

/// Classify a link by sniffing the whole URL string (case-insensitive)
pub fn classify(url: &str) -> Option<VideoProvider> {
    let lower = url.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }

    if lower.contains("youtu") {
        return Some(VideoProvider::Youtube);
    }
    if lower.contains("vimeo") {
        return Some(VideoProvider::Vimeo);
    }

    // Extension may be followed by a query string, nothing else
    let before_query = lower.split('?').next().unwrap_or_default();
    if FILE_EXTENSIONS.iter().any(|ext| before_query.ends_with(ext)) {
        return Some(VideoProvider::File);
    }

    None
}

/// Classify with an explicit hint from the data model; the hint wins
pub fn classify_with_hint(url: &str, hint: Option<VideoProvider>) -> Option<VideoProvider> {
    hint.or_else(|| classify(url))
}

/// Player URL for embeddable providers
///
/// Returns `None` for files, unclassified links, and links whose video id
/// cannot be extracted.
pub fn embed_url(url: &str, provider: Option<VideoProvider>) -> Option<String> {
    match provider? {
        VideoProvider::Youtube => {
            youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{}", id))
        }
        VideoProvider::Vimeo => {
            last_path_segment(url).map(|id| format!("https://player.vimeo.com/video/{}", id))
        }
        VideoProvider::File => None,
    }
}

/// Video id from the `v` query parameter or the last path segment
pub fn youtube_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;

    if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        if is_valid_id(&v) {
            return Some(v.into_owned());
        }
    }

    last_segment_of(&parsed).filter(|id| id != "watch")
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    last_segment_of(&parsed)
}

fn last_segment_of(parsed: &Url) -> Option<String> {
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .filter(|s| is_valid_id(s))
        .map(str::to_string)
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
