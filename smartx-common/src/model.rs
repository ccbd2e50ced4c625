//! Artist data model
//!
//! Two shapes live here: the raw, sparse record as stored by the data
//! platform, and the resolved public profile handed to the UI.
//!
//! The numbered photo and video columns of the raw record are held as
//! fixed-size slot arrays. Slot `i` always corresponds to the `i`-th stored
//! column, so gaps never shift the position of later slots.

use serde::{Deserialize, Serialize};

/// Number of photo slots (`image1..image12`)
pub const PHOTO_SLOTS: usize = 12;

/// Number of video slots (`link_to_video`, `link_to_video2..link_to_video10`)
pub const VIDEO_SLOTS: usize = 10;

/// Stage name used when neither artistic nor full name is set
pub const DEFAULT_STAGE_NAME: &str = "Artista SMARTx";

/// Publication state of projects and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Published,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
        }
    }

    /// Parse a stored status; anything unrecognized is treated as draft
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("published") {
            PublicationStatus::Published
        } else {
            PublicationStatus::Draft
        }
    }
}

/// One numbered photo slot and its caption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSlot {
    pub path: Option<String>,
    pub caption: Option<String>,
}

/// One numbered video slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSlot {
    pub link: Option<String>,
}

/// Social link columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub youtube_channel: Option<String>,
    pub music_spotify_apple: Option<String>,
}

/// Rich-text narrative columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    /// `visao_geral_titulo`
    pub vision: Option<String>,
    /// `historia_titulo`
    pub history: Option<String>,
    /// `carreira_titulo`
    pub career: Option<String>,
    /// `mais_titulo`
    pub more: Option<String>,
}

/// Denormalized artist row as read from `artist_public_view`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArtistRecord {
    pub id: String,
    pub slug: Option<String>,
    pub member_id: Option<String>,

    pub artistic_name: Option<String>,
    pub full_name: Option<String>,

    pub country_residence: Option<String>,
    pub city: Option<String>,
    pub country_of_birth: Option<String>,
    pub profile_text2: Option<String>,

    pub narrative: Narrative,

    pub profile_image: Option<String>,
    pub video_banner_landscape: Option<String>,
    pub video_banner_portrait: Option<String>,
    pub audio: Option<String>,

    pub photos: [PhotoSlot; PHOTO_SLOTS],
    pub videos: [VideoSlot; VIDEO_SLOTS],

    pub socials: SocialLinks,

    pub perfil_completo: bool,
    pub accepted_terms1: bool,
    pub accepted_terms2: bool,
}

/// Project row owned by an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: String,
    pub member_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
    pub link: Option<String>,
    pub status: PublicationStatus,
}

/// Event row owned by an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub member_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub place: Option<String>,
    pub link: Option<String>,
    pub image_path: Option<String>,
    pub status: PublicationStatus,
}

/// Returns the trimmed value when it carries any text
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Resolved public profile
// ============================================================================

/// UI-ready artist profile
///
/// Recomputed on every fetch and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub stage_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub sections: Vec<ProfileSection>,
    #[serde(default)]
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub projects: Vec<PublicProject>,
    #[serde(default)]
    pub events: Vec<PublicEvent>,
    #[serde(default)]
    pub profile_complete: bool,
}

/// Narrative block, keyed `vision`, `history`, `career` or `more`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSection {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<crate::video::VideoProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProject {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl PublicProject {
    /// At least one display field carries a value
    pub fn has_content(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.image_url,
            &self.video_url,
            &self.link,
        ]
        .iter()
        .any(|v| non_empty(v.as_deref()).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PublicEvent {
    /// At least one display field carries a value
    pub fn has_content(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.date,
            &self.place,
            &self.link,
            &self.image_url,
        ]
        .iter()
        .any(|v| non_empty(v.as_deref()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(PublicationStatus::parse("published"), PublicationStatus::Published);
        assert_eq!(PublicationStatus::parse(" Published "), PublicationStatus::Published);
        assert_eq!(PublicationStatus::parse("draft"), PublicationStatus::Draft);
        assert_eq!(PublicationStatus::parse("archived"), PublicationStatus::Draft);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some(" Lisboa ")), Some("Lisboa"));
    }

    #[test]
    fn test_event_without_fields_has_no_content() {
        let event = PublicEvent {
            id: "e1".to_string(),
            title: Some("  ".to_string()),
            description: None,
            date: None,
            place: None,
            link: None,
            image_url: None,
        };
        assert!(!event.has_content());

        let event = PublicEvent {
            place: Some("Porto".to_string()),
            ..event
        };
        assert!(event.has_content());
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = PublicProfile {
            id: "a1".to_string(),
            slug: Some("ana".to_string()),
            stage_name: "Ana".to_string(),
            country: None,
            city: None,
            avatar_url: Some("https://cdn.example.com/a.jpg".to_string()),
            cover_url: None,
            audio_url: None,
            sections: vec![],
            stats: vec![],
            socials: vec![],
            photos: vec![],
            videos: vec![],
            projects: vec![],
            events: vec![],
            profile_complete: false,
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["stageName"], "Ana");
        assert_eq!(json["avatarUrl"], "https://cdn.example.com/a.jpg");
        assert!(json["coverUrl"].is_null());
        assert!(json["photos"].as_array().unwrap().is_empty());
    }
}
