//! Public profile aggregation
//!
//! Turns one sparse artist record plus its published projects and events
//! into a [`PublicProfile`]. Used by the API server and by the client-side
//! fallback path; both inject their own [`ProfileSource`] and signer.
//!
//! # Guarantees
//! - Identifier lookup order is slug, then id, then member_id.
//! - Every media reference of one call is resolved concurrently, and
//!   results are reassembled by slot index, never by completion order.
//! - A failed reference drops only that field; aggregation still succeeds.
//! - Output order is fixed: slot order for photos and videos, list order
//!   for stats, socials and sections.

use crate::db::{LookupKey, ProfileSource};
use crate::model::{
    non_empty, EventRecord, Photo, ProfileSection, ProjectRecord, PublicEvent, PublicProfile,
    PublicProject, RawArtistRecord, SocialLink, Stat, Video, VideoSlot, DEFAULT_STAGE_NAME,
};
use crate::storage::{is_absolute_url, StorageResolver};
use crate::video::{classify, classify_with_hint, embed_url, VideoProvider};
use crate::{Error, Result};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds public profiles from the data platform
#[derive(Clone)]
pub struct ProfileAggregator {
    source: Arc<dyn ProfileSource>,
    resolver: StorageResolver,
}

impl ProfileAggregator {
    pub fn new(source: Arc<dyn ProfileSource>, resolver: StorageResolver) -> Self {
        Self { source, resolver }
    }

    pub fn resolver(&self) -> &StorageResolver {
        &self.resolver
    }

    /// Aggregate the public profile for a slug, id or member_id
    ///
    /// Fails with [`Error::NotFound`] when no lookup matches.
    pub async fn aggregate(&self, identifier: &str) -> Result<PublicProfile> {
        let record = self.find_record(identifier).await?;

        let (projects, events) = match non_empty(record.member_id.as_deref()) {
            Some(member_id) => {
                let (projects, events) = futures::join!(
                    self.source.published_projects(member_id),
                    self.source.published_events(member_id)
                );
                (
                    projects.unwrap_or_else(|e| {
                        warn!(member_id = %member_id, error = %e, "Projects unavailable");
                        Vec::new()
                    }),
                    events.unwrap_or_else(|e| {
                        warn!(member_id = %member_id, error = %e, "Events unavailable");
                        Vec::new()
                    }),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        let profile = self.build_profile(&record, &projects, &events).await;

        info!(
            identifier = %identifier,
            artist_id = %profile.id,
            photos = profile.photos.len(),
            videos = profile.videos.len(),
            projects = profile.projects.len(),
            events = profile.events.len(),
            "Profile aggregated"
        );

        Ok(profile)
    }

    /// First record matching the identifier by slug, id, then member_id
    pub async fn find_record(&self, identifier: &str) -> Result<RawArtistRecord> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::NotFound("empty artist identifier".to_string()));
        }

        for key in LookupKey::ORDER {
            if let Some(record) = self.source.find_artist(key, identifier).await? {
                debug!(identifier = %identifier, column = key.column(), "Artist matched");
                return Ok(record);
            }
        }

        Err(Error::NotFound(format!("artist '{}'", identifier)))
    }

    /// Resolve media and derive every profile field
    ///
    /// `projects` and `events` are expected to be published already; entries
    /// without any display value are dropped here.
    pub async fn build_profile(
        &self,
        record: &RawArtistRecord,
        projects: &[ProjectRecord],
        events: &[EventRecord],
    ) -> PublicProfile {
        let photo_refs: Vec<Option<&str>> =
            record.photos.iter().map(|slot| slot.path.as_deref()).collect();

        let (avatar, landscape, portrait, audio, photo_urls, videos, projects, events) = futures::join!(
            self.resolver.resolve(record.profile_image.as_deref()),
            self.resolver.resolve(record.video_banner_landscape.as_deref()),
            self.resolver.resolve(record.video_banner_portrait.as_deref()),
            self.resolver.resolve(record.audio.as_deref()),
            self.resolver.resolve_many(&photo_refs),
            self.resolve_videos(&record.videos),
            self.resolve_projects(projects),
            self.resolve_events(events),
        );

        let photos = record
            .photos
            .iter()
            .zip(photo_urls)
            .filter_map(|(slot, url)| {
                url.map(|url| Photo {
                    url,
                    alt: owned(slot.caption.as_deref()),
                })
            })
            .collect();

        PublicProfile {
            id: record.id.clone(),
            slug: owned(record.slug.as_deref()),
            stage_name: stage_name(record),
            country: owned(record.country_residence.as_deref()),
            city: owned(record.city.as_deref()),
            avatar_url: avatar,
            cover_url: landscape.or(portrait),
            audio_url: audio,
            sections: sections(record),
            stats: stats(record),
            socials: socials(record),
            photos,
            videos,
            projects,
            events,
            profile_complete: record.perfil_completo
                && record.accepted_terms1
                && record.accepted_terms2,
        }
    }

    async fn resolve_videos(&self, slots: &[VideoSlot]) -> Vec<Video> {
        join_all(slots.iter().map(|slot| self.resolve_video(slot.link.as_deref())))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Direct files and relative references are private assets; absolute
    /// platform links are used verbatim
    async fn resolve_video(&self, link: Option<&str>) -> Option<Video> {
        let link = non_empty(link)?;
        let provider = classify(link);

        if !is_absolute_url(link) || provider == Some(VideoProvider::File) {
            let url = self.resolver.resolve(Some(link)).await?;
            return Some(Video {
                url,
                provider: classify_with_hint(link, Some(VideoProvider::File)),
                embed_url: None,
            });
        }

        Some(Video {
            url: link.to_string(),
            provider,
            embed_url: embed_url(link, provider),
        })
    }

    async fn resolve_projects(&self, projects: &[ProjectRecord]) -> Vec<PublicProject> {
        join_all(projects.iter().map(|project| async move {
            let (image_url, video_url) = futures::join!(
                self.resolver.resolve(project.image_path.as_deref()),
                self.resolver.resolve(project.video_path.as_deref()),
            );
            PublicProject {
                id: project.id.clone(),
                title: owned(project.title.as_deref()),
                description: owned(project.description.as_deref()),
                image_url,
                video_url,
                link: owned(project.link.as_deref()),
            }
        }))
        .await
        .into_iter()
        .filter(PublicProject::has_content)
        .collect()
    }

    async fn resolve_events(&self, events: &[EventRecord]) -> Vec<PublicEvent> {
        join_all(events.iter().map(|event| async move {
            PublicEvent {
                id: event.id.clone(),
                title: owned(event.title.as_deref()),
                description: owned(event.description.as_deref()),
                date: owned(event.event_date.as_deref()),
                place: owned(event.place.as_deref()),
                link: owned(event.link.as_deref()),
                image_url: self.resolver.resolve(event.image_path.as_deref()).await,
            }
        }))
        .await
        .into_iter()
        .filter(PublicEvent::has_content)
        .collect()
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

/// Artistic name, then full name, then the fixed label
pub fn stage_name(record: &RawArtistRecord) -> String {
    non_empty(record.artistic_name.as_deref())
        .or_else(|| non_empty(record.full_name.as_deref()))
        .unwrap_or(DEFAULT_STAGE_NAME)
        .to_string()
}

/// Stats for country, city and profile highlight, only when present
pub fn stats(record: &RawArtistRecord) -> Vec<Stat> {
    [
        ("País", record.country_residence.as_deref()),
        ("Cidade", record.city.as_deref()),
        ("Perfil", record.profile_text2.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        non_empty(value).map(|value| Stat {
            label: label.to_string(),
            value: value.to_string(),
        })
    })
    .collect()
}

/// Social links in fixed order, absent links omitted
pub fn socials(record: &RawArtistRecord) -> Vec<SocialLink> {
    let links = &record.socials;
    [
        ("Site", links.website.as_deref()),
        ("Instagram", links.instagram.as_deref()),
        ("Facebook", links.facebook.as_deref()),
        ("YouTube", links.youtube_channel.as_deref()),
        ("Spotify/Apple", links.music_spotify_apple.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, url)| {
        non_empty(url).map(|url| SocialLink {
            label: label.to_string(),
            url: url.to_string(),
        })
    })
    .collect()
}

/// Narrative blocks in fixed order, empty ones omitted
pub fn sections(record: &RawArtistRecord) -> Vec<ProfileSection> {
    let narrative = &record.narrative;
    [
        ("vision", narrative.vision.as_deref()),
        ("history", narrative.history.as_deref()),
        ("career", narrative.career.as_deref()),
        ("more", narrative.more.as_deref()),
    ]
    .into_iter()
    .filter_map(|(key, text)| {
        non_empty(text).map(|text| ProfileSection {
            key: key.to_string(),
            text: text.to_string(),
        })
    })
    .collect()
}
