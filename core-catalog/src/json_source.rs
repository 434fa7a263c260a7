//! JSON catalog source.
//!
//! Catalog documents look like:
//!
//! ```json
//! { "music": [
//!     { "id": "wake_up_01",
//!       "title": "Intro - The Way Of Waking Up",
//!       "album": "Wake Up",
//!       "artist": "The Kyoto Connection",
//!       "genre": "Electronic",
//!       "source": "audio/01_intro.mp3",
//!       "image": "art/wake_up.jpg",
//!       "trackNumber": 1,
//!       "totalTrackCount": 13,
//!       "duration": 90 }
//! ]}
//! ```
//!
//! `duration` is in seconds. `source` and `image` may be relative, in which
//! case they resolve against the directory of the catalog file (or the base
//! URI given for inline documents).

use async_trait::async_trait;
use bridge_traits::media::{MediaFlag, MediaItem, MetadataKey};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::source::{MusicSource, SourceState, SourceStatus};

#[derive(Debug, Deserialize)]
struct JsonCatalog {
    #[serde(default)]
    music: Vec<JsonMusic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JsonMusic {
    id: String,
    title: String,
    album: String,
    artist: String,
    genre: String,
    source: String,
    image: String,
    track_number: i64,
    total_track_count: i64,
    duration: i64,
}

impl Default for JsonMusic {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            album: String::new(),
            artist: String::new(),
            genre: String::new(),
            source: String::new(),
            image: String::new(),
            track_number: 0,
            total_track_count: 0,
            duration: -1,
        }
    }
}

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Inline(String),
}

/// Music source backed by a JSON catalog document.
#[derive(Debug)]
pub struct JsonSource {
    origin: Origin,
    base_uri: Option<String>,
    catalog: RwLock<Vec<Arc<MediaItem>>>,
    status: SourceStatus,
}

impl JsonSource {
    /// Catalog read from `path`; relative entries resolve against its directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_uri = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| parent.to_string_lossy().into_owned());
        Self {
            origin: Origin::File(path),
            base_uri,
            catalog: RwLock::new(Vec::new()),
            status: SourceStatus::new(),
        }
    }

    /// Catalog held in memory.
    pub fn from_json(json: impl Into<String>, base_uri: Option<String>) -> Self {
        Self {
            origin: Origin::Inline(json.into()),
            base_uri,
            catalog: RwLock::new(Vec::new()),
            status: SourceStatus::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) => Some(path),
            Origin::Inline(_) => None,
        }
    }

    async fn read_document(&self) -> Result<String> {
        match &self.origin {
            Origin::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            Origin::Inline(json) => Ok(json.clone()),
        }
    }

    fn resolve(&self, reference: &str) -> String {
        match &self.base_uri {
            Some(base) if is_relative(reference) => {
                format!("{}/{}", base.trim_end_matches('/'), reference)
            }
            _ => reference.to_string(),
        }
    }

    fn to_media_item(&self, music: JsonMusic) -> MediaItem {
        let mut builder = MediaItem::builder(music.id)
            .flag(MediaFlag::Playable)
            .title(music.title.clone())
            .artist(music.artist.clone())
            .album(music.album.clone())
            .genre(music.genre)
            .long(MetadataKey::TrackNumber, music.track_number)
            .long(MetadataKey::TrackCount, music.total_track_count)
            .text(MetadataKey::DisplayTitle, music.title)
            .text(MetadataKey::DisplaySubtitle, music.artist)
            .text(MetadataKey::DisplayDescription, music.album);

        if !music.source.is_empty() {
            builder = builder.media_uri(self.resolve(&music.source));
        }
        if !music.image.is_empty() {
            let art = self.resolve(&music.image);
            builder = builder
                .art_uri(art.clone())
                .text(MetadataKey::DisplayIconUri, art);
        }
        if music.duration >= 0 {
            builder = builder.duration_ms(music.duration.saturating_mul(1000));
        }

        builder.build()
    }

    fn parse(&self, document: &str) -> Result<Vec<Arc<MediaItem>>> {
        let catalog: JsonCatalog = serde_json::from_str(document)?;
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(catalog.music.len());

        for (index, music) in catalog.music.into_iter().enumerate() {
            if music.id.trim().is_empty() {
                return Err(CatalogError::InvalidEntry {
                    index,
                    message: "missing id".to_string(),
                });
            }
            if !seen.insert(music.id.clone()) {
                return Err(CatalogError::InvalidEntry {
                    index,
                    message: format!("duplicate id '{}'", music.id),
                });
            }
            if music.source.is_empty() {
                warn!(media_id = %music.id, "Catalog entry has no source");
            }
            items.push(Arc::new(self.to_media_item(music)));
        }

        Ok(items)
    }
}

fn is_relative(reference: &str) -> bool {
    !(reference.contains("://") || reference.starts_with('/') || reference.starts_with('\\'))
        && !Path::new(reference).is_absolute()
}

#[async_trait]
impl MusicSource for JsonSource {
    async fn load(&self) -> Result<()> {
        self.status.set(SourceState::Initializing);

        let parsed = match self.read_document().await {
            Ok(document) => self.parse(&document),
            Err(err) => Err(err),
        };

        match parsed {
            Ok(items) => {
                info!(count = items.len(), "JSON catalog loaded");
                *self.catalog.write() = items;
                self.status.set(SourceState::Initialized);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "JSON catalog failed to load");
                self.status.set(SourceState::Error);
                Err(err)
            }
        }
    }

    fn state(&self) -> SourceState {
        self.status.get()
    }

    fn items(&self) -> Vec<Arc<MediaItem>> {
        self.catalog.read().clone()
    }

    async fn when_ready(&self) -> bool {
        self.status.wait_settled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "music": [
            {
                "id": "wake_up_01",
                "title": "Intro",
                "album": "Wake Up",
                "artist": "The Kyoto Connection",
                "genre": "Electronic",
                "source": "audio/01.mp3",
                "image": "https://cdn.example.com/art.jpg",
                "trackNumber": 1,
                "totalTrackCount": 13,
                "duration": 90
            },
            {
                "id": "wake_up_02",
                "title": "Geisha",
                "source": "/srv/music/02.mp3"
            }
        ]
    }"#;

    #[tokio::test]
    async fn parses_entries_and_resolves_relative_uris() {
        let source = JsonSource::from_json(CATALOG, Some("file:///srv/catalog/".to_string()));
        source.load().await.unwrap();

        assert_eq!(source.state(), SourceState::Initialized);
        let items = source.items();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title(), Some("Intro"));
        assert_eq!(first.media_uri(), Some("file:///srv/catalog/audio/01.mp3"));
        assert_eq!(first.art_uri(), Some("https://cdn.example.com/art.jpg"));
        assert_eq!(first.duration_ms(), Some(90_000));
        assert_eq!(first.long(MetadataKey::TrackCount), Some(13));

        let second = &items[1];
        assert_eq!(second.media_uri(), Some("/srv/music/02.mp3"));
        assert_eq!(second.duration_ms(), None);
        assert_eq!(second.art_uri(), None);
    }

    #[tokio::test]
    async fn malformed_document_moves_to_error() {
        let source = JsonSource::from_json("{ not json", None);
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert_eq!(source.state(), SourceState::Error);
        assert!(!source.when_ready().await);
        assert!(source.items().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let json = r#"{"music":[{"id":"a","source":"a.mp3"},{"id":"a","source":"b.mp3"}]}"#;
        let source = JsonSource::from_json(json, None);
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { index: 1, .. }));
    }

    #[tokio::test]
    async fn missing_id_is_rejected() {
        let json = r#"{"music":[{"title":"nameless"}]}"#;
        let source = JsonSource::from_json(json, None);
        assert!(matches!(
            source.load().await,
            Err(CatalogError::InvalidEntry { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn empty_document_is_an_empty_catalog() {
        let source = JsonSource::from_json("{}", None);
        source.load().await.unwrap();
        assert!(source.when_ready().await);
        assert!(source.items().is_empty());
    }

    #[test]
    fn relative_detection() {
        assert!(is_relative("audio/01.mp3"));
        assert!(!is_relative("https://example.com/a.mp3"));
        assert!(!is_relative("/abs/a.mp3"));
    }
}
