//! Media item model shared between the catalog, the player and the host.
//!
//! A [`MediaItem`] is published by the content catalog and never mutated
//! afterwards; components pass it around as `Arc<MediaItem>`. Metadata is a
//! key/value map so hosts can forward it to their media-session framework
//! without an intermediate struct per platform.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known metadata keys understood by media-session frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    Title,
    Artist,
    Album,
    Genre,
    /// Track length in milliseconds.
    DurationMs,
    /// Album artwork location.
    ArtUri,
    /// Location of the playable audio.
    MediaUri,
    DisplayTitle,
    DisplaySubtitle,
    DisplayDescription,
    DisplayIconUri,
    TrackNumber,
    TrackCount,
}

impl MetadataKey {
    /// Keys that carry numeric values.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            MetadataKey::DurationMs | MetadataKey::TrackNumber | MetadataKey::TrackCount
        )
    }
}

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Long(i64),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            MetadataValue::Long(_) => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            MetadataValue::Long(value) => Some(*value),
            MetadataValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(text) => f.write_str(text),
            MetadataValue::Long(value) => write!(f, "{}", value),
        }
    }
}

/// How browsing clients may interact with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaFlag {
    /// The item can be handed to the player.
    #[default]
    Playable,
    /// The item is a folder with children of its own.
    Browsable,
}

/// Catalog entry with an identifier unique within its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    id: String,
    flag: MediaFlag,
    metadata: BTreeMap<MetadataKey, MetadataValue>,
}

impl MediaItem {
    /// Start building an item with the given identifier.
    pub fn builder(id: impl Into<String>) -> MediaItemBuilder {
        MediaItemBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flag(&self) -> MediaFlag {
        self.flag
    }

    pub fn metadata(&self) -> &BTreeMap<MetadataKey, MetadataValue> {
        &self.metadata
    }

    pub fn get(&self, key: MetadataKey) -> Option<&MetadataValue> {
        self.metadata.get(&key)
    }

    pub fn text(&self, key: MetadataKey) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_text)
    }

    pub fn long(&self, key: MetadataKey) -> Option<i64> {
        self.get(key).and_then(MetadataValue::as_long)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(MetadataKey::Title)
    }

    pub fn artist(&self) -> Option<&str> {
        self.text(MetadataKey::Artist)
    }

    pub fn album(&self) -> Option<&str> {
        self.text(MetadataKey::Album)
    }

    pub fn art_uri(&self) -> Option<&str> {
        self.text(MetadataKey::ArtUri)
    }

    pub fn media_uri(&self) -> Option<&str> {
        self.text(MetadataKey::MediaUri)
    }

    /// Track length, when the catalog knows it. Negative values mean unknown.
    pub fn duration_ms(&self) -> Option<u64> {
        self.long(MetadataKey::DurationMs)
            .and_then(|ms| u64::try_from(ms).ok())
    }

    /// Short description used by browse results and queue commands.
    pub fn description(&self) -> MediaDescription {
        MediaDescription {
            media_id: Some(self.id.clone()),
            title: self
                .text(MetadataKey::DisplayTitle)
                .or_else(|| self.title())
                .map(str::to_owned),
            subtitle: self
                .text(MetadataKey::DisplaySubtitle)
                .or_else(|| self.artist())
                .map(str::to_owned),
            description: self
                .text(MetadataKey::DisplayDescription)
                .or_else(|| self.album())
                .map(str::to_owned),
            icon_uri: self
                .text(MetadataKey::DisplayIconUri)
                .or_else(|| self.art_uri())
                .map(str::to_owned),
            media_uri: self.media_uri().map(str::to_owned),
        }
    }
}

/// Builder for [`MediaItem`].
#[derive(Debug, Clone)]
pub struct MediaItemBuilder {
    id: String,
    flag: MediaFlag,
    metadata: BTreeMap<MetadataKey, MetadataValue>,
}

impl MediaItemBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            flag: MediaFlag::Playable,
            metadata: BTreeMap::new(),
        }
    }

    pub fn flag(mut self, flag: MediaFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn text(mut self, key: MetadataKey, value: impl Into<String>) -> Self {
        self.metadata.insert(key, MetadataValue::Text(value.into()));
        self
    }

    pub fn long(mut self, key: MetadataKey, value: i64) -> Self {
        self.metadata.insert(key, MetadataValue::Long(value));
        self
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.text(MetadataKey::Title, title)
    }

    pub fn artist(self, artist: impl Into<String>) -> Self {
        self.text(MetadataKey::Artist, artist)
    }

    pub fn album(self, album: impl Into<String>) -> Self {
        self.text(MetadataKey::Album, album)
    }

    pub fn genre(self, genre: impl Into<String>) -> Self {
        self.text(MetadataKey::Genre, genre)
    }

    pub fn media_uri(self, uri: impl Into<String>) -> Self {
        self.text(MetadataKey::MediaUri, uri)
    }

    pub fn art_uri(self, uri: impl Into<String>) -> Self {
        self.text(MetadataKey::ArtUri, uri)
    }

    pub fn duration_ms(self, duration_ms: i64) -> Self {
        self.long(MetadataKey::DurationMs, duration_ms)
    }

    pub fn build(self) -> MediaItem {
        MediaItem {
            id: self.id,
            flag: self.flag,
            metadata: self.metadata,
        }
    }
}

/// Lightweight description of a media item, as carried by queue commands
/// and browse results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescription {
    pub media_id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub icon_uri: Option<String>,
    pub media_uri: Option<String>,
}
