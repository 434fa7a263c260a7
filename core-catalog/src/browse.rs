//! Browse tree exposed to media-browser clients.
//!
//! The tree is one level deep: the root lists every playable catalog item.

use bridge_traits::media::{MediaDescription, MediaFlag, MediaItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier of the browse root.
pub const BROWSE_ROOT_ID: &str = "/";

/// Root handed to a connecting browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserRoot {
    pub root_id: String,
    pub extras: HashMap<String, String>,
}

impl BrowserRoot {
    pub fn new(extras: HashMap<String, String>) -> Self {
        Self {
            root_id: BROWSE_ROOT_ID.to_string(),
            extras,
        }
    }
}

/// Entry in a browse listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    pub description: MediaDescription,
    pub flag: MediaFlag,
}

impl BrowseItem {
    pub fn media_id(&self) -> Option<&str> {
        self.description.media_id.as_deref()
    }
}

impl From<&MediaItem> for BrowseItem {
    fn from(item: &MediaItem) -> Self {
        Self {
            description: item.description(),
            flag: item.flag(),
        }
    }
}

/// Children of `parent_id`. Unknown parents have no children.
pub fn children(items: &[Arc<MediaItem>], parent_id: &str) -> Vec<BrowseItem> {
    if parent_id != BROWSE_ROOT_ID {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| item.flag() == MediaFlag::Playable)
        .map(|item| BrowseItem::from(item.as_ref()))
        .collect()
}
