//! Catalog cursor: the play queue the coordinator walks.
//!
//! The cursor holds the published sequence as one `Arc<[Arc<MediaItem>]>`.
//! [`CatalogCursor::load`] swaps that slice and resets the index under a
//! single write lock, so readers observe either the old queue or the new one.

use bridge_traits::{media::MediaItem, playback::RepeatMode};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct CursorState {
    items: Arc<[Arc<MediaItem>]>,
    index: usize,
    repeat_mode: RepeatMode,
}

impl CursorState {
    fn current(&self) -> Option<Arc<MediaItem>> {
        self.items.get(self.index).cloned()
    }
}

/// Ordered queue with a current position.
///
/// Non-empty means ready: `current` returns an item. Empty means not ready:
/// every accessor returns `None`.
#[derive(Debug)]
pub struct CatalogCursor {
    state: RwLock<CursorState>,
}

impl CatalogCursor {
    pub fn new(repeat_mode: RepeatMode) -> Self {
        Self {
            state: RwLock::new(CursorState {
                items: Arc::from(Vec::new()),
                index: 0,
                repeat_mode,
            }),
        }
    }

    pub fn with_items(items: Vec<Arc<MediaItem>>, repeat_mode: RepeatMode) -> Self {
        let cursor = Self::new(repeat_mode);
        cursor.load(items);
        cursor
    }

    pub fn is_ready(&self) -> bool {
        !self.state.read().items.is_empty()
    }

    pub fn current(&self) -> Option<Arc<MediaItem>> {
        self.state.read().current()
    }

    /// Index of the current item, `None` when empty.
    pub fn position(&self) -> Option<usize> {
        let state = self.state.read();
        (!state.items.is_empty()).then_some(state.index)
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the whole queue.
    pub fn items(&self) -> Arc<[Arc<MediaItem>]> {
        Arc::clone(&self.state.read().items)
    }

    /// Advance according to the repeat mode.
    ///
    /// - `All`: +1, wrapping to the first item after the last.
    /// - `One`: stays on the current item.
    /// - `None`: +1, or `None` (without moving) at the last item.
    pub fn next(&self) -> Option<Arc<MediaItem>> {
        let mut state = self.state.write();
        let len = state.items.len();
        if len == 0 {
            return None;
        }
        let target = match state.repeat_mode {
            RepeatMode::All => (state.index + 1) % len,
            RepeatMode::One => state.index,
            RepeatMode::None if state.index + 1 < len => state.index + 1,
            RepeatMode::None => {
                debug!(index = state.index, "Cursor at end of queue");
                return None;
            }
        };
        state.index = target;
        state.current()
    }

    /// Step back according to the repeat mode.
    ///
    /// - `All`: -1, wrapping to the last item before the first.
    /// - `One`: stays on the current item.
    /// - `None`: -1, or `None` (without moving) at the first item.
    pub fn prev(&self) -> Option<Arc<MediaItem>> {
        let mut state = self.state.write();
        let len = state.items.len();
        if len == 0 {
            return None;
        }
        let target = match state.repeat_mode {
            RepeatMode::All => (state.index + len - 1) % len,
            RepeatMode::One => state.index,
            RepeatMode::None if state.index > 0 => state.index - 1,
            RepeatMode::None => {
                debug!("Cursor at start of queue");
                return None;
            }
        };
        state.index = target;
        state.current()
    }

    /// Replace the queue and reset the position to the first item.
    pub fn load(&self, items: Vec<Arc<MediaItem>>) {
        let items: Arc<[Arc<MediaItem>]> = Arc::from(items);
        let mut state = self.state.write();
        debug!(count = items.len(), "Cursor loaded");
        state.items = items;
        state.index = 0;
    }

    /// Move onto the item with `id`. Unknown ids leave the cursor untouched.
    pub fn select(&self, id: &str) -> Option<Arc<MediaItem>> {
        let mut state = self.state.write();
        let index = state.items.iter().position(|item| item.id() == id)?;
        state.index = index;
        state.current()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.state.read().repeat_mode
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.state.write().repeat_mode = mode;
    }
}

impl Default for CatalogCursor {
    fn default() -> Self {
        Self::new(RepeatMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ids: &[&str]) -> Vec<Arc<MediaItem>> {
        ids.iter()
            .map(|id| Arc::new(MediaItem::builder(*id).title(format!("title {id}")).build()))
            .collect()
    }

    fn id(item: Option<Arc<MediaItem>>) -> Option<String> {
        item.map(|item| item.id().to_string())
    }

    #[test]
    fn empty_cursor_is_not_ready() {
        let cursor = CatalogCursor::default();
        assert!(!cursor.is_ready());
        assert!(cursor.current().is_none());
        assert!(cursor.next().is_none());
        assert!(cursor.prev().is_none());
        assert_eq!(cursor.position(), None);
    }

    #[test]
    fn wraps_at_both_ends() {
        let cursor = CatalogCursor::with_items(items(&["a", "b", "c"]), RepeatMode::All);
        assert_eq!(id(cursor.prev()), Some("c".into()));
        assert_eq!(id(cursor.next()), Some("a".into()));
        assert_eq!(id(cursor.next()), Some("b".into()));
        assert_eq!(id(cursor.next()), Some("c".into()));
        assert_eq!(id(cursor.next()), Some("a".into()));
    }

    #[test]
    fn single_item_wraps_onto_itself() {
        let cursor = CatalogCursor::with_items(items(&["only"]), RepeatMode::All);
        assert_eq!(id(cursor.next()), Some("only".into()));
        assert_eq!(id(cursor.prev()), Some("only".into()));
        assert_eq!(cursor.position(), Some(0));
    }

    #[test]
    fn repeat_one_stays_put() {
        let cursor = CatalogCursor::with_items(items(&["a", "b"]), RepeatMode::One);
        assert_eq!(id(cursor.next()), Some("a".into()));
        assert_eq!(id(cursor.prev()), Some("a".into()));
    }

    #[test]
    fn repeat_none_stops_at_ends() {
        let cursor = CatalogCursor::with_items(items(&["a", "b"]), RepeatMode::None);
        assert!(cursor.prev().is_none());
        assert_eq!(id(cursor.next()), Some("b".into()));
        assert!(cursor.next().is_none());
        assert_eq!(id(cursor.current()), Some("b".into()));
    }

    #[test]
    fn load_resets_index() {
        let cursor = CatalogCursor::with_items(items(&["a", "b"]), RepeatMode::All);
        cursor.next();
        cursor.load(items(&["x", "y", "z"]));
        assert_eq!(cursor.position(), Some(0));
        assert_eq!(id(cursor.current()), Some("x".into()));
        assert_eq!(cursor.len(), 3);
    }

    #[test]
    fn select_moves_to_known_id_only() {
        let cursor = CatalogCursor::with_items(items(&["a", "b", "c"]), RepeatMode::All);
        assert_eq!(id(cursor.select("c")), Some("c".into()));
        assert_eq!(cursor.position(), Some(2));
        assert!(cursor.select("missing").is_none());
        assert_eq!(cursor.position(), Some(2));
    }

    #[test]
    fn snapshot_survives_reload() {
        let cursor = CatalogCursor::with_items(items(&["a", "b"]), RepeatMode::All);
        let before = cursor.items();
        cursor.load(items(&["z"]));
        assert_eq!(before.len(), 2);
        assert_eq!(cursor.items().len(), 1);
    }
}
