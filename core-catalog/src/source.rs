//! Music sources: where the catalog's items come from.
//!
//! A source starts in [`SourceState::Created`], moves to `Initializing` while
//! loading and settles in `Initialized` or `Error`. Callers that need the
//! items (the browser, the service bootstrap) await
//! [`MusicSource::when_ready`] instead of polling.

use async_trait::async_trait;
use bridge_traits::media::MediaItem;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::error::Result;

/// Lifecycle of a music source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Created,
    Initializing,
    Initialized,
    Error,
}

impl SourceState {
    /// Loading has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, SourceState::Initialized | SourceState::Error)
    }
}

/// Provider of catalog items.
#[async_trait]
pub trait MusicSource: Send + Sync {
    /// Load (or reload) the catalog.
    async fn load(&self) -> Result<()>;

    fn state(&self) -> SourceState;

    /// Items in catalog order. Empty until initialised.
    fn items(&self) -> Vec<Arc<MediaItem>>;

    fn find(&self, id: &str) -> Option<Arc<MediaItem>> {
        self.items().into_iter().find(|item| item.id() == id)
    }

    /// Resolves once loading settles: `true` if initialised, `false` on error.
    async fn when_ready(&self) -> bool;
}

/// Readiness tracking shared by source implementations.
#[derive(Debug)]
pub struct SourceStatus {
    sender: watch::Sender<SourceState>,
}

impl SourceStatus {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SourceState::Created);
        Self { sender }
    }

    pub fn get(&self) -> SourceState {
        *self.sender.borrow()
    }

    pub fn set(&self, state: SourceState) {
        let previous = self.sender.send_replace(state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "Music source state changed");
        }
    }

    /// Wait until the state settles.
    pub async fn wait_settled(&self) -> bool {
        let mut receiver = self.sender.subscribe();
        let ready = match receiver.wait_for(SourceState::is_settled).await {
            Ok(state) => *state == SourceState::Initialized,
            Err(_) => false,
        };
        ready
    }
}

impl Default for SourceStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Source over a fixed list of items, initialised on construction.
#[derive(Debug)]
pub struct StaticSource {
    items: RwLock<Vec<Arc<MediaItem>>>,
    status: SourceStatus,
}

impl StaticSource {
    pub fn new(items: Vec<MediaItem>) -> Self {
        let status = SourceStatus::new();
        status.set(SourceState::Initialized);
        Self {
            items: RwLock::new(items.into_iter().map(Arc::new).collect()),
            status,
        }
    }

    /// Replace the items. The source stays initialised.
    pub fn replace(&self, items: Vec<MediaItem>) {
        *self.items.write() = items.into_iter().map(Arc::new).collect();
    }
}

#[async_trait]
impl MusicSource for StaticSource {
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    fn state(&self) -> SourceState {
        self.status.get()
    }

    fn items(&self) -> Vec<Arc<MediaItem>> {
        self.items.read().clone()
    }

    async fn when_ready(&self) -> bool {
        self.status.wait_settled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn when_ready_waits_for_settled_state() {
        let status = Arc::new(SourceStatus::new());
        status.set(SourceState::Initializing);

        let waiter = {
            let status = Arc::clone(&status);
            tokio::spawn(async move { status.wait_settled().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        status.set(SourceState::Initialized);
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn when_ready_reports_error() {
        let status = SourceStatus::new();
        status.set(SourceState::Error);
        assert!(!status.wait_settled().await);
    }

    #[tokio::test]
    async fn static_source_is_ready_immediately() {
        let source = StaticSource::new(vec![
            MediaItem::builder("a").build(),
            MediaItem::builder("b").build(),
        ]);
        assert_eq!(source.state(), SourceState::Initialized);
        assert!(source.when_ready().await);
        assert_eq!(source.find("b").map(|i| i.id().to_string()), Some("b".into()));
        assert!(source.find("zzz").is_none());
    }
}
