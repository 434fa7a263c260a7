//! # Event Bus System
//!
//! Provides an event-driven surface for the music session core using `tokio::sync::broadcast`.
//! The coordinator publishes what it did (session activated, foreground started, playback
//! paused, catalog loaded) so hosts and diagnostics can observe the core without being
//! wired into it.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for the session, playback and catalog domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐
//! │ Coordinator ├──────────────>│           │     subscribe    ┌────────────┐
//! └─────────────┘               │ EventBus  ├─────────────────>│ Subscriber │
//!                               │ (broadcast│                  └────────────┘
//! ┌─────────────┐     emit      │  channel) │     subscribe    ┌────────────┐
//! │ Catalog     ├──────────────>│           ├─────────────────>│ Subscriber │
//! └─────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus.emit(CoreEvent::Session(SessionEvent::Activated)).ok();
//! assert_eq!(
//!     stream.recv().await.unwrap(),
//!     CoreEvent::Session(SessionEvent::Activated)
//! );
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Publishing with no subscribers returns `Err(SendError)`; the core ignores it.

use bridge_traits::playback::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Media-session and foreground lifecycle events
    Session(SessionEvent),
    /// Player events
    Playback(PlaybackEvent),
    /// Content catalog events
    Catalog(CatalogEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Catalog(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Session(SessionEvent::ForegroundStarted { .. })
            | CoreEvent::Session(SessionEvent::ForegroundStopped)
            | CoreEvent::Catalog(CatalogEvent::Loaded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events describing what the coordinator did to the host session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// Session marked active.
    Activated,
    /// Session marked inactive.
    Deactivated,
    /// Metadata for a new item was published.
    MetadataChanged {
        media_id: String,
        title: Option<String>,
    },
    /// Service entered (or refreshed) the started foreground state.
    ForegroundStarted { media_id: Option<String> },
    /// Foreground detached while keeping the notification (paused).
    ForegroundDetached,
    /// Service left the started state.
    ForegroundStopped,
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Activated => "Session activated",
            SessionEvent::Deactivated => "Session deactivated",
            SessionEvent::MetadataChanged { .. } => "Session metadata changed",
            SessionEvent::ForegroundStarted { .. } => "Foreground service started",
            SessionEvent::ForegroundDetached => "Foreground detached",
            SessionEvent::ForegroundStopped => "Foreground service stopped",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Player reported PLAYING.
    Started {
        media_id: Option<String>,
        position_ms: u64,
    },
    /// Player reported PAUSED.
    Paused {
        media_id: Option<String>,
        position_ms: u64,
    },
    /// Player reported STOPPED.
    Stopped { media_id: Option<String> },
    /// Item reached its end without an external stop.
    Completed { media_id: Option<String> },
    /// Player failure.
    Error {
        media_id: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events related to the content catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// Catalog finished loading.
    Loaded { item_count: usize },
    /// Catalog could not be loaded; browsing clients see nothing.
    LoadFailed { message: String },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::Loaded { .. } => "Catalog loaded",
            CatalogEvent::LoadFailed { .. } => "Catalog load failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus shared by the coordinator, the service loop and observers.
/// Clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` events are buffered per subscriber before it lags.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of subscribers reached, or an error when nobody listens.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Future events only; nothing is replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering capabilities.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let session_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Session(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Started {
            media_id: Some(id.to_string()),
            position_ms: 0,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(CoreEvent::Session(SessionEvent::Activated)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let count = bus.emit(started("a")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(sub1.recv().await.unwrap(), started("a"));
        assert_eq!(sub2.recv().await.unwrap(), started("a"));
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Session(_)));

        bus.emit(started("a")).unwrap();
        bus.emit(CoreEvent::Session(SessionEvent::ForegroundStopped))
            .unwrap();

        let event = stream.recv().await.unwrap();
        assert_eq!(event, CoreEvent::Session(SessionEvent::ForegroundStopped));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.emit(started(&i.to_string())).unwrap();
        }
        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error = CoreEvent::Playback(PlaybackEvent::Error {
            media_id: None,
            kind: ErrorKind::DecodeFailed,
            message: "corrupt".to_string(),
        });
        assert_eq!(error.severity(), EventSeverity::Error);
        assert_eq!(
            CoreEvent::Catalog(CatalogEvent::Loaded { item_count: 3 }).severity(),
            EventSeverity::Info
        );
        assert_eq!(started("a").severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(
            CoreEvent::Session(SessionEvent::ForegroundDetached).description(),
            "Foreground detached"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Session(SessionEvent::MetadataChanged {
            media_id: "a".to_string(),
            title: Some("Song".to_string()),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Session");
        assert_eq!(json["payload"]["event"], "MetadataChanged");

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }
}
