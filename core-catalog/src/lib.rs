//! # Content Catalog
//!
//! The play queue and the sources that fill it.
//!
//! - [`CatalogCursor`] - ordered queue with a current position and repeat policy
//! - [`MusicSource`] - async provider of catalog items with readiness tracking
//! - [`JsonSource`] - catalog loaded from a JSON document
//! - [`browse`] - the browse tree served to media-browser clients

pub mod browse;
pub mod cursor;
pub mod error;
pub mod json_source;
pub mod source;

pub use browse::{BrowseItem, BrowserRoot, BROWSE_ROOT_ID};
pub use cursor::CatalogCursor;
pub use error::{CatalogError, Result};
pub use json_source::JsonSource;
pub use source::{MusicSource, SourceState, SourceStatus, StaticSource};
