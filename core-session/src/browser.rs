//! Media-browser interface.
//!
//! Browsing clients get a fixed root and a flat listing of the catalog. A
//! listing request waits for the music source to finish loading.

use core_catalog::browse::{self, BrowseItem, BrowserRoot};
use core_catalog::MusicSource;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};

pub struct SessionBrowser {
    source: Arc<dyn MusicSource>,
    events: EventBus,
}

impl SessionBrowser {
    pub fn new(source: Arc<dyn MusicSource>, events: EventBus) -> Self {
        Self { source, events }
    }

    /// Every client gets the same root; hints are logged and otherwise ignored.
    pub fn get_root(
        &self,
        client_package: &str,
        client_uid: u32,
        hints: &HashMap<String, String>,
    ) -> BrowserRoot {
        info!(client_package, client_uid, hint_count = hints.len(), "Browser client connected");
        BrowserRoot::new(HashMap::new())
    }

    /// Children of `parent_id`, once the source is ready.
    pub async fn load_children(&self, parent_id: &str) -> Result<Vec<BrowseItem>> {
        debug!(parent_id, "Loading browse children");
        if !self.source.when_ready().await {
            let message = format!("music source unavailable (state {:?})", self.source.state());
            warn!(parent_id, %message, "Browse request failed");
            self.events
                .emit(CoreEvent::Catalog(CatalogEvent::LoadFailed {
                    message: message.clone(),
                }))
                .ok();
            return Err(SessionError::CatalogUnavailable(message));
        }

        let items = self.source.items();
        Ok(browse::children(&items, parent_id))
    }
}
