//! Cookie notice acknowledgement
//!
//! The acknowledgement is one persisted flag. A notice already acknowledged
//! is hidden at once on init; a fresh acceptance fades the notice out and
//! hides it when the fade finishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::CookieConfig;
use crate::dom::{Document, NodeId};
use crate::storage::KeyValueStore;
use crate::timers::{TimerQueue, TimerTask};
use crate::Result;

const ACCEPTED: &str = "true";
const ACCEPT_CONTROL: &str = ".accept-cookies";

pub struct CookieNotice {
    notice: NodeId,
    key: String,
    fade: Duration,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CookieNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieNotice")
            .field("notice", &self.notice)
            .field("key", &self.key)
            .field("fade", &self.fade)
            .finish_non_exhaustive()
    }
}

impl CookieNotice {
    /// Returns `None` when the page has no cookie notice
    pub fn init(
        doc: &mut Document,
        selector: &str,
        config: &CookieConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Option<Self>> {
        let Some(notice) = doc.query_selector(selector)? else {
            debug!(selector = %selector, "No cookie notice, skipping");
            return Ok(None);
        };

        let this = Self {
            notice,
            key: config.storage_key.clone(),
            fade: Duration::from_millis(config.fade_out_ms),
            store,
        };
        if this.has_accepted() {
            doc.set_style(notice, "display", "none");
        }
        Ok(Some(this))
    }

    pub fn notice(&self) -> NodeId {
        self.notice
    }

    /// Whether the visitor accepted before. Unreadable storage counts as no.
    pub fn has_accepted(&self) -> bool {
        match self.store.get(&self.key) {
            Ok(value) => value.as_deref() == Some(ACCEPTED),
            Err(e) => {
                warn!(error = %e, "Failed to read cookie acknowledgement");
                false
            }
        }
    }

    /// Whether `node` is the notice's accept control
    pub fn is_accept_control(&self, doc: &Document, node: NodeId) -> bool {
        if !doc.contains(self.notice, node) {
            return false;
        }
        matches!(doc.closest(node, ACCEPT_CONTROL), Ok(Some(control)) if doc.contains(self.notice, control))
    }

    /// Persist acceptance and start the fade-out. The notice is hidden by
    /// the `CookieFadeComplete` timer once the fade has run.
    pub fn accept(&self, doc: &mut Document, timers: &mut TimerQueue, now: Instant) {
        if let Err(e) = self.store.set(&self.key, ACCEPTED) {
            warn!(error = %e, "Failed to persist cookie acknowledgement");
        }
        if timers.contains(&TimerTask::CookieFadeComplete)
            || doc.style(self.notice, "display") == Some("none")
        {
            return;
        }

        doc.set_style(
            self.notice,
            "transition",
            &format!("opacity {}s ease-out", self.fade.as_secs_f64()),
        );
        doc.set_style(self.notice, "opacity", "0");
        timers.schedule(now + self.fade, TimerTask::CookieFadeComplete);
    }

    /// Finish the fade started by `accept`
    pub fn complete_fade(&self, doc: &mut Document) {
        doc.set_style(self.notice, "display", "none");
    }
}
