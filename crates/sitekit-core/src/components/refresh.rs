//! Periodic indicator highlight
//!
//! Every cycle each indicator display flashes a highlight background that is
//! cleared shortly after. The displayed values themselves never change.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::debug;

use crate::config::RefreshConfig;
use crate::dom::{Document, NodeId};
use crate::timers::{TimerQueue, TimerTask};
use crate::Result;

#[derive(Debug)]
pub struct IndicatorRefresher {
    selectors: Vec<String>,
    interval: Duration,
    flash: Duration,
    color: String,
    cycles: u64,
    last_refreshed: Option<DateTime<Utc>>,
}

impl IndicatorRefresher {
    /// Returns `None` when refreshing is disabled or no indicator exists
    pub fn init(doc: &Document, selectors: &[String], config: &RefreshConfig) -> Result<Option<Self>> {
        if config.interval_secs == 0 {
            debug!("Indicator refresh disabled (interval_secs = 0)");
            return Ok(None);
        }
        let mut present = false;
        for selector in selectors {
            present |= doc.query_selector(selector)?.is_some();
        }
        if !present {
            debug!("No indicator displays, skipping refresh cycle");
            return Ok(None);
        }

        Ok(Some(Self {
            selectors: selectors.to_vec(),
            interval: Duration::from_secs(config.interval_secs),
            flash: Duration::from_millis(config.flash_ms),
            color: config.flash_color.clone(),
            cycles: 0,
            last_refreshed: None,
        }))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    /// Queue the first cycle one interval after `now`
    pub fn start(&self, timers: &mut TimerQueue, now: Instant) {
        timers.schedule(now + self.interval, TimerTask::IndicatorRefresh);
    }

    /// Run the cycle due at `deadline`: flash every indicator still on the
    /// page and queue the next cycle. Returns the flashed nodes.
    pub fn on_cycle(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        deadline: Instant,
    ) -> Vec<NodeId> {
        let mut flashed = Vec::new();
        for selector in &self.selectors {
            // Selectors were validated at init.
            let Ok(Some(node)) = doc.query_selector(selector) else {
                continue;
            };
            doc.set_style(
                node,
                "transition",
                &format!("background-color {}s ease", self.flash.as_secs_f64()),
            );
            doc.set_style(node, "background-color", &self.color);
            timers.schedule(deadline + self.flash, TimerTask::FlashReset { node });
            flashed.push(node);
        }

        self.cycles += 1;
        self.last_refreshed = Some(Utc::now());
        timers.schedule(deadline + self.interval, TimerTask::IndicatorRefresh);
        debug!(cycle = self.cycles, flashed = flashed.len(), "Indicator refresh cycle");
        flashed
    }

    pub fn reset_flash(&self, doc: &mut Document, node: NodeId) {
        doc.set_style(node, "background-color", "transparent");
    }
}
