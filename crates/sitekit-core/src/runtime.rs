//! Async driver for a [`Page`]
//!
//! One task owns the page. Events arrive over an unbounded channel, frames
//! tick at the configured rate while something animates, and between
//! animations the task sleeps until the page's next deadline.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::fixture::ScriptedEvent;
use crate::page::{Page, PageEvent};

#[derive(Debug)]
enum Input {
    Event(PageEvent),
    /// Resolved against the live document on arrival
    Scripted(ScriptedEvent),
}

/// Sends events to a running [`PageRuntime`]
#[derive(Debug, Clone)]
pub struct PageHandle {
    tx: mpsc::UnboundedSender<Input>,
}

impl PageHandle {
    pub fn send(&self, event: PageEvent) {
        self.push(Input::Event(event));
    }

    pub fn send_scripted(&self, event: ScriptedEvent) {
        self.push(Input::Scripted(event));
    }

    fn push(&self, input: Input) {
        if self.tx.send(input).is_err() {
            warn!("Failed to send page event: runtime stopped");
        }
    }
}

pub struct PageRuntime {
    page: Page,
    events: mpsc::UnboundedReceiver<Input>,
    frame_interval: Duration,
}

impl PageRuntime {
    pub fn new(page: Page, fps: u32) -> (Self, PageHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let runtime = Self {
            page,
            events,
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
        };
        (runtime, PageHandle { tx })
    }

    /// Drive the page until shutdown, then hand it back
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Page {
        info!(frame_ms = self.frame_interval.as_millis() as u64, "Page runtime started");

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let animating = self.page.needs_frames();
            let wakeup = self.page.next_wakeup();

            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Page runtime received shutdown signal");
                        break;
                    }
                }

                Some(input) = self.events.recv() => {
                    let event = match input {
                        Input::Event(event) => event,
                        Input::Scripted(scripted) => match scripted.resolve(self.page.document()) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!(error = %e, "Dropping unresolvable event");
                                continue;
                            }
                        },
                    };
                    let now = Instant::now();
                    debug!(?event, "Page event");
                    self.page.dispatch(event, now);
                    self.page.advance(now);
                }

                _ = frames.tick(), if animating => {
                    self.page.advance(Instant::now());
                }

                _ = tokio::time::sleep_until(wakeup.unwrap_or_else(Instant::now)), if !animating && wakeup.is_some() => {
                    self.page.advance(Instant::now());
                }
            }
        }

        self.page
    }
}
