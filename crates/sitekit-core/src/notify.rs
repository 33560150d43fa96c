//! User-facing notifications
//!
//! Every interaction that would reach a backend on a real site ends in a
//! [`Notification`] delivered through an injected [`Notifier`].

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Search { query: String },
    VideoPlayback { title: String },
    VideoWatch { title: String },
    ServiceAccess { service: String },
    SeeMore { section: String },
    ProductSelected { name: String, price: String },
    AddedToCart { name: String, price: String },
    ContactSubmitted { name: String },
    Subscribed { email: String },
    ValidationError { message: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Search { query } => write!(f, "Searching for: \"{}\"", query),
            Notification::VideoPlayback { title } => write!(f, "Playing video: \"{}\"", title),
            Notification::VideoWatch { title } => write!(f, "Watching: \"{}\"", title),
            Notification::ServiceAccess { service } => write!(f, "Accessing {}", service),
            Notification::SeeMore { section } => write!(f, "Navigating to {} section", section),
            Notification::ProductSelected { name, price } => {
                write!(f, "You selected: {} - {}", name, price)
            }
            Notification::AddedToCart { name, price } => {
                write!(f, "Added to cart: {} - {}", name, price)
            }
            Notification::ContactSubmitted { name } => write!(
                f,
                "Thank you for your message, {}! We will get back to you soon.",
                name
            ),
            Notification::Subscribed { email } => {
                write!(f, "Thank you for subscribing with {}!", email)
            }
            Notification::ValidationError { message } => f.write_str(message),
        }
    }
}

/// Sink for notifications; must not block the page
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!(notification = %notification, "Page notification");
    }
}

/// Forwards notifications to an async consumer
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Failed to deliver notification: receiver dropped");
        }
    }
}

/// Keeps every notification for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let n = Notification::AddedToCart {
            name: "Aviator".to_string(),
            price: "$120".to_string(),
        };
        assert_eq!(n.to_string(), "Added to cart: Aviator - $120");

        let n = Notification::ValidationError {
            message: "Please fill in all fields".to_string(),
        };
        assert_eq!(n.to_string(), "Please fill in all fields");
    }

    #[test]
    fn test_recording_take_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::Search {
            query: "rates".to_string(),
        });
        assert_eq!(notifier.take().len(), 1);
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        notifier.notify(Notification::Subscribed {
            email: "a@b.c".to_string(),
        });
        assert_eq!(
            rx.recv().await,
            Some(Notification::Subscribed {
                email: "a@b.c".to_string()
            })
        );
    }
}
