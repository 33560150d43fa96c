//! Fixed header scrolled state

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::Result;

const SCROLLED_CLASS: &str = "scrolled";

#[derive(Debug)]
pub struct HeaderState {
    header: NodeId,
    threshold: f64,
}

impl HeaderState {
    pub fn init(doc: &Document, selector: Option<&str>, threshold: f64) -> Result<Option<Self>> {
        let Some(selector) = selector else {
            return Ok(None);
        };
        match doc.query_selector(selector)? {
            Some(header) => Ok(Some(Self { header, threshold })),
            None => {
                debug!(selector = %selector, "No header, skipping header state");
                Ok(None)
            }
        }
    }

    pub fn on_scroll(&self, doc: &mut Document, scroll_y: f64) {
        if scroll_y > self.threshold {
            doc.add_class(self.header, SCROLLED_CLASS);
        } else {
            doc.remove_class(self.header, SCROLLED_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrolled_class_follows_threshold() {
        let mut doc = Document::new();
        let header = doc.append_new(doc.body(), "header");
        doc.add_class(header, "header");
        let state = HeaderState::init(&doc, Some(".header"), 50.0).unwrap().unwrap();

        state.on_scroll(&mut doc, 51.0);
        assert!(doc.has_class(header, "scrolled"));
        state.on_scroll(&mut doc, 50.0);
        assert!(!doc.has_class(header, "scrolled"));
    }
}
