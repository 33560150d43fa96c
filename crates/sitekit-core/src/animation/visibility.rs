//! One-shot reveal of elements scrolled into view
//!
//! Mirrors an intersection observer with `threshold` and a negative bottom
//! root margin: an element is revealed the first time the visible fraction
//! of its box, measured against the viewport minus the bottom margin,
//! reaches the threshold. Revealed elements are never observed again.

use tracing::debug;

use crate::config::AnimationConfig;
use crate::dom::{Document, NodeId, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element that must be visible
    pub threshold: f64,
    /// Pixels trimmed from the bottom of the viewport
    pub bottom_margin: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin: 50.0,
        }
    }
}

impl From<&AnimationConfig> for ObserverOptions {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            threshold: config.reveal_threshold,
            bottom_margin: config.reveal_bottom_margin_px,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ObservedElement {
    node: NodeId,
    revealed: bool,
}

#[derive(Debug)]
pub struct VisibilityAnimator {
    options: ObserverOptions,
    reveal_class: String,
    elements: Vec<ObservedElement>,
}

/// Visible fraction of the box `[top, top + height)` inside the trimmed viewport
pub fn intersection_ratio(viewport: &Viewport, top: f64, height: f64, bottom_margin: f64) -> f64 {
    let root_top = viewport.scroll_y;
    let root_bottom = viewport.scroll_y + (viewport.height - bottom_margin).max(0.0);

    if height <= 0.0 {
        return if top >= root_top && top <= root_bottom {
            1.0
        } else {
            0.0
        };
    }

    let overlap = (top + height).min(root_bottom) - top.max(root_top);
    (overlap.max(0.0) / height).clamp(0.0, 1.0)
}

impl VisibilityAnimator {
    pub fn new(options: ObserverOptions, reveal_class: impl Into<String>) -> Self {
        Self {
            options,
            reveal_class: reveal_class.into(),
            elements: Vec::new(),
        }
    }

    /// Start observing `nodes` and run the initial intersection check.
    ///
    /// Without intersection support every node is revealed immediately, so
    /// content never stays hidden on a page that cannot detect visibility.
    pub fn observe(&mut self, doc: &mut Document, nodes: &[NodeId]) {
        for &node in nodes {
            if self.elements.iter().any(|e| e.node == node) {
                continue;
            }
            self.elements.push(ObservedElement {
                node,
                revealed: false,
            });
        }

        if !doc.viewport().supports_intersection {
            debug!(count = nodes.len(), "Intersection detection unavailable, revealing all");
            for element in &mut self.elements {
                if !element.revealed {
                    doc.add_class(element.node, &self.reveal_class);
                    element.revealed = true;
                }
            }
            return;
        }

        self.check(doc);
    }

    /// Reveal every observed element now intersecting the viewport.
    /// Returns how many were revealed by this call.
    pub fn check(&mut self, doc: &mut Document) -> usize {
        let options = self.options;
        let mut revealed = 0;
        for element in self.elements.iter_mut().filter(|e| !e.revealed) {
            let Some(el) = doc.element(element.node) else {
                continue;
            };
            let ratio =
                intersection_ratio(doc.viewport(), el.top(), el.height(), options.bottom_margin);
            if ratio > 0.0 && ratio >= options.threshold {
                doc.add_class(element.node, &self.reveal_class);
                element.revealed = true;
                revealed += 1;
            }
        }
        revealed
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.elements
            .iter()
            .any(|e| e.node == node && e.revealed)
    }

    /// Elements still waiting to be revealed
    pub fn pending(&self) -> usize {
        self.elements.iter().filter(|e| !e.revealed).count()
    }

    pub fn observed(&self) -> usize {
        self.elements.len()
    }

    pub fn reveal_class(&self) -> &str {
        &self.reveal_class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(tops: &[f64]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let nodes = tops
            .iter()
            .map(|top| {
                let node = doc.append_new(body, "div");
                doc.set_geometry(node, *top, 200.0);
                node
            })
            .collect();
        doc.viewport_mut().height = 800.0;
        (doc, nodes)
    }

    #[test]
    fn test_initial_check_reveals_visible_only() {
        let (mut doc, nodes) = page(&[100.0, 2000.0]);
        let mut animator = VisibilityAnimator::new(ObserverOptions::default(), "fade-in-up");
        assert_eq!(animator.reveal_class(), "fade-in-up");
        animator.observe(&mut doc, &nodes);

        assert!(doc.has_class(nodes[0], "fade-in-up"));
        assert!(!doc.has_class(nodes[1], "fade-in-up"));
        assert_eq!(animator.pending(), 1);
    }

    #[test]
    fn test_bottom_margin_and_threshold() {
        // Element top at 740: the trimmed viewport ends at 750, so only 10px
        // (5%) is visible, below the 10% threshold.
        let (mut doc, nodes) = page(&[740.0]);
        let mut animator = VisibilityAnimator::new(ObserverOptions::default(), "fade-in");
        animator.observe(&mut doc, &nodes);
        assert!(!animator.is_revealed(nodes[0]));

        // 30px visible = 15%.
        doc.viewport_mut().scroll_y = 20.0;
        assert_eq!(animator.check(&mut doc), 1);
        assert!(animator.is_revealed(nodes[0]));
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let (mut doc, nodes) = page(&[1000.0]);
        let mut animator = VisibilityAnimator::new(ObserverOptions::default(), "fade-in");
        animator.observe(&mut doc, &nodes);

        doc.viewport_mut().scroll_y = 600.0;
        assert_eq!(animator.check(&mut doc), 1);
        // Scrolling away and back neither hides nor reveals again.
        doc.viewport_mut().scroll_y = 0.0;
        assert_eq!(animator.check(&mut doc), 0);
        assert!(doc.has_class(nodes[0], "fade-in"));
        doc.viewport_mut().scroll_y = 600.0;
        assert_eq!(animator.check(&mut doc), 0);
        assert_eq!(doc.element(nodes[0]).unwrap().classes().len(), 1);
    }

    #[test]
    fn test_fails_open_without_intersection_support() {
        let (mut doc, nodes) = page(&[100.0, 5000.0, 9000.0]);
        doc.viewport_mut().supports_intersection = false;
        let mut animator = VisibilityAnimator::new(ObserverOptions::default(), "fade-in-up");
        animator.observe(&mut doc, &nodes);
        assert!(nodes.iter().all(|n| doc.has_class(*n, "fade-in-up")));
        assert_eq!(animator.pending(), 0);
    }

    #[test]
    fn test_duplicate_observe_is_ignored() {
        let (mut doc, nodes) = page(&[3000.0]);
        let mut animator = VisibilityAnimator::new(ObserverOptions::default(), "fade-in");
        animator.observe(&mut doc, &nodes);
        animator.observe(&mut doc, &nodes);
        assert_eq!(animator.observed(), 1);
    }

    #[test]
    fn test_intersection_ratio() {
        let viewport = Viewport {
            width: 1024.0,
            height: 800.0,
            scroll_y: 0.0,
            supports_intersection: true,
        };
        assert_eq!(intersection_ratio(&viewport, 0.0, 100.0, 50.0), 1.0);
        assert_eq!(intersection_ratio(&viewport, 700.0, 100.0, 50.0), 0.5);
        assert_eq!(intersection_ratio(&viewport, 900.0, 100.0, 50.0), 0.0);
    }
}
