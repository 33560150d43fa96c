//! Count-up animation for metric displays
//!
//! A display such as `₦1487.9` or `27.5%` counts up from zero with a quartic
//! ease-out, then snaps back to its original text so the final value never
//! carries floating-point noise.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;
use tracing::debug;

use super::easing::ease_out_quart;
use super::timing::{lerp, progress};
use crate::dom::{Document, NodeId};

/// Unit detected from a display's target text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricUnit {
    /// Leading glyph, one decimal place
    Currency(String),
    /// Trailing percent sign, two decimal places
    Percentage,
    /// Two decimal places, no adornment
    Plain,
}

/// A display node and the value it counts up to
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDisplay {
    node: NodeId,
    target: String,
    magnitude: f64,
    unit: MetricUnit,
}

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.]").expect("valid regex"))
}

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)").expect("valid regex"))
}

/// Parse the numeric magnitude out of display text.
///
/// Every character other than an ASCII digit or `.` is discarded, then the
/// longest leading decimal number is read, so `₦1,487.9` yields `1487.9`.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let digits = non_numeric().replace_all(text, "");
    let number = leading_number().find(&digits)?;
    number.as_str().parse::<f64>().ok()
}

impl MetricDisplay {
    /// Returns `None` when the text holds no number
    pub fn parse(node: NodeId, text: &str, currency_symbol: &str) -> Option<Self> {
        let magnitude = parse_magnitude(text)?;
        let unit = if !currency_symbol.is_empty() && text.contains(currency_symbol) {
            MetricUnit::Currency(currency_symbol.to_string())
        } else if text.contains('%') {
            MetricUnit::Percentage
        } else {
            MetricUnit::Plain
        };
        Some(Self {
            node,
            target: text.to_string(),
            magnitude,
            unit,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn unit(&self) -> &MetricUnit {
        &self.unit
    }

    /// Render an intermediate value in this display's unit
    pub fn format(&self, value: f64) -> String {
        match &self.unit {
            MetricUnit::Currency(symbol) => format!("{}{:.1}", symbol, value),
            MetricUnit::Percentage => format!("{:.2}%", value),
            MetricUnit::Plain => format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveCounter {
    display: MetricDisplay,
    start: Instant,
    from: f64,
    duration: Duration,
}

/// Drives count-up animations, at most one per display
#[derive(Debug, Default)]
pub struct CounterAnimator {
    active: BTreeMap<NodeId, ActiveCounter>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `display`. Returns false if it is already animating.
    pub fn animate(&mut self, display: MetricDisplay, duration: Duration, now: Instant) -> bool {
        if self.active.contains_key(&display.node) {
            return false;
        }
        self.active.insert(
            display.node,
            ActiveCounter {
                display,
                start: now,
                from: 0.0,
                duration,
            },
        );
        true
    }

    /// Parse each node's text and start its animation.
    /// Nodes whose text holds no number are left untouched.
    pub fn animate_matching(
        &mut self,
        doc: &Document,
        nodes: &[NodeId],
        currency_symbol: &str,
        duration: Duration,
        now: Instant,
    ) -> usize {
        let mut started = 0;
        for &node in nodes {
            match MetricDisplay::parse(node, doc.text(node), currency_symbol) {
                Some(display) => {
                    if self.animate(display, duration, now) {
                        started += 1;
                    }
                }
                None => debug!(node = node.index(), "Skipping non-numeric metric display"),
            }
        }
        started
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn is_animating_node(&self, node: NodeId) -> bool {
        self.active.contains_key(&node)
    }

    /// Advance every animation to `now` and write the frame into the document.
    /// Finished animations restore their exact target text.
    pub fn update(&mut self, doc: &mut Document, now: Instant) {
        self.active.retain(|node, counter| {
            let t = progress(counter.start, now, counter.duration);
            if t >= 1.0 {
                doc.set_text(*node, &counter.display.target);
                return false;
            }
            let current = lerp(counter.from, counter.display.magnitude, ease_out_quart(t));
            doc.set_text(*node, &counter.display.format(current));
            true
        });
    }

    /// Stop every animation, leaving each display on its target text
    pub fn finish_all(&mut self, doc: &mut Document) {
        for (node, counter) in std::mem::take(&mut self.active) {
            doc.set_text(node, &counter.display.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display_doc(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append_new(body, "span");
        doc.set_text(node, text);
        (doc, node)
    }

    fn run_to_end(text: &str) -> (String, Vec<String>) {
        let (mut doc, node) = display_doc(text);
        let mut animator = CounterAnimator::new();
        let start = Instant::now();
        let duration = Duration::from_millis(2000);
        let started = animator.animate_matching(&doc, &[node], "₦", duration, start);
        assert_eq!(started, 1);

        let mut frames = Vec::new();
        for ms in (16..=2016).step_by(16) {
            animator.update(&mut doc, start + Duration::from_millis(ms));
            frames.push(doc.text(node).to_string());
        }
        assert!(!animator.is_animating());
        (doc.text(node).to_string(), frames)
    }

    #[test]
    fn test_percentage_restores_exact_target() {
        let (last, frames) = run_to_end("27.5%");
        assert_eq!(last, "27.5%");
        assert!(frames[0].ends_with('%'));
        assert_eq!(frames[0].split('.').nth(1).map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_currency_restores_exact_target() {
        let (last, frames) = run_to_end("₦1487.9");
        assert_eq!(last, "₦1487.9");
        assert!(frames[0].starts_with('₦'));
        // One decimal place on intermediate frames.
        let decimals = frames[0].split('.').nth(1).map(str::len);
        assert_eq!(decimals, Some(1));
    }

    #[test]
    fn test_plain_formats_two_decimals() {
        let (doc, node) = display_doc("15");
        let display = MetricDisplay::parse(node, doc.text(node), "₦").unwrap();
        assert_eq!(display.unit(), &MetricUnit::Plain);
        assert_eq!(display.format(7.5), "7.50");
    }

    #[test]
    fn test_non_numeric_left_untouched() {
        let (mut doc, node) = display_doc("N/A");
        let mut animator = CounterAnimator::new();
        let now = Instant::now();
        let started =
            animator.animate_matching(&doc, &[node], "₦", Duration::from_millis(2000), now);
        assert_eq!(started, 0);
        animator.update(&mut doc, now + Duration::from_millis(100));
        assert_eq!(doc.text(node), "N/A");
    }

    #[test]
    fn test_one_animation_per_display() {
        let (doc, node) = display_doc("20.12%");
        let mut animator = CounterAnimator::new();
        let now = Instant::now();
        let display = MetricDisplay::parse(node, doc.text(node), "₦").unwrap();
        assert!(animator.animate(display.clone(), Duration::from_millis(2000), now));
        assert!(!animator.animate(display, Duration::from_millis(2000), now));
        assert!(animator.is_animating_node(node));
    }

    #[test]
    fn test_finish_all_writes_targets() {
        let (mut doc, node) = display_doc("15.00%");
        let mut animator = CounterAnimator::new();
        let now = Instant::now();
        animator.animate_matching(&doc, &[node], "₦", Duration::from_millis(2000), now);
        animator.update(&mut doc, now + Duration::from_millis(500));
        assert_ne!(doc.text(node), "15.00%");

        animator.finish_all(&mut doc);
        assert!(!animator.is_animating());
        assert_eq!(doc.text(node), "15.00%");
    }

    #[test]
    fn test_values_rise_monotonically() {
        let (_, frames) = run_to_end("₦1487.9");
        let values: Vec<f64> = frames
            .iter()
            .map(|f| parse_magnitude(f).unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_parse_magnitude() {
        assert_eq!(parse_magnitude("₦1,487.9"), Some(1487.9));
        assert_eq!(parse_magnitude("15.00%"), Some(15.0));
        assert_eq!(parse_magnitude("1.2.3"), Some(1.2));
        assert_eq!(parse_magnitude("—"), None);
        assert_eq!(parse_magnitude("."), None);
    }
}
