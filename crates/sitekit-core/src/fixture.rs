//! JSON page fixtures
//!
//! A fixture describes a page (element tree, geometry and viewport) and a
//! timeline of visitor input. Events name their targets by selector and are
//! resolved against the live document when they fire, so they can address
//! controls the page generates at runtime.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, SiteProfile};
use crate::dom::{Document, NodeId, Viewport};
use crate::page::PageEvent;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Space-separated class list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

/// Visitor input with selector-addressed targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptedEvent {
    Scroll { y: f64 },
    Resize { width: f64, height: f64 },
    Click { selector: String },
    KeyPress { selector: String, key: String },
    Input { selector: String, value: String },
    Submit { selector: String },
    AcceptCookies,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Milliseconds after page init
    pub at_ms: u64,
    pub event: ScriptedEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<SiteProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub body: Vec<ElementSpec>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

fn resolve(doc: &Document, selector: &str) -> Result<NodeId> {
    doc.query_selector(selector)?
        .ok_or_else(|| Error::Fixture(format!("no element matches '{}'", selector)))
}

impl ScriptedEvent {
    /// Resolve selectors against the current document
    pub fn resolve(&self, doc: &Document) -> Result<PageEvent> {
        Ok(match self {
            ScriptedEvent::Scroll { y } => PageEvent::Scroll { y: *y },
            ScriptedEvent::Resize { width, height } => PageEvent::Resize {
                width: *width,
                height: *height,
            },
            ScriptedEvent::Click { selector } => PageEvent::Click {
                target: resolve(doc, selector)?,
            },
            ScriptedEvent::KeyPress { selector, key } => PageEvent::KeyPress {
                target: resolve(doc, selector)?,
                key: key.clone(),
            },
            ScriptedEvent::Input { selector, value } => PageEvent::Input {
                target: resolve(doc, selector)?,
                value: value.clone(),
            },
            ScriptedEvent::Submit { selector } => PageEvent::Submit {
                form: resolve(doc, selector)?,
            },
            ScriptedEvent::AcceptCookies => PageEvent::AcceptCookies,
        })
    }
}

impl PageFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let fixture: Self = serde_json::from_str(content)?;
        if let Some(entry) = fixture.timeline.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(Error::Fixture(format!(
                "timeline goes backwards at {}ms",
                entry[1].at_ms
            )));
        }
        Ok(fixture)
    }

    /// Apply the fixture's site overrides on top of `config`
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(profile) = self.profile {
            config.site.profile = profile;
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
    }

    pub fn build_document(&self) -> Document {
        let mut doc = Document::new();
        *doc.viewport_mut() = self.viewport.clone();
        let body = doc.body();
        for spec in &self.body {
            build_element(&mut doc, body, spec);
        }
        doc
    }
}

fn build_element(doc: &mut Document, parent: NodeId, spec: &ElementSpec) {
    let node = doc.append_new(parent, &spec.tag);
    if let Some(id) = &spec.id {
        doc.set_attr(node, "id", id);
    }
    for class in spec.class.iter().flat_map(|c| c.split_whitespace()) {
        doc.add_class(node, class);
    }
    for (key, value) in &spec.attrs {
        doc.set_attr(node, key, value);
    }
    if let Some(text) = &spec.text {
        doc.set_text(node, text);
    }
    if let Some(value) = &spec.value {
        doc.set_value(node, value);
    }
    doc.set_geometry(node, spec.top, spec.height);
    for child in &spec.children {
        build_element(doc, node, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r##"{
        "profile": "retail",
        "viewport": { "width": 480 },
        "body": [
            { "tag": "ul", "class": "nav-menu", "children": [
                { "tag": "a", "class": "nav-link active", "attrs": { "href": "#shop" }, "text": "Shop" }
            ]},
            { "tag": "section", "id": "shop", "top": 600, "height": 800 }
        ],
        "timeline": [
            { "at_ms": 0, "event": { "type": "click", "selector": ".nav-link" } },
            { "at_ms": 250, "event": { "type": "scroll", "y": 420 } },
            { "at_ms": 900, "event": { "type": "accept_cookies" } }
        ]
    }"##;

    #[test]
    fn test_build_document_from_json() {
        let fixture = PageFixture::from_json(FIXTURE).unwrap();
        let doc = fixture.build_document();

        assert_eq!(doc.viewport().width, 480.0);
        assert_eq!(doc.viewport().height, 800.0);
        let link = doc.query_selector(".nav-menu > a").unwrap().unwrap();
        assert!(doc.has_class(link, "active"));
        assert_eq!(doc.attr(link, "href"), Some("#shop"));
        let shop = doc.get_element_by_id("shop").unwrap();
        assert_eq!(doc.offset_top(shop), 600.0);

        let mut config = AppConfig::default();
        fixture.apply_to(&mut config);
        assert_eq!(config.site.profile, SiteProfile::Retail);
    }

    #[test]
    fn test_events_resolve_against_document() {
        let fixture = PageFixture::from_json(FIXTURE).unwrap();
        let doc = fixture.build_document();
        let link = doc.query_selector(".nav-link").unwrap().unwrap();

        let events: Vec<_> = fixture
            .timeline
            .iter()
            .map(|entry| entry.event.resolve(&doc).unwrap())
            .collect();
        assert_eq!(
            events,
            vec![
                PageEvent::Click { target: link },
                PageEvent::Scroll { y: 420.0 },
                PageEvent::AcceptCookies,
            ]
        );

        let missing = ScriptedEvent::Click {
            selector: ".mobile-menu-toggle".to_string(),
        };
        assert!(matches!(missing.resolve(&doc), Err(Error::Fixture(_))));
    }

    #[test]
    fn test_timeline_must_be_ordered() {
        let json = r#"{ "timeline": [
            { "at_ms": 500, "event": { "type": "scroll", "y": 1 } },
            { "at_ms": 100, "event": { "type": "scroll", "y": 2 } }
        ]}"#;
        assert!(matches!(PageFixture::from_json(json), Err(Error::Fixture(_))));
    }
}
