//! Navigation link state and section scroll-spy
//!
//! Exactly one link is active at a time, or none. A click on a link that
//! points at a section in this document activates it and yields the scroll
//! offset that puts the section just below the fixed header. Scroll position
//! changes activate the link whose section range contains the offset.

use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use crate::config::SiteSelectors;
use crate::dom::{Document, NodeId};
use crate::Result;

const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone)]
pub struct NavLink {
    node: NodeId,
    label: String,
    /// Id of the element this link targets, when it points into the page
    section: Option<String>,
    active: bool,
}

impl NavLink {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct Navigation {
    links: Vec<NavLink>,
    /// In-page anchors outside the navigation: (anchor, target id)
    anchors: Vec<(NodeId, String)>,
    sections: Vec<NodeId>,
    header: Option<NodeId>,
    margin: f64,
}

/// Resolve `href` against the page URL and return the fragment when it names
/// an element of this same document.
///
/// The parsed fragment is percent-encoded, so it is decoded before the id
/// lookup.
pub fn internal_target(doc: &Document, base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href).ok()?;
    let encoded = resolved.fragment().filter(|f| !f.is_empty())?;
    let fragment = percent_decode_str(encoded).decode_utf8().ok()?.into_owned();

    let mut page = base.clone();
    page.set_fragment(None);
    let mut target_page = resolved.clone();
    target_page.set_fragment(None);
    if page != target_page {
        return None;
    }

    doc.get_element_by_id(&fragment).map(|_| fragment)
}

/// Half-open activation range `[start, start + height)` for a section
pub fn activation_range(section_top: f64, section_height: f64, header_height: f64, margin: f64) -> (f64, f64) {
    let start = section_top - header_height - margin;
    (start, start + section_height)
}

impl Navigation {
    /// Returns `None` when the page has no navigation links
    pub fn init(doc: &Document, selectors: &SiteSelectors, base: &Url) -> Result<Option<Self>> {
        let link_nodes = doc.query_selector_all(&selectors.nav_links)?;
        if link_nodes.is_empty() {
            debug!(selector = %selectors.nav_links, "No navigation links, skipping navigation");
            return Ok(None);
        }

        let links: Vec<NavLink> = link_nodes
            .iter()
            .map(|&node| NavLink {
                node,
                label: doc.text(node).trim().to_string(),
                section: doc
                    .attr(node, "href")
                    .and_then(|href| internal_target(doc, base, href)),
                active: doc.has_class(node, ACTIVE_CLASS),
            })
            .collect();

        let anchors = doc
            .query_selector_all(&selectors.anchors)?
            .into_iter()
            .filter(|node| !link_nodes.contains(node))
            .filter_map(|node| {
                let href = doc.attr(node, "href")?;
                internal_target(doc, base, href).map(|id| (node, id))
            })
            .collect();

        let header = match &selectors.header {
            Some(selector) => doc.query_selector(selector)?,
            None => None,
        };

        Ok(Some(Self {
            links,
            anchors,
            sections: doc.query_selector_all(&selectors.sections)?,
            header,
            margin: selectors.section_margin_px,
        }))
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn active_link(&self) -> Option<&NavLink> {
        self.links.iter().find(|l| l.active)
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn header_height(&self, doc: &Document) -> f64 {
        self.header.map(|h| doc.offset_height(h)).unwrap_or(0.0)
    }

    /// Index of the link containing `node`
    pub fn link_for(&self, doc: &Document, node: NodeId) -> Option<usize> {
        self.links.iter().position(|l| doc.contains(l.node, node))
    }

    /// Scroll offset for an in-page anchor containing `node`
    pub fn anchor_target(&self, doc: &Document, node: NodeId) -> Option<f64> {
        let (_, id) = self.anchors.iter().find(|(a, _)| doc.contains(*a, node))?;
        let target = doc.get_element_by_id(id)?;
        Some(doc.offset_top(target) - self.header_height(doc))
    }

    fn set_active(&mut self, doc: &mut Document, index: Option<usize>) {
        for (i, link) in self.links.iter_mut().enumerate() {
            link.active = Some(i) == index;
            if link.active {
                doc.add_class(link.node, ACTIVE_CLASS);
            } else {
                doc.remove_class(link.node, ACTIVE_CLASS);
            }
        }
    }

    /// Handle a click on link `index`.
    ///
    /// Returns the scroll offset to move to, or `None` when the link does
    /// not point into this page (state is left untouched).
    pub fn click(&mut self, doc: &mut Document, index: usize) -> Option<f64> {
        let section = self.links.get(index)?.section.clone()?;
        let target = doc.get_element_by_id(&section)?;

        self.set_active(doc, Some(index));
        let offset = doc.offset_top(target) - self.header_height(doc);
        debug!(section = %section, offset, "Navigation click");
        Some(offset)
    }

    /// Section whose activation range contains `scroll_y`, in document order
    pub fn section_at(&self, doc: &Document, scroll_y: f64) -> Option<String> {
        let header_height = self.header_height(doc);
        self.sections.iter().find_map(|&section| {
            let (start, end) = activation_range(
                doc.offset_top(section),
                doc.offset_height(section),
                header_height,
                self.margin,
            );
            if scroll_y >= start && scroll_y < end {
                doc.attr(section, "id").map(str::to_string)
            } else {
                None
            }
        })
    }

    /// Update the active link for a new scroll offset
    pub fn on_scroll(&mut self, doc: &mut Document, scroll_y: f64) {
        let section = self.section_at(doc, scroll_y);
        let index = section.and_then(|id| {
            self.links
                .iter()
                .position(|l| l.section.as_deref() == Some(id.as_str()))
        });
        self.set_active(doc, index);
    }
}
