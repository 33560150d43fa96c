//! Responsive navigation menu
//!
//! At or below the breakpoint the navigation list collapses behind a toggle
//! control. In `generated` mode the control is created and removed as the
//! viewport crosses the breakpoint; in `static` mode the page ships it and
//! the menu's `active` class carries the expanded state.

use tracing::debug;

use crate::config::{MenuMode, SiteSelectors};
use crate::dom::{Document, NodeId};
use crate::Result;

pub const TOGGLE_CLASS: &str = "mobile-menu-toggle";
pub const ICON_COLLAPSED: &str = "☰";
pub const ICON_EXPANDED: &str = "✕";

const TOGGLE_STYLE: &[(&str, &str)] = &[
    ("background", "none"),
    ("border", "none"),
    ("color", "white"),
    ("font-size", "24px"),
    ("cursor", "pointer"),
    ("padding", "10px"),
    ("display", "block"),
];

const EXPANDED_STYLE: &[(&str, &str)] = &[
    ("display", "flex"),
    ("flex-direction", "column"),
    ("position", "absolute"),
    ("top", "100%"),
    ("left", "0"),
    ("right", "0"),
    ("background-color", "rgba(46, 139, 87, 0.95)"),
    ("padding", "20px"),
    ("z-index", "1000"),
];

const INLINE_STYLE: &[(&str, &str)] = &[
    ("display", "flex"),
    ("flex-direction", "row"),
    ("position", "static"),
    ("background-color", "transparent"),
    ("padding", "0"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Collapsed,
    Expanded,
}

#[derive(Debug)]
pub struct ResponsiveMenu {
    menu: NodeId,
    container: Option<NodeId>,
    toggle: Option<NodeId>,
    generated: bool,
    state: MenuState,
    breakpoint: f64,
}

fn apply_style(doc: &mut Document, node: NodeId, style: &[(&str, &str)]) {
    for (property, value) in style {
        doc.set_style(node, property, value);
    }
}

impl ResponsiveMenu {
    /// Returns `None` when the page lacks the elements the mode needs
    pub fn init(doc: &mut Document, selectors: &SiteSelectors, breakpoint: f64) -> Result<Option<Self>> {
        let Some(menu) = doc.query_selector(&selectors.nav_menu)? else {
            debug!(selector = %selectors.nav_menu, "No navigation menu, skipping responsive menu");
            return Ok(None);
        };

        let mut this = match &selectors.menu_mode {
            MenuMode::Generated => {
                let Some(container) = doc.query_selector(&selectors.nav_container)? else {
                    debug!("No navigation container, skipping responsive menu");
                    return Ok(None);
                };
                Self {
                    menu,
                    container: Some(container),
                    toggle: None,
                    generated: true,
                    state: MenuState::Collapsed,
                    breakpoint,
                }
            }
            MenuMode::Static(selector) => {
                let Some(toggle) = doc.query_selector(selector)? else {
                    debug!(selector = %selector, "No mobile toggle, skipping responsive menu");
                    return Ok(None);
                };
                let state = if doc.has_class(menu, "active") {
                    MenuState::Expanded
                } else {
                    MenuState::Collapsed
                };
                Self {
                    menu,
                    container: None,
                    toggle: Some(toggle),
                    generated: false,
                    state,
                    breakpoint,
                }
            }
        };

        let width = doc.viewport().width;
        if this.generated && width <= breakpoint {
            this.create_toggle(doc)?;
        }
        Ok(Some(this))
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn toggle_control(&self) -> Option<NodeId> {
        self.toggle
    }

    /// Whether `node` is the toggle control or inside it
    pub fn is_toggle(&self, doc: &Document, node: NodeId) -> bool {
        self.toggle.map(|t| doc.contains(t, node)).unwrap_or(false)
    }

    /// React to a viewport width change
    pub fn on_resize(&mut self, doc: &mut Document, width: f64) -> Result<()> {
        if width <= self.breakpoint {
            if self.generated {
                self.create_toggle(doc)?;
            }
        } else if self.generated {
            self.remove_toggle(doc);
        } else if self.state == MenuState::Expanded {
            self.set_state(doc, MenuState::Collapsed);
        }
        Ok(())
    }

    /// Insert a collapsed toggle control. No-op when one already exists.
    fn create_toggle(&mut self, doc: &mut Document) -> Result<()> {
        if let Some(existing) = doc.query_selector(&format!(".{}", TOGGLE_CLASS))? {
            self.toggle = Some(existing);
            return Ok(());
        }
        let Some(container) = self.container else {
            return Ok(());
        };

        let toggle = doc.create_element("button");
        doc.add_class(toggle, TOGGLE_CLASS);
        doc.set_text(toggle, ICON_COLLAPSED);
        apply_style(doc, toggle, TOGGLE_STYLE);
        let first = doc.first_child(container);
        doc.insert_before(container, toggle, first);

        doc.set_style(self.menu, "display", "none");
        self.toggle = Some(toggle);
        self.state = MenuState::Collapsed;
        debug!("Created mobile menu toggle");
        Ok(())
    }

    /// Remove the toggle control and restore the inline layout
    fn remove_toggle(&mut self, doc: &mut Document) {
        if let Some(toggle) = self.toggle.take() {
            doc.remove(toggle);
            debug!("Removed mobile menu toggle");
        }
        apply_style(doc, self.menu, INLINE_STYLE);
        self.state = MenuState::Collapsed;
    }

    fn set_state(&mut self, doc: &mut Document, state: MenuState) {
        if self.generated {
            match state {
                MenuState::Expanded => apply_style(doc, self.menu, EXPANDED_STYLE),
                MenuState::Collapsed => doc.set_style(self.menu, "display", "none"),
            }
        } else {
            match state {
                MenuState::Expanded => doc.add_class(self.menu, "active"),
                MenuState::Collapsed => doc.remove_class(self.menu, "active"),
            }
        }
        if let Some(toggle) = self.toggle {
            let icon = match state {
                MenuState::Expanded => ICON_EXPANDED,
                MenuState::Collapsed => ICON_COLLAPSED,
            };
            doc.set_text(toggle, icon);
        }
        self.state = state;
    }

    /// Flip collapsed ⇄ expanded. Returns the new state, or `None` when
    /// there is no toggle control (desktop layout).
    pub fn toggle(&mut self, doc: &mut Document) -> Option<MenuState> {
        self.toggle?;
        let next = match self.state {
            MenuState::Collapsed => MenuState::Expanded,
            MenuState::Expanded => MenuState::Collapsed,
        };
        self.set_state(doc, next);
        Some(next)
    }

    /// Collapse the menu if it is expanded
    pub fn collapse(&mut self, doc: &mut Document) {
        if self.state == MenuState::Expanded {
            self.set_state(doc, MenuState::Collapsed);
        }
    }

    /// Remove anything this component added to the document
    pub fn teardown(&mut self, doc: &mut Document) {
        if self.generated {
            if let Some(toggle) = self.toggle.take() {
                doc.remove(toggle);
            }
        }
    }
}
