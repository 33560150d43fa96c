//! Page components
//!
//! Each component is built once from the document by its `init`, which
//! returns `Ok(None)` when the page lacks the elements it manages.

pub mod catalog;
pub mod cookie;
pub mod forms;
pub mod header;
pub mod interactions;
pub mod menu;
pub mod navigation;
pub mod refresh;

pub use catalog::{ProductFilter, ProductGallery};
pub use cookie::CookieNotice;
pub use forms::{ContactForm, Newsletter};
pub use header::HeaderState;
pub use interactions::{Media, Search, SeeMore, ServiceCards};
pub use menu::{MenuState, ResponsiveMenu};
pub use navigation::{NavLink, Navigation};
pub use refresh::IndicatorRefresher;

use crate::dom::{Document, NodeId};

/// Trimmed text of the first `selector` match under `scope`
pub(crate) fn text_within(doc: &Document, scope: NodeId, selector: &str) -> Option<String> {
    doc.query_selector_within(scope, selector)
        .ok()
        .flatten()
        .map(|node| doc.text(node).trim().to_string())
}
