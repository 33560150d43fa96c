//! Document model the page components operate on

mod document;
mod selector;

pub use document::{Document, Element, NodeId, Viewport};
pub use selector::Selector;
