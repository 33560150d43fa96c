//! Product filtering and the product gallery

use tracing::debug;

use super::text_within;
use crate::config::SiteSelectors;
use crate::dom::{Document, NodeId, Selector};
use crate::notify::{Notification, Notifier};
use crate::Result;

const SHOW_ALL: &str = "all";
const NAME_SELECTOR: &str = ".product-name";
const PRICE_SELECTOR: &str = ".price";

/// Filter buttons carrying a `data-filter` class name
#[derive(Debug)]
pub struct ProductFilter {
    buttons: Vec<(NodeId, String)>,
    cards: Vec<NodeId>,
}

impl ProductFilter {
    /// Needs at least one filter button and one product card
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let buttons: Vec<_> = doc
            .query_selector_all(&selectors.filter_buttons)?
            .into_iter()
            .map(|b| (b, doc.attr(b, "data-filter").unwrap_or_default().to_string()))
            .collect();
        let cards = doc.query_selector_all(&selectors.product_cards)?;
        if buttons.is_empty() || cards.is_empty() {
            debug!("No product filters, skipping");
            return Ok(None);
        }
        Ok(Some(Self { buttons, cards }))
    }

    pub fn handle_click(&self, doc: &mut Document, target: NodeId) -> bool {
        let Some((button, filter)) = self.buttons.iter().find(|(b, _)| doc.contains(*b, target)) else {
            return false;
        };
        self.apply(doc, *button, filter);
        true
    }

    fn apply(&self, doc: &mut Document, button: NodeId, filter: &str) {
        for (other, _) in &self.buttons {
            doc.remove_class(*other, "active");
        }
        doc.add_class(button, "active");

        let mut shown = 0;
        for &card in &self.cards {
            let visible = filter == SHOW_ALL || doc.has_class(card, filter);
            doc.set_style(card, "display", if visible { "block" } else { "none" });
            shown += usize::from(visible);
        }
        debug!(filter = %filter, shown, "Applied product filter");
    }
}

/// Product card selection and add-to-cart buttons
#[derive(Debug)]
pub struct ProductGallery {
    cards: Vec<NodeId>,
    cart_buttons: Vec<NodeId>,
    card_selector: String,
}

impl ProductGallery {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let cards = doc.query_selector_all(&selectors.product_cards)?;
        let cart_buttons = doc.query_selector_all(&selectors.add_to_cart)?;
        if cards.is_empty() && cart_buttons.is_empty() {
            return Ok(None);
        }
        Selector::parse(&selectors.product_cards)?;
        Ok(Some(Self {
            cards,
            cart_buttons,
            card_selector: selectors.product_cards.clone(),
        }))
    }

    fn describe(doc: &Document, card: NodeId) -> Option<(String, String)> {
        Some((
            text_within(doc, card, NAME_SELECTOR)?,
            text_within(doc, card, PRICE_SELECTOR)?,
        ))
    }

    /// Add-to-cart click. Consumes the event so the card is not also selected.
    pub fn handle_add_to_cart(&self, doc: &Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        let Some(&button) = self.cart_buttons.iter().find(|b| doc.contains(**b, target)) else {
            return false;
        };
        let product = doc
            .closest(button, &self.card_selector)
            .ok()
            .flatten()
            .and_then(|card| Self::describe(doc, card));
        match product {
            Some((name, price)) => notifier.notify(Notification::AddedToCart { name, price }),
            None => debug!("Add-to-cart button outside a product card"),
        }
        true
    }

    pub fn handle_select(&self, doc: &Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        let Some(&card) = self.cards.iter().find(|c| doc.contains(**c, target)) else {
            return false;
        };
        if let Some((name, price)) = Self::describe(doc, card) {
            notifier.notify(Notification::ProductSelected { name, price });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteProfile;
    use crate::notify::RecordingNotifier;

    fn retail() -> SiteSelectors {
        SiteSelectors::for_profile(SiteProfile::Retail)
    }

    fn card(doc: &mut Document, category: &str, name: &str, price: &str) -> (NodeId, NodeId) {
        let body = doc.body();
        let card = doc.append_new(body, "div");
        doc.add_class(card, "product-card");
        doc.add_class(card, category);
        let n = doc.append_new(card, "h3");
        doc.add_class(n, "product-name");
        doc.set_text(n, name);
        let p = doc.append_new(card, "span");
        doc.add_class(p, "price");
        doc.set_text(p, price);
        let button = doc.append_new(card, "button");
        doc.add_class(button, "add-to-cart");
        (card, button)
    }

    fn filter_button(doc: &mut Document, filter: &str) -> NodeId {
        let body = doc.body();
        let button = doc.append_new(body, "button");
        doc.add_class(button, "filter-button");
        doc.set_attr(button, "data-filter", filter);
        button
    }

    #[test]
    fn test_filter_shows_matching_cards() {
        let mut doc = Document::new();
        let all = filter_button(&mut doc, "all");
        let rings = filter_button(&mut doc, "rings");
        doc.add_class(all, "active");
        let (ring, _) = card(&mut doc, "rings", "Gold Band", "$120");
        let (necklace, _) = card(&mut doc, "necklaces", "Pearl Strand", "$90");

        let filter = ProductFilter::init(&doc, &retail()).unwrap().unwrap();
        assert!(filter.handle_click(&mut doc, rings));
        assert_eq!(doc.style(ring, "display"), Some("block"));
        assert_eq!(doc.style(necklace, "display"), Some("none"));
        assert!(doc.has_class(rings, "active"));
        assert!(!doc.has_class(all, "active"));

        filter.handle_click(&mut doc, all);
        assert_eq!(doc.style(necklace, "display"), Some("block"));
    }

    #[test]
    fn test_add_to_cart_does_not_select_card() {
        let mut doc = Document::new();
        let (card, button) = card(&mut doc, "rings", "Gold Band", "$120");
        let gallery = ProductGallery::init(&doc, &retail()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();

        assert!(gallery.handle_add_to_cart(&doc, button, &notifier));
        assert!(!gallery.handle_add_to_cart(&doc, card, &notifier));
        assert!(gallery.handle_select(&doc, card, &notifier));
        assert_eq!(
            notifier.take(),
            vec![
                Notification::AddedToCart {
                    name: "Gold Band".to_string(),
                    price: "$120".to_string()
                },
                Notification::ProductSelected {
                    name: "Gold Band".to_string(),
                    price: "$120".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_filter_needs_buttons_and_cards() {
        let mut doc = Document::new();
        filter_button(&mut doc, "all");
        assert!(ProductFilter::init(&doc, &retail()).unwrap().is_none());
    }
}
