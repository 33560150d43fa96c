//! Demo interactions that end in a notification
//!
//! None of these reach a backend. Each resolves what the visitor clicked,
//! reads the label it needs from the surrounding markup and reports it.

use tracing::debug;

use super::text_within;
use crate::config::SiteSelectors;
use crate::dom::{Document, NodeId, Selector};
use crate::notify::{Notification, Notifier};
use crate::Result;

/// Search box: button click or Enter in the input
#[derive(Debug)]
pub struct Search {
    input: NodeId,
    button: NodeId,
}

impl Search {
    /// Both the input and its button are required
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let input = doc.query_selector(&selectors.search_input)?;
        let button = doc.query_selector(&selectors.search_button)?;
        match (input, button) {
            (Some(input), Some(button)) => Ok(Some(Self { input, button })),
            _ => {
                debug!("No search box, skipping search");
                Ok(None)
            }
        }
    }

    pub fn handle_click(&self, doc: &mut Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        if !doc.contains(self.button, target) {
            return false;
        }
        self.perform(doc, notifier);
        true
    }

    pub fn handle_key(&self, doc: &mut Document, target: NodeId, key: &str, notifier: &dyn Notifier) -> bool {
        if target != self.input || key != "Enter" {
            return false;
        }
        self.perform(doc, notifier);
        true
    }

    /// Report a non-blank query and clear the input
    pub fn perform(&self, doc: &mut Document, notifier: &dyn Notifier) {
        let query = doc.value(self.input).trim().to_string();
        if query.is_empty() {
            return;
        }
        notifier.notify(Notification::Search { query });
        doc.set_value(self.input, "");
    }
}

/// Play and watch buttons on video cards
#[derive(Debug)]
pub struct Media {
    play: Vec<NodeId>,
    watch: Vec<NodeId>,
    card_selector: String,
}

impl Media {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let play = doc.query_selector_all(&selectors.play_buttons)?;
        let watch = doc.query_selector_all(&selectors.watch_buttons)?;
        if play.is_empty() && watch.is_empty() {
            return Ok(None);
        }
        // Validated here so clicks can resolve cards without error handling.
        Selector::parse(&selectors.video_card)?;
        Ok(Some(Self {
            play,
            watch,
            card_selector: selectors.video_card.clone(),
        }))
    }

    fn card_title(&self, doc: &Document, button: NodeId) -> Option<String> {
        let card = doc.closest(button, &self.card_selector).ok().flatten()?;
        text_within(doc, card, "h4")
    }

    pub fn handle_click(&self, doc: &Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        if let Some(&button) = self.play.iter().find(|b| doc.contains(**b, target)) {
            match self.card_title(doc, button) {
                Some(title) => notifier.notify(Notification::VideoPlayback { title }),
                None => debug!("Play button outside a titled video card"),
            }
            return true;
        }
        if let Some(&button) = self.watch.iter().find(|b| doc.contains(**b, target)) {
            match self.card_title(doc, button) {
                Some(title) => notifier.notify(Notification::VideoWatch { title }),
                None => debug!("Watch button outside a titled video card"),
            }
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct ServiceCards {
    cards: Vec<NodeId>,
}

impl ServiceCards {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let cards = doc.query_selector_all(&selectors.service_cards)?;
        Ok((!cards.is_empty()).then_some(Self { cards }))
    }

    pub fn handle_click(&self, doc: &Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        let Some(&card) = self.cards.iter().find(|c| doc.contains(**c, target)) else {
            return false;
        };
        if let Some(service) = text_within(doc, card, "h4") {
            notifier.notify(Notification::ServiceAccess { service });
        }
        true
    }
}

/// "See more" links naming their content section
#[derive(Debug)]
pub struct SeeMore {
    links: Vec<NodeId>,
    section_selector: String,
}

impl SeeMore {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        let links = doc.query_selector_all(&selectors.see_more)?;
        if links.is_empty() {
            return Ok(None);
        }
        Selector::parse(&selectors.content_section)?;
        Ok(Some(Self {
            links,
            section_selector: selectors.content_section.clone(),
        }))
    }

    pub fn handle_click(&self, doc: &Document, target: NodeId, notifier: &dyn Notifier) -> bool {
        let Some(&link) = self.links.iter().find(|l| doc.contains(**l, target)) else {
            return false;
        };
        let section = doc
            .closest(link, &self.section_selector)
            .ok()
            .flatten()
            .and_then(|s| text_within(doc, s, "h3"));
        if let Some(section) = section {
            notifier.notify(Notification::SeeMore { section });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteProfile;
    use crate::notify::RecordingNotifier;

    fn bank() -> SiteSelectors {
        SiteSelectors::for_profile(SiteProfile::Bank)
    }

    fn search_page() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let box_ = doc.append_new(body, "div");
        doc.add_class(box_, "search-box");
        let input = doc.append_new(box_, "input");
        let button = doc.append_new(box_, "button");
        (doc, input, button)
    }

    #[test]
    fn test_search_reports_trimmed_query_and_clears() {
        let (mut doc, input, button) = search_page();
        let search = Search::init(&doc, &bank()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();

        doc.set_value(input, "  exchange rates ");
        assert!(search.handle_click(&mut doc, button, &notifier));
        assert_eq!(
            notifier.take(),
            vec![Notification::Search {
                query: "exchange rates".to_string()
            }]
        );
        assert_eq!(doc.value(input), "");

        doc.set_value(input, "mpr");
        assert!(!search.handle_key(&mut doc, input, "a", &notifier));
        assert!(search.handle_key(&mut doc, input, "Enter", &notifier));
        assert_eq!(notifier.take().len(), 1);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let (mut doc, input, button) = search_page();
        let search = Search::init(&doc, &bank()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();

        doc.set_value(input, "   ");
        search.handle_click(&mut doc, button, &notifier);
        assert!(notifier.notifications().is_empty());
        assert_eq!(doc.value(input), "   ");
    }

    #[test]
    fn test_media_buttons_use_card_title() {
        let mut doc = Document::new();
        let body = doc.body();
        let card = doc.append_new(body, "div");
        doc.add_class(card, "video-card");
        let title = doc.append_new(card, "h4");
        doc.set_text(title, "Monetary Policy Explained");
        let play = doc.append_new(card, "div");
        doc.add_class(play, "play-button");
        let icon = doc.append_new(play, "i");
        let watch = doc.append_new(card, "a");
        doc.add_class(watch, "watch-btn");

        let media = Media::init(&doc, &bank()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();
        assert!(media.handle_click(&doc, icon, &notifier));
        assert!(media.handle_click(&doc, watch, &notifier));
        assert!(!media.handle_click(&doc, title, &notifier));
        assert_eq!(
            notifier.take(),
            vec![
                Notification::VideoPlayback {
                    title: "Monetary Policy Explained".to_string()
                },
                Notification::VideoWatch {
                    title: "Monetary Policy Explained".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_service_card_and_see_more() {
        let mut doc = Document::new();
        let body = doc.body();
        let card = doc.append_new(body, "div");
        doc.add_class(card, "service-card");
        let h4 = doc.append_new(card, "h4");
        doc.set_text(h4, "eNaira");
        let section = doc.append_new(body, "div");
        doc.add_class(section, "content-section");
        let h3 = doc.append_new(section, "h3");
        doc.set_text(h3, "Publications");
        let link = doc.append_new(section, "a");
        doc.add_class(link, "see-more");

        let notifier = RecordingNotifier::new();
        let services = ServiceCards::init(&doc, &bank()).unwrap().unwrap();
        let see_more = SeeMore::init(&doc, &bank()).unwrap().unwrap();
        assert!(services.handle_click(&doc, h4, &notifier));
        assert!(!see_more.handle_click(&doc, h3, &notifier));
        assert!(see_more.handle_click(&doc, link, &notifier));
        assert_eq!(
            notifier.take(),
            vec![
                Notification::ServiceAccess {
                    service: "eNaira".to_string()
                },
                Notification::SeeMore {
                    section: "Publications".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_absent_features() {
        let doc = Document::new();
        assert!(Search::init(&doc, &bank()).unwrap().is_none());
        assert!(Media::init(&doc, &bank()).unwrap().is_none());
        assert!(ServiceCards::init(&doc, &bank()).unwrap().is_none());
        assert!(SeeMore::init(&doc, &bank()).unwrap().is_none());
    }
}
