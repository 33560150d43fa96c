//! Contact and newsletter forms

use tracing::debug;

use crate::config::SiteSelectors;
use crate::dom::{Document, NodeId};
use crate::notify::{Notification, Notifier};
use crate::Result;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";
const ENTER_EMAIL: &str = "Please enter your email address";

fn field_value(doc: &Document, form: NodeId, selector: &str) -> String {
    doc.query_selector_within(form, selector)
        .ok()
        .flatten()
        .map(|field| doc.value(field).to_string())
        .unwrap_or_default()
}

fn validation_error(message: &str) -> Notification {
    Notification::ValidationError {
        message: message.to_string(),
    }
}

#[derive(Debug)]
pub struct ContactForm {
    form: NodeId,
}

impl ContactForm {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        Ok(doc
            .query_selector(&selectors.contact_form)?
            .map(|form| Self { form }))
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    /// Validate and submit. Returns whether the submission went through.
    pub fn submit(&self, doc: &mut Document, notifier: &dyn Notifier) -> bool {
        let name = field_value(doc, self.form, "input[name=\"name\"]");
        let email = field_value(doc, self.form, "input[name=\"email\"]");
        let message = field_value(doc, self.form, "textarea[name=\"message\"]");

        if name.is_empty() || email.is_empty() || message.is_empty() {
            notifier.notify(validation_error(FILL_ALL_FIELDS));
            return false;
        }

        debug!(name = %name, "Contact form submitted");
        notifier.notify(Notification::ContactSubmitted { name });
        doc.reset_form(self.form);
        true
    }
}

#[derive(Debug)]
pub struct Newsletter {
    form: NodeId,
}

impl Newsletter {
    pub fn init(doc: &Document, selectors: &SiteSelectors) -> Result<Option<Self>> {
        Ok(doc
            .query_selector(&selectors.newsletter_form)?
            .map(|form| Self { form }))
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn submit(&self, doc: &mut Document, notifier: &dyn Notifier) -> bool {
        let email = field_value(doc, self.form, "input[type=\"email\"]");
        if email.is_empty() {
            notifier.notify(validation_error(ENTER_EMAIL));
            return false;
        }

        notifier.notify(Notification::Subscribed { email });
        doc.reset_form(self.form);
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

    fn contact_page() -> (Document, [NodeId; 3]) {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.append_new(body, "form");
        doc.add_class(form, "contact-form");
        let mut fields = Vec::new();
        for (tag, name) in [("input", "name"), ("input", "email"), ("textarea", "message")] {
            let field = doc.append_new(form, tag);
            doc.set_attr(field, "name", name);
            fields.push(field);
        }
        (doc, [fields[0], fields[1], fields[2]])
    }

    #[test]
    fn test_contact_form_requires_every_field() {
        let (mut doc, [name, email, _]) = contact_page();
        let contact = ContactForm::init(&doc, &retail()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();

        doc.set_value(name, "Ada");
        doc.set_value(email, "ada@example.com");
        assert!(!contact.submit(&mut doc, &notifier));
        assert_eq!(notifier.take(), vec![validation_error("Please fill in all fields")]);
        // Nothing was cleared.
        assert_eq!(doc.value(name), "Ada");
    }

    #[test]
    fn test_contact_form_submits_and_resets() {
        let (mut doc, [name, email, message]) = contact_page();
        let contact = ContactForm::init(&doc, &retail()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();

        doc.set_value(name, "Ada");
        doc.set_value(email, "ada@example.com");
        doc.set_value(message, "Do you resize rings?");
        assert!(contact.submit(&mut doc, &notifier));
        assert_eq!(
            notifier.take(),
            vec![Notification::ContactSubmitted {
                name: "Ada".to_string()
            }]
        );
        assert_eq!(doc.value(message), "");
    }

    #[test]
    fn test_newsletter() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.append_new(body, "form");
        doc.add_class(form, "newsletter-form");
        let input = doc.append_new(form, "input");
        doc.set_attr(input, "type", "email");

        let newsletter = Newsletter::init(&doc, &retail()).unwrap().unwrap();
        let notifier = RecordingNotifier::new();
        assert!(!newsletter.submit(&mut doc, &notifier));
        doc.set_value(input, "ada@example.com");
        assert!(newsletter.submit(&mut doc, &notifier));
        assert_eq!(
            notifier.take(),
            vec![
                validation_error("Please enter your email address"),
                Notification::Subscribed {
                    email: "ada@example.com".to_string()
                },
            ]
        );
        assert_eq!(doc.value(input), "");
    }
}
