//! CSS selector subset used to locate page elements
//!
//! Supports type, universal, `#id`, `.class`, attribute conditions
//! (`[a]`, `[a="v"]`, `[a^="v"]`), `:nth-child(n)`, comma groups and the
//! descendant / child combinators.

use super::document::{Document, NodeId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    nth_child: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    step: SelectorStep,
    // Relation to previous (left) selector part.
    combinator: Option<Combinator>,
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Vec<SelectorPart>>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let groups = split_groups(selector)?
            .iter()
            .map(|group| parse_chain(group))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Whether `node` matches any group of this selector
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|chain| matches_chain(doc, node, chain, chain.len() - 1))
    }
}

fn unsupported(selector: &str) -> Error {
    Error::Selector(selector.to_string())
}

fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
            }
            '(' => paren_depth += 1,
            ')' => {
                paren_depth = paren_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
            }
            ',' if bracket_depth == 0 && paren_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(unsupported(selector));
                }
                groups.push(trimmed.to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    if bracket_depth != 0 || paren_depth != 0 {
        return Err(unsupported(selector));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(unsupported(selector));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize(selector: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '>' if depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
                tokens.push(">".to_string());
            }
            ch if ch.is_ascii_whitespace() && depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    tokens
}

fn parse_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(selector) {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(unsupported(selector));
            }
            pending = Some(Combinator::Child);
            continue;
        }

        let step = parse_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(unsupported(selector));
    }
    Ok(parts)
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let end = src[start..]
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| start + i)
        .unwrap_or(src.len());
    if end == start {
        None
    } else {
        Some((src[start..end].to_string(), end))
    }
}

fn parse_attr(part: &str, start: usize) -> Result<(AttrCondition, usize)> {
    let close = part[start..]
        .find(']')
        .map(|i| start + i)
        .ok_or_else(|| unsupported(part))?;
    let body = part[start + 1..close].trim();

    let condition = if let Some((key, value)) = body.split_once("^=") {
        AttrCondition::StartsWith {
            key: key.trim().to_string(),
            value: unquote(value),
        }
    } else if let Some((key, value)) = body.split_once('=') {
        AttrCondition::Eq {
            key: key.trim().to_string(),
            value: unquote(value),
        }
    } else if body.is_empty() {
        return Err(unsupported(part));
    } else {
        AttrCondition::Exists {
            key: body.to_string(),
        }
    };
    Ok((condition, close + 1))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
        .to_string()
}

fn parse_step(part: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    while i < part.len() {
        let rest = &part[i..];
        if rest.starts_with('*') {
            step.universal = true;
            i += 1;
        } else if rest.starts_with('#') {
            let (id, next) = parse_ident(part, i + 1).ok_or_else(|| unsupported(part))?;
            step.id = Some(id);
            i = next;
        } else if rest.starts_with('.') {
            let (class, next) = parse_ident(part, i + 1).ok_or_else(|| unsupported(part))?;
            step.classes.push(class);
            i = next;
        } else if rest.starts_with('[') {
            let (attr, next) = parse_attr(part, i)?;
            step.attrs.push(attr);
            i = next;
        } else if let Some(arg) = rest.strip_prefix(":nth-child(") {
            let close = arg.find(')').ok_or_else(|| unsupported(part))?;
            let n = arg[..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| unsupported(part))?;
            step.nth_child = Some(n);
            i += ":nth-child(".len() + close + 1;
        } else {
            if step.tag.is_some() || i != 0 {
                return Err(unsupported(part));
            }
            let (tag, next) = parse_ident(part, i).ok_or_else(|| unsupported(part))?;
            step.tag = Some(tag.to_ascii_lowercase());
            i = next;
        }
    }

    Ok(step)
}

fn matches_step(doc: &Document, node: NodeId, step: &SelectorStep) -> bool {
    let Some(element) = doc.element(node) else {
        return false;
    };
    if let Some(tag) = &step.tag {
        if element.tag() != tag {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if element.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !step.classes.iter().all(|c| element.has_class(c)) {
        return false;
    }
    let attrs_match = step.attrs.iter().all(|cond| match cond {
        AttrCondition::Exists { key } => element.attr(key).is_some(),
        AttrCondition::Eq { key, value } => element.attr(key) == Some(value.as_str()),
        AttrCondition::StartsWith { key, value } => element
            .attr(key)
            .map(|v| v.starts_with(value.as_str()))
            .unwrap_or(false),
    });
    if !attrs_match {
        return false;
    }
    if let Some(n) = step.nth_child {
        if doc.child_index(node).map(|i| i + 1) != Some(n) {
            return false;
        }
    }
    true
}

fn matches_chain(doc: &Document, node: NodeId, chain: &[SelectorPart], index: usize) -> bool {
    let part = &chain[index];
    if !matches_step(doc, node, &part.step) {
        return false;
    }
    let Some(combinator) = part.combinator else {
        return true;
    };

    match combinator {
        Combinator::Child => doc
            .parent(node)
            .map(|parent| matches_chain(doc, parent, chain, index - 1))
            .unwrap_or(false),
        Combinator::Descendant => {
            let mut current = doc.parent(node);
            while let Some(ancestor) = current {
                if matches_chain(doc, ancestor, chain, index - 1) {
                    return true;
                }
                current = doc.parent(ancestor);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append_new(body, "nav");
        doc.add_class(nav, "nav-menu");
        let link = doc.append_new(nav, "a");
        doc.set_attr(link, "href", "#about");
        doc.add_class(link, "nav-link");
        let list = doc.append_new(body, "div");
        doc.add_class(list, "indicators");
        let first = doc.append_new(list, "div");
        doc.add_class(first, "indicator");
        let second = doc.append_new(list, "div");
        doc.add_class(second, "indicator");
        let value = doc.append_new(second, "span");
        doc.add_class(value, "value");
        (doc, nav, link, value)
    }

    #[test]
    fn test_descendant_and_child() {
        let (doc, _, link, _) = sample();
        assert!(Selector::parse(".nav-menu a").unwrap().matches(&doc, link));
        assert!(Selector::parse("nav > a.nav-link").unwrap().matches(&doc, link));
        assert!(!Selector::parse("body > a").unwrap().matches(&doc, link));
    }

    #[test]
    fn test_attribute_conditions() {
        let (doc, _, link, _) = sample();
        assert!(Selector::parse("a[href]").unwrap().matches(&doc, link));
        assert!(Selector::parse("a[href^=\"#\"]").unwrap().matches(&doc, link));
        assert!(Selector::parse(".nav-link[href=\"#about\"]").unwrap().matches(&doc, link));
        assert!(!Selector::parse("a[href='#team']").unwrap().matches(&doc, link));
    }

    #[test]
    fn test_nth_child() {
        let (doc, _, _, value) = sample();
        assert!(Selector::parse(".indicator:nth-child(2) .value").unwrap().matches(&doc, value));
        assert!(!Selector::parse(".indicator:nth-child(1) .value").unwrap().matches(&doc, value));
    }

    #[test]
    fn test_groups() {
        let (doc, nav, link, _) = sample();
        let sel = Selector::parse(".nav-link, nav").unwrap();
        assert!(sel.matches(&doc, nav));
        assert!(sel.matches(&doc, link));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".a,,.b").is_err());
        assert!(Selector::parse("a[href").is_err());
        assert!(Selector::parse("> a").is_err());
        assert!(Selector::parse(".").is_err());
    }
}
