//! Minimal owned XML tree for the CTA feed documents.
//!
//! Both feeds are small, flat documents, so they are read once with the
//! `quick-xml` event reader into an [`Element`] tree and then queried by tag
//! name. Attributes are not kept since neither feed uses them.

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    /// First descendant named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// All descendants named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// Direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the direct child named `name`; empty text counts as missing.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Text of the first descendant named `name`; empty text counts as missing.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name)
            .map(|e| e.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Parses the text of the direct child `name`, see [`parse_logged`].
    pub fn parse_child<'a, T>(
        &'a self,
        name: &'static str,
        parse: impl FnOnce(&'a str) -> Option<T>,
    ) -> Option<T> {
        parse_logged(name, self.child_text(name), parse)
    }
}

/// Applies `parse` to a field value. A value that is present but rejected is
/// logged with its field name before falling back to `None`.
pub fn parse_logged<'a, T>(
    field: &'static str,
    raw: Option<&'a str>,
    parse: impl FnOnce(&'a str) -> Option<T>,
) -> Option<T> {
    let raw = raw?;
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!(field, raw, "Unparseable feed value, using fallback");
    }
    parsed
}

/// Parses a complete document and returns its root element.
///
/// # Errors
///
/// Returns an error for syntax errors, mismatched or unclosed tags, text
/// outside the root element, and documents without a root element.
pub fn parse_document(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => bail!(
                "malformed XML at position {}: {}",
                reader.buffer_position(),
                e
            ),
        };

        match event {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    bail!("document has more than one root element");
                }
                stack.push(Element::new(e.name().as_ref()));
            }
            Event::Empty(e) => attach(&mut stack, &mut root, Element::new(e.name().as_ref()))?,
            Event::End(_) => match stack.pop() {
                Some(element) => attach(&mut stack, &mut root, element)?,
                None => bail!("closing tag without a matching opening tag"),
            },
            Event::Text(t) => {
                let text = t.unescape()?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None => bail!("text outside the root element"),
                }
            }
            Event::CData(c) => match stack.last_mut() {
                Some(parent) => parent.text.push_str(&String::from_utf8_lossy(&c)),
                None => bail!("CDATA outside the root element"),
            },
            Event::Eof => break,
            // declarations, comments, processing instructions
            _ => (),
        }
    }

    if let Some(open) = stack.last() {
        bail!("document ended inside <{}>", open.name);
    }
    match root {
        Some(root) => Ok(root),
        None => bail!("document has no root element"),
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        bail!("document has more than one root element");
    }
    Ok(())
}
