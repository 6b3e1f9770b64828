//! The XML state document served at `GET /api`.
//!
//! The document is kept as a generic tree of [`Element`]s rather than a fixed schema: the
//! mixer adds attributes and sections between releases, and callers navigate whatever is there.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::str::FromStr;

/// The response body could not be read as a single well-formed XML document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),
    #[error("character data outside the root element: {0:?}")]
    ContentOutsideRoot(String),
}

/// One XML element: its attributes in document order, its text, and its child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    /// Character data directly inside this element, concatenated.
    ///
    /// Kept verbatim, except that an element with child elements and only whitespace between
    /// them (indentation) has empty text.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut attributes = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The first child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements called `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Server and input state as reported by the mixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServerInfo {
    root: Element,
}

impl ServerInfo {
    /// Parses a state document.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    close(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    // quick-xml has already matched the end tag against its start tag
                    if let Some(element) = stack.pop() {
                        close(&mut stack, &mut root, element)?;
                    }
                }
                Event::Text(text) => {
                    push_text(&mut stack, &text.unescape()?)?;
                }
                Event::CData(data) => {
                    push_text(&mut stack, &String::from_utf8_lossy(&data.into_inner()))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::Unclosed(open.name));
        }
        let root = root.ok_or(ParseError::NoRoot)?;
        Ok(Self { root })
    }

    /// The document element (`<vmix>`).
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The mixer's version string, e.g. `27.0.0.49`.
    pub fn version(&self) -> Option<&str> {
        self.root.child("version").map(|e| e.text.as_str())
    }

    /// The mixer's edition, e.g. `4K` or `Pro`.
    pub fn edition(&self) -> Option<&str> {
        self.root.child("edition").map(|e| e.text.as_str())
    }

    /// The `<input>` elements under `<inputs>`, in document order.
    ///
    /// Yields nothing if the document has no `<inputs>` section.
    pub fn input_elements(&self) -> impl Iterator<Item = &Element> {
        self.root
            .child("inputs")
            .into_iter()
            .flat_map(|inputs| inputs.children_named("input"))
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

impl FromStr for ServerInfo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(ParseError::ContentOutsideRoot(text.trim().to_string())),
    }
    Ok(())
}

fn close(
    stack: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), ParseError> {
    if !element.children.is_empty() && element.text.trim().is_empty() {
        element.text.clear();
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(ParseError::MultipleRoots(element.name));
    } else {
        *root = Some(element);
    }
    Ok(())
}
