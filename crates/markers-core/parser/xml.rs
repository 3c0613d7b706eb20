//! Generic attributed element tree built with `quick-xml`
//!
//! The decoder never looks at raw XML events; it works on this owned tree of
//! elements with string attributes and ordered children. Text content is
//! trimmed, unescaped and kept on the element that directly contains it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::ParseError;

/// One XML element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified tag name as written in the document
    pub tag: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
    /// Direct text content (trimmed), empty when there is none
    pub text: String,
}

impl XmlElement {
    /// Create an element with no attributes or children
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child element
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given tag
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All child elements with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Concatenated text of this element and all its descendants
    ///
    /// Segments are joined with nothing in between, matching how FCP splits a
    /// caption line across `<text-style>` runs.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Parse a complete document and return its root element
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::XmlSyntax`] for malformed XML,
    /// [`ParseError::UnbalancedElement`] for a truncated document and
    /// [`ParseError::MissingRoot`] when no element is present at all.
    ///
    /// # Example
    ///
    /// ```rust
    /// use markers_core::parser::XmlElement;
    ///
    /// let root = XmlElement::parse(r#"<fcpxml version="1.10"><library/></fcpxml>"#)?;
    /// assert_eq!(root.attr("version"), Some("1.10"));
    /// assert_eq!(root.children[0].tag, "library");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            let event = reader.read_event().map_err(|err| ParseError::XmlSyntax {
                position: u64::try_from(reader.error_position()).unwrap_or(0),
                message: err.to_string(),
            })?;
            let position = u64::try_from(reader.buffer_position()).unwrap_or(0);

            match event {
                Event::Eof => break,
                Event::Start(ref start) => {
                    stack.push(Self::from_start(start, position)?);
                }
                Event::Empty(ref start) => {
                    let element = Self::from_start(start, position)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(ref end) => {
                    let Some(element) = stack.pop() else {
                        return Err(ParseError::UnbalancedElement {
                            tag: String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                        });
                    };
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(ref text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text.unescape().map_err(|err| ParseError::XmlSyntax {
                            position,
                            message: err.to_string(),
                        })?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::UnbalancedElement { tag: open.tag });
        }
        root.ok_or(ParseError::MissingRoot)
    }

    fn from_start(start: &BytesStart<'_>, position: u64) -> Result<Self, ParseError> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attr in start.attributes() {
            let attr = attr.map_err(|err| ParseError::XmlSyntax {
                position,
                message: err.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::XmlSyntax {
                    position,
                    message: err.to_string(),
                })?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

/// Hand a finished element to its parent, or make it the document root.
fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
