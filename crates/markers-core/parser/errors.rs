//! Parser error types for FCPXML documents
//!
//! Every variant here is structural: a document that produces one cannot be
//! turned into a timeline and the extraction run aborts.

use core::fmt;

use thiserror::Error;

/// Primary parse error type for FCPXML documents
///
/// # Error Categories
///
/// - **Syntax errors**: the XML itself is malformed or truncated
/// - **Structure errors**: the root element is missing or not `<fcpxml>`
/// - **Content errors**: time or numeric attributes that do not parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// XML reader rejected the document
    XmlSyntax { position: u64, message: String },

    /// Element closed that was never opened, or left open at end of input
    UnbalancedElement { tag: String },

    /// Document has no root element
    MissingRoot,

    /// Root element is not `<fcpxml>`
    UnexpectedRoot { tag: String },

    /// Time attribute that is not `"<n>/<d>s"` or `"<n>s"`
    InvalidTime {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    /// Non-time attribute with an unusable value
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    /// Build an [`ParseError::InvalidTime`] for an attribute on an element
    pub fn invalid_time(element: &str, attribute: &str, value: &str, reason: &str) -> Self {
        Self::InvalidTime {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`ParseError::InvalidAttribute`] for an attribute on an element
    pub fn invalid_attribute(element: &str, attribute: &str, value: &str, reason: &str) -> Self {
        Self::InvalidAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlSyntax { position, message } => {
                write!(f, "Malformed XML at byte {position}: {message}")
            }
            Self::UnbalancedElement { tag } => {
                write!(f, "Unbalanced element <{tag}>")
            }
            Self::MissingRoot => write!(f, "Document has no root element"),
            Self::UnexpectedRoot { tag } => {
                write!(f, "Expected <fcpxml> root element, found <{tag}>")
            }
            Self::InvalidTime {
                element,
                attribute,
                value,
                reason,
            } => write!(
                f,
                "Invalid time '{value}' in {element}@{attribute}: {reason}"
            ),
            Self::InvalidAttribute {
                element,
                attribute,
                value,
                reason,
            } => write!(
                f,
                "Invalid value '{value}' in {element}@{attribute}: {reason}"
            ),
        }
    }
}
