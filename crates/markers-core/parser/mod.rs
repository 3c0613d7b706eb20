//! FCPXML reader
//!
//! Two stages: [`XmlElement::parse`] turns the document into a generic
//! attributed element tree, then [`decode`] lowers that tree into the
//! [`Timeline`](crate::model::Timeline) arena with typed node kinds and exact
//! rational timing.
//!
//! # Example
//!
//! ```rust
//! use markers_core::parser::{decode, XmlElement};
//!
//! let root = XmlElement::parse(r#"<fcpxml version="1.10"><library/></fcpxml>"#)?;
//! let timeline = decode(&root)?;
//! assert_eq!(timeline.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decode;
mod errors;
mod xml;

pub use decode::decode;
pub use errors::ParseError;
pub use xml::XmlElement;
