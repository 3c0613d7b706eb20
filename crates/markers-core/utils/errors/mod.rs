//! Crate-wide error handling
//!
//! Provides the main `CoreError` enum and its categorization, plus `From`
//! conversions so `?` works across the parser, timecode and extraction
//! modules.
//!
//! # Examples
//!
//! ```rust
//! use markers_core::utils::errors::{CoreError, ErrorCategory};
//!
//! let err = CoreError::validation("marker list is empty");
//! assert_eq!(err.category(), ErrorCategory::Validation);
//! ```

mod category;
mod core;

pub use category::ErrorCategory;
pub use core::{CoreError, Result};

/// Convert from parser errors
impl From<crate::parser::ParseError> for CoreError {
    fn from(err: crate::parser::ParseError) -> Self {
        Self::Parse(err)
    }
}

/// Convert from timecode errors
impl From<crate::timecode::TimecodeError> for CoreError {
    fn from(err: crate::timecode::TimecodeError) -> Self {
        Self::Timecode(err)
    }
}

/// Convert from standard I/O errors
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{err}"))
    }
}
