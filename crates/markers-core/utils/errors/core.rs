//! Core error type for marker extraction
//!
//! Provides the main `CoreError` enum that wraps all error types from the
//! parser and timecode modules together with the structural and validation
//! failures of the extraction pipeline.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` in the library)
//! - Structural and validation errors abort the whole run; nothing partial
//!   is handed to export writers
//! - Degraded conditions (missing rate, missing role, hidden marker) are
//!   never errors; they are logged and a fallback is used

use core::fmt;

use thiserror::Error;

use crate::parser::ParseError;
use crate::timecode::TimecodeError;

/// Main error type for marker extraction
///
/// Wraps module-specific errors to provide a unified error handling
/// interface. Every variant is fatal for the run that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Document could not be read into a timeline
    Parse(ParseError),

    /// Rational time or frame rate arithmetic failed
    Timecode(TimecodeError),

    /// A node has no ancestor path to a timeline sequence
    DetachedNode { node: usize, kind: String },

    /// The document contains no project timeline
    NoProject,

    /// More than one project and none was selected
    MultipleProjects { names: Vec<String> },

    /// The selected project does not exist in the document
    ProjectNotFound { name: String },

    /// A marker resolved to an empty identifier
    EmptyMarkerId { mode: String, marker: String },

    /// Generic validation failure
    Validation(String),

    /// File I/O errors
    Io(String),

    /// Internal consistency error (should not happen)
    Internal(String),
}

impl CoreError {
    /// Create internal error (indicates a bug)
    pub fn internal<T: fmt::Display>(message: T) -> Self {
        Self::Internal(format!("{message}"))
    }

    /// Create validation error from message
    pub fn validation<T: fmt::Display>(message: T) -> Self {
        Self::Validation(format!("{message}"))
    }

    /// Check if error indicates a bug in the library
    pub fn is_internal_bug(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::DetachedNode { .. })
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Parse error: {err}"),
            Self::Timecode(err) => write!(f, "Timecode error: {err}"),
            Self::DetachedNode { node, kind } => write!(
                f,
                "Structural error: {kind} node #{node} has no path to a timeline sequence"
            ),
            Self::NoProject => write!(f, "Structural error: document contains no project"),
            Self::MultipleProjects { names } => write!(
                f,
                "Structural error: document contains {} projects ({}); select one",
                names.len(),
                names.join(", ")
            ),
            Self::ProjectNotFound { name } => {
                write!(f, "Structural error: project '{name}' not found")
            }
            Self::EmptyMarkerId { mode, marker } => write!(
                f,
                "Validation error: marker '{marker}' has an empty ID in {mode} mode"
            ),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg} (this is a bug, please report)")
            }
        }
    }
}
