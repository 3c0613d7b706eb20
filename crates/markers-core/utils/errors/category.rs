//! Error categorization for reporting
//!
//! Groups [`CoreError`] variants into the three classes the extraction run
//! distinguishes: structural failures of the document, validation failures of
//! the resolved output, and everything else.

use core::fmt;

use super::CoreError;
use crate::timecode::TimecodeError;

/// Error category for filtering and user interface organization
///
/// # Examples
///
/// ```rust
/// use markers_core::utils::errors::{CoreError, ErrorCategory};
///
/// let error = CoreError::NoProject;
/// assert_eq!(error.category(), ErrorCategory::Structural);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The document or its tree is malformed
    ///
    /// Unparseable XML, malformed time attributes, detached nodes and
    /// ambiguous project selection.
    Structural,

    /// Rational or frame rate arithmetic
    Timecode,

    /// Resolved markers failed a precondition required by the writers
    Validation,

    /// I/O and file system errors
    Io,

    /// Internal library bugs
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ErrorCategory {
    /// Get human-readable category name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Timecode => "timecode",
            Self::Validation => "validation",
            Self::Io => "io",
            Self::Internal => "internal",
        }
    }

    /// Check if errors in this category are typically user-fixable
    #[must_use]
    pub const fn is_user_fixable(self) -> bool {
        matches!(self, Self::Structural | Self::Validation)
    }
}

impl CoreError {
    /// Get error category for filtering/grouping
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(_)
            | Self::NoProject
            | Self::MultipleProjects { .. }
            | Self::ProjectNotFound { .. } => ErrorCategory::Structural,
            Self::EmptyMarkerId { .. }
            | Self::Validation(_)
            | Self::Timecode(TimecodeError::Overflow) => ErrorCategory::Validation,
            Self::Timecode(_) => ErrorCategory::Timecode,
            Self::Io(_) => ErrorCategory::Io,
            Self::DetachedNode { .. } | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Suggest a fix for user-fixable errors
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MultipleProjects { .. } => {
                Some("Pass a project name to extract a single timeline")
            }
            Self::NoProject => Some("Export the FCPXML from a project, not from a clip or event"),
            Self::EmptyMarkerId { .. } => {
                Some("Name every marker or choose an ID mode that is never empty")
            }
            Self::Timecode(TimecodeError::Overflow) => {
                Some("Check the document for time values with extreme denominators")
            }
            _ => None,
        }
    }
}
