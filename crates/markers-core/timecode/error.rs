//! Error types for timecode operations.

use thiserror::Error;

use super::FrameRate;

/// Errors that can occur during rational time and timecode operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimecodeError {
    /// A time attribute that is not `"<n>/<d>s"` or `"<n>s"`.
    #[error("Invalid time value '{value}': {reason}")]
    InvalidTime {
        /// The offending attribute text.
        value: String,
        /// Description of the format error.
        reason: String,
    },

    /// Rational constructed with a zero denominator.
    #[error("Rational time with zero denominator")]
    ZeroDenominator,

    /// Exact time arithmetic left the representable range.
    #[error("Time arithmetic out of range")]
    Overflow,

    /// Division by a zero time value or rate.
    #[error("Division by zero in time arithmetic")]
    DivisionByZero,

    /// Invalid frame rate.
    #[error("Invalid frame rate: {numerator}/{denominator}")]
    InvalidFrameRate {
        /// Frame rate numerator.
        numerator: u32,
        /// Frame rate denominator.
        denominator: u32,
    },

    /// Arithmetic between timecodes at different rates without conversion.
    #[error("Incompatible frame rates: {left} vs {right}")]
    IncompatibleRate {
        /// Rate of the left operand.
        left: FrameRate,
        /// Rate of the right operand.
        right: FrameRate,
    },
}
