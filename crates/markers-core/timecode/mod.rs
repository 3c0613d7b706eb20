//! Timecode engine: exact rational time at a frame rate
//!
//! Every position the resolver produces is a [`Timecode`]: a rational number
//! of seconds tagged with the frame rate and subframe base it is displayed
//! at. Arithmetic is exact; rates must match unless a conversion is asked for.
//!
//! # Example
//!
//! ```rust
//! use markers_core::timecode::{FrameRate, Rational, Timecode, TimecodeStyle};
//!
//! let start = Timecode::new(Rational::from_integer(3600), FrameRate::Fps25, 80);
//! let marker = start.checked_add(&Timecode::new(Rational::new(5, 2), FrameRate::Fps25, 80))?;
//! assert_eq!(marker.format(TimecodeStyle::default()), "01:00:02:12");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::cmp::Ordering;
use core::fmt;

mod dropframe;
mod error;
mod frame_rate;
mod rational;

pub use dropframe::DropFrameConfig;
pub use error::TimecodeError;
pub use frame_rate::FrameRate;
pub use rational::Rational;

/// Subframe resolution Final Cut Pro uses for its timelines.
pub const DEFAULT_SUBFRAME_BASE: u32 = 80;

/// How a [`Timecode`] is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeStyle {
    /// SMPTE notation `HH:MM:SS:FF`.
    ///
    /// `drop_frame` switches to `HH:MM:SS;FF` labelling, honoured only at
    /// 29.97 and 59.94 fps. `subframes` appends `.SF`.
    Timecode {
        /// Use drop-frame labels where the rate supports them.
        drop_frame: bool,
        /// Append the subframe component.
        subframes: bool,
    },
    /// Wall-clock notation `HH:MM:SS.mmm`.
    RealTime,
}

impl Default for TimecodeStyle {
    fn default() -> Self {
        Self::Timecode {
            drop_frame: false,
            subframes: false,
        }
    }
}

/// Split timecode fields, already adjusted for drop-frame labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimecodeComponents {
    /// The time is before zero.
    pub negative: bool,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub frames: u64,
    pub subframes: u64,
}

/// A point in time at a frame rate.
///
/// Ordering compares the wall-clock position first, so sorting markers from
/// one timeline is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timecode {
    seconds: Rational,
    rate: FrameRate,
    subframe_base: u32,
}

impl Timecode {
    /// Construct a time value from rational seconds.
    #[must_use]
    pub const fn new(seconds: Rational, rate: FrameRate, subframe_base: u32) -> Self {
        Self {
            seconds,
            rate,
            subframe_base,
        }
    }

    /// Zero at the given rate with FCP's subframe base.
    #[must_use]
    pub const fn zero(rate: FrameRate) -> Self {
        Self::new(Rational::ZERO, rate, DEFAULT_SUBFRAME_BASE)
    }

    /// Position in seconds.
    #[must_use]
    pub const fn seconds(&self) -> Rational {
        self.seconds
    }

    #[must_use]
    pub const fn rate(&self) -> FrameRate {
        self.rate
    }

    #[must_use]
    pub const fn subframe_base(&self) -> u32 {
        self.subframe_base
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), TimecodeError> {
        if self.rate == other.rate {
            Ok(())
        } else {
            Err(TimecodeError::IncompatibleRate {
                left: self.rate,
                right: other.rate,
            })
        }
    }

    /// Add two times at the same rate.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::IncompatibleRate`] when the rates differ;
    /// convert one side with [`Timecode::converted`] first.
    /// [`TimecodeError::Overflow`] when the sum is out of range.
    pub fn checked_add(&self, other: &Self) -> Result<Self, TimecodeError> {
        self.ensure_compatible(other)?;
        Ok(Self::new(
            self.seconds.checked_add(other.seconds)?,
            self.rate,
            self.subframe_base,
        ))
    }

    /// Subtract two times at the same rate.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::IncompatibleRate`] when the rates differ and
    /// [`TimecodeError::Overflow`] when the difference is out of range.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, TimecodeError> {
        self.ensure_compatible(other)?;
        Ok(Self::new(
            self.seconds.checked_sub(other.seconds)?,
            self.rate,
            self.subframe_base,
        ))
    }

    /// Re-express this time at another rate by wall-clock equivalence.
    ///
    /// The position in seconds is unchanged; only frame labelling changes,
    /// so no precision is lost at rate boundaries.
    #[must_use]
    pub const fn converted(&self, rate: FrameRate) -> Self {
        Self::new(self.seconds, rate, self.subframe_base)
    }

    /// Whole frames elapsed since zero (floored, may be negative).
    #[must_use]
    pub fn frame_count(&self) -> i128 {
        let (fps_num, fps_den) = self.rate.as_ratio();
        // seconds parts are within 2^63 and rate parts within 2^32
        (self.seconds.numer() * i128::from(fps_num))
            .div_euclid(self.seconds.denom() * i128::from(fps_den.max(1)))
    }

    /// Break the time into display fields.
    #[must_use]
    pub fn components(&self, drop_frame: bool) -> TimecodeComponents {
        let negative = self.seconds.is_negative();
        let (fps_num, fps_den) = self.rate.as_ratio();
        let scaled = self.seconds.numer().unsigned_abs() * u128::from(fps_num);
        let per_frame = self.seconds.denom().unsigned_abs() * u128::from(fps_den.max(1));
        let frames = u64::try_from(scaled / per_frame).unwrap_or(u64::MAX);
        let subframes = (scaled % per_frame) * u128::from(self.subframe_base) / per_frame;
        let subframes = u64::try_from(subframes).unwrap_or(0);

        let (label, fps) = match DropFrameConfig::for_frame_rate(self.rate) {
            Some(config) if drop_frame => (config.label_frame(frames), config.nominal_fps),
            _ => (frames, u64::from(self.rate.nominal_fps().max(1))),
        };

        TimecodeComponents {
            negative,
            hours: label / (fps * 3600),
            minutes: (label / (fps * 60)) % 60,
            seconds: (label / fps) % 60,
            frames: label % fps,
            subframes,
        }
    }

    /// Render to text.
    #[must_use]
    pub fn format(&self, style: TimecodeStyle) -> String {
        match style {
            TimecodeStyle::Timecode {
                drop_frame,
                subframes,
            } => {
                let drop_frame = drop_frame && self.rate.is_drop_frame_capable();
                let c = self.components(drop_frame);
                let sign = if c.negative { "-" } else { "" };
                let separator = if drop_frame { ';' } else { ':' };
                let mut text = format!(
                    "{sign}{:02}:{:02}:{:02}{separator}{:02}",
                    c.hours, c.minutes, c.seconds, c.frames
                );
                if subframes {
                    text.push_str(&format!(".{:02}", c.subframes));
                }
                text
            }
            TimecodeStyle::RealTime => {
                let sign = if self.seconds.is_negative() { "-" } else { "" };
                let millis = self.seconds.numer().unsigned_abs() * 1000
                    / self.seconds.denom().unsigned_abs();
                let millis = u64::try_from(millis).unwrap_or(u64::MAX);
                let total_seconds = millis / 1000;
                format!(
                    "{sign}{:02}:{:02}:{:02}.{:03}",
                    total_seconds / 3600,
                    (total_seconds / 60) % 60,
                    total_seconds % 60,
                    millis % 1000
                )
            }
        }
    }
}

impl PartialOrd for Timecode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timecode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.seconds
            .cmp(&other.seconds)
            .then_with(|| self.rate.as_ratio().cmp(&other.rate.as_ratio()))
            .then_with(|| self.subframe_base.cmp(&other.subframe_base))
    }
}

/// Non-drop `HH:MM:SS:FF`.
impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(TimecodeStyle::default()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Timecode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Timecode", 3)?;
        state.serialize_field("timecode", &self.to_string())?;
        state.serialize_field("seconds", &self.seconds)?;
        state.serialize_field("frame_rate", &self.rate.to_string())?;
        state.end()
    }
}
