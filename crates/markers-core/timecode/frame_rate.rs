//! Frame rates used by FCPXML formats and timelines.

use core::fmt;

use super::{Rational, TimecodeError};

/// Common frame rates used in video production.
///
/// FCPXML never names a rate directly; it declares a `frameDuration` on a
/// `<format>` resource. [`FrameRate::from_frame_duration`] maps that back to
/// one of the standard rates, keeping anything unusual as `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FrameRate {
    /// 23.976 fps (24000/1001, NTSC film)
    Fps23_976,
    /// 24 fps (film)
    Fps24,
    /// 25 fps (PAL)
    Fps25,
    /// 29.97 fps (30000/1001, NTSC)
    Fps29_97,
    /// 30 fps
    Fps30,
    /// 47.952 fps (48000/1001)
    Fps47_952,
    /// 48 fps (HFR film)
    Fps48,
    /// 50 fps (PAL)
    Fps50,
    /// 59.94 fps (60000/1001, NTSC)
    Fps59_94,
    /// 60 fps
    Fps60,
    /// Custom frame rate (numerator, denominator)
    Custom {
        /// Frame rate numerator.
        numerator: u32,
        /// Frame rate denominator.
        denominator: u32,
    },
}

impl FrameRate {
    /// Rate FCP timelines fall back to when no format can be resolved.
    pub const DEFAULT: Self = Self::Fps24;

    /// Get the frame rate as a rational number (numerator, denominator).
    #[must_use]
    pub const fn as_ratio(&self) -> (u32, u32) {
        match self {
            Self::Fps23_976 => (24000, 1001),
            Self::Fps24 => (24, 1),
            Self::Fps25 => (25, 1),
            Self::Fps29_97 => (30000, 1001),
            Self::Fps30 => (30, 1),
            Self::Fps47_952 => (48000, 1001),
            Self::Fps48 => (48, 1),
            Self::Fps50 => (50, 1),
            Self::Fps59_94 => (60000, 1001),
            Self::Fps60 => (60, 1),
            Self::Custom {
                numerator,
                denominator,
            } => (*numerator, *denominator),
        }
    }

    /// Frames per second as an exact rational.
    #[must_use]
    pub fn as_rational(&self) -> Rational {
        let (num, den) = self.as_ratio();
        Rational::new(i64::from(num), i64::from(den.max(1)))
    }

    /// Duration of a single frame in seconds.
    #[must_use]
    pub fn frame_duration(&self) -> Rational {
        let (num, den) = self.as_ratio();
        Rational::new(i64::from(den), i64::from(num.max(1)))
    }

    /// Integer frames per second used for timecode labels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    #[must_use]
    pub const fn nominal_fps(&self) -> u32 {
        match self {
            Self::Fps23_976 | Self::Fps24 => 24,
            Self::Fps25 => 25,
            Self::Fps29_97 | Self::Fps30 => 30,
            Self::Fps47_952 | Self::Fps48 => 48,
            Self::Fps50 => 50,
            Self::Fps59_94 | Self::Fps60 => 60,
            Self::Custom {
                numerator,
                denominator,
            } => {
                if *denominator == 0 {
                    return 0;
                }
                // rounded quotient never exceeds the numerator
                ((*numerator as u64 + *denominator as u64 / 2) / *denominator as u64) as u32
            }
        }
    }

    /// Whether drop-frame timecode notation exists for this rate.
    #[must_use]
    pub const fn is_drop_frame_capable(&self) -> bool {
        matches!(self, Self::Fps29_97 | Self::Fps59_94)
    }

    /// Create a custom frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::InvalidFrameRate`] for a zero numerator or
    /// denominator.
    pub fn custom(numerator: u32, denominator: u32) -> Result<Self, TimecodeError> {
        if numerator == 0 || denominator == 0 {
            return Err(TimecodeError::InvalidFrameRate {
                numerator,
                denominator,
            });
        }
        Ok(Self::from_ratio(numerator, denominator))
    }

    /// Match a rational frame rate to a standard one.
    #[must_use]
    pub const fn from_ratio(numerator: u32, denominator: u32) -> Self {
        match (numerator, denominator) {
            (24000, 1001) => Self::Fps23_976,
            (24, 1) => Self::Fps24,
            (25, 1) => Self::Fps25,
            (30000, 1001) => Self::Fps29_97,
            (30, 1) => Self::Fps30,
            (48000, 1001) => Self::Fps47_952,
            (48, 1) => Self::Fps48,
            (50, 1) => Self::Fps50,
            (60000, 1001) => Self::Fps59_94,
            (60, 1) => Self::Fps60,
            _ => Self::Custom {
                numerator,
                denominator,
            },
        }
    }

    /// Derive the rate from an FCPXML `frameDuration` (e.g. `1001/30000s`).
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::InvalidFrameRate`] when the duration is not
    /// positive or does not fit a `u32` ratio.
    pub fn from_frame_duration(duration: Rational) -> Result<Self, TimecodeError> {
        let invalid = || TimecodeError::InvalidFrameRate {
            numerator: u32::try_from(duration.denom()).unwrap_or(0),
            denominator: u32::try_from(duration.numer()).unwrap_or(0),
        };
        if !duration.is_positive() {
            return Err(invalid());
        }
        let numerator = u32::try_from(duration.denom()).map_err(|_| invalid())?;
        let denominator = u32::try_from(duration.numer()).map_err(|_| invalid())?;
        Ok(Self::from_ratio(numerator, denominator))
    }

    /// Parse a decimal rate as written in `conform-rate srcFrameRate`
    /// (`"23.98"`, `"29.97"`, `"25"`).
    #[must_use]
    pub fn from_decimal_label(label: &str) -> Option<Self> {
        match label.trim() {
            "23.98" | "23.976" => Some(Self::Fps23_976),
            "24" => Some(Self::Fps24),
            "25" => Some(Self::Fps25),
            "29.97" => Some(Self::Fps29_97),
            "30" => Some(Self::Fps30),
            "47.95" | "47.952" => Some(Self::Fps47_952),
            "48" => Some(Self::Fps48),
            "50" => Some(Self::Fps50),
            "59.94" => Some(Self::Fps59_94),
            "60" => Some(Self::Fps60),
            other => other
                .parse::<u32>()
                .ok()
                .filter(|fps| *fps > 0)
                .map(|fps| Self::from_ratio(fps, 1)),
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fps23_976 => write!(f, "23.976"),
            Self::Fps24 => write!(f, "24"),
            Self::Fps25 => write!(f, "25"),
            Self::Fps29_97 => write!(f, "29.97"),
            Self::Fps30 => write!(f, "30"),
            Self::Fps47_952 => write!(f, "47.952"),
            Self::Fps48 => write!(f, "48"),
            Self::Fps50 => write!(f, "50"),
            Self::Fps59_94 => write!(f, "59.94"),
            Self::Fps60 => write!(f, "60"),
            Self::Custom {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frame_duration_maps_to_standard_rates() {
        let cases = [
            ("1001/24000s", FrameRate::Fps23_976),
            ("100/2400s", FrameRate::Fps24),
            ("1/25s", FrameRate::Fps25),
            ("1001/30000s", FrameRate::Fps29_97),
            ("1001/60000s", FrameRate::Fps59_94),
        ];
        for (duration, expected) in cases {
            let duration = Rational::parse_fcpxml(duration).unwrap();
            assert_eq!(FrameRate::from_frame_duration(duration).unwrap(), expected);
        }
    }

    #[test]
    fn unusual_duration_stays_custom() {
        let rate = FrameRate::from_frame_duration(Rational::new(1, 120)).unwrap();
        assert_eq!(
            rate,
            FrameRate::Custom {
                numerator: 120,
                denominator: 1
            }
        );
        assert_eq!(rate.nominal_fps(), 120);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(FrameRate::from_frame_duration(Rational::ZERO).is_err());
        assert!(FrameRate::from_frame_duration(Rational::new(-1, 25)).is_err());
        assert!(FrameRate::custom(0, 1).is_err());
    }

    #[test]
    fn custom_nominal_rate_handles_wide_ratios() {
        let duration = Rational::parse_fcpxml("3/4294967295s").unwrap();
        let rate = FrameRate::from_frame_duration(duration).unwrap();
        assert_eq!(rate.nominal_fps(), 1_431_655_765);
        assert_eq!(FrameRate::from_ratio(u32::MAX, 2).nominal_fps(), 2_147_483_648);
        assert_eq!(FrameRate::from_ratio(25, 0).nominal_fps(), 0);
    }

    #[test]
    fn nominal_rates_round() {
        assert_eq!(FrameRate::Fps29_97.nominal_fps(), 30);
        assert_eq!(FrameRate::Fps23_976.nominal_fps(), 24);
        assert!(FrameRate::Fps59_94.is_drop_frame_capable());
        assert!(!FrameRate::Fps25.is_drop_frame_capable());
    }

    #[test]
    fn decimal_labels() {
        assert_eq!(FrameRate::from_decimal_label("23.98"), Some(FrameRate::Fps23_976));
        assert_eq!(FrameRate::from_decimal_label("25"), Some(FrameRate::Fps25));
        assert_eq!(
            FrameRate::from_decimal_label("100"),
            Some(FrameRate::Custom {
                numerator: 100,
                denominator: 1
            })
        );
        assert_eq!(FrameRate::from_decimal_label("fast"), None);
    }
}
