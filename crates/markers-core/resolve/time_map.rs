//! Piecewise linear retiming curves
//!
//! A `<timeMap>` lists control points pairing a source media time with the
//! segment-local time it plays at. Marker positions are authored in source
//! time, so resolution maps source to target.

use crate::timecode::{Rational, TimecodeError};

/// One control point of a retiming curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimePoint {
    /// Media time (`value` attribute of `<timept>`)
    pub source: Rational,
    /// Segment-local time (`time` attribute of `<timept>`)
    pub target: Rational,
}

impl TimePoint {
    #[must_use]
    pub const fn new(source: Rational, target: Rational) -> Self {
        Self { source, target }
    }
}

/// Ordered control points of a retiming curve.
///
/// Points keep document order. Reverse playback produces segments whose
/// source decreases, so lookups do not assume a sorted domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TimeMap {
    points: Vec<TimePoint>,
}

impl TimeMap {
    #[must_use]
    pub const fn new(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Map a source time to segment-local time.
    ///
    /// Interpolates linearly inside the first segment that brackets `source`
    /// and clamps to the nearest endpoint outside the curve's domain. An empty
    /// map is the identity.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::Overflow`] when interpolating leaves the
    /// representable range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use markers_core::resolve::{TimeMap, TimePoint};
    /// use markers_core::timecode::Rational;
    ///
    /// // double speed: ten seconds of media play in five
    /// let map = TimeMap::new(vec![
    ///     TimePoint::new(Rational::ZERO, Rational::ZERO),
    ///     TimePoint::new(Rational::from_integer(10), Rational::from_integer(5)),
    /// ]);
    /// assert_eq!(map.map(Rational::from_integer(4))?, Rational::from_integer(2));
    /// assert_eq!(map.map(Rational::from_integer(30))?, Rational::from_integer(5));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn map(&self, source: Rational) -> Result<Rational, TimecodeError> {
        let Some(first) = self.points.first() else {
            return Ok(source);
        };

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (low, high) = if a.source <= b.source {
                (a.source, b.source)
            } else {
                (b.source, a.source)
            };
            if source < low || source > high {
                continue;
            }
            if a.source == b.source {
                return Ok(a.target);
            }
            let progress = source
                .checked_sub(a.source)?
                .checked_div(b.source.checked_sub(a.source)?)?;
            return progress
                .checked_mul(b.target.checked_sub(a.target)?)?
                .checked_add(a.target);
        }

        // outside every segment: clamp to the endpoint nearest in source time
        let mut lowest = *first;
        let mut highest = *first;
        for point in &self.points {
            if point.source < lowest.source {
                lowest = *point;
            }
            if point.source > highest.source {
                highest = *point;
            }
        }
        if source <= lowest.source {
            Ok(lowest.target)
        } else {
            Ok(highest.target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    fn point(source: i64, target: i64) -> TimePoint {
        TimePoint::new(s(source), s(target))
    }

    #[test]
    fn empty_map_is_identity() {
        assert_eq!(TimeMap::default().map(s(7)).unwrap(), s(7));
    }

    #[test]
    fn interpolates_between_bracketing_points() {
        let map = TimeMap::new(vec![point(0, 0), point(10, 20), point(20, 25)]);
        assert_eq!(map.map(s(5)).unwrap(), s(10));
        assert_eq!(map.map(s(10)).unwrap(), s(20));
        assert_eq!(map.map(s(14)).unwrap(), s(22));
        assert_eq!(map.map(Rational::new(1, 2)).unwrap(), s(1));
    }

    #[test]
    fn clamps_outside_domain() {
        let map = TimeMap::new(vec![point(2, 0), point(12, 10)]);
        assert_eq!(map.map(s(0)).unwrap(), s(0));
        assert_eq!(map.map(s(100)).unwrap(), s(10));
    }

    #[test]
    fn handles_reverse_segments() {
        // media runs backwards from 10s to 0s over the first 5s of the clip
        let map = TimeMap::new(vec![point(10, 0), point(0, 5)]);
        assert_eq!(map.map(s(10)).unwrap(), s(0));
        assert_eq!(map.map(s(4)).unwrap(), s(3));
        assert_eq!(map.map(s(0)).unwrap(), s(5));
    }

    #[test]
    fn interpolation_overflow_is_an_error() {
        let map = TimeMap::new(vec![
            TimePoint::new(s(0), s(0)),
            TimePoint::new(
                Rational::parse_fcpxml("3/9223372036854775783s").unwrap(),
                Rational::parse_fcpxml("1/9223372036854775643s").unwrap(),
            ),
        ]);
        assert_eq!(
            map.map(Rational::parse_fcpxml("1/9223372036854775549s").unwrap()),
            Err(TimecodeError::Overflow)
        );
    }

    #[test]
    fn freeze_frame_segment_returns_first_target() {
        let map = TimeMap::new(vec![point(3, 0), point(3, 4), point(6, 7)]);
        assert_eq!(map.map(s(3)).unwrap(), s(0));
        assert_eq!(map.map(s(5)).unwrap(), s(6));
    }
}
