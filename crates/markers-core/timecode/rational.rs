//! Exact rational seconds for frame-accurate timeline arithmetic
//!
//! FCPXML expresses every time attribute as a fraction of seconds
//! (`"1001/30000s"`, `"3600s"`). Positions are composed across many nested
//! transforms, so all arithmetic stays exact; floating point only appears at
//! the display boundary.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};

use super::TimecodeError;

/// Largest magnitude a reduced numerator or denominator may take.
///
/// With both parts within 2^63, any cross product of two values fits an
/// `i128`, so comparison and display never overflow.
const MAGNITUDE_LIMIT: u128 = 1 << 63;

/// A normalised fraction with a positive denominator.
///
/// Numerator and denominator stay within [`MAGNITUDE_LIMIT`]. The operators
/// panic when a result leaves that range, like integer overflow does; the
/// `checked_*` methods report [`TimecodeError::Overflow`] instead and are
/// what every computation on document values goes through.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    /// Zero seconds.
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// One second.
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Create a new rational number.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero. Use [`Rational::try_new`] for untrusted input.
    #[must_use]
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        // i64 parts are always within the magnitude limit
        Self::reduce(i128::from(num), i128::from(den)).unwrap_or(Self::ZERO)
    }

    /// Create a rational number, rejecting a zero denominator.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::ZeroDenominator`] when `den == 0`.
    pub fn try_new(num: i64, den: i64) -> Result<Self, TimecodeError> {
        Self::reduce(i128::from(num), i128::from(den))
    }

    /// Create a rational from a whole number.
    #[must_use]
    pub const fn from_integer(n: i64) -> Self {
        Self {
            num: n as i128,
            den: 1,
        }
    }

    fn reduce(num: i128, den: i128) -> Result<Self, TimecodeError> {
        if den == 0 {
            return Err(TimecodeError::ZeroDenominator);
        }
        if num == 0 {
            return Ok(Self::ZERO);
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs());
        let (num_mag, den_mag) = (num.unsigned_abs() / g, den.unsigned_abs() / g);
        if num_mag > MAGNITUDE_LIMIT || den_mag > MAGNITUDE_LIMIT {
            return Err(TimecodeError::Overflow);
        }
        let negative = (num < 0) != (den < 0);
        let num = i128::try_from(num_mag).map_err(|_| TimecodeError::Overflow)?;
        let den = i128::try_from(den_mag).map_err(|_| TimecodeError::Overflow)?;
        Ok(Self {
            num: if negative { -num } else { num },
            den,
        })
    }

    /// Numerator of the reduced fraction.
    #[must_use]
    pub const fn numer(&self) -> i128 {
        self.num
    }

    /// Denominator of the reduced fraction (always positive).
    #[must_use]
    pub const fn denom(&self) -> i128 {
        self.den
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.num > 0
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(&self) -> Self {
        Self {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Largest integer less than or equal to this value.
    #[must_use]
    pub const fn floor(&self) -> i128 {
        self.num.div_euclid(self.den)
    }

    /// Fractional part, always in `[0, 1)`.
    #[must_use]
    pub const fn fract(&self) -> Self {
        // num and den are coprime, so the remainder is too
        Self {
            num: self.num.rem_euclid(self.den),
            den: self.den,
        }
    }

    /// Lossy conversion for display and logging.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Parse an FCPXML time attribute.
    ///
    /// Accepts `"<numerator>/<denominator>s"` and `"<N>s"`. The trailing `s`
    /// is required by the format but tolerated when missing.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::InvalidTime`] if the value is not a
    /// well-formed rational, or has a zero denominator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markers_core::timecode::Rational;
    ///
    /// assert_eq!(Rational::parse_fcpxml("1001/30000s")?, Rational::new(1001, 30000));
    /// assert_eq!(Rational::parse_fcpxml("3600s")?, Rational::from_integer(3600));
    /// assert!(Rational::parse_fcpxml("abc").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_fcpxml(value: &str) -> Result<Self, TimecodeError> {
        let trimmed = value.trim();
        let body = trimmed.strip_suffix('s').unwrap_or(trimmed);
        let invalid = |reason: &str| TimecodeError::InvalidTime {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if body.is_empty() {
            return Err(invalid("empty time value"));
        }

        let (num_str, den_str) = body.split_once('/').unwrap_or((body, "1"));
        let num: i64 = num_str
            .trim()
            .parse()
            .map_err(|_| invalid("numerator is not an integer"))?;
        let den: i64 = den_str
            .trim()
            .parse()
            .map_err(|_| invalid("denominator is not an integer"))?;

        if den == 0 {
            return Err(invalid("zero denominator"));
        }
        Self::reduce(i128::from(num), i128::from(den))
    }

    /// Exact sum.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::Overflow`] when the reduced result leaves the
    /// representable range.
    pub fn checked_add(self, rhs: Self) -> Result<Self, TimecodeError> {
        let num = self
            .num
            .checked_mul(rhs.den)
            .zip(rhs.num.checked_mul(self.den))
            .and_then(|(left, right)| left.checked_add(right))
            .ok_or(TimecodeError::Overflow)?;
        let den = self
            .den
            .checked_mul(rhs.den)
            .ok_or(TimecodeError::Overflow)?;
        Self::reduce(num, den)
    }

    /// Exact difference.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::Overflow`] when the reduced result leaves the
    /// representable range.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, TimecodeError> {
        self.checked_add(-rhs)
    }

    /// Exact product.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::Overflow`] when the reduced result leaves the
    /// representable range.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, TimecodeError> {
        let num = self
            .num
            .checked_mul(rhs.num)
            .ok_or(TimecodeError::Overflow)?;
        let den = self
            .den
            .checked_mul(rhs.den)
            .ok_or(TimecodeError::Overflow)?;
        Self::reduce(num, den)
    }

    /// Exact quotient.
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::DivisionByZero`] for a zero divisor and
    /// [`TimecodeError::Overflow`] when the result leaves the representable
    /// range.
    pub fn checked_div(self, rhs: Self) -> Result<Self, TimecodeError> {
        if rhs.num == 0 {
            return Err(TimecodeError::DivisionByZero);
        }
        let num = self
            .num
            .checked_mul(rhs.den)
            .ok_or(TimecodeError::Overflow)?;
        let den = self
            .den
            .checked_mul(rhs.num)
            .ok_or(TimecodeError::Overflow)?;
        Self::reduce(num, den)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.max(1)
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

/// Formats in FCPXML notation (`"1001/30000s"`, `"5s"`).
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}s", self.num)
        } else {
            write!(f, "{}/{}s", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // parts are within 2^63, so both cross products fit i128
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

/// # Panics
///
/// The operators panic when the exact result leaves the representable range.
impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .unwrap_or_else(|err| panic!("rational addition failed: {err}"))
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .unwrap_or_else(|err| panic!("rational subtraction failed: {err}"))
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs)
            .unwrap_or_else(|err| panic!("rational multiplication failed: {err}"))
    }
}

impl Div for Rational {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when dividing by zero.
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs)
            .unwrap_or_else(|err| panic!("rational division failed: {err}"))
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_integer(i64::from(n))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rational {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
