//! Decimal arithmetic under an explicit precision context.
//!
//! Every operation is performed by a [`PrecisionContext`] that carries the
//! number of significant digits to round to. Nothing here reads an ambient
//! rounding configuration, so changing the working precision mid-run is just
//! a matter of building a new context.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};
use thiserror::Error;

use crate::domain::errors::{EngineError, EngineResult};

/// Rounding applied when a result carries more digits than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round to nearest, ties to the even neighbour
    #[default]
    HalfEven,
    /// Truncate toward zero
    Down,
}

/// Error returned when a string is not a plain decimal number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseDecimalError {
    #[error("Cannot parse an empty string as a decimal")]
    Empty,

    #[error("Invalid character {0:?} in decimal literal")]
    InvalidCharacter(char),

    #[error("Decimal literal has no digits")]
    NoDigits,
}

/// Signed arbitrary-precision decimal: `coefficient * 10^exponent`.
///
/// Values are immutable; arithmetic goes through a [`PrecisionContext`].
/// Equality and ordering compare numeric value, so `3.10 == 3.1`.
#[derive(Debug, Clone)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i64,
}

impl Decimal {
    /// Exact zero.
    pub fn zero() -> Self {
        Self {
            coefficient: BigInt::zero(),
            exponent: 0,
        }
    }

    /// Exact power of ten, `10^exponent`.
    pub fn power_of_ten(exponent: i64) -> Self {
        Self {
            coefficient: BigInt::one(),
            exponent,
        }
    }

    /// Exact `units * 10^exponent`.
    pub fn scaled(units: u64, exponent: i64) -> Self {
        Self {
            coefficient: BigInt::from(units),
            exponent,
        }
    }

    /// Whether this value is zero.
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// Whether this value is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.coefficient.sign() == Sign::Minus
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            coefficient: self.coefficient.abs(),
            exponent: self.exponent,
        }
    }

    fn negated(&self) -> Self {
        Self {
            coefficient: -self.coefficient.clone(),
            exponent: self.exponent,
        }
    }

    /// Number of significant digits in the coefficient.
    pub fn significant_digits(&self) -> u64 {
        digit_count(self.coefficient.magnitude())
    }

    /// Re-round to exactly `digits` significant digits.
    ///
    /// A coefficient shorter than `digits` is padded with trailing zeros, so
    /// the rendered string always shows the requested number of digits.
    pub fn to_precision(&self, digits: u64, rounding: Rounding) -> Self {
        let rounded = round(self.coefficient.clone(), self.exponent, digits, rounding);
        if rounded.is_zero() {
            return rounded;
        }

        let length = rounded.significant_digits();
        if length >= digits {
            return rounded;
        }

        let pad = digits - length;
        Self {
            coefficient: rounded.coefficient * BigInt::from(pow10(pad)),
            exponent: rounded.exponent - pad as i64,
        }
    }

    /// Leading `digits` significant digits, truncated, rendered as a string.
    pub fn preview(&self, digits: u64) -> String {
        self.to_precision(digits.max(1), Rounding::Down).to_string()
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self {
            coefficient: BigInt::from(value),
            exponent: 0,
        }
    }
}

impl From<u128> for Decimal {
    fn from(value: u128) -> Self {
        Self {
            coefficient: BigInt::from(value),
            exponent: 0,
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = (self.coefficient.sign(), other.coefficient.sign());
        if left != right {
            return sign_rank(left).cmp(&sign_rank(right));
        }
        if left == Sign::NoSign {
            return Ordering::Equal;
        }
        let (a, b, _) = aligned(self, other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }

        let digits = self.coefficient.magnitude().to_string();
        if self.exponent >= 0 {
            f.write_str(&digits)?;
            return f.write_str(&"0".repeat(self.exponent as usize));
        }

        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{integer}.{fraction}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseDecimalError::Empty);
        }

        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(ParseDecimalError::NoDigits);
        }
        if let Some(bad) = integer
            .chars()
            .chain(fraction.chars())
            .find(|c| !c.is_ascii_digit())
        {
            return Err(ParseDecimalError::InvalidCharacter(bad));
        }

        let joined = format!("{integer}{fraction}");
        let magnitude =
            BigUint::parse_bytes(joined.as_bytes(), 10).ok_or(ParseDecimalError::NoDigits)?;
        let sign = if magnitude.is_zero() {
            Sign::NoSign
        } else if negative {
            Sign::Minus
        } else {
            Sign::Plus
        };

        Ok(Self {
            coefficient: BigInt::from_biguint(sign, magnitude),
            exponent: -(fraction.len() as i64),
        })
    }
}

/// Arithmetic context carrying a fixed number of significant digits.
///
/// Every result is rounded half-even to [`PrecisionContext::digits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionContext {
    digits: u64,
}

impl PrecisionContext {
    /// Context rounding to `digits` significant digits.
    pub fn new(digits: u64) -> EngineResult<Self> {
        if digits == 0 {
            return Err(EngineError::InvalidPrecision(digits));
        }
        Ok(Self { digits })
    }

    /// Context for a working precision plus guard digits.
    pub fn configure(working_precision: u64, guard_digits: u64) -> EngineResult<Self> {
        if working_precision == 0 {
            return Err(EngineError::InvalidPrecision(working_precision));
        }
        Self::new(working_precision + guard_digits)
    }

    /// Significant digits carried by this context.
    pub fn digits(&self) -> u64 {
        self.digits
    }

    /// Termination threshold for series summed under this context: `10^-digits`.
    pub fn threshold(&self) -> Decimal {
        Decimal::power_of_ten(-(self.digits as i64))
    }

    /// Round an existing value to this context.
    pub fn plus(&self, value: &Decimal) -> Decimal {
        round(value.coefficient.clone(), value.exponent, self.digits, Rounding::HalfEven)
    }

    pub fn add(&self, a: &Decimal, b: &Decimal) -> Decimal {
        if b.is_zero() {
            return self.plus(a);
        }
        if a.is_zero() {
            return self.plus(b);
        }
        let (left, right, exponent) = aligned(a, b);
        round(left + right, exponent, self.digits, Rounding::HalfEven)
    }

    pub fn sub(&self, a: &Decimal, b: &Decimal) -> Decimal {
        self.add(a, &b.negated())
    }

    pub fn mul(&self, a: &Decimal, b: &Decimal) -> Decimal {
        round(
            &a.coefficient * &b.coefficient,
            a.exponent + b.exponent,
            self.digits,
            Rounding::HalfEven,
        )
    }

    /// Correctly rounded quotient.
    pub fn div(&self, dividend: &Decimal, divisor: &Decimal) -> EngineResult<Decimal> {
        if divisor.is_zero() {
            return Err(EngineError::DivisionByZero);
        }
        if dividend.is_zero() {
            return Ok(Decimal::zero());
        }

        let sign = dividend.coefficient.sign() * divisor.coefficient.sign();
        let numerator = dividend.coefficient.magnitude();
        let denominator = divisor.coefficient.magnitude();

        // Scale so the integer quotient carries at least digits + 1 digits.
        let shift = (self.digits + 1 + digit_count(denominator))
            .saturating_sub(digit_count(numerator));
        let scaled = numerator * pow10(shift);
        let mut quotient = &scaled / denominator;
        let mut exponent = dividend.exponent - divisor.exponent - shift as i64;

        // Sticky digit: a non-zero remainder must break rounding ties upward.
        if !(scaled % denominator).is_zero() {
            quotient = quotient * 10u32 + 1u32;
            exponent -= 1;
        }

        Ok(round(
            BigInt::from_biguint(sign, quotient),
            exponent,
            self.digits,
            Rounding::HalfEven,
        ))
    }
}

const fn sign_rank(sign: Sign) -> i8 {
    match sign {
        Sign::Minus => -1,
        Sign::NoSign => 0,
        Sign::Plus => 1,
    }
}

fn pow10(exponent: u64) -> BigUint {
    num_traits::pow(BigUint::from(10u32), exponent as usize)
}

/// Number of decimal digits in `n` (zero counts as one digit).
fn digit_count(n: &BigUint) -> u64 {
    if n.is_zero() {
        return 1;
    }

    // 2^(bits-1) <= n, so this estimate never overshoots by more than one.
    let mut exponent = ((n.bits() - 1) as f64 * std::f64::consts::LOG10_2) as u64;
    let mut lower = pow10(exponent);
    while exponent > 0 && n < &lower {
        exponent -= 1;
        lower = pow10(exponent);
    }
    loop {
        let upper = &lower * 10u32;
        if n < &upper {
            return exponent + 1;
        }
        exponent += 1;
        lower = upper;
    }
}

fn aligned(a: &Decimal, b: &Decimal) -> (BigInt, BigInt, i64) {
    let exponent = a.exponent.min(b.exponent);
    (
        rescale(&a.coefficient, a.exponent - exponent),
        rescale(&b.coefficient, b.exponent - exponent),
        exponent,
    )
}

fn rescale(coefficient: &BigInt, shift: i64) -> BigInt {
    if shift == 0 || coefficient.is_zero() {
        coefficient.clone()
    } else {
        coefficient * BigInt::from(pow10(shift as u64))
    }
}

fn round(coefficient: BigInt, exponent: i64, digits: u64, rounding: Rounding) -> Decimal {
    let (sign, magnitude) = coefficient.into_parts();
    let length = digit_count(&magnitude);
    if length <= digits {
        return Decimal {
            coefficient: BigInt::from_biguint(sign, magnitude),
            exponent,
        };
    }

    let dropped = length - digits;
    let divisor = pow10(dropped);
    let mut kept = &magnitude / &divisor;
    let remainder = magnitude % &divisor;
    let mut exponent = exponent + dropped as i64;

    let round_up = match rounding {
        Rounding::Down => false,
        Rounding::HalfEven => match (remainder * 2u32).cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => (&kept % 2u32).is_one(),
        },
    };

    if round_up {
        kept += 1u32;
        if digit_count(&kept) > digits {
            kept /= 10u32;
            exponent += 1;
        }
    }

    Decimal {
        coefficient: BigInt::from_biguint(sign, kept),
        exponent,
    }
}
