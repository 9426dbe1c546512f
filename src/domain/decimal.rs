//! Fixed-point amount type backed by rust_decimal.
//!
//! Every arithmetic result is rounded to exactly eight fractional digits
//! before it is stored or compared, so rounding error never accumulates
//! across thousands of partial lot consumptions.

use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by every stored amount.
pub const ASSET_DECIMALS: u32 = 8;

/// 1 RUNE == 100_000_000 tor; likewise sats to BTC, etc.
pub const BASE_OFFSET: i64 = 100_000_000;

/// Fixed-point decimal amount, always held at eight fractional digits.
///
/// Backed by rust_decimal to avoid floating-point drift. Serializes to a
/// JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FixedAmount(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl FixedAmount {
    /// Round an arbitrary decimal into the fixed eight-place representation.
    pub fn new(value: RustDecimal) -> Self {
        FixedAmount(value.round_dp_with_strategy(
            ASSET_DECIMALS,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Convert a raw minor-unit amount (tor, sats, ...) into asset units.
    pub fn from_minor_units(minor: i64) -> Self {
        Self::new(RustDecimal::from(minor) / RustDecimal::from(BASE_OFFSET))
    }

    /// Parse from a decimal string, rounding to eight places.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Self::new)
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        FixedAmount(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        FixedAmount(self.0.abs())
    }

    /// `self * (numerator / denominator)`.
    ///
    /// The quotient is held unrounded only long enough to multiply back
    /// out; the product is rounded before it is returned, so a
    /// proportional lot split loses at most one unit of the last decimal
    /// place.
    pub fn mul_fraction(&self, numerator: FixedAmount, denominator: FixedAmount) -> Self {
        Self::new(self.0 * numerator.0 / denominator.0)
    }

    /// Format without exponent notation and without trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// Get the underlying rust_decimal value.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }
}

impl fmt::Display for FixedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for FixedAmount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<RustDecimal> for FixedAmount {
    fn from(value: RustDecimal) -> Self {
        FixedAmount::new(value)
    }
}

impl std::ops::Add for FixedAmount {
    type Output = FixedAmount;

    fn add(self, rhs: FixedAmount) -> FixedAmount {
        FixedAmount::new(self.0 + rhs.0)
    }
}

impl std::ops::Sub for FixedAmount {
    type Output = FixedAmount;

    fn sub(self, rhs: FixedAmount) -> FixedAmount {
        FixedAmount::new(self.0 - rhs.0)
    }
}

impl std::ops::Mul for FixedAmount {
    type Output = FixedAmount;

    fn mul(self, rhs: FixedAmount) -> FixedAmount {
        FixedAmount::new(self.0 * rhs.0)
    }
}

impl std::ops::Div for FixedAmount {
    type Output = FixedAmount;

    fn div(self, rhs: FixedAmount) -> FixedAmount {
        FixedAmount::new(self.0 / rhs.0)
    }
}

impl std::ops::Neg for FixedAmount {
    type Output = FixedAmount;

    fn neg(self) -> FixedAmount {
        FixedAmount(-self.0)
    }
}
