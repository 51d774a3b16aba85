//! Monetary values in smallest currency units.
//!
//! Amounts are integral minor units (e.g. cents), which keeps the
//! double-entry balance check exact: "within the smallest currency unit"
//! collapses to an exact zero under integer arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// ISO 4217 style three-letter currency code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub fn new(code: &str) -> DomainResult<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::invalid_value(format!(
                "currency code '{code}' must be three letters"
            )));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Constructed from ASCII letters only.
        core::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

/// Monetary amount: minor units plus currency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in smallest currency units (e.g. cents). Sign carries the
    /// debit/credit direction at the posting layer.
    pub minor: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub fn negated(self) -> Self {
        Self {
            minor: -self.minor,
            ..self
        }
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        if self.currency != other.currency {
            return Err(DomainError::invalid_value(format!(
                "currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or_else(|| DomainError::invalid_value("amount overflow"))?;
        Ok(Money {
            minor,
            currency: self.currency,
        })
    }

    pub fn checked_mul(self, quantity: u64) -> DomainResult<Money> {
        let q = i64::try_from(quantity)
            .map_err(|_| DomainError::invalid_value("quantity overflow"))?;
        let minor = self
            .minor
            .checked_mul(q)
            .ok_or_else(|| DomainError::invalid_value("amount overflow"))?;
        Ok(Money {
            minor,
            currency: self.currency,
        })
    }

    /// Convert into another currency at the given rate.
    ///
    /// Rounds half away from zero to the smallest unit of the target currency.
    pub fn convert(self, rate: Rate, into: Currency) -> Money {
        Money {
            minor: rate.apply(self.minor),
            currency: into,
        }
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.minor, self.currency)
    }
}

/// Exchange rate as a fixed-point multiplier in millionths.
///
/// `Rate::from_millionths(1_250_000)` is a rate of 1.25. Rate lookup itself
/// is an external collaborator's concern; callers pass the rate in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(i64);

impl Rate {
    pub const UNIT: Rate = Rate(1_000_000);

    pub fn from_millionths(millionths: i64) -> Self {
        Self(millionths)
    }

    pub fn millionths(&self) -> i64 {
        self.0
    }

    /// Midpoint of two rates (buying/selling average).
    pub fn average(self, other: Rate) -> Rate {
        Rate((self.0 + other.0) / 2)
    }

    fn apply(self, minor: i64) -> i64 {
        let scaled = i128::from(minor) * i128::from(self.0);
        let half = 500_000i128;
        let rounded = if scaled >= 0 {
            (scaled + half) / 1_000_000
        } else {
            (scaled - half) / 1_000_000
        };
        rounded as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn inr() -> Currency {
        Currency::new("inr").unwrap()
    }

    #[test]
    fn currency_codes_are_uppercased_and_checked() {
        assert_eq!(inr().as_str(), "INR");
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("U5D").is_err());
    }

    #[test]
    fn addition_requires_matching_currency() {
        let a = Money::new(100, usd());
        let b = Money::new(50, inr());
        assert!(matches!(
            a.checked_add(b),
            Err(DomainError::InvalidValue(_))
        ));
        assert_eq!(a.checked_add(Money::new(-100, usd())).unwrap().minor, 0);
    }

    #[test]
    fn conversion_rounds_half_away_from_zero() {
        let rate = Rate::from_millionths(1_250_000); // 1.25
        assert_eq!(Money::new(100, usd()).convert(rate, inr()).minor, 125);
        // 3 * 1.25 = 3.75 -> 4
        assert_eq!(Money::new(3, usd()).convert(rate, inr()).minor, 4);
        assert_eq!(Money::new(-3, usd()).convert(rate, inr()).minor, -4);
    }

    #[test]
    fn rate_average_is_midpoint() {
        let buy = Rate::from_millionths(1_000_000);
        let sell = Rate::from_millionths(1_500_000);
        assert_eq!(buy.average(sell).millionths(), 1_250_000);
    }
}
