//! Fixed-point money type.
//!
//! All split arithmetic happens on whole cents held in an `i64`; decimal
//! values only exist at the edges (JSON numbers, user-typed strings, display).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Largest amount accepted from the outside world, in cents.
const MAX_CENTS: i64 = 100_000_000_000_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid number format: {0}")]
    InvalidFormat(String),
    #[error("Amount cannot be negative")]
    Negative,
    #[error("Amount has more than 2 decimal places")]
    TooManyDecimals,
    #[error("Amount is too large")]
    TooLarge,
}

/// A monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert a decimal amount such as `12.5` into cents.
    ///
    /// Rejects non-finite and negative values, and values carrying more than
    /// two decimal places once float noise is discounted.
    pub fn try_from_major(value: f64) -> Result<Self, MoneyParseError> {
        if !value.is_finite() {
            return Err(MoneyParseError::InvalidFormat(value.to_string()));
        }
        if value < 0.0 {
            return Err(MoneyParseError::Negative);
        }
        let scaled = value * 100.0;
        let cents = scaled.round();
        if cents > MAX_CENTS as f64 {
            return Err(MoneyParseError::TooLarge);
        }
        // Float spacing grows with magnitude; a stray third decimal is still
        // at least a tenth of a cent away from the nearest whole cent.
        let tolerance = (scaled * f64::EPSILON * 4.0).max(1e-6);
        if (scaled - cents).abs() > tolerance {
            return Err(MoneyParseError::TooManyDecimals);
        }
        Ok(Money(cents as i64))
    }

    /// Decimal representation for JSON responses.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `None` when the sum does not fit.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Absolute distance between two amounts.
    pub fn abs_diff(self, other: Money) -> Money {
        Money((self.0 - other.0).abs())
    }

    pub fn format_with_symbol(self, currency_symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        format!("{}{}{}.{:02}", sign, currency_symbol, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol(""))
    }
}

/// Parses user-typed amounts like `"10"`, `"10.5"`, `"$1,234.56"`.
///
/// Parsing is exact: the integer and fraction digits are read separately so
/// no float rounding is involved.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        if cleaned.starts_with('-') {
            return Err(MoneyParseError::Negative);
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(MoneyParseError::InvalidFormat(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals);
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyParseError::TooLarge)?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|e| MoneyParseError::InvalidFormat(e.to_string()))? * 10,
            _ => fraction.parse().map_err(|e: std::num::ParseIntError| MoneyParseError::InvalidFormat(e.to_string()))?,
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .filter(|c| *c <= MAX_CENTS)
            .ok_or(MoneyParseError::TooLarge)?;

        Ok(Money(cents))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_decorated_amounts() {
        assert_eq!("10".parse::<Money>().unwrap(), Money::from_cents(1000));
        assert_eq!("10.5".parse::<Money>().unwrap(), Money::from_cents(1050));
        assert_eq!("$10.50".parse::<Money>().unwrap(), Money::from_cents(1050));
        assert_eq!(" $1,234.56 ".parse::<Money>().unwrap(), Money::from_cents(123456));
        assert_eq!(".75".parse::<Money>().unwrap(), Money::from_cents(75));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert_eq!("  $ ".parse::<Money>(), Err(MoneyParseError::Empty));
        assert_eq!("-5".parse::<Money>(), Err(MoneyParseError::Negative));
        assert_eq!("1.234".parse::<Money>(), Err(MoneyParseError::TooManyDecimals));
        assert!(matches!("abc".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("1.2.3".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!(".".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_try_from_major() {
        assert_eq!(Money::try_from_major(10.0).unwrap(), Money::from_cents(1000));
        assert_eq!(Money::try_from_major(0.1 + 0.2).unwrap(), Money::from_cents(30));
        assert_eq!(Money::try_from_major(33.33).unwrap(), Money::from_cents(3333));
        assert_eq!(Money::try_from_major(1.005), Err(MoneyParseError::TooManyDecimals));
        assert_eq!(Money::try_from_major(-1.0), Err(MoneyParseError::Negative));
        assert!(Money::try_from_major(f64::NAN).is_err());
        assert!(Money::try_from_major(f64::INFINITY).is_err());
    }

    #[test]
    fn test_try_from_major_large_amounts() {
        assert_eq!(
            Money::try_from_major(12_345_678_901.23).unwrap(),
            Money::from_cents(1_234_567_890_123)
        );
        assert_eq!(
            Money::try_from_major(999_999_999_999.99).unwrap(),
            Money::from_cents(99_999_999_999_999)
        );
        assert_eq!(
            Money::try_from_major(10_000_000_000.005),
            Err(MoneyParseError::TooManyDecimals)
        );
        assert_eq!(Money::try_from_major(2e12), Err(MoneyParseError::TooLarge));
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Money::from_cents(1).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(3))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::from_cents(1050).format_with_symbol("$"), "$10.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-250).format_with_symbol("$"), "-$2.50");
    }

    #[test]
    fn test_arithmetic() {
        let total: Money = [Money::from_cents(334), Money::from_cents(333), Money::from_cents(333)]
            .iter()
            .sum();
        assert_eq!(total, Money::from_cents(1000));
        assert_eq!(Money::from_cents(999).abs_diff(total), Money::from_cents(1));
        assert_eq!(total - Money::from_cents(1), Money::from_cents(999));
        assert_eq!(Money::from_cents(1000).to_major(), 10.0);
    }
}
