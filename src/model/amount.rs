//! Amount type for the numeric values carried by entries and aggregated by sections.
//!
//! An `Amount` is either a decimal number or the invalid sentinel produced by input that could
//! not be read as a number. Any sum that includes the invalid sentinel is itself invalid, so a bad
//! value shows up in the total of every enclosing section until it is corrected.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Represents how amounts should be formatted for display.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ dollar: false, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `-60000`
///  - `AmountFormat{ dollar: true, commas: false }` -> `-$60000`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountFormat {
    /// Whether a dollar sign is written in front of the number.
    #[serde(default)]
    dollar: bool,
    /// Whether commas are written as thousands separators (this also fixes two decimal places).
    #[serde(default)]
    commas: bool,
}

impl AmountFormat {
    /// The plain format: no dollar sign, no separators, the number as it was given.
    pub const PLAIN: AmountFormat = AmountFormat {
        dollar: false,
        commas: false,
    };

    pub const fn new(dollar: bool, commas: bool) -> Self {
        Self { dollar, commas }
    }

    pub fn dollar(&self) -> bool {
        self.dollar
    }

    pub fn commas(&self) -> bool {
        self.commas
    }
}

/// Represents the numeric value of an entry or the aggregate of a section.
///
/// # Examples
///
/// ```
/// # use report_tree::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,000.50").unwrap();
/// let b = Amount::from(20);
/// assert_eq!((a + b).to_string(), "1020.50");
/// ```
///
/// The invalid sentinel poisons sums:
///
/// ```
/// # use report_tree::model::Amount;
/// let bad = Amount::parse_lenient("twelve");
/// assert!(!bad.is_valid());
/// assert!(!(bad + Amount::from(5)).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    /// `None` is the invalid sentinel.
    value: Option<Decimal>,
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl Amount {
    pub const ZERO: Amount = Amount {
        value: Some(Decimal::ZERO),
    };

    /// The not-a-number value.
    pub const INVALID: Amount = Amount { value: None };

    pub const fn new(value: Decimal) -> Self {
        Self { value: Some(value) }
    }

    /// Returns the underlying decimal, or `None` for the invalid sentinel.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.value.map(|v| v.is_zero()).unwrap_or(false)
    }

    /// Parses user input the way a numeric text field does: anything that cannot be read as a
    /// number becomes `Amount::INVALID` instead of an error.
    pub fn parse_lenient(s: &str) -> Self {
        Amount::from_str(s).unwrap_or(Amount::INVALID)
    }

    /// Formats the amount using `format`. The invalid sentinel is written as `NaN`.
    pub fn formatted(&self, format: AmountFormat) -> String {
        let value = match self.value {
            Some(value) => value,
            None => return String::from("NaN"),
        };
        let (sign, num) = if value.is_sign_negative() && !value.is_zero() {
            ("-", value.abs())
        } else {
            ("", value)
        };
        let dol = if format.dollar { "$" } else { "" };
        if format.commas {
            format!(
                "{sign}{dol}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            format!("{sign}{dol}{num}")
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts plain numbers, an optional leading `$` (after the sign) and comma separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");

        let value = match Decimal::from_str(&without_commas) {
            Ok(value) => value,
            Err(e) => Decimal::from_scientific(&without_commas).map_err(|_| AmountError(e))?,
        };
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted(AmountFormat::PLAIN))
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Invalid operands and decimal overflow both produce `Amount::INVALID`.
    fn add(self, rhs: Self) -> Self::Output {
        match (self.value, rhs.value) {
            (Some(a), Some(b)) => Amount {
                value: a.checked_add(b),
            },
            _ => Amount::INVALID,
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl Serialize for Amount {
    /// Whole numbers are written as JSON integers, other values as JSON floats and the invalid
    /// sentinel as `null`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = match self.value {
            Some(value) => value,
            None => return serializer.serialize_none(),
        };
        if value.fract().is_zero() {
            if let Some(i) = value.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        match value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Ok(Amount::INVALID);
        }
        // The shortest round-trip rendering of `v` keeps `0.1` as `0.1`.
        Ok(Amount::parse_lenient(&v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount::parse_lenient(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::INVALID)
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::INVALID)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(amount("50").value(), Some(Decimal::from(50)));
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        assert_eq!(amount("$50.00").value(), Decimal::from_str("50.00").ok());
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        assert_eq!(amount("-$50.00").value(), Decimal::from_str("-50.00").ok());
    }

    #[test]
    fn test_parse_with_commas() {
        assert_eq!(
            amount("$1,234,567.89").value(),
            Decimal::from_str("1234567.89").ok()
        );
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(amount("  7  ").value(), Some(Decimal::from(7)));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(amount("1e3").value(), Some(Decimal::from(1000)));
    }

    #[test]
    fn test_parse_strict_rejects_garbage() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_parse_lenient_gives_invalid() {
        assert_eq!(Amount::parse_lenient("abc"), Amount::INVALID);
        assert_eq!(Amount::parse_lenient(""), Amount::INVALID);
        assert_eq!(Amount::parse_lenient("12"), Amount::from(12));
    }

    #[test]
    fn test_default_is_zero() {
        assert!(Amount::default().is_zero());
        assert!(Amount::default().is_valid());
    }

    #[test]
    fn test_add() {
        assert_eq!(Amount::from(5) + Amount::from(10), Amount::from(15));
        assert_eq!(amount("0.1") + amount("0.2"), amount("0.3"));
    }

    #[test]
    fn test_invalid_poisons_sum() {
        let total: Amount = vec![Amount::from(1), Amount::INVALID, Amount::from(2)]
            .into_iter()
            .sum();
        assert!(!total.is_valid());
    }

    #[test]
    fn test_overflow_is_invalid() {
        let max = Amount::new(Decimal::MAX);
        assert!(!(max + Amount::from(1)).is_valid());
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Amount = Vec::<Amount>::new().iter().sum();
        assert_eq!(total, Amount::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from(15).to_string(), "15");
        assert_eq!(amount("-22.5").to_string(), "-22.5");
        assert_eq!(Amount::INVALID.to_string(), "NaN");
    }

    #[test]
    fn test_formatted_dollar_commas() {
        let format = AmountFormat::new(true, true);
        assert_eq!(amount("-60000").formatted(format), "-$60,000.00");
        assert_eq!(Amount::ZERO.formatted(format), "$0.00");
    }

    #[test]
    fn test_formatted_dollar_only() {
        let format = AmountFormat::new(true, false);
        assert_eq!(amount("-60000").formatted(format), "-$60000");
    }

    #[test]
    fn test_formatted_invalid() {
        assert_eq!(Amount::INVALID.formatted(AmountFormat::new(true, true)), "NaN");
    }

    #[test]
    fn test_serialize_integer() {
        assert_eq!(serde_json::to_string(&Amount::from(120)).unwrap(), "120");
    }

    #[test]
    fn test_serialize_fraction() {
        assert_eq!(serde_json::to_string(&amount("22.5")).unwrap(), "22.5");
    }

    #[test]
    fn test_serialize_invalid_as_null() {
        assert_eq!(serde_json::to_string(&Amount::INVALID).unwrap(), "null");
    }

    #[test]
    fn test_deserialize_number() {
        let a: Amount = serde_json::from_str("140").unwrap();
        assert_eq!(a, Amount::from(140));
        let b: Amount = serde_json::from_str("-3").unwrap();
        assert_eq!(b, Amount::from(-3));
        let c: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(c, amount("0.1"));
    }

    #[test]
    fn test_deserialize_string() {
        let a: Amount = serde_json::from_str("\"$1,000\"").unwrap();
        assert_eq!(a, Amount::from(1000));
        let b: Amount = serde_json::from_str("\"oops\"").unwrap();
        assert_eq!(b, Amount::INVALID);
    }

    #[test]
    fn test_deserialize_null() {
        let a: Amount = serde_json::from_str("null").unwrap();
        assert_eq!(a, Amount::INVALID);
    }
}
