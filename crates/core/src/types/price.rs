//! Type-safe money representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyCodeError {
    /// The input is not exactly three characters long.
    #[error("currency code must be 3 letters (got {0:?})")]
    InvalidLength(String),
    /// The input contains something other than ASCII letters.
    #[error("currency code must contain only ASCII letters (got {0:?})")]
    InvalidCharacters(String),
}

/// An ISO 4217 currency code such as `USD` or `JOD`.
///
/// The storefront supports whatever currencies the rate providers know
/// about, so this is an open set rather than an enum. Codes are normalised
/// to upper case on parse.
///
/// ```
/// use bazaar_core::CurrencyCode;
///
/// assert_eq!(CurrencyCode::parse("jod").unwrap().as_str(), "JOD");
/// assert!(CurrencyCode::parse("JO").is_err());
/// assert!(CurrencyCode::parse("J0D").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// US dollar, the fallback currency when nothing better is known.
    pub const USD: Self = Self(*b"USD");

    /// Parse a currency code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly three ASCII letters.
    pub fn parse(s: &str) -> Result<Self, CurrencyCodeError> {
        let s = s.trim();
        let bytes: [u8; 3] = s
            .as_bytes()
            .try_into()
            .map_err(|_| CurrencyCodeError::InvalidLength(s.to_owned()))?;

        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(CurrencyCodeError::InvalidCharacters(s.to_owned()));
        }

        Ok(Self(bytes.map(|b| b.to_ascii_uppercase())))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        core::str::from_utf8(&self.0).unwrap_or("USD")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An amount of money in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Convert into `target` using `rate` (units of `target` per unit of
    /// this currency). The result is rounded to two decimal places.
    #[must_use]
    pub fn convert(&self, rate: Decimal, target: CurrencyCode) -> Self {
        let amount = (self.amount * rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self::new(amount, target)
    }

    /// Format for display, e.g. `"12.50 JOD"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency_code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_case() {
        let code = CurrencyCode::parse(" eur ").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(code.to_string(), "EUR");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            CurrencyCode::parse("DOLLAR"),
            Err(CurrencyCodeError::InvalidLength(_))
        ));
        assert!(matches!(
            CurrencyCode::parse(""),
            Err(CurrencyCodeError::InvalidLength(_))
        ));
        assert!(matches!(
            CurrencyCode::parse("U$D"),
            Err(CurrencyCodeError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn test_currency_serde() {
        let code: CurrencyCode = serde_json::from_str("\"jod\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"JOD\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"jordan\"").is_err());
    }

    #[test]
    fn test_convert_rounds_to_cents() {
        let price = Money::new(Decimal::new(1999, 2), CurrencyCode::USD);
        let jod = CurrencyCode::parse("JOD").unwrap();
        let converted = price.convert(Decimal::new(709, 3), jod);
        // 19.99 * 0.709 = 14.17291
        assert_eq!(converted.amount, Decimal::new(1417, 2));
        assert_eq!(converted.currency_code, jod);
    }

    #[test]
    fn test_display() {
        let price = Money::new(Decimal::new(125, 1), CurrencyCode::USD);
        assert_eq!(price.display(), "12.50 USD");
    }
}
