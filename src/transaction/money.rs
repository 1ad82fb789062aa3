//! Validated amounts of money and the currency codes they are labelled with.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of digits after the decimal point that amounts are kept to.
const AMOUNT_SCALE: u32 = 2;

/// Amounts must be strictly less than this, i.e. at most ten digits in total.
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// A non-negative amount of money with exactly two digits after the decimal point.
///
/// Whether the money was earned or spent is given by the transaction type, not
/// the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, AMOUNT_SCALE));

    /// Validate `value` and normalize it to two decimal places, e.g. `100.5` becomes `100.50`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is negative, has more than two
    /// significant digits after the decimal point, or is 100,000,000 or more.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidAmount(format!(
                "{value} is negative, use the transaction type to record an expense"
            )));
        }

        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(Error::InvalidAmount(format!(
                "{value} has more than {AMOUNT_SCALE} decimal places"
            )));
        }

        if value >= AMOUNT_LIMIT {
            return Err(Error::InvalidAmount(format!(
                "{value} must be less than {AMOUNT_LIMIT}"
            )));
        }

        let mut value = value.abs();
        value.rescale(AMOUNT_SCALE);

        Ok(Self(value))
    }

    /// Create an amount from a whole number of cents, as stored in the database.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, AMOUNT_SCALE))
    }

    /// The amount in cents.
    pub fn cents(&self) -> i64 {
        // Amounts are below 10^10 cents, well within range of an i64.
        self.0.mantissa() as i64
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A three letter currency code such as "USD" or "NZD".
///
/// The code is only a label, amounts in different currencies are never converted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a currency code, converting it to upper case.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCurrency] if `code` is not exactly three ASCII letters.
    pub fn new(code: &str) -> Result<Self, Error> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(Error::InvalidCurrency(code.to_owned()))
        }
    }

    /// Create a currency code without validation, e.g. for values read from the database.
    pub fn new_unchecked(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("USD".to_owned())
    }
}

impl TryFrom<String> for Currency {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod currency_tests {
    use crate::{Error, transaction::Currency};

    #[test]
    fn upper_cases_code() {
        assert_eq!(Currency::new("nzd").unwrap().as_ref(), "NZD");
    }

    #[test]
    fn defaults_to_usd() {
        assert_eq!(Currency::default().as_ref(), "USD");
    }

    #[test]
    fn rejects_invalid_codes() {
        for invalid in ["", "US", "USDT", "U5D", "€€€"] {
            assert_eq!(
                Currency::new(invalid),
                Err(Error::InvalidCurrency(invalid.to_owned())),
                "want {invalid:?} to be rejected"
            );
        }
    }
}
