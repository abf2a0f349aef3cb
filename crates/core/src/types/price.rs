//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are [`Decimal`] throughout; nothing is rounded until a value is
//! formatted for display.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "€19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol used when formatting prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Errors that can occur when constructing a [`VatRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VatRateError {
    /// The rate is below zero.
    #[error("VAT rate cannot be negative (got {0})")]
    Negative(Decimal),
    /// The rate is above [`VatRate::MAX_PERCENT`].
    #[error("VAT rate cannot exceed {max}% (got {0})", max = VatRate::MAX_PERCENT)]
    TooHigh(Decimal),
    /// The input is not a decimal number.
    #[error("invalid VAT rate: {0}")]
    Invalid(String),
}

/// A value-added tax rate expressed as a percentage.
///
/// `21` means 21%, not 0.21. Applying the rate multiplies a subtotal by
/// `1 + rate / 100`.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopkeep_core::VatRate;
///
/// let rate = VatRate::new(Decimal::from(21)).unwrap();
/// assert_eq!(rate.apply(Decimal::from(600)), Decimal::from(726));
/// assert_eq!(VatRate::default().percent(), Decimal::from(14));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct VatRate(Decimal);

impl VatRate {
    /// Rate used when none is configured.
    pub const DEFAULT_PERCENT: i64 = 14;

    /// Highest accepted rate. Keeps gross totals within `Decimal` range for
    /// any persisted price and quantity.
    pub const MAX_PERCENT: i64 = 100;

    /// Create a VAT rate from a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`VatRateError::Negative`] if `percent` is below zero and
    /// [`VatRateError::TooHigh`] if it is above [`Self::MAX_PERCENT`].
    pub fn new(percent: Decimal) -> Result<Self, VatRateError> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(VatRateError::Negative(percent));
        }
        if percent > Decimal::from(Self::MAX_PERCENT) {
            return Err(VatRateError::TooHigh(percent));
        }
        Ok(Self(percent))
    }

    /// The rate as a percentage.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Multiplier applied to a net amount (`1 + percent / 100`).
    #[must_use]
    pub fn multiplier(&self) -> Decimal {
        Decimal::ONE + self.0 / Decimal::ONE_HUNDRED
    }

    /// Gross amount for a net `amount`.
    #[must_use]
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.multiplier()
    }
}

impl Default for VatRate {
    fn default() -> Self {
        Self(Decimal::from(Self::DEFAULT_PERCENT))
    }
}

impl TryFrom<Decimal> for VatRate {
    type Error = VatRateError;

    fn try_from(percent: Decimal) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<VatRate> for Decimal {
    fn from(rate: VatRate) -> Self {
        rate.0
    }
}

impl FromStr for VatRate {
    type Err = VatRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let percent = s
            .trim()
            .trim_end_matches('%')
            .parse::<Decimal>()
            .map_err(|_| VatRateError::Invalid(s.to_owned()))?;
        Self::new(percent)
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
