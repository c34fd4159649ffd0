//! Value Objects for the storefront

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }

    /// Generated SKU for products created without one.
    pub fn generate() -> Self { Self(format!("SKU-{:08}", rand::thread_rng().gen_range(0..100_000_000u32))) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("SKU empty")]
    Empty,
    #[error("SKU longer than {} characters", Sku::MAX_LEN)]
    TooLong,
}

/// Money in integer minor units (cents).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: i64, currency: String }

impl Money {
    pub fn new(amount: i64, currency: &str) -> Self { Self { amount, currency: currency.to_uppercase() } }
    pub fn usd(amount: i64) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(0, currency) }
    pub fn amount(&self) -> i64 { self.amount }
    pub fn currency(&self) -> &str { &self.currency }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(i64::from(qty)).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }

    /// Amount after taking `percent` off, rounded half-up to the nearest minor unit.
    pub fn percent_off(&self, percent: u8) -> Money {
        let kept = i128::from(self.amount) * i128::from(100 - percent.min(100));
        let rounded = (kept + 50).div_euclid(100);
        Money::new(rounded as i64, &self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Currency mismatch")]
    CurrencyMismatch,
    #[error("Amount overflow")]
    Overflow,
}

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    pub fn subtract(&self, other: u32) -> Option<Self> { self.0.checked_sub(other).map(Self) }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

/// URL slug: lowercase alphanumerics, other runs collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() { slug.push('-'); }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku() { let sku = Sku::new(" prod-001 ").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }

    #[test]
    fn test_sku_rejects_blank_and_long() {
        assert_eq!(Sku::new("   "), Err(SkuError::Empty));
        assert_eq!(Sku::new("x".repeat(51)), Err(SkuError::TooLong));
    }

    #[test]
    fn test_sku_length_counts_characters() {
        assert_eq!(Sku::new("é".repeat(30)).unwrap().as_str(), "É".repeat(30));
        assert!(Sku::new("É".repeat(50)).is_ok());
        assert_eq!(Sku::new("É".repeat(51)), Err(SkuError::TooLong));
    }

    #[test]
    fn test_generated_sku_is_valid() {
        let sku = Sku::generate();
        assert!(sku.as_str().starts_with("SKU-"));
        assert_eq!(sku.as_str().len(), 12);
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(10_000);
        let b = Money::usd(5_000);
        assert_eq!(a.add(&b).unwrap().amount(), 15_000);
        assert_eq!(a.add(&Money::new(1, "EUR")), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn test_money_percent_off_rounds() {
        assert_eq!(Money::usd(1999).percent_off(25).amount(), 1499);
        assert_eq!(Money::usd(1000).percent_off(10).amount(), 900);
        assert_eq!(Money::usd(5).percent_off(50).amount(), 3);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::usd(1234).to_string(), "12.34 USD");
        assert_eq!(Money::usd(-5).to_string(), "-0.05 USD");
    }

    #[test]
    fn test_quantity_subtract() {
        let q = Quantity::new(3);
        assert_eq!(q.subtract(2).map(|q| q.value()), Some(1));
        assert!(q.subtract(4).is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  --Summer Sale 2026!  "), "summer-sale-2026");
        assert_eq!(slugify("!!!"), "");
    }
}
