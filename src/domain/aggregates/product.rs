//! Product Aggregate
//!
//! A sale is represented directly on the product: `price` holds the reduced
//! price, `original_price` the list price to restore and `sale_end` the
//! instant the reduction stops applying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub sale_end: Option<DateTime<Utc>>,
    pub currency: String,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub inventory_quantity: i32,
    pub images: Vec<String>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a sale price is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SalePrice {
    /// Absolute sale price in minor units.
    Price(i64),
    /// Percentage taken off the list price.
    PercentOff(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SaleCountdown { pub days: i64, pub hours: i64, pub minutes: i64, pub seconds: i64 }

impl SaleCountdown {
    fn from_seconds(total: i64) -> Self {
        Self { days: total / 86_400, hours: total % 86_400 / 3_600, minutes: total % 3_600 / 60, seconds: total % 60 }
    }
}

impl Product {
    pub fn money(&self, amount: i64) -> Money { Money::new(amount, &self.currency) }

    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        matches!((self.original_price, self.sale_end), (Some(_), Some(end)) if end > now)
    }

    /// Sale fields are still set but the end has passed.
    pub fn sale_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.original_price, self.sale_end) {
            (Some(_), Some(end)) => end <= now,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// List price, ignoring any running sale.
    pub fn list_price(&self) -> i64 { self.original_price.unwrap_or(self.price) }

    /// Price a customer pays right now. An expired sale that has not been
    /// restored yet already sells at the list price.
    pub fn effective_price(&self, now: DateTime<Utc>) -> i64 {
        if self.sale_expired(now) { self.list_price() } else { self.price }
    }

    pub fn discount_percent(&self, now: DateTime<Utc>) -> Option<u8> {
        if !self.is_on_sale(now) { return None; }
        let list = self.list_price();
        if list <= 0 { return None; }
        let off = (list - self.price) as f64 * 100.0 / list as f64;
        Some(off.round().clamp(0.0, 100.0) as u8)
    }

    pub fn sale_time_left(&self, now: DateTime<Utc>) -> Option<SaleCountdown> {
        if !self.is_on_sale(now) { return None; }
        self.sale_end.map(|end| SaleCountdown::from_seconds((end - now).num_seconds().max(0)))
    }

    pub fn start_sale(&mut self, sale: SalePrice, ends_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), SaleError> {
        if ends_at <= now { return Err(SaleError::EndInPast); }
        let base = self.list_price();
        let sale_price = match sale {
            SalePrice::Price(p) => p,
            SalePrice::PercentOff(pct) => {
                if !(1..=99).contains(&pct) { return Err(SaleError::InvalidPercent(pct)); }
                self.money(base).percent_off(pct).amount()
            }
        };
        if sale_price <= 0 || sale_price >= base {
            return Err(SaleError::NotADiscount { list_price: base, sale_price });
        }
        self.original_price = Some(base);
        self.price = sale_price;
        self.sale_end = Some(ends_at);
        self.touch();
        Ok(())
    }

    /// Changes the list price. During a sale that is the price restored when
    /// the sale ends, and it has to stay above the sale price. A sale that has
    /// already run out is restored first.
    pub fn set_list_price(&mut self, list_price: i64, now: DateTime<Utc>) -> Result<(), SaleError> {
        self.restore_if_expired(now);
        match self.original_price {
            Some(_) if list_price <= self.price => {
                return Err(SaleError::NotADiscount { list_price, sale_price: self.price });
            }
            Some(_) => self.original_price = Some(list_price),
            None => self.price = list_price,
        }
        self.touch();
        Ok(())
    }

    pub fn end_sale(&mut self) -> Result<(), SaleError> {
        let original = self.original_price.take().ok_or(SaleError::NotOnSale)?;
        self.price = original;
        self.sale_end = None;
        self.touch();
        Ok(())
    }

    /// Restores the list price if the sale has run out.
    pub fn restore_if_expired(&mut self, now: DateTime<Utc>) -> bool {
        self.sale_expired(now) && self.end_sale().is_ok()
    }

    pub fn inventory(&self) -> Quantity { Quantity::new(self.inventory_quantity.max(0) as u32) }
    pub fn is_in_stock(&self) -> bool { !self.inventory().is_zero() }

    pub fn remove_inventory(&mut self, qty: u32) -> Result<(), ProductError> {
        let left = self.inventory().subtract(qty).ok_or(ProductError::InsufficientInventory {
            product_id: self.id, available: self.inventory().value(), requested: qty,
        })?;
        self.inventory_quantity = left.value() as i32;
        self.touch();
        Ok(())
    }

    pub fn view(self, now: DateTime<Utc>) -> ProductView {
        ProductView {
            effective_price: self.effective_price(now),
            on_sale: self.is_on_sale(now),
            discount_percent: self.discount_percent(now),
            sale_countdown: self.sale_time_left(now),
            product: self,
        }
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Product as returned by the API, with read-time sale figures.
#[derive(Clone, Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub effective_price: i64,
    pub on_sale: bool,
    pub discount_percent: Option<u8>,
    pub sale_countdown: Option<SaleCountdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("Sale end must be in the future")]
    EndInPast,
    #[error("Discount percent must be between 1 and 99, got {0}")]
    InvalidPercent(u8),
    #[error("Sale price {sale_price} is not below list price {list_price}")]
    NotADiscount { list_price: i64, sale_price: i64 },
    #[error("Product is not on sale")]
    NotOnSale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Insufficient inventory for {product_id}: {available} available, {requested} requested")]
    InsufficientInventory { product_id: Uuid, available: u32, requested: u32 },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn product(price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::now_v7(), sku: "TEST-001".into(), name: "Test Product".into(), description: None,
            price, original_price: None, sale_end: None, currency: "USD".into(),
            category_id: None, brand_id: None, company_id: None, inventory_quantity: 10,
            images: vec![], featured: false, active: true, created_at: now, updated_at: now,
        }
    }

    #[test]
    fn test_start_sale_by_percent() {
        let now = Utc::now();
        let mut p = product(2000);
        p.start_sale(SalePrice::PercentOff(25), now + Duration::days(2), now).unwrap();
        assert_eq!(p.price, 1500);
        assert_eq!(p.original_price, Some(2000));
        assert!(p.is_on_sale(now));
        assert_eq!(p.discount_percent(now), Some(25));
    }

    #[test]
    fn test_resale_does_not_compound() {
        let now = Utc::now();
        let mut p = product(2000);
        p.start_sale(SalePrice::PercentOff(50), now + Duration::hours(1), now).unwrap();
        p.start_sale(SalePrice::PercentOff(10), now + Duration::hours(5), now).unwrap();
        assert_eq!(p.price, 1800);
        assert_eq!(p.original_price, Some(2000));
    }

    #[test]
    fn test_sale_validation() {
        let now = Utc::now();
        let mut p = product(1000);
        assert_eq!(p.start_sale(SalePrice::Price(900), now, now), Err(SaleError::EndInPast));
        assert_eq!(
            p.start_sale(SalePrice::Price(1000), now + Duration::days(1), now),
            Err(SaleError::NotADiscount { list_price: 1000, sale_price: 1000 })
        );
        assert_eq!(p.start_sale(SalePrice::PercentOff(0), now + Duration::days(1), now), Err(SaleError::InvalidPercent(0)));
        assert_eq!(p.price, 1000);
        assert!(p.original_price.is_none());
    }

    #[test]
    fn test_expired_sale_sells_at_list_price() {
        let now = Utc::now();
        let mut p = product(1000);
        p.start_sale(SalePrice::Price(700), now + Duration::minutes(10), now).unwrap();
        let later = now + Duration::minutes(11);
        assert!(!p.is_on_sale(later));
        assert!(p.sale_expired(later));
        assert_eq!(p.effective_price(now), 700);
        assert_eq!(p.effective_price(later), 1000);
        assert!(p.restore_if_expired(later));
        assert_eq!(p.price, 1000);
        assert!(p.sale_end.is_none());
        assert!(!p.restore_if_expired(later));
    }

    #[test]
    fn test_list_price_change_during_sale() {
        let now = Utc::now();
        let mut p = product(1000);
        p.set_list_price(1200, now).unwrap();
        assert_eq!(p.price, 1200);
        p.start_sale(SalePrice::Price(900), now + Duration::days(1), now).unwrap();
        p.set_list_price(1100, now).unwrap();
        assert_eq!((p.price, p.original_price), (900, Some(1100)));
        assert!(p.set_list_price(900, now).is_err());
        p.end_sale().unwrap();
        assert_eq!(p.price, 1100);
    }

    #[test]
    fn test_list_price_below_expired_sale_price() {
        let now = Utc::now();
        let mut p = product(1000);
        p.start_sale(SalePrice::Price(700), now + Duration::minutes(1), now).unwrap();
        let later = now + Duration::minutes(11);
        p.set_list_price(600, later).unwrap();
        assert_eq!((p.price, p.original_price, p.sale_end), (600, None, None));
        assert!(!p.is_on_sale(later));
    }

    #[test]
    fn test_end_sale_requires_sale() {
        let mut p = product(1000);
        assert_eq!(p.end_sale(), Err(SaleError::NotOnSale));
    }

    #[test]
    fn test_countdown() {
        let now = Utc::now();
        let mut p = product(1000);
        let end = now + Duration::days(1) + Duration::hours(2) + Duration::minutes(3) + Duration::seconds(4);
        p.start_sale(SalePrice::Price(500), end, now).unwrap();
        assert_eq!(p.sale_time_left(now), Some(SaleCountdown { days: 1, hours: 2, minutes: 3, seconds: 4 }));
        assert_eq!(p.sale_time_left(end), None);
    }

    #[test]
    fn test_inventory() {
        let mut p = product(1000);
        assert!(p.is_in_stock());
        p.remove_inventory(4).unwrap();
        assert_eq!(p.inventory().value(), 6);
        assert!(matches!(p.remove_inventory(7), Err(ProductError::InsufficientInventory { available: 6, requested: 7, .. })));
    }

    #[test]
    fn test_view_serializes_flat() {
        let now = Utc::now();
        let mut p = product(1000);
        p.start_sale(SalePrice::Price(800), now + Duration::days(3), now).unwrap();
        let json = serde_json::to_value(p.view(now)).unwrap();
        assert_eq!(json["price"], 800);
        assert_eq!(json["effective_price"], 800);
        assert_eq!(json["on_sale"], true);
        assert_eq!(json["discount_percent"], 20);
    }
}
