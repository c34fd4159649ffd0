//! Cart Aggregate
//!
//! Built server side at checkout from the requested lines, priced from the
//! catalog rather than from anything the client sent.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{Money, MoneyError};

#[derive(Clone, Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartItem {
    pub fn line_total(&self) -> Result<Money, MoneyError> { self.unit_price.multiply(self.quantity) }
}

/// Flat shipping fee, waived at or above `free_over`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: i64,
    pub free_over: Option<i64>,
}

impl ShippingPolicy {
    pub fn fee_for(&self, subtotal: i64) -> i64 {
        match self.free_over {
            Some(threshold) if subtotal >= threshold => 0,
            _ => self.flat_fee,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], currency: currency.to_uppercase() }
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn currency(&self) -> &str { &self.currency }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity); }
        if item.unit_price.currency() != self.currency { return Err(CartError::Money(MoneyError::CurrencyMismatch)); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 { self.items.retain(|i| i.product_id != product_id); }
        else { item.quantity = quantity; }
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn subtotal(&self) -> Result<Money, CartError> {
        self.items.iter().try_fold(Money::zero(&self.currency), |acc, i| Ok::<_, CartError>(acc.add(&i.line_total()?)?))
    }

    pub fn totals(&self, shipping: &ShippingPolicy) -> Result<CartTotals, CartError> {
        if self.is_empty() { return Err(CartError::Empty); }
        let subtotal = self.subtotal()?;
        let shipping = Money::new(shipping.fee_for(subtotal.amount()), &self.currency);
        let total = subtotal.add(&shipping)?;
        Ok(CartTotals { subtotal, shipping, total })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Cart is empty")]
    Empty,
    #[error(transparent)]
    Money(#[from] MoneyError),
}
