//! Order Aggregate

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub currency: String,
    pub shipping_address: Json<Address>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub zip: String,
    #[validate(length(min = 2, max = 100))]
    pub country: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered, Cancelled }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum PaymentStatus { #[default] Pending, Paid, Failed, Refunded }

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Pending, Cancelled) | (Processing, Shipped) | (Processing, Cancelled) | (Shipped, Delivered)
        )
    }

    pub fn is_final(self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }
}

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Failed) | (Failed, Paid) | (Failed, Pending) | (Paid, Refunded))
    }
}

/// `ORD-` followed by eight random digits.
pub fn generate_order_number() -> String {
    format!("ORD-{:08}", rand::thread_rng().gen_range(0..100_000_000u32))
}

impl Order {
    /// Moves the order to `next`. Returns `false` when it already had that status.
    pub fn set_status(&mut self, next: OrderStatus) -> Result<bool, OrderError> {
        if self.status == next { return Ok(false); }
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition { from: format!("{:?}", self.status), to: format!("{next:?}") });
        }
        self.status = next;
        self.touch();
        Ok(true)
    }

    pub fn set_payment_status(&mut self, next: PaymentStatus) -> Result<bool, OrderError> {
        if self.payment_status == next { return Ok(false); }
        if !self.payment_status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition { from: format!("{:?}", self.payment_status), to: format!("{next:?}") });
        }
        self.payment_status = next;
        self.touch();
        Ok(true)
    }

    pub fn ensure_deletable(&self) -> Result<(), OrderError> {
        if self.status.is_final() { Ok(()) } else { Err(OrderError::StillOpen) }
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Order together with its line items.
#[derive(Clone, Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Only delivered or cancelled orders can be deleted")]
    StillOpen,
}
