//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{OrderStatus, PaymentStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, sku: String },
    Updated { product_id: Uuid },
    Deactivated { product_id: Uuid },
    SaleStarted { product_id: Uuid, price: i64, original_price: i64, sale_end: DateTime<Utc> },
    SaleEnded { product_id: Uuid, price: i64 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, total: i64 },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
    PaymentStatusChanged { order_id: Uuid, from: PaymentStatus, to: PaymentStatus },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        let kind = match self {
            Self::Product(ProductEvent::Created { .. }) => "product.created",
            Self::Product(ProductEvent::Updated { .. }) => "product.updated",
            Self::Product(ProductEvent::Deactivated { .. }) => "product.deactivated",
            Self::Product(ProductEvent::SaleStarted { .. }) => "product.sale_started",
            Self::Product(ProductEvent::SaleEnded { .. }) => "product.sale_ended",
            Self::Order(OrderEvent::Placed { .. }) => "order.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "order.status_changed",
            Self::Order(OrderEvent::PaymentStatusChanged { .. }) => "order.payment_status_changed",
        };
        format!("storefront.{kind}")
    }
}
