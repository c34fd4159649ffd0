//! Expired-sale maintenance.
//!
//! Sales are not ended by a timer. Reads already price an expired sale at
//! its list price; this pass writes the list price back to the rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::publisher::EventPublisher;
use crate::repo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredSale {
    pub product_id: Uuid,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub checked_at: DateTime<Utc>,
    pub dry_run: bool,
    pub restored: Vec<RestoredSale>,
}

#[tracing::instrument(skip(pool, publisher))]
pub async fn restore_expired(pool: &PgPool, publisher: &EventPublisher, now: DateTime<Utc>, dry_run: bool) -> sqlx::Result<RestoreReport> {
    let restored: Vec<RestoredSale> = if dry_run {
        repo::products::expired_sales(pool, now)
            .await?
            .into_iter()
            .map(|p| RestoredSale { product_id: p.id, price: p.list_price() })
            .collect()
    } else {
        repo::products::restore_expired_sales(pool, now)
            .await?
            .into_iter()
            .map(|(product_id, price)| RestoredSale { product_id, price })
            .collect()
    };

    if !dry_run {
        for sale in &restored {
            publisher.publish(DomainEvent::Product(ProductEvent::SaleEnded { product_id: sale.product_id, price: sale.price })).await;
        }
    }
    tracing::info!(count = restored.len(), dry_run, "expired sales processed");
    Ok(RestoreReport { checked_at: now, dry_run, restored })
}
