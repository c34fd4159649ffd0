use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::{extract::{Json, Path, Query}, AppState};
use crate::domain::aggregates::{Order, OrderDetail, OrderStatus, PaymentStatus};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::error::{ApiError, ApiResult};
use crate::repo::{self, orders::OrderFilter, Page, Paginated};
use crate::services::checkout::{self, CheckoutRequest};

#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<Uuid>,
}

impl OrderListParams {
    pub fn filter(&self) -> OrderFilter {
        OrderFilter { status: self.status, payment_status: self.payment_status, customer_id: self.customer_id }
    }

    pub fn page(&self) -> Page { Page::new(self.page, self.per_page) }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate { pub status: OrderStatus }

#[derive(Debug, Deserialize)]
pub struct PaymentStatusUpdate { pub payment_status: PaymentStatus }

pub async fn list_orders(State(s): State<AppState>, Query(p): Query<OrderListParams>) -> ApiResult<Json<Paginated<Order>>> {
    Ok(Json(repo::orders::list(&s.db, &p.filter(), p.page()).await?))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<OrderDetail>> {
    let order = repo::orders::get(&s.db, id).await?.ok_or(ApiError::NotFound("Order"))?;
    let items = repo::orders::items(&s.db, id).await?;
    Ok(Json(OrderDetail { order, items }))
}

pub async fn create_order(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let detail = checkout::place_order(&s.db, r, &s.currency, &s.shipping).await?;
    let order = &detail.order;
    s.events
        .publish(DomainEvent::Order(OrderEvent::Placed { order_id: order.id, order_number: order.order_number.clone(), total: order.total }))
        .await;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn update_status(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<StatusUpdate>) -> ApiResult<Json<Order>> {
    let (order, previous) = checkout::change_status(&s.db, id, r.status).await?;
    if let Some(from) = previous {
        s.events.publish(DomainEvent::Order(OrderEvent::StatusChanged { order_id: id, from, to: order.status })).await;
    }
    Ok(Json(order))
}

pub async fn update_payment_status(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<PaymentStatusUpdate>) -> ApiResult<Json<Order>> {
    let (order, previous) = checkout::change_payment_status(&s.db, id, r.payment_status).await?;
    if let Some(from) = previous {
        s.events.publish(DomainEvent::Order(OrderEvent::PaymentStatusChanged { order_id: id, from, to: order.payment_status })).await;
    }
    Ok(Json(order))
}

/// Only orders that reached a final status can be removed.
pub async fn delete_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let order = repo::orders::get(&s.db, id).await?.ok_or(ApiError::NotFound("Order"))?;
    order.ensure_deletable()?;
    if !repo::orders::delete(&s.db, id).await? {
        return Err(ApiError::NotFound("Order"));
    }
    tracing::info!(order_id = %id, order_number = %order.order_number, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}
