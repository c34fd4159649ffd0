//! Checkout and order state changes. Each runs in a single transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{
    generate_order_number, Address, Cart, CartItem, Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus, Product,
    ShippingPolicy,
};
use crate::error::{ApiError, ApiResult};
use crate::repo;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(max = 40))]
    pub customer_phone: Option<String>,
    #[validate(length(max = 40))]
    pub payment_method: Option<String>,
    #[validate]
    pub shipping_address: Address,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub items: Vec<CheckoutLine>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Builds the cart from catalog rows at their current effective prices.
/// Missing or inactive products and zero quantities are rejected.
pub fn price_cart(
    lines: &[CheckoutLine],
    products: &HashMap<Uuid, Product>,
    currency: &str,
    now: DateTime<Utc>,
) -> ApiResult<Cart> {
    let mut cart = Cart::new(currency);
    for line in lines {
        if line.quantity == 0 {
            return Err(ApiError::Validation(format!("Quantity for {} must be at least 1", line.product_id)));
        }
        let product = products
            .get(&line.product_id)
            .filter(|p| p.active)
            .ok_or_else(|| ApiError::Validation(format!("Product {} is not available", line.product_id)))?;
        cart.add_item(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            quantity: line.quantity,
            unit_price: product.money(product.effective_price(now)),
        })?;
    }
    Ok(cart)
}

#[tracing::instrument(skip_all, fields(email = %req.customer_email, lines = req.items.len()))]
pub async fn place_order(pool: &PgPool, req: CheckoutRequest, currency: &str, shipping: &ShippingPolicy) -> ApiResult<OrderDetail> {
    req.validate()?;
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    if let Some(customer_id) = req.customer_id {
        repo::customers::get(&mut *tx, customer_id).await?.ok_or(ApiError::NotFound("Customer"))?;
    }

    let mut ids: Vec<Uuid> = req.items.iter().map(|l| l.product_id).collect();
    ids.sort();
    ids.dedup();
    let mut products: HashMap<Uuid, Product> =
        repo::products::lock_many(&mut *tx, &ids).await?.into_iter().map(|p| (p.id, p)).collect();

    let cart = price_cart(&req.items, &products, currency, now)?;
    let totals = cart.totals(shipping)?;

    for item in cart.items() {
        if let Some(product) = products.get_mut(&item.product_id) {
            product.remove_inventory(item.quantity)?;
            repo::products::adjust_inventory(&mut *tx, product.id, -(item.quantity as i32)).await?;
        }
    }

    let order = repo::orders::insert(&mut *tx, &Order {
        id: Uuid::now_v7(),
        order_number: generate_order_number(),
        customer_id: req.customer_id,
        customer_name: req.customer_name.trim().to_string(),
        customer_email: req.customer_email.trim().to_lowercase(),
        customer_phone: req.customer_phone,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: req.payment_method,
        subtotal: totals.subtotal.amount(),
        shipping: totals.shipping.amount(),
        total: totals.total.amount(),
        currency: cart.currency().to_string(),
        shipping_address: Json(req.shipping_address),
        notes: req.notes,
        created_at: now,
        updated_at: now,
    })
    .await
    .map_err(|e| ApiError::from_write(e, "Order"))?;

    let mut items = Vec::with_capacity(cart.item_count());
    for item in cart.items() {
        let line = OrderItem {
            id: Uuid::now_v7(),
            order_id: order.id,
            product_id: item.product_id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            quantity: item.quantity as i32,
            unit_price: item.unit_price.amount(),
            total: item.line_total()?.amount(),
        };
        items.push(repo::orders::insert_item(&mut *tx, &line).await?);
    }

    tx.commit().await?;
    tracing::info!(order_id = %order.id, order_number = %order.order_number, total = order.total, "order placed");
    Ok(OrderDetail { order, items })
}

/// Applies the status change; cancelling restocks the order's items.
#[tracing::instrument(skip(pool))]
pub async fn change_status(pool: &PgPool, order_id: Uuid, next: OrderStatus) -> ApiResult<(Order, Option<OrderStatus>)> {
    let mut tx = pool.begin().await?;
    let mut order = repo::orders::lock(&mut *tx, order_id).await?.ok_or(ApiError::NotFound("Order"))?;
    let previous = order.status;
    if !order.set_status(next)? {
        return Ok((order, None));
    }
    if next == OrderStatus::Cancelled {
        for item in repo::orders::items(&mut *tx, order_id).await? {
            repo::products::adjust_inventory(&mut *tx, item.product_id, item.quantity).await?;
        }
    }
    let order = repo::orders::save_statuses(&mut *tx, &order).await?;
    tx.commit().await?;
    tracing::info!(%order_id, from = ?previous, to = ?next, "order status changed");
    Ok((order, Some(previous)))
}

#[tracing::instrument(skip(pool))]
pub async fn change_payment_status(pool: &PgPool, order_id: Uuid, next: PaymentStatus) -> ApiResult<(Order, Option<PaymentStatus>)> {
    let mut tx = pool.begin().await?;
    let mut order = repo::orders::lock(&mut *tx, order_id).await?.ok_or(ApiError::NotFound("Order"))?;
    let previous = order.payment_status;
    if !order.set_payment_status(next)? {
        return Ok((order, None));
    }
    let order = repo::orders::save_statuses(&mut *tx, &order).await?;
    tx.commit().await?;
    tracing::info!(%order_id, from = ?previous, to = ?next, "payment status changed");
    Ok((order, Some(previous)))
}
