use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Page, Paginated};
use crate::domain::aggregates::{Order, OrderItem, OrderStatus, PaymentStatus};

#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<Uuid>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &OrderFilter) {
    if let Some(s) = f.status { qb.push(" AND status = ").push_bind(s); }
    if let Some(s) = f.payment_status { qb.push(" AND payment_status = ").push_bind(s); }
    if let Some(id) = f.customer_id { qb.push(" AND customer_id = ").push_bind(id); }
}

#[tracing::instrument(skip(pool))]
pub async fn list(pool: &PgPool, filter: &OrderFilter, page: Page) -> sqlx::Result<Paginated<Order>> {
    let mut qb = QueryBuilder::new("SELECT * FROM orders WHERE TRUE");
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(page.limit()).push(" OFFSET ").push_bind(page.offset());
    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE TRUE");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(Paginated::new(orders, total, page))
}

pub async fn get(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn lock(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE").bind(id).fetch_optional(e).await
}

pub async fn items(e: impl PgExecutor<'_>, order_id: Uuid) -> sqlx::Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY name")
        .bind(order_id).fetch_all(e).await
}

pub async fn insert(e: impl PgExecutor<'_>, o: &Order) -> sqlx::Result<Order> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_number, customer_id, customer_name, customer_email, customer_phone, status, payment_status, \
         payment_method, subtotal, shipping, total, currency, shipping_address, notes, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) RETURNING *",
    )
    .bind(o.id).bind(&o.order_number).bind(o.customer_id).bind(&o.customer_name).bind(&o.customer_email)
    .bind(&o.customer_phone).bind(o.status).bind(o.payment_status).bind(&o.payment_method).bind(o.subtotal)
    .bind(o.shipping).bind(o.total).bind(&o.currency).bind(&o.shipping_address).bind(&o.notes)
    .bind(o.created_at).bind(o.updated_at)
    .fetch_one(e).await
}

pub async fn insert_item(e: impl PgExecutor<'_>, i: &OrderItem) -> sqlx::Result<OrderItem> {
    sqlx::query_as::<_, OrderItem>(
        "INSERT INTO order_items (id, order_id, product_id, sku, name, quantity, unit_price, total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(i.id).bind(i.order_id).bind(i.product_id).bind(&i.sku).bind(&i.name).bind(i.quantity).bind(i.unit_price).bind(i.total)
    .fetch_one(e).await
}

pub async fn save_statuses(e: impl PgExecutor<'_>, o: &Order) -> sqlx::Result<Order> {
    sqlx::query_as::<_, Order>("UPDATE orders SET status = $2, payment_status = $3, updated_at = $4 WHERE id = $1 RETURNING *")
        .bind(o.id).bind(o.status).bind(o.payment_status).bind(o.updated_at)
        .fetch_one(e).await
}

/// Items are removed with the order (`ON DELETE CASCADE`).
pub async fn delete(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
    let done = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(e).await?;
    Ok(done.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_render_sql() {
        let filter = OrderFilter { status: Some(OrderStatus::Shipped), customer_id: Some(Uuid::nil()), ..Default::default() };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders WHERE TRUE");
        push_filters(&mut qb, &filter);
        assert_eq!(qb.sql(), "SELECT * FROM orders WHERE TRUE AND status = $1 AND customer_id = $2");
    }
}
