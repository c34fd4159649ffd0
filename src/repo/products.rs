use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Page, Paginated};
use crate::domain::aggregates::Product;

/// Filters for product listings. `None` means "don't filter".
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub search: Option<String>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    pub include_inactive: bool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &ProductFilter, now: DateTime<Utc>) {
    if !f.include_inactive { qb.push(" AND active"); }
    if let Some(id) = f.category_id { qb.push(" AND category_id = ").push_bind(id); }
    if let Some(id) = f.brand_id { qb.push(" AND brand_id = ").push_bind(id); }
    if let Some(id) = f.company_id { qb.push(" AND company_id = ").push_bind(id); }
    if let Some(term) = f.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" AND name ILIKE ").push_bind(format!("%{}%", escape_like(term)));
    }
    match f.on_sale {
        Some(true) => { qb.push(" AND original_price IS NOT NULL AND sale_end > ").push_bind(now); }
        Some(false) => { qb.push(" AND (original_price IS NULL OR sale_end IS NULL OR sale_end <= ").push_bind(now).push(")"); }
        None => {}
    }
    if let Some(featured) = f.featured { qb.push(" AND featured = ").push_bind(featured); }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[tracing::instrument(skip(pool))]
pub async fn list(pool: &PgPool, filter: &ProductFilter, page: Page, now: DateTime<Utc>) -> sqlx::Result<Paginated<Product>> {
    let mut qb = QueryBuilder::new("SELECT * FROM products WHERE TRUE");
    push_filters(&mut qb, filter, now);
    qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(page.limit()).push(" OFFSET ").push_bind(page.offset());
    let products = qb.build_query_as::<Product>().fetch_all(pool).await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE TRUE");
    push_filters(&mut count, filter, now);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(Paginated::new(products, total, page))
}

pub async fn get(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(e).await
}

/// Row-locks the product for the rest of the transaction.
pub async fn lock(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE").bind(id).fetch_optional(e).await
}

/// Row-locks the products for the rest of the transaction.
pub async fn lock_many(e: impl PgExecutor<'_>, ids: &[Uuid]) -> sqlx::Result<Vec<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(ids).fetch_all(e).await
}

pub async fn insert(e: impl PgExecutor<'_>, p: &Product) -> sqlx::Result<Product> {
    sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, sku, name, description, price, original_price, sale_end, currency, category_id, brand_id, company_id, inventory_quantity, images, featured, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) RETURNING *",
    )
    .bind(p.id).bind(&p.sku).bind(&p.name).bind(&p.description).bind(p.price).bind(p.original_price).bind(p.sale_end)
    .bind(&p.currency).bind(p.category_id).bind(p.brand_id).bind(p.company_id).bind(p.inventory_quantity)
    .bind(&p.images).bind(p.featured).bind(p.active).bind(p.created_at).bind(p.updated_at)
    .fetch_one(e).await
}

/// Writes every mutable column of `p` except `inventory_quantity`, which only
/// changes through `adjust_inventory` and `set_inventory`.
pub async fn update(e: impl PgExecutor<'_>, p: &Product) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
        "UPDATE products SET sku = $2, name = $3, description = $4, price = $5, original_price = $6, sale_end = $7, \
         category_id = $8, brand_id = $9, company_id = $10, images = $11, featured = $12, \
         active = $13, updated_at = $14 WHERE id = $1 RETURNING *",
    )
    .bind(p.id).bind(&p.sku).bind(&p.name).bind(&p.description).bind(p.price).bind(p.original_price).bind(p.sale_end)
    .bind(p.category_id).bind(p.brand_id).bind(p.company_id).bind(&p.images)
    .bind(p.featured).bind(p.active).bind(p.updated_at)
    .fetch_optional(e).await
}

pub async fn set_inventory(e: impl PgExecutor<'_>, id: Uuid, quantity: i32) -> sqlx::Result<()> {
    sqlx::query("UPDATE products SET inventory_quantity = $2, updated_at = NOW() WHERE id = $1")
        .bind(id).bind(quantity).execute(e).await?;
    Ok(())
}

pub async fn adjust_inventory(e: impl PgExecutor<'_>, id: Uuid, delta: i32) -> sqlx::Result<()> {
    sqlx::query("UPDATE products SET inventory_quantity = inventory_quantity + $2, updated_at = NOW() WHERE id = $1")
        .bind(id).bind(delta).execute(e).await?;
    Ok(())
}

pub async fn deactivate(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
    let done = sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active")
        .bind(id).execute(e).await?;
    Ok(done.rows_affected() > 0)
}

pub async fn expired_sales(e: impl PgExecutor<'_>, now: DateTime<Utc>) -> sqlx::Result<Vec<Product>> {
    sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE original_price IS NOT NULL AND (sale_end IS NULL OR sale_end <= $1) ORDER BY sale_end",
    )
    .bind(now).fetch_all(e).await
}

/// Puts every product whose sale ran out back at its list price.
/// Returns `(id, restored price)` pairs.
#[tracing::instrument(skip(e))]
pub async fn restore_expired_sales(e: impl PgExecutor<'_>, now: DateTime<Utc>) -> sqlx::Result<Vec<(Uuid, i64)>> {
    sqlx::query_as::<_, (Uuid, i64)>(
        "UPDATE products SET price = original_price, original_price = NULL, sale_end = NULL, updated_at = NOW() \
         WHERE original_price IS NOT NULL AND (sale_end IS NULL OR sale_end <= $1) RETURNING id, price",
    )
    .bind(now).fetch_all(e).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_render_sql() {
        let now = Utc::now();
        let filter = ProductFilter { company_id: Some(Uuid::nil()), search: Some(" mug ".into()), on_sale: Some(true), ..Default::default() };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE TRUE");
        push_filters(&mut qb, &filter, now);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE TRUE AND active AND company_id = $1 AND name ILIKE $2 AND original_price IS NOT NULL AND sale_end > $3"
        );
    }

    #[test]
    fn test_blank_search_and_inactive() {
        let filter = ProductFilter { search: Some("   ".into()), include_inactive: true, ..Default::default() };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_filters(&mut qb, &filter, Utc::now());
        assert_eq!(qb.sql(), "SELECT 1 WHERE TRUE");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
