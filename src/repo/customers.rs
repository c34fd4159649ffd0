use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::aggregates::CustomerUser;

pub async fn insert(e: impl PgExecutor<'_>, c: &CustomerUser) -> sqlx::Result<CustomerUser> {
    sqlx::query_as::<_, CustomerUser>(
        "INSERT INTO customers (id, name, email, password_hash, phone, address, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(c.id).bind(&c.name).bind(&c.email).bind(&c.password_hash).bind(&c.phone).bind(&c.address).bind(c.created_at)
    .fetch_one(e).await
}

pub async fn get(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<CustomerUser>> {
    sqlx::query_as::<_, CustomerUser>("SELECT * FROM customers WHERE id = $1").bind(id).fetch_optional(e).await
}

/// Emails are stored lowercased.
pub async fn find_by_email(e: impl PgExecutor<'_>, email: &str) -> sqlx::Result<Option<CustomerUser>> {
    sqlx::query_as::<_, CustomerUser>("SELECT * FROM customers WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(e).await
}
