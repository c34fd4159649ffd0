use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::aggregates::{Brand, Category, Company};

pub async fn list_categories(e: impl PgExecutor<'_>) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name").fetch_all(e).await
}

pub async fn get_category(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn insert_category(e: impl PgExecutor<'_>, c: &Category) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, parent_id, image_url, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.description).bind(c.parent_id).bind(&c.image_url).bind(c.created_at)
    .fetch_one(e).await
}

pub async fn update_category(e: impl PgExecutor<'_>, c: &Category) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, slug = $3, description = $4, parent_id = $5, image_url = $6 WHERE id = $1 RETURNING *",
    )
    .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.description).bind(c.parent_id).bind(&c.image_url)
    .fetch_optional(e).await
}

/// Whether `ancestor` is `category` itself or sits on its parent chain.
pub async fn category_descends_from(e: impl PgExecutor<'_>, category: Uuid, ancestor: Uuid) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "WITH RECURSIVE chain AS (SELECT id, parent_id FROM categories WHERE id = $1 \
         UNION SELECT c.id, c.parent_id FROM categories c JOIN chain ON c.id = chain.parent_id) \
         SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)",
    )
    .bind(category).bind(ancestor).fetch_one(e).await
}

pub async fn list_brands(e: impl PgExecutor<'_>) -> sqlx::Result<Vec<Brand>> {
    sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY name").fetch_all(e).await
}

pub async fn get_brand(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Brand>> {
    sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn insert_brand(e: impl PgExecutor<'_>, b: &Brand) -> sqlx::Result<Brand> {
    sqlx::query_as::<_, Brand>("INSERT INTO brands (id, name, slug, logo_url, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *")
        .bind(b.id).bind(&b.name).bind(&b.slug).bind(&b.logo_url).bind(b.created_at)
        .fetch_one(e).await
}

pub async fn update_brand(e: impl PgExecutor<'_>, b: &Brand) -> sqlx::Result<Option<Brand>> {
    sqlx::query_as::<_, Brand>("UPDATE brands SET name = $2, slug = $3, logo_url = $4 WHERE id = $1 RETURNING *")
        .bind(b.id).bind(&b.name).bind(&b.slug).bind(&b.logo_url)
        .fetch_optional(e).await
}

pub async fn list_companies(e: impl PgExecutor<'_>) -> sqlx::Result<Vec<Company>> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY name").fetch_all(e).await
}

pub async fn get_company(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Company>> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn insert_company(e: impl PgExecutor<'_>, c: &Company) -> sqlx::Result<Company> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (id, name, slug, email, phone, logo_url, description, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.email).bind(&c.phone).bind(&c.logo_url).bind(&c.description).bind(c.created_at)
    .fetch_one(e).await
}

pub async fn update_company(e: impl PgExecutor<'_>, c: &Company) -> sqlx::Result<Option<Company>> {
    sqlx::query_as::<_, Company>(
        "UPDATE companies SET name = $2, slug = $3, email = $4, phone = $5, logo_url = $6, description = $7 WHERE id = $1 RETURNING *",
    )
    .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.email).bind(&c.phone).bind(&c.logo_url).bind(&c.description)
    .fetch_optional(e).await
}

/// Table a taxonomy row lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Taxonomy { Category, Brand, Company }

impl Taxonomy {
    fn table(self) -> &'static str {
        match self { Self::Category => "categories", Self::Brand => "brands", Self::Company => "companies" }
    }

    pub fn label(self) -> &'static str {
        match self { Self::Category => "Category", Self::Brand => "Brand", Self::Company => "Company" }
    }
}

/// Products referencing the row block the delete (foreign key violation).
pub async fn delete(e: impl PgExecutor<'_>, kind: Taxonomy, id: Uuid) -> sqlx::Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
    let done = sqlx::query(&sql).bind(id).execute(e).await?;
    Ok(done.rows_affected() > 0)
}
