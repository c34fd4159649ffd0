use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::aggregates::{CarouselSlide, MenuItem};

pub async fn list_slides(e: impl PgExecutor<'_>, include_inactive: bool) -> sqlx::Result<Vec<CarouselSlide>> {
    sqlx::query_as::<_, CarouselSlide>("SELECT * FROM carousel_slides WHERE active OR $1 ORDER BY position, title")
        .bind(include_inactive).fetch_all(e).await
}

pub async fn get_slide(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<CarouselSlide>> {
    sqlx::query_as::<_, CarouselSlide>("SELECT * FROM carousel_slides WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn upsert_slide(e: impl PgExecutor<'_>, s: &CarouselSlide) -> sqlx::Result<CarouselSlide> {
    sqlx::query_as::<_, CarouselSlide>(
        "INSERT INTO carousel_slides (id, title, subtitle, image_url, link_url, position, active) VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, subtitle = EXCLUDED.subtitle, image_url = EXCLUDED.image_url, \
         link_url = EXCLUDED.link_url, position = EXCLUDED.position, active = EXCLUDED.active RETURNING *",
    )
    .bind(s.id).bind(&s.title).bind(&s.subtitle).bind(&s.image_url).bind(&s.link_url).bind(s.position).bind(s.active)
    .fetch_one(e).await
}

pub async fn delete_slide(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
    let done = sqlx::query("DELETE FROM carousel_slides WHERE id = $1").bind(id).execute(e).await?;
    Ok(done.rows_affected() > 0)
}

pub async fn list_menu(e: impl PgExecutor<'_>, include_inactive: bool) -> sqlx::Result<Vec<MenuItem>> {
    sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE active OR $1 ORDER BY position, label")
        .bind(include_inactive).fetch_all(e).await
}

pub async fn get_menu_item(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<MenuItem>> {
    sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = $1").bind(id).fetch_optional(e).await
}

pub async fn upsert_menu_item(e: impl PgExecutor<'_>, m: &MenuItem) -> sqlx::Result<MenuItem> {
    sqlx::query_as::<_, MenuItem>(
        "INSERT INTO menu_items (id, label, url, position, parent_id, active) VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (id) DO UPDATE SET label = EXCLUDED.label, url = EXCLUDED.url, position = EXCLUDED.position, \
         parent_id = EXCLUDED.parent_id, active = EXCLUDED.active RETURNING *",
    )
    .bind(m.id).bind(&m.label).bind(&m.url).bind(m.position).bind(m.parent_id).bind(m.active)
    .fetch_one(e).await
}

/// Whether `ancestor` is `item` itself or sits on its parent chain.
pub async fn menu_item_descends_from(e: impl PgExecutor<'_>, item: Uuid, ancestor: Uuid) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "WITH RECURSIVE chain AS (SELECT id, parent_id FROM menu_items WHERE id = $1 \
         UNION SELECT m.id, m.parent_id FROM menu_items m JOIN chain ON m.id = chain.parent_id) \
         SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)",
    )
    .bind(item).bind(ancestor).fetch_one(e).await
}

/// Children of a deleted menu item move to the top level (`ON DELETE SET NULL`).
pub async fn delete_menu_item(e: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<bool> {
    let done = sqlx::query("DELETE FROM menu_items WHERE id = $1").bind(id).execute(e).await?;
    Ok(done.rows_affected() > 0)
}
