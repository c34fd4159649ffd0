//! PostgreSQL persistence. One module per aggregate, plain `sqlx` queries.

pub mod catalog;
pub mod content;
pub mod customers;
pub mod orders;
pub mod products;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::Config;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to connect to database: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connects the pool and applies pending migrations.
#[tracing::instrument(skip_all, fields(max_connections = config.max_connections))]
pub async fn connect(config: &Config) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// 1-based page window, clamped to sane bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 { i64::from(self.per_page) }
    pub fn offset(&self) -> i64 { i64::from(self.page - 1) * i64::from(self.per_page) }
}

impl Default for Page {
    fn default() -> Self { Self::new(None, None) }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        Self { data, total, page: page.page, per_page: page.per_page }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated { data: self.data.into_iter().map(f).collect(), total: self.total, page: self.page, per_page: self.per_page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let p = Page::new(Some(0), Some(1000));
        assert_eq!((p.page, p.per_page), (1, 100));
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(Page::default().limit(), 20);
        assert_eq!(Page::new(None, Some(0)).per_page, 1);
    }
}
