//! Storefront API
//!
//! REST backend for a storefront with company and admin dashboards.
//!
//! ## Features
//! - Product catalog with categories, brands and selling companies
//! - Timed sales with read-time countdowns and an expired-sale restore pass
//! - Server-priced checkout with inventory reservation
//! - Order and payment status tracking
//! - Customer accounts
//! - Carousel and menu content for the storefront

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod repo;
pub mod services;

pub use api::{router, AppState};
pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use publisher::EventPublisher;

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
