//! HTTP routes. Everything except `/health` lives under `/api/v1`.

pub mod admin;
pub mod catalog;
pub mod content;
pub mod customers;
pub mod extract;
pub mod orders;
pub mod products;

use axum::{routing::{get, patch, post}, Json, Router};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::domain::aggregates::ShippingPolicy;
use crate::publisher::EventPublisher;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub events: EventPublisher,
    pub currency: String,
    pub shipping: ShippingPolicy,
}

impl AppState {
    pub fn new(db: PgPool, events: EventPublisher, config: &Config) -> Self {
        Self { db, events, currency: config.currency.clone(), shipping: config.shipping }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/products/:id/sale", post(products::start_sale).delete(products::end_sale))
        .route("/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/categories/:id", get(catalog::get_category).put(catalog::update_category).delete(catalog::delete_category))
        .route("/brands", get(catalog::list_brands).post(catalog::create_brand))
        .route("/brands/:id", get(catalog::get_brand).put(catalog::update_brand).delete(catalog::delete_brand))
        .route("/companies", get(catalog::list_companies).post(catalog::create_company))
        .route("/companies/:id", get(catalog::get_company).put(catalog::update_company).delete(catalog::delete_company))
        .route("/companies/:id/products", get(catalog::company_products))
        .route("/customers", post(customers::register))
        .route("/customers/:id", get(customers::get_customer))
        .route("/customers/:id/orders", get(customers::customer_orders))
        .route("/auth/login", post(customers::login))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/orders/:id/payment-status", patch(orders::update_payment_status))
        .route("/carousel", get(content::list_slides).post(content::create_slide))
        .route("/carousel/:id", get(content::get_slide).put(content::update_slide).delete(content::delete_slide))
        .route("/menu", get(content::list_menu).post(content::create_menu_item))
        .route("/menu/:id", get(content::get_menu_item).put(content::update_menu_item).delete(content::delete_menu_item))
        .route("/admin/sales/restore-expired", post(admin::restore_expired_sales));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
