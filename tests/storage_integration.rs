//! Integration tests against a real Postgres.
//!
//! Each test gets a fresh database with `migrations/` applied. They need a
//! server reachable through `DATABASE_URL`, so they are `#[ignore]`d by default:
//! `DATABASE_URL=postgres://... cargo test --test storage_integration -- --ignored`

use axum::{body::Body, http::{Request, StatusCode}, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use storefront::domain::aggregates::{Brand, Category, Company, OrderStatus, Product, ShippingPolicy};
use storefront::services::{checkout::{self, CheckoutRequest}, sales};
use storefront::{repo, router, ApiError, AppState, EventPublisher};
use tower::ServiceExt;
use uuid::Uuid;

fn product(price: i64, stock: i32) -> Product {
    let now = Utc::now();
    let id = Uuid::now_v7();
    Product {
        id,
        sku: format!("IT-{}", id.simple()),
        name: "Enamel Mug".into(),
        description: None,
        price,
        original_price: None,
        sale_end: None,
        currency: "USD".into(),
        category_id: None,
        brand_id: None,
        company_id: None,
        inventory_quantity: stock,
        images: vec![],
        featured: false,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn checkout_request(product_id: Uuid, quantity: u32) -> CheckoutRequest {
    serde_json::from_value(json!({
        "customer_name": "Ann",
        "customer_email": "ann@example.com",
        "shipping_address": { "street": "1 Main St", "city": "Springfield", "zip": "12345", "country": "US" },
        "items": [{ "product_id": product_id, "quantity": quantity }]
    }))
    .expect("valid checkout body")
}

async fn stock(pool: &PgPool, id: Uuid) -> i32 {
    repo::products::get(pool, id).await.unwrap().unwrap().inventory_quantity
}

fn app(pool: &PgPool) -> Router {
    router(AppState {
        db: pool.clone(),
        events: EventPublisher::disabled(),
        currency: "USD".into(),
        shipping: ShippingPolicy::default(),
    })
}

async fn send(pool: &PgPool, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app(pool).oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// ==================== Checkout and inventory ====================

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_checkout_decrements_inventory(pool: PgPool) -> anyhow::Result<()> {
    let mug = repo::products::insert(&pool, &product(1000, 10)).await?;

    let detail = checkout::place_order(&pool, checkout_request(mug.id, 3), "USD", &ShippingPolicy::default()).await?;

    assert_eq!(detail.order.total, 3000);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(stock(&pool, mug.id).await, 7);
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_checkout_rejects_insufficient_stock(pool: PgPool) -> anyhow::Result<()> {
    let mug = repo::products::insert(&pool, &product(1000, 10)).await?;

    let err = checkout::place_order(&pool, checkout_request(mug.id, 11), "USD", &ShippingPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Domain(_)));
    assert_eq!(stock(&pool, mug.id).await, 10);
    let orders = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders").fetch_one(&pool).await?;
    assert_eq!(orders, 0);
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_stale_product_write_keeps_checkout_stock(pool: PgPool) -> anyhow::Result<()> {
    let mug = repo::products::insert(&pool, &product(1000, 10)).await?;
    let mut stale = repo::products::get(&pool, mug.id).await?.unwrap();

    checkout::place_order(&pool, checkout_request(mug.id, 3), "USD", &ShippingPolicy::default()).await?;
    stale.name = "Renamed Mug".into();
    repo::products::update(&pool, &stale).await?;

    let saved = repo::products::get(&pool, mug.id).await?.unwrap();
    assert_eq!((saved.name.as_str(), saved.inventory_quantity), ("Renamed Mug", 7));
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_product_update_endpoint_after_checkout(pool: PgPool) -> anyhow::Result<()> {
    let mug = repo::products::insert(&pool, &product(1000, 10)).await?;
    checkout::place_order(&pool, checkout_request(mug.id, 3), "USD", &ShippingPolicy::default()).await?;

    let uri = format!("/api/v1/products/{}", mug.id);
    let (status, json) = send(&pool, "PUT", &uri, Some(json!({ "name": "Renamed Mug" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["inventory_quantity"], 7);

    let (status, json) = send(&pool, "PUT", &uri, Some(json!({ "inventory_quantity": 25 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["inventory_quantity"], 25);
    assert_eq!(stock(&pool, mug.id).await, 25);
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_cancel_restocks_items(pool: PgPool) -> anyhow::Result<()> {
    let mug = repo::products::insert(&pool, &product(1000, 10)).await?;
    let detail = checkout::place_order(&pool, checkout_request(mug.id, 3), "USD", &ShippingPolicy::default()).await?;
    assert_eq!(stock(&pool, mug.id).await, 7);

    let (order, previous) = checkout::change_status(&pool, detail.order.id, OrderStatus::Cancelled).await?;
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(previous, Some(OrderStatus::Pending));
    assert_eq!(stock(&pool, mug.id).await, 10);

    let (_, previous) = checkout::change_status(&pool, detail.order.id, OrderStatus::Cancelled).await?;
    assert_eq!(previous, None);
    assert_eq!(stock(&pool, mug.id).await, 10);
    Ok(())
}

// ==================== Sale maintenance ====================

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_restore_expired_sales(pool: PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut expired = product(700, 5);
    expired.original_price = Some(1000);
    expired.sale_end = Some(now - Duration::minutes(10));
    let expired = repo::products::insert(&pool, &expired).await?;
    let mut running = product(800, 5);
    running.original_price = Some(900);
    running.sale_end = Some(now + Duration::days(1));
    let running = repo::products::insert(&pool, &running).await?;

    let dry = sales::restore_expired(&pool, &EventPublisher::disabled(), now, true).await?;
    assert_eq!(dry.restored.len(), 1);
    assert_eq!(repo::products::get(&pool, expired.id).await?.unwrap().price, 700);

    let restored = repo::products::restore_expired_sales(&pool, now).await?;
    assert_eq!(restored, vec![(expired.id, 1000)]);

    let saved = repo::products::get(&pool, expired.id).await?.unwrap();
    assert_eq!((saved.price, saved.original_price, saved.sale_end), (1000, None, None));
    let untouched = repo::products::get(&pool, running.id).await?.unwrap();
    assert_eq!((untouched.price, untouched.original_price), (800, Some(900)));
    Ok(())
}

// ==================== Catalog ====================

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_referenced_taxonomy_delete_conflicts(pool: PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let category = repo::catalog::insert_category(&pool, &Category {
        id: Uuid::now_v7(), name: "Kitchen".into(), slug: "kitchen".into(), description: None,
        parent_id: None, image_url: None, created_at: now,
    })
    .await?;
    let brand = repo::catalog::insert_brand(&pool, &Brand {
        id: Uuid::now_v7(), name: "Acme".into(), slug: "acme".into(), logo_url: None, created_at: now,
    })
    .await?;
    let company = repo::catalog::insert_company(&pool, &Company {
        id: Uuid::now_v7(), name: "Acme Goods".into(), slug: "acme-goods".into(), email: None, phone: None,
        logo_url: None, description: None, created_at: now,
    })
    .await?;
    let mut mug = product(1000, 1);
    mug.category_id = Some(category.id);
    mug.brand_id = Some(brand.id);
    mug.company_id = Some(company.id);
    repo::products::insert(&pool, &mug).await?;

    for uri in [
        format!("/api/v1/categories/{}", category.id),
        format!("/api/v1/brands/{}", brand.id),
        format!("/api/v1/companies/{}", company.id),
    ] {
        let (status, json) = send(&pool, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        assert!(json["error"].as_str().unwrap().ends_with("is still referenced"));
    }
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_category_cycle_rejected(pool: PgPool) -> anyhow::Result<()> {
    let (_, a) = send(&pool, "POST", "/api/v1/categories", Some(json!({ "name": "Home" }))).await;
    let (_, b) = send(&pool, "POST", "/api/v1/categories", Some(json!({ "name": "Kitchen", "parent_id": a["id"] }))).await;
    let (_, c) = send(&pool, "POST", "/api/v1/categories", Some(json!({ "name": "Mugs", "parent_id": b["id"] }))).await;

    let uri = format!("/api/v1/categories/{}", a["id"].as_str().unwrap());
    let (status, _) = send(&pool, "PUT", &uri, Some(json!({ "name": "Home", "parent_id": c["id"] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/categories/{}", c["id"].as_str().unwrap());
    let (status, _) = send(&pool, "PUT", &uri, Some(json!({ "name": "Mugs", "parent_id": a["id"] }))).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_menu_cycle_rejected(pool: PgPool) -> anyhow::Result<()> {
    let (_, shop) = send(&pool, "POST", "/api/v1/menu", Some(json!({ "label": "Shop", "url": "/shop" }))).await;
    let (_, sale) =
        send(&pool, "POST", "/api/v1/menu", Some(json!({ "label": "Sale", "url": "/sale", "parent_id": shop["id"] }))).await;

    let uri = format!("/api/v1/menu/{}", shop["id"].as_str().unwrap());
    let (status, _) = send(&pool, "PUT", &uri, Some(json!({ "label": "Shop", "url": "/shop", "parent_id": sale["id"] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

// ==================== Customers ====================

#[sqlx::test]
#[ignore = "needs DATABASE_URL"]
async fn test_login_failures_look_alike(pool: PgPool) -> anyhow::Result<()> {
    let body = json!({ "name": "Ann", "email": "Ann@Example.com", "password": "correct horse" });
    let (status, json) = send(&pool, "POST", "/api/v1/customers", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json.get("password_hash").is_none());

    let (status, json) =
        send(&pool, "POST", "/api/v1/auth/login", Some(json!({ "email": "ann@example.com", "password": "correct horse" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "ann@example.com");

    let wrong_password =
        send(&pool, "POST", "/api/v1/auth/login", Some(json!({ "email": "ann@example.com", "password": "wrong" }))).await;
    let unknown_email =
        send(&pool, "POST", "/api/v1/auth/login", Some(json!({ "email": "bob@example.com", "password": "wrong" }))).await;
    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    Ok(())
}
