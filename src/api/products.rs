use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::{extract::{Json, Path, Query}, AppState};
use crate::domain::aggregates::{Product, ProductView, SalePrice};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Sku;
use crate::error::{ApiError, ApiResult};
use crate::repo::{self, products::ProductFilter, Page, Paginated};

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub brand: Option<Uuid>,
    pub company: Option<Uuid>,
    pub search: Option<String>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl ProductListParams {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category_id: self.category,
            brand_id: self.brand,
            company_id: self.company,
            search: self.search.clone(),
            on_sale: self.on_sale,
            featured: self.featured,
            include_inactive: self.include_inactive,
        }
    }

    pub fn page(&self) -> Page { Page::new(self.page, self.per_page) }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub inventory_quantity: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Fields left out keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub inventory_quantity: Option<i32>,
    #[validate(length(max = 20))]
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StartSaleRequest {
    pub price: Option<i64>,
    pub percent_off: Option<u8>,
    pub ends_at: DateTime<Utc>,
}

impl StartSaleRequest {
    pub fn sale_price(&self) -> ApiResult<SalePrice> {
        match (self.price, self.percent_off) {
            (Some(p), None) => Ok(SalePrice::Price(p)),
            (None, Some(pct)) => Ok(SalePrice::PercentOff(pct)),
            _ => Err(ApiError::Validation("Provide exactly one of price or percent_off".into())),
        }
    }
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ProductListParams>) -> ApiResult<Json<Paginated<ProductView>>> {
    let now = Utc::now();
    let products = repo::products::list(&s.db, &p.filter(), p.page(), now).await?;
    Ok(Json(products.map(|product| product.view(now))))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<ProductView>> {
    let product = repo::products::get(&s.db, id).await?.ok_or(ApiError::NotFound("Product"))?;
    Ok(Json(product.view(Utc::now())))
}

pub async fn create_product(State(s): State<AppState>, Json(r): Json<CreateProductRequest>) -> ApiResult<(StatusCode, Json<ProductView>)> {
    r.validate()?;
    let sku = match r.sku.as_deref() {
        Some(sku) => Sku::new(sku)?,
        None => Sku::generate(),
    };
    let now = Utc::now();
    let product = Product {
        id: Uuid::now_v7(),
        sku: sku.to_string(),
        name: r.name.trim().to_string(),
        description: r.description,
        price: r.price,
        original_price: None,
        sale_end: None,
        currency: s.currency.clone(),
        category_id: r.category_id,
        brand_id: r.brand_id,
        company_id: r.company_id,
        inventory_quantity: r.inventory_quantity.unwrap_or(0),
        images: r.images,
        featured: r.featured,
        active: true,
        created_at: now,
        updated_at: now,
    };
    let product = repo::products::insert(&s.db, &product).await.map_err(|e| ApiError::from_write(e, "Product"))?;
    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
    s.events.publish(DomainEvent::Product(ProductEvent::Created { product_id: product.id, sku: product.sku.clone() })).await;
    Ok((StatusCode::CREATED, Json(product.view(now))))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<UpdateProductRequest>) -> ApiResult<Json<ProductView>> {
    r.validate()?;
    let now = Utc::now();
    let product = save_locked(&s.db, id, |product| apply_update(product, r, now)).await?;
    tracing::info!(product_id = %id, "product updated");
    s.events.publish(DomainEvent::Product(ProductEvent::Updated { product_id: id })).await;
    Ok(Json(product.view(now)))
}

/// Locks the row, applies `change` and writes it back in one transaction, so
/// concurrent checkouts and restocks are never overwritten.
async fn save_locked(db: &PgPool, id: Uuid, change: impl FnOnce(&mut Product) -> ApiResult<()>) -> ApiResult<Product> {
    let mut tx = db.begin().await?;
    let mut product = repo::products::lock(&mut *tx, id).await?.ok_or(ApiError::NotFound("Product"))?;
    let stock = product.inventory_quantity;
    change(&mut product)?;
    let mut saved = repo::products::update(&mut *tx, &product)
        .await
        .map_err(|e| ApiError::from_write(e, "Product"))?
        .ok_or(ApiError::NotFound("Product"))?;
    if product.inventory_quantity != stock {
        repo::products::set_inventory(&mut *tx, id, product.inventory_quantity).await?;
        saved.inventory_quantity = product.inventory_quantity;
    }
    tx.commit().await?;
    Ok(saved)
}

fn apply_update(product: &mut Product, r: UpdateProductRequest, now: DateTime<Utc>) -> ApiResult<()> {
    if let Some(sku) = r.sku { product.sku = Sku::new(sku)?.to_string(); }
    if let Some(name) = r.name { product.name = name.trim().to_string(); }
    if let Some(description) = r.description { product.description = Some(description); }
    if let Some(price) = r.price { product.set_list_price(price, now)?; }
    if let Some(id) = r.category_id { product.category_id = Some(id); }
    if let Some(id) = r.brand_id { product.brand_id = Some(id); }
    if let Some(id) = r.company_id { product.company_id = Some(id); }
    if let Some(qty) = r.inventory_quantity { product.inventory_quantity = qty; }
    if let Some(images) = r.images { product.images = images; }
    if let Some(featured) = r.featured { product.featured = featured; }
    if let Some(active) = r.active { product.active = active; }
    product.updated_at = now;
    Ok(())
}

/// Soft delete: the product stays referenced by past orders.
pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !repo::products::deactivate(&s.db, id).await? {
        return Err(ApiError::NotFound("Product"));
    }
    tracing::info!(product_id = %id, "product deactivated");
    s.events.publish(DomainEvent::Product(ProductEvent::Deactivated { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_sale(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<StartSaleRequest>) -> ApiResult<Json<ProductView>> {
    let sale = r.sale_price()?;
    let now = Utc::now();
    let product = save_locked(&s.db, id, |product| Ok(product.start_sale(sale, r.ends_at, now)?)).await?;
    let original_price = product.list_price();
    tracing::info!(product_id = %id, price = product.price, original_price, sale_end = %r.ends_at, "sale started");
    s.events
        .publish(DomainEvent::Product(ProductEvent::SaleStarted { product_id: id, price: product.price, original_price, sale_end: r.ends_at }))
        .await;
    Ok(Json(product.view(now)))
}

pub async fn end_sale(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<ProductView>> {
    let product = save_locked(&s.db, id, |product| Ok(product.end_sale()?)).await?;
    tracing::info!(product_id = %id, price = product.price, "sale ended");
    s.events.publish(DomainEvent::Product(ProductEvent::SaleEnded { product_id: id, price: product.price })).await;
    Ok(Json(product.view(Utc::now())))
}
