use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{extract::{Json, Path, Query}, products::ProductListParams, AppState};
use crate::domain::aggregates::{Brand, Category, Company, ProductView};
use crate::domain::value_objects::slugify;
use crate::error::{ApiError, ApiResult};
use crate::repo::{self, catalog::Taxonomy, Paginated};

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrandRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Slug for a display name; names without any letters or digits are rejected.
fn slug_for(name: &str) -> ApiResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ApiError::Validation(format!("Name {name:?} needs at least one letter or digit")));
    }
    Ok(slug)
}

async fn remove(s: &AppState, kind: Taxonomy, id: Uuid) -> ApiResult<StatusCode> {
    let deleted = repo::catalog::delete(&s.db, kind, id).await.map_err(|e| ApiError::from_write(e, kind.label()))?;
    if !deleted { return Err(ApiError::NotFound(kind.label())); }
    tracing::info!(%id, kind = kind.label(), "catalog entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Categories

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(repo::catalog::list_categories(&s.db).await?))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Category>> {
    repo::catalog::get_category(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Category"))
}

pub async fn create_category(State(s): State<AppState>, Json(r): Json<CategoryRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
    r.validate()?;
    let category = Category {
        id: Uuid::now_v7(),
        slug: slug_for(&r.name)?,
        name: r.name.trim().to_string(),
        description: r.description,
        parent_id: r.parent_id,
        image_url: r.image_url,
        created_at: Utc::now(),
    };
    let category = repo::catalog::insert_category(&s.db, &category).await.map_err(|e| ApiError::from_write(e, "Category"))?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<CategoryRequest>) -> ApiResult<Json<Category>> {
    r.validate()?;
    if r.parent_id == Some(id) {
        return Err(ApiError::Validation("A category cannot be its own parent".into()));
    }
    let mut category = repo::catalog::get_category(&s.db, id).await?.ok_or(ApiError::NotFound("Category"))?;
    if let Some(parent) = r.parent_id {
        if repo::catalog::category_descends_from(&s.db, parent, id).await? {
            return Err(ApiError::Validation(format!("Category {parent} is a subcategory of this category")));
        }
    }
    category.slug = slug_for(&r.name)?;
    category.name = r.name.trim().to_string();
    category.description = r.description;
    category.parent_id = r.parent_id;
    category.image_url = r.image_url;
    repo::catalog::update_category(&s.db, &category)
        .await
        .map_err(|e| ApiError::from_write(e, "Category"))?
        .map(Json)
        .ok_or(ApiError::NotFound("Category"))
}

pub async fn delete_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    remove(&s, Taxonomy::Category, id).await
}

// Brands

pub async fn list_brands(State(s): State<AppState>) -> ApiResult<Json<Vec<Brand>>> {
    Ok(Json(repo::catalog::list_brands(&s.db).await?))
}

pub async fn get_brand(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Brand>> {
    repo::catalog::get_brand(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Brand"))
}

pub async fn create_brand(State(s): State<AppState>, Json(r): Json<BrandRequest>) -> ApiResult<(StatusCode, Json<Brand>)> {
    r.validate()?;
    let brand = Brand { id: Uuid::now_v7(), slug: slug_for(&r.name)?, name: r.name.trim().to_string(), logo_url: r.logo_url, created_at: Utc::now() };
    let brand = repo::catalog::insert_brand(&s.db, &brand).await.map_err(|e| ApiError::from_write(e, "Brand"))?;
    tracing::info!(brand_id = %brand.id, slug = %brand.slug, "brand created");
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<BrandRequest>) -> ApiResult<Json<Brand>> {
    r.validate()?;
    let mut brand = repo::catalog::get_brand(&s.db, id).await?.ok_or(ApiError::NotFound("Brand"))?;
    brand.slug = slug_for(&r.name)?;
    brand.name = r.name.trim().to_string();
    brand.logo_url = r.logo_url;
    repo::catalog::update_brand(&s.db, &brand)
        .await
        .map_err(|e| ApiError::from_write(e, "Brand"))?
        .map(Json)
        .ok_or(ApiError::NotFound("Brand"))
}

pub async fn delete_brand(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    remove(&s, Taxonomy::Brand, id).await
}

// Companies

pub async fn list_companies(State(s): State<AppState>) -> ApiResult<Json<Vec<Company>>> {
    Ok(Json(repo::catalog::list_companies(&s.db).await?))
}

pub async fn get_company(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Company>> {
    repo::catalog::get_company(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Company"))
}

pub async fn create_company(State(s): State<AppState>, Json(r): Json<CompanyRequest>) -> ApiResult<(StatusCode, Json<Company>)> {
    r.validate()?;
    let company = Company {
        id: Uuid::now_v7(),
        slug: slug_for(&r.name)?,
        name: r.name.trim().to_string(),
        email: r.email.map(|e| e.trim().to_lowercase()),
        phone: r.phone,
        logo_url: r.logo_url,
        description: r.description,
        created_at: Utc::now(),
    };
    let company = repo::catalog::insert_company(&s.db, &company).await.map_err(|e| ApiError::from_write(e, "Company"))?;
    tracing::info!(company_id = %company.id, slug = %company.slug, "company created");
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<CompanyRequest>) -> ApiResult<Json<Company>> {
    r.validate()?;
    let mut company = repo::catalog::get_company(&s.db, id).await?.ok_or(ApiError::NotFound("Company"))?;
    company.slug = slug_for(&r.name)?;
    company.name = r.name.trim().to_string();
    company.email = r.email.map(|e| e.trim().to_lowercase());
    company.phone = r.phone;
    company.logo_url = r.logo_url;
    company.description = r.description;
    repo::catalog::update_company(&s.db, &company)
        .await
        .map_err(|e| ApiError::from_write(e, "Company"))?
        .map(Json)
        .ok_or(ApiError::NotFound("Company"))
}

pub async fn delete_company(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    remove(&s, Taxonomy::Company, id).await
}

/// Company dashboard listing: every product of the company, inactive ones included.
pub async fn company_products(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Query(p): Query<ProductListParams>,
) -> ApiResult<Json<Paginated<ProductView>>> {
    repo::catalog::get_company(&s.db, id).await?.ok_or(ApiError::NotFound("Company"))?;
    let mut filter = p.filter();
    filter.company_id = Some(id);
    filter.include_inactive = true;
    let now = Utc::now();
    let products = repo::products::list(&s.db, &filter, p.page(), now).await?;
    Ok(Json(products.map(|product| product.view(now))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::send;
    use serde_json::json;

    #[test]
    fn test_slug_for() {
        assert_eq!(slug_for("Kitchen & Dining").unwrap(), "kitchen-dining");
        assert!(matches!(slug_for("***"), Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_category_cannot_parent_itself() {
        let id = Uuid::now_v7();
        let (status, json) = send("PUT", &format!("/api/v1/categories/{id}"), Some(json!({ "name": "Shoes", "parent_id": id }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "A category cannot be its own parent");
    }

    #[tokio::test]
    async fn test_company_email_is_validated() {
        let (status, _) = send("POST", "/api/v1/companies", Some(json!({ "name": "Acme", "email": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_symbol_only_brand_name_rejected() {
        let (status, _) = send("POST", "/api/v1/brands", Some(json!({ "name": "!!!" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
