use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{extract::{Json, Path, Query}, AppState};
use crate::domain::aggregates::{CarouselSlide, MenuItem};
use crate::error::{ApiError, ApiResult};
use crate::repo;

#[derive(Debug, Default, Deserialize)]
pub struct VisibilityParams {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SlideRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub subtitle: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub image_url: String,
    #[validate(length(max = 2000))]
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MenuItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub label: String,
    #[validate(length(min = 1, max = 2000))]
    pub url: String,
    #[serde(default)]
    pub position: i32,
    pub parent_id: Option<Uuid>,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool { true }

impl SlideRequest {
    fn into_slide(self, id: Uuid) -> CarouselSlide {
        CarouselSlide {
            id,
            title: self.title.trim().to_string(),
            subtitle: self.subtitle,
            image_url: self.image_url,
            link_url: self.link_url,
            position: self.position,
            active: self.active,
        }
    }
}

impl MenuItemRequest {
    fn into_item(self, id: Uuid) -> ApiResult<MenuItem> {
        if self.parent_id == Some(id) {
            return Err(ApiError::Validation("A menu item cannot be its own parent".into()));
        }
        Ok(MenuItem { id, label: self.label.trim().to_string(), url: self.url, position: self.position, parent_id: self.parent_id, active: self.active })
    }
}

// Carousel

pub async fn list_slides(State(s): State<AppState>, Query(v): Query<VisibilityParams>) -> ApiResult<Json<Vec<CarouselSlide>>> {
    Ok(Json(repo::content::list_slides(&s.db, v.all).await?))
}

pub async fn get_slide(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<CarouselSlide>> {
    repo::content::get_slide(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Slide"))
}

pub async fn create_slide(State(s): State<AppState>, Json(r): Json<SlideRequest>) -> ApiResult<(StatusCode, Json<CarouselSlide>)> {
    r.validate()?;
    let slide = repo::content::upsert_slide(&s.db, &r.into_slide(Uuid::now_v7())).await?;
    tracing::info!(slide_id = %slide.id, "carousel slide created");
    Ok((StatusCode::CREATED, Json(slide)))
}

pub async fn update_slide(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<SlideRequest>) -> ApiResult<Json<CarouselSlide>> {
    r.validate()?;
    repo::content::get_slide(&s.db, id).await?.ok_or(ApiError::NotFound("Slide"))?;
    Ok(Json(repo::content::upsert_slide(&s.db, &r.into_slide(id)).await?))
}

pub async fn delete_slide(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !repo::content::delete_slide(&s.db, id).await? { return Err(ApiError::NotFound("Slide")); }
    tracing::info!(slide_id = %id, "carousel slide deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Menu

pub async fn list_menu(State(s): State<AppState>, Query(v): Query<VisibilityParams>) -> ApiResult<Json<Vec<MenuItem>>> {
    Ok(Json(repo::content::list_menu(&s.db, v.all).await?))
}

pub async fn get_menu_item(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<MenuItem>> {
    repo::content::get_menu_item(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Menu item"))
}

pub async fn create_menu_item(State(s): State<AppState>, Json(r): Json<MenuItemRequest>) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    r.validate()?;
    let item = r.into_item(Uuid::now_v7())?;
    let item = repo::content::upsert_menu_item(&s.db, &item).await.map_err(|e| ApiError::from_write(e, "Menu item"))?;
    tracing::info!(menu_item_id = %item.id, "menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_menu_item(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<MenuItemRequest>) -> ApiResult<Json<MenuItem>> {
    r.validate()?;
    let item = r.into_item(id)?;
    repo::content::get_menu_item(&s.db, id).await?.ok_or(ApiError::NotFound("Menu item"))?;
    if let Some(parent) = item.parent_id {
        if repo::content::menu_item_descends_from(&s.db, parent, id).await? {
            return Err(ApiError::Validation(format!("Menu item {parent} is nested under this item")));
        }
    }
    Ok(Json(repo::content::upsert_menu_item(&s.db, &item).await.map_err(|e| ApiError::from_write(e, "Menu item"))?))
}

pub async fn delete_menu_item(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !repo::content::delete_menu_item(&s.db, id).await? { return Err(ApiError::NotFound("Menu item")); }
    tracing::info!(menu_item_id = %id, "menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}
