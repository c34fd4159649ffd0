use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use super::{extract::{Json, Query}, AppState};
use crate::error::ApiResult;
use crate::services::sales::{self, RestoreReport};

#[derive(Debug, Default, Deserialize)]
pub struct RestoreParams {
    #[serde(default)]
    pub dry_run: bool,
}

pub async fn restore_expired_sales(State(s): State<AppState>, Query(p): Query<RestoreParams>) -> ApiResult<Json<RestoreReport>> {
    Ok(Json(sales::restore_expired(&s.db, &s.events, Utc::now(), p.dry_run).await?))
}
