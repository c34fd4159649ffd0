use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{extract::{Json, Path, Query}, orders::OrderListParams, AppState};
use crate::domain::aggregates::{CustomerUser, Order, PasswordHash};
use crate::error::{ApiError, ApiResult};
use crate::repo::{self, Paginated};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

pub async fn register(State(s): State<AppState>, Json(r): Json<RegisterRequest>) -> ApiResult<(StatusCode, Json<CustomerUser>)> {
    r.validate()?;
    let customer = CustomerUser {
        id: Uuid::now_v7(),
        name: r.name.trim().to_string(),
        email: r.email.trim().to_lowercase(),
        password_hash: PasswordHash::create(&r.password).as_str().to_string(),
        phone: r.phone,
        address: r.address,
        created_at: Utc::now(),
    };
    let customer = repo::customers::insert(&s.db, &customer).await.map_err(|e| ApiError::from_write(e, "Customer"))?;
    tracing::info!(customer_id = %customer.id, "customer registered");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> ApiResult<Json<CustomerUser>> {
    r.validate()?;
    let Some(customer) = repo::customers::find_by_email(&s.db, &r.email).await? else {
        PasswordHash::decoy().verify(&r.password);
        return Err(ApiError::Unauthorized);
    };
    if !customer.check_password(&r.password) {
        tracing::warn!(customer_id = %customer.id, "failed login");
        return Err(ApiError::Unauthorized);
    }
    tracing::info!(customer_id = %customer.id, "customer logged in");
    Ok(Json(customer))
}

pub async fn get_customer(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<CustomerUser>> {
    repo::customers::get(&s.db, id).await?.map(Json).ok_or(ApiError::NotFound("Customer"))
}

pub async fn customer_orders(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Query(p): Query<OrderListParams>,
) -> ApiResult<Json<Paginated<Order>>> {
    repo::customers::get(&s.db, id).await?.ok_or(ApiError::NotFound("Customer"))?;
    let mut filter = p.filter();
    filter.customer_id = Some(id);
    Ok(Json(repo::orders::list(&s.db, &filter, p.page()).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::tests::send;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_short_password_rejected() {
        let body = json!({ "name": "Ann", "email": "ann@example.com", "password": "short" });
        let (status, _) = send("POST", "/api/v1/customers", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let (status, _) = send("POST", "/api/v1/auth/login", Some(json!({ "email": "", "password": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
