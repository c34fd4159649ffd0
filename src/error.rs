//! HTTP-facing error type.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::domain::aggregates::{CartError, OrderError, ProductError, SaleError};
use crate::domain::value_objects::{MoneyError, SkuError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    Unauthorized,

    #[error("{0}")]
    Domain(String),

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Domain(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps unique and foreign key violations to `Conflict`, anything else stays a storage error.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some("23505") => return Self::Conflict(format!("{what} already exists")),
                Some("23503") => return Self::Conflict(format!("{what} is still referenced")),
                _ => {}
            }
        }
        Self::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

macro_rules! rejection {
    ($($ty:ty),*) => {$(
        impl From<$ty> for ApiError {
            fn from(e: $ty) -> Self { Self::Validation(e.body_text()) }
        }
    )*};
}

rejection!(JsonRejection, PathRejection, QueryRejection);

impl From<SkuError> for ApiError {
    fn from(e: SkuError) -> Self { Self::Validation(e.to_string()) }
}

macro_rules! domain_error {
    ($($ty:ty),*) => {$(
        impl From<$ty> for ApiError {
            fn from(e: $ty) -> Self { Self::Domain(e.to_string()) }
        }
    )*};
}

domain_error!(SaleError, OrderError, ProductError, CartError, MoneyError);
