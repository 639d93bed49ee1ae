use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use validator::ValidationErrors;

use crate::{schema::{rules::FieldErrors, ApiResponse}, store::StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError{
    #[error("Cant bind to the Socket")]
    SocketBind,
    #[error("Cant connect to the DB")]
    DbConnect,
    #[error("Cant run the database migrations")]
    Migration,
    #[error("Cant start the server")]
    ServerStart,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => AppError::NotFound(entity),
            StoreError::Duplicate(message) => AppError::Duplicate(message),
            StoreError::Database(e) => {
                tracing::error!(error = %e, "database error");
                AppError::InternalError
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(FieldErrors::from(&errors).to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::Validation(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DbConnect
            | AppError::Migration
            | AppError::ServerStart
            | AppError::SocketBind
            | AppError::Config(_)
            | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
