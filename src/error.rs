use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{GeocodeError, StoreError};

/// Errors raised while turning request input into search inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),
}

impl SearchError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SearchError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        SearchError::NotFound(what.into())
    }
}

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("{0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("{message}")]
    Payload { error: &'static str, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("Geocoding failure: {0}")]
    Geocode(#[from] GeocodeError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Search(SearchError::Validation { .. }) | ApiError::Invalid(_) => {
                "validation_error"
            }
            ApiError::Search(SearchError::NotFound(_)) => "not_found",
            ApiError::Payload { error, .. } => error,
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Store(_) => "storage_error",
            ApiError::Geocode(_) => "geocoding_error",
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            ApiError::Search(SearchError::Validation { field, .. }) => Some(field.clone()),
            ApiError::Invalid(errors) => errors.field_errors().keys().next().map(|f| f.to_string()),
            _ => None,
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Search(SearchError::Validation { .. })
            | ApiError::Invalid(_)
            | ApiError::Payload { .. } => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Geocode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            field: self.field(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Payload {
        error: "invalid_json",
        message: format!("Invalid JSON: {}", err),
    }
    .into()
}

/// Handle query string errors such as non-numeric coordinates
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    ApiError::Payload {
        error: "invalid_query",
        message: format!("Invalid query: {}", err),
    }
    .into()
}

/// Handle malformed path segments such as a non-numeric id
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    ApiError::Search(SearchError::not_found(req.path().to_string())).into()
}
