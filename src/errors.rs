use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use aws_smithy_types::error::operation::BuildError as SmithyBuildError;
use thiserror::Error;
use uuid::Uuid;

// --- Catalog Store Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Meme not found with ID: {0}")]
    NotFound(Uuid),

    #[error("Stored meme data is corrupt: {0}")]
    DataCorruption(String),

    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid meme ID format: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Meme not found with ID: {0}")]
    MemeNotFound(Uuid),
    #[error("Catalog store unavailable")]
    StoreUnavailable(#[source] RepoError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::MemeNotFound(id),
            e @ (RepoError::DataCorruption(_) | RepoError::BackendError(_)) => {
                AppError::StoreUnavailable(e)
            }
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<SmithyBuildError> for AppError {
    fn from(err: SmithyBuildError) -> Self {
        AppError::InitError(format!("Failed to build AWS request: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(format!("IO error: {}", err))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidQuery(_) | AppError::InvalidInput(_) | AppError::InvalidUuid(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::MemeNotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_)
            | AppError::ConfigError(_)
            | AppError::InitError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            // 4xx Client Errors
            AppError::InvalidQuery(msg) => format!("Invalid search query: {}", msg),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidUuid(e) => format!("Invalid ID format: {}", e),
            AppError::MemeNotFound(id) => format!("Meme not found with ID: {}", id),

            // 5xx Server Errors
            AppError::StoreUnavailable(e) => {
                tracing::error!(error.source = ?e, "Catalog store error occurred");
                "Database operation failed".to_string()
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server configuration error".to_string()
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                "Server initialization error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "An internal server error occurred".to_string()
            }
        };

        if status.is_server_error() {
            tracing::error!(error.message = %error_message, error.status = %status, "Responding with error");
        } else {
            tracing::debug!(error.message = %error_message, error.status = %status, "Rejecting request");
        }

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        let err: AppError = RepoError::NotFound(id).into();
        assert!(matches!(err, AppError::MemeNotFound(found) if found == id));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_failure_is_a_server_error() {
        let err: AppError = RepoError::BackendError(anyhow::anyhow!("connection reset")).into();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn query_errors_are_client_errors() {
        assert_eq!(
            AppError::InvalidQuery("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidInput("page".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
