use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors raised while handling a request. All of them surface as a plain 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("session data error: {0}")]
    Session(#[from] serde_json::Error),
    #[error("system random source failed")]
    Random,
}

impl From<ring::error::Unspecified> for AppError {
    fn from(_: ring::error::Unspecified) -> Self {
        AppError::Random
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("database initialization failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("system random source failed")]
    Random,
    #[error("server error: {0}")]
    Serve(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ring::error::Unspecified> for StartupError {
    fn from(_: ring::error::Unspecified) -> Self {
        StartupError::Random
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_is_an_internal_server_error() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
