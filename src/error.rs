//! Error types shared by the stores, the update cycle and the web layer.

/// Failure of a dataset store
///
/// Store errors are fatal for the cycle that hit them; nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot could not be encoded or decoded: {0}")]
    Codec(#[from] bincode::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous cycle panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

/// Top level error surfaced to users of the dashboard
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(feature = "web")]
mod response {
    use super::DashboardError;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde::Serialize;

    #[derive(Serialize)]
    struct ErrorBody {
        status: String,
        message: String,
    }

    impl IntoResponse for DashboardError {
        fn into_response(self) -> Response {
            log::error!("request failed: {}", self);
            let body = ErrorBody {
                status: "error".to_string(),
                message: self.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
