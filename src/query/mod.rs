//! Read-only query service over a catalog snapshot
//!
//! The catalog file is loaded once into a [`CatalogIndex`] at startup and
//! never reloaded; a new crawl is picked up by restarting the service.

mod index;
mod routes;

pub use index::{health, CatalogIndex, SearchCriteria};
pub use routes::{router, serve, AppState};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced to query-service callers
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Book not found: {0}")]
    NotFound(u32),

    #[error("No books match the given criteria")]
    NoMatch,

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::NoMatch => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
