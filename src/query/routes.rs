//! HTTP routes of the query service
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /books` | every title |
//! | `GET /books/search?title=&category=` | matching records, 404 if none |
//! | `GET /books/{id}` | one record, 404 if unknown, 400 if not an integer |
//! | `GET /categories` | `{"categories": [...]}` |
//! | `GET /health` | `{"status": "ok"}`, 503 if the catalog file is unusable |

use crate::catalog::BookRecord;
use crate::config::Config;
use crate::query::{health, CatalogIndex, QueryError, SearchCriteria};
use crate::Result;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub index: Arc<CatalogIndex>,
    /// Catalog file the index was loaded from, re-checked by `/health`
    pub catalog_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(index: CatalogIndex, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            index: Arc::new(index),
            catalog_path: Arc::new(catalog_path.into()),
        }
    }
}

/// Builds the query service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/books", get(list_titles))
        .route("/books/search", get(search_books))
        .route("/books/:id", get(get_book))
        .route("/categories", get(list_categories))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads the catalog once and serves it until the process is stopped
pub async fn serve(config: &Config) -> Result<()> {
    let catalog_path = PathBuf::from(&config.output.catalog_path);
    let index = CatalogIndex::load(&catalog_path)?;
    let app = router(AppState::new(index, catalog_path));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!("Query service listening on {}", config.server.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.index.titles().into_iter().map(str::to_string).collect())
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> std::result::Result<Json<BookRecord>, QueryError> {
    state.index.get(id).cloned().map(Json)
}

async fn search_books(
    State(state): State<AppState>,
    Query(criteria): Query<SearchCriteria>,
) -> std::result::Result<Json<Vec<BookRecord>>, QueryError> {
    let found = state.index.search(&criteria)?;
    tracing::debug!(?criteria, "search matched {} books", found.len());
    Ok(Json(found.into_iter().cloned().collect()))
}

async fn list_categories(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "categories": state.index.categories() }))
}

async fn health_check(State(state): State<AppState>) -> std::result::Result<Json<Value>, QueryError> {
    health(&state.catalog_path)?;
    Ok(Json(json!({ "status": "ok" })))
}
