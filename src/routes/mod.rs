use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::middleware::{self, csrf::CsrfConfig};

pub mod todo;
pub mod todo_status;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub csrf: Arc<CsrfConfig>,
}

impl AppState {
    pub fn new(db: Database, csrf: CsrfConfig) -> Self {
        Self {
            db,
            csrf: Arc::new(csrf),
        }
    }
}

/// The full application: routes, then CSRF, then CORS, then request tracing.
/// Collection routes answer with and without a trailing slash.
pub fn router(state: AppState) -> Router {
    let csrf = axum::middleware::from_fn_with_state(Arc::clone(&state.csrf), middleware::csrf::csrf);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/todo", get(todo::list).post(todo::create))
        .route("/todo/", get(todo::list).post(todo::create))
        .route("/todo/done/:todoId", put(todo::set_done))
        .route(
            "/todo/:todoId",
            get(todo::detail).patch(todo::update).delete(todo::delete),
        )
        .route("/todo_status", get(todo_status::list).post(todo_status::create))
        .route("/todo_status/", get(todo_status::list).post(todo_status::create))
        .route(
            "/todo_status/:todoStatusId",
            axum::routing::patch(todo_status::update).delete(todo_status::delete),
        )
        .with_state(state)
        .layer(csrf)
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
}
