//! HTTP surface over the car store.
//!
//! Routes:
//! - `GET /health`
//! - `POST /cars`, `GET /cars`
//! - `GET|PUT|PATCH|DELETE /cars/:id`

pub mod error;
pub mod handlers;

use crate::store::CarStore;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CarStore>,
}

impl AppState {
    pub fn new(store: Arc<CarStore>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route(
            "/cars",
            get(handlers::list_cars).post(handlers::create_car),
        )
        .route(
            "/cars/:id",
            get(handlers::get_car)
                .put(handlers::replace_car)
                .patch(handlers::patch_car)
                .delete(handlers::delete_car),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
