use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::DocumentStore;

pub fn create_router<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Converter settings
        .route(
            "/config",
            get(handlers::get_config::<S>).put(handlers::update_config::<S>),
        )
        // Scan + convert cycle
        .route("/scan", post(handlers::scan::<S>))
        .route("/convert", post(handlers::convert::<S>))
}
