use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .with_state(state)
}
