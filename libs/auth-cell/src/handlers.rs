use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::UserProfile;
use shared_utils::JsonBody;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::UserDirectoryService;

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let service = UserDirectoryService::new(&state.store);
    let profile = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let service = UserDirectoryService::new(&state.store);
    let profile = service.login(request).await?;

    Ok(Json(profile))
}
