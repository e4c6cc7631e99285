use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::warn;

use shared_models::error::AppError;

/// JSON body extractor. A body that fails to parse or deserialize is
/// rejected as a validation error with the shared error envelope.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                warn!("Rejected request body ({}): {}", rejection.status(), rejection.body_text());
                Err(AppError::ValidationError(rejection.body_text()))
            }
        }
    }
}
