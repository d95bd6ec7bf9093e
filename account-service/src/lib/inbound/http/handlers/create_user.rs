use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserDraft;
use crate::inbound::http::router::AppState;

/// Register a new account.
///
/// The body is a raw [`UserDraft`]; validation and hashing happen in the
/// domain service so the plaintext password never reaches storage.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserDraft>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(draft) = body?;

    state
        .user_service
        .create_user(draft)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}
