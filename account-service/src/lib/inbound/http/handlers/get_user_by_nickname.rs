use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use super::INVALID_NICKNAME;
use crate::inbound::http::router::AppState;

pub async fn get_user_by_nickname(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(ApiError::BadRequest(INVALID_NICKNAME.to_string()));
    }

    state
        .user_service
        .get_user_by_nickname(nickname)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
