use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::router::AppState;

/// List every user, or `204 No Content` when there are none.
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state.user_service.list_users().await?;

    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let data: Vec<UserData> = users.iter().map(UserData::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, data).into_response())
}
