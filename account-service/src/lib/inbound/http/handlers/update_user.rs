use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;

use super::parse_user_id;
use super::ApiError;
use super::FORBIDDEN;
use crate::domain::user::models::UserDraft;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Replace the profile fields of the caller's own account.
///
/// Ownership is checked before the body is read, so a caller editing someone
/// else's record gets `403` even with a malformed payload.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<UserDraft>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let user_id = parse_user_id(&id)?;

    if caller.user_id != user_id {
        tracing::warn!(
            caller_id = %caller.user_id,
            target_id = %user_id,
            "Rejected update of another user's record"
        );
        return Err(ApiError::Forbidden(FORBIDDEN.to_string()));
    }

    let Json(draft) = body?;

    state.user_service.update_user(&user_id, draft).await?;

    Ok(StatusCode::NO_CONTENT)
}
