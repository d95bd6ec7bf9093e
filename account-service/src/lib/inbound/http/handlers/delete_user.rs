use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_user_id;
use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

const USER_DELETED: &str = "User deleted successfully";

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let user_id = parse_user_id(&id)?;

    state.user_service.delete_user(&user_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData {
            message: USER_DELETED.to_string(),
        },
    ))
}
