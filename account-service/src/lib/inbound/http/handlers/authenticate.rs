use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::INTERNAL_ERROR;
use super::INVALID_CREDENTIALS;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const LOGIN_SUCCESSFUL: &str = "Login successful";

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body?;

    let user = match state.user_service.get_user_by_email(&body.email).await {
        Ok(user) => user,
        Err(UserError::NotFoundByEmail(_)) => {
            return Err(reject_unknown_email(&state, &body.password));
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    let result = state
        .authenticator
        .authenticate(&body.password, &user.password_hash, user.id.value())
        .map_err(|e| match e {
            auth::AuthenticationError::InvalidCredentials => {
                tracing::info!(user_id = %user.id, "Login rejected");
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            auth::AuthenticationError::PasswordError(err) => {
                tracing::error!(user_id = %user.id, error = %err, "Password verification failed");
                ApiError::InternalServerError(INTERNAL_ERROR.to_string())
            }
            auth::AuthenticationError::JwtError(err) => {
                tracing::error!(user_id = %user.id, error = %err, "Token generation failed");
                ApiError::InternalServerError(INTERNAL_ERROR.to_string())
            }
        })?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            message: LOGIN_SUCCESSFUL.to_string(),
            token: result.access_token,
        },
    ))
}

/// Unknown emails pay for a password verification too, then get the same
/// 401 as a wrong password.
fn reject_unknown_email(state: &AppState, password: &str) -> ApiError {
    match state.authenticator.reject_unknown_user(password) {
        auth::AuthenticationError::InvalidCredentials => {
            tracing::debug!("Login rejected for unknown email");
            ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
        }
        err => {
            tracing::error!(error = %err, "Decoy password verification failed");
            ApiError::InternalServerError(INTERNAL_ERROR.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub message: String,
    pub token: String,
}
