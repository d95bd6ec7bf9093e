use axum::extract::rejection::JsonRejection;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::validation::ValidationCode;
use crate::domain::user::validation::ValidationError;
use crate::user::errors::UserError;

pub mod authenticate;
pub mod create_user;
pub mod delete_user;
pub mod get_user;
pub mod get_user_by_nickname;
pub mod list_users;
pub mod update_user;

pub const INVALID_BODY: &str = "invalid request body format";
pub const INVALID_USER_ID: &str = "invalid user ID";
pub const INVALID_NICKNAME: &str = "invalid user nickname";
pub const USER_NOT_FOUND: &str = "user not found";
pub const INVALID_CREDENTIALS: &str = "invalid email or password";
pub const UNAUTHORIZED: &str = "unauthorized access";
pub const FORBIDDEN: &str = "forbidden access";
pub const INTERNAL_ERROR: &str = "internal server error occurred";
pub const NOT_SUPPORTED: &str = "operation not supported";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Handler failure, rendered by [`render_errors`] once the request path is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Validation(ValidationError),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    NotImplemented(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(err) => &err.message,
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotImplemented(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        Self::BadRequest(INVALID_BODY.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Extension(self)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(err) => ApiError::Validation(err),
            UserError::NotFound(_)
            | UserError::NotFoundByNickname(_)
            | UserError::NotFoundByEmail(_) => ApiError::NotFound(USER_NOT_FOUND.to_string()),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                ApiError::Conflict(err.to_string())
            }
            UserError::Unsupported(operation) => {
                tracing::warn!(operation, "Operation not supported by storage backend");
                ApiError::NotImplemented(NOT_SUPPORTED.to_string())
            }
            UserError::StorageUnavailable(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Storage failure");
                ApiError::InternalServerError(INTERNAL_ERROR.to_string())
            }
        }
    }
}

/// Middleware that turns an [`ApiError`] left in the response extensions into
/// the JSON error body, tagged with the path of the failed request.
pub async fn render_errors(req: Request, next: Next) -> Response {
    let url = req.uri().path().to_string();
    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<ApiError>() {
        Some(error) => (error.status(), Json(ApiErrorBody::new(url, &error))).into_response(),
        None => response,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ValidationCode>,
}

impl ApiErrorBody {
    pub fn new(url: String, error: &ApiError) -> Self {
        let (field, code) = match error {
            ApiError::Validation(err) => (Some(err.field), Some(err.code)),
            _ => (None, None),
        };

        Self {
            url,
            kind: error.status().as_u16(),
            message: error.message().to_string(),
            field,
            code,
        }
    }
}

/// Parse the `{id}` path segment of a user route.
pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::from_string(raw).map_err(|e| {
        tracing::debug!(error = %e, raw, "Rejected user id");
        ApiError::BadRequest(INVALID_USER_ID.to_string())
    })
}

/// Public view of a user record. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: u64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}
