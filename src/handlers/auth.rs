use axum::{http::HeaderMap, http::StatusCode, Json};

use crate::error::{ErrorKind, TierError};
use crate::handlers::{api_error, bearer_token, tier_error, ApiError};
use crate::models::auth::{AuthUser, LoginRequest, Session};
use crate::services::auth::{mock_login, mock_user_for_token};

pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<Session>, ApiError> {
    match mock_login(&request.email, &request.password) {
        Some(session) => {
            tracing::info!(user_id = %session.user.id, "Issued session");
            Ok(Json(session))
        }
        None => Err(api_error(
            StatusCode::UNAUTHORIZED,
            ErrorKind::Unauthorized,
            "Invalid email or password",
        )),
    }
}

pub async fn me(headers: HeaderMap) -> Result<Json<AuthUser>, ApiError> {
    bearer_token(&headers)
        .and_then(mock_user_for_token)
        .map(Json)
        .ok_or_else(|| tier_error(TierError::Unauthorized))
}
