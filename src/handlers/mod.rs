//! Reference HTTP backend speaking the remote-tier contract.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorKind, TierError};
use crate::models::auth::ErrorResponse;
use crate::models::entity::EntityKind;
use crate::services::auth::mock_user_for_token;
use crate::AppState;

pub mod auth;
pub mod files;
pub mod records;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> ApiError {
    let code = serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string));
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code,
        }),
    )
}

pub fn tier_error(err: TierError) -> ApiError {
    let (status, kind) = match &err {
        TierError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorKind::NotFound),
        TierError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorKind::ValidationFailure),
        TierError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorKind::Unauthorized),
        TierError::Transport(_) => (StatusCode::SERVICE_UNAVAILABLE, ErrorKind::TransportFailure),
    };
    api_error(status, kind, err.to_string())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.require_auth {
        let known = bearer_token(request.headers()).and_then(mock_user_for_token);
        if known.is_none() {
            return Err(tier_error(TierError::Unauthorized));
        }
    }
    Ok(next.run(request).await)
}

fn collection_router(kind: EntityKind) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(records::list_records).post(records::create_record))
        .route(
            "/{id}",
            get(records::get_record)
                .patch(records::update_record)
                .delete(records::delete_record),
        )
        .route("/{id}/status", patch(records::set_status));

    if kind == EntityKind::File {
        router = router
            .route("/{id}/views", patch(records::increment_views))
            .route("/upload", post(files::upload_file))
            .route("/extract/{id}", post(files::extract_products));
    }

    router.layer(Extension(kind))
}

/// Routes mounted under `/api`
pub fn router(state: AppState) -> Router {
    let mut collections = Router::new();
    for kind in EntityKind::ALL {
        collections = collections.nest(&format!("/{}", kind.collection()), collection_router(kind));
    }
    let collections =
        collections.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .merge(collections);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
