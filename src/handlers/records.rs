use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ErrorKind, TierError};
use crate::handlers::{api_error, tier_error, ApiError};
use crate::models::customer::CustomerStatus;
use crate::models::entity::EntityKind;
use crate::models::file::FileStatus;
use crate::models::trader::TraderStatus;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Status values each collection accepts
pub fn validate_status(kind: EntityKind, status: &str) -> Result<String, String> {
    match kind {
        EntityKind::Customer => CustomerStatus::from_str(status).map(|s| s.to_string()),
        EntityKind::Trader => TraderStatus::from_str(status).map(|s| s.to_string()),
        EntityKind::File => FileStatus::from_str(status).map(|s| s.to_string()),
        EntityKind::Product => Err("products have no status".to_string()),
    }
}

/// Fill in the id and creation field when the client did not send them
fn complete_record(kind: EntityKind, record: &mut Value) -> Result<(), ApiError> {
    let Some(fields) = record.as_object_mut() else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorKind::ValidationFailure,
            "request body must be a JSON object",
        ));
    };

    fields
        .entry(kind.id_field())
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));

    let now = Utc::now();
    let created = if kind.created_is_timestamp() {
        now.to_rfc3339()
    } else {
        now.date_naive().to_string()
    };
    fields
        .entry(kind.created_field())
        .or_insert_with(|| Value::String(created));

    Ok(())
}

pub async fn list_records(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let records = state.tier.list(kind).await.map_err(tier_error)?;
    Ok(Json(records))
}

pub async fn get_record(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state.tier.get(kind, &id).await.map_err(tier_error)?;
    Ok(Json(record))
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Json(mut record): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    complete_record(kind, &mut record)?;
    let created = state.tier.insert(kind, record).await.map_err(tier_error)?;
    tracing::info!(entity = %kind, "Record created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let updated = state.tier.update(kind, &id, patch).await.map_err(tier_error)?;
    Ok(Json(updated))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.tier.delete(kind, &id).await.map_err(tier_error)?;
    tracing::info!(entity = %kind, id = %id, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = validate_status(kind, &request.status)
        .map_err(|e| tier_error(TierError::Validation(e)))?;
    let updated = state
        .tier
        .set_status(kind, &id, &status)
        .await
        .map_err(tier_error)?;
    Ok(Json(updated))
}

pub async fn increment_views(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let updated = state.tier.increment_views(&id).await.map_err(tier_error)?;
    Ok(Json(updated))
}
