use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::handlers::{api_error, tier_error, ApiError};
use crate::models::file::FileUpload;
use crate::AppState;

fn bad_upload(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, ErrorKind::ValidationFailure, message)
}

/// Collect the `file` part and the optional `traderId` field
async fn read_upload(mut multipart: Multipart) -> Result<FileUpload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut trader_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_upload(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| bad_upload(e.body_text()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("traderId") => {
                let text = field.text().await.map_err(|e| bad_upload(e.body_text()))?;
                trader_id = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    let (file_name, content) = file.ok_or_else(|| bad_upload("file is required"))?;
    let upload = FileUpload {
        file_name,
        content,
        trader_id,
    };
    upload.validate().map_err(bad_upload)?;
    Ok(upload)
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let upload = read_upload(multipart).await?;
    let id = Uuid::new_v4().to_string();
    let created = state.tier.upload_file(&upload, &id).await.map_err(tier_error)?;
    tracing::info!(
        file = %upload.file_name,
        bytes = upload.content.len(),
        "File uploaded"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn extract_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state.tier.extract_products(&id).await.map_err(tier_error)?;
    Ok(Json(result))
}
