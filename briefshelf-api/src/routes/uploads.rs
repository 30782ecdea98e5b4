/// File upload endpoint
///
/// # Endpoint
///
/// - `POST /v1/uploads` - Multipart upload to Supabase Storage (admin)
///
/// Accepts a single `file` part plus an optional `folder` text part and
/// responds with the public URL of the stored object. Uploads are
/// admin-only because the URL ends up on content records, not user
/// profiles.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::multipart::Multipart, extract::State, Extension, Json};
use briefshelf_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    storage::StorageClient,
};
use serde::Serialize;

/// 25 MB, enough for cover images and audio clips
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_FOLDER: &str = "uploads";

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL of the stored object
    pub url: String,

    /// Object path inside the bucket
    pub path: String,

    /// Size of the stored object in bytes
    pub size: usize,
}

/// Uploads a file to storage (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: Missing `file` part or empty payload
/// - `503 Service Unavailable`: Storage isn't configured
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    require_admin(&auth)?;

    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?
        .clone();

    let mut folder = DEFAULT_FOLDER.to_string();
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("folder") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid folder field: {}", e)))?;
                let value = value.trim().trim_matches('/');
                if !value.is_empty() {
                    folder = value.to_string();
                }
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(ApiError::BadRequest(format!(
                        "File exceeds the {} byte limit",
                        MAX_UPLOAD_BYTES
                    )));
                }

                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("File is empty".to_string()));
    }

    let path = StorageClient::object_path(&folder, &filename);
    let size = bytes.len();
    let url = storage.upload(&path, bytes, &content_type).await?;

    tracing::info!(path = %path, size, "File uploaded");

    Ok(Json(UploadResponse { url, path, size }))
}
