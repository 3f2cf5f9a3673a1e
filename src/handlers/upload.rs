use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::Json;
use rand::Rng;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Fixed multipart field name carrying the file.
pub const UPLOAD_FIELD: &str = "image";

/// Hard cap on a single uploaded file.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Destination buckets; anything unrecognized falls into the general bucket.
pub const CATEGORIES: &[&str] = &["profile", "project", "general"];

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

pub fn upload_body_limit() -> DefaultBodyLimit {
    // Multipart framing overhead on top of the file cap
    DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024)
}

pub fn resolve_category(raw: &str) -> &'static str {
    match raw {
        "profile" => "profile",
        "project" => "project",
        _ => "general",
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extension and declared content type must both identify an image.
pub fn validate_image_policy(filename: &str, content_type: Option<&str>) -> Result<String, ApiError> {
    let ext = extension_of(filename)
        .ok_or_else(|| ApiError::upload_rejected("File has no usable extension"))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::upload_rejected(format!(
            "Only image files are accepted (got .{})",
            ext
        )));
    }

    match content_type {
        Some(ct) if ct.starts_with("image/") => Ok(ext),
        Some(ct) => Err(ApiError::upload_rejected(format!(
            "Declared content type '{}' is not an image",
            ct
        ))),
        None => Err(ApiError::upload_rejected("Missing content type")),
    }
}

/// Collision-resistant stored name; the client-supplied filename is never
/// used for storage.
pub fn stored_filename(ext: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{:09}.{}", millis, suffix, ext)
}

/// POST /api/upload/:category - store one image, return its public URL
pub async fn upload_image(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let category = resolve_category(&category);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .ok_or_else(|| ApiError::validation("File field must have a filename"))?
            .to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        // Policy check happens before anything touches the filesystem.
        let ext = validate_image_policy(&original_name, content_type.as_deref())?;

        let filename = stored_filename(&ext);
        let dest = state.upload_root.join(category).join(&filename);
        let size = stream_field_to_file(field, &dest, MAX_UPLOAD_BYTES).await?;

        tracing::info!(category, filename = %filename, size, "stored upload");

        return Ok(Json(json!({
            "url": format!("/uploads/{}/{}", category, filename),
            "filename": filename,
            "original_name": original_name,
            "size": size,
        })));
    }

    Err(ApiError::validation(format!(
        "Missing '{}' file field",
        UPLOAD_FIELD
    )))
}

/// Stream a multipart field to disk, enforcing the size cap chunk by chunk
/// so oversized bodies fail before they are fully buffered.
async fn stream_field_to_file(
    mut field: axum::extract::multipart::Field<'_>,
    dest: &std::path::Path,
    max_size: usize,
) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| ApiError::internal(format!("failed to create upload file: {}", e)))?;

    let result = async {
        let mut total: usize = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::validation(format!("Upload read error: {}", e)))?
        {
            total += chunk.len();
            if total > max_size {
                return Err(ApiError::upload_rejected(format!(
                    "File exceeds maximum size of {} bytes",
                    max_size
                )));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::internal(format!("upload write failed: {}", e)))?;
        }

        file.flush()
            .await
            .map_err(|e| ApiError::internal(format!("upload flush failed: {}", e)))?;

        Ok(total as u64)
    }
    .await;

    if result.is_err() {
        // Best effort.
        let _ = tokio::fs::remove_file(dest).await;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_resolve_with_general_fallback() {
        assert_eq!(resolve_category("profile"), "profile");
        assert_eq!(resolve_category("project"), "project");
        assert_eq!(resolve_category("banner"), "general");
        assert_eq!(resolve_category(""), "general");
    }

    #[test]
    fn policy_rejects_non_image_extension() {
        let err = validate_image_policy("notes.txt", Some("image/png")).unwrap_err();
        assert!(matches!(err, ApiError::UploadRejected(_)));
    }

    #[test]
    fn policy_rejects_mismatched_content_type() {
        let err = validate_image_policy("photo.png", Some("text/plain")).unwrap_err();
        assert!(matches!(err, ApiError::UploadRejected(_)));
    }

    #[test]
    fn policy_requires_both_checks_to_agree() {
        assert!(validate_image_policy("photo.png", Some("image/png")).is_ok());
        assert!(validate_image_policy("photo.PNG", Some("image/png")).is_ok());
        assert!(validate_image_policy("photo", Some("image/png")).is_err());
        assert!(validate_image_policy("photo.png", None).is_err());
    }

    #[test]
    fn stored_names_preserve_extension_and_avoid_collisions() {
        let a = stored_filename("png");
        let b = stored_filename("png");
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
        assert!(!a.contains('/'));
    }
}
