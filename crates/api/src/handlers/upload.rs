//! Multipart image extraction shared by the upload and calibration handlers.

use axum::extract::Multipart;
use semadepth_inference::ImageUpload;

use crate::error::{AppError, AppResult};

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Read the `image` field of a multipart body. Other fields are ignored.
pub async fn read_image(mut multipart: Multipart) -> AppResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        return Ok(ImageUpload::new(file_name, content_type, bytes.to_vec()));
    }

    Err(AppError::BadRequest(format!(
        "Missing '{IMAGE_FIELD}' field in multipart body"
    )))
}
