use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header::HOST, HeaderMap},
    Json,
};
use bookshelf_http::error::AppError;
use mime_guess::{mime, Mime};
use uuid::Uuid;

use super::BooksState;
use crate::modules::books::models::UploadResponse;
use crate::utils;

/// Multipart part carrying the file
const IMAGE_FIELD: &str = "image";

pub(super) async fn upload_image(
    State(state): State<BooksState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("failed to read upload: {e}")))?;

        if data.is_empty() {
            return Err(AppError::bad_request("Uploaded image is empty"));
        }

        let extension = image_extension(original_name.as_deref(), content_type.as_deref())
            .ok_or_else(|| AppError::bad_request("Only image files are allowed"))?;

        let file_name = format!("image-{}.{}", Uuid::now_v7(), extension);
        let target = state.uploads.dir.join(&file_name);

        tokio::fs::create_dir_all(&state.uploads.dir)
            .await
            .with_context(|| format!("failed to create {}", state.uploads.dir.display()))?;
        tokio::fs::write(&target, &data)
            .await
            .with_context(|| format!("failed to write {}", target.display()))?;

        let host = headers.get(HOST).and_then(|h| h.to_str().ok());
        let image_url = utils::public_upload_url(&state.uploads, host, &file_name);

        tracing::info!(
            file = %file_name,
            bytes = data.len(),
            original = original_name.as_deref().unwrap_or("-"),
            "image uploaded"
        );

        return Ok(Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            image_url,
        }));
    }

    Err(AppError::bad_request("No image file provided"))
}

/// Raster types accepted for covers, with the extension stored on disk.
/// Uploads are served from the API origin, so scriptable formats such as SVG stay out.
const ALLOWED_IMAGES: [(&str, &str); 4] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for an accepted image, or `None` when the upload is refused.
///
/// The declared content type wins unless it is missing or generic, in which
/// case the type is guessed from the original file name.
pub(crate) fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> Option<String> {
    let declared = content_type
        .and_then(|ct| ct.parse::<Mime>().ok())
        .filter(|m| *m != mime::APPLICATION_OCTET_STREAM);
    let guessed = file_name.and_then(|name| mime_guess::from_path(name).first());

    let mime_type = declared.or(guessed)?;
    ALLOWED_IMAGES
        .iter()
        .find(|(essence, _)| *essence == mime_type.essence_str())
        .map(|(_, ext)| ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_file_name() {
        assert_eq!(
            image_extension(Some("Cover.PNG"), Some("image/png")).as_deref(),
            Some("png")
        );
    }

    #[test]
    fn octet_stream_falls_back_to_name() {
        assert_eq!(
            image_extension(Some("cover.jpg"), Some("application/octet-stream")).as_deref(),
            Some("jpg")
        );
    }

    #[test]
    fn extension_from_content_type_when_name_lacks_one() {
        assert_eq!(
            image_extension(Some("cover"), Some("image/gif")).as_deref(),
            Some("gif")
        );
    }

    #[test]
    fn non_images_are_refused() {
        assert_eq!(image_extension(Some("notes.txt"), Some("text/plain")), None);
        assert_eq!(image_extension(Some("notes.txt"), None), None);
        assert_eq!(image_extension(None, None), None);
    }

    #[test]
    fn only_raster_images_are_accepted() {
        assert_eq!(image_extension(Some("evil.svg"), Some("image/svg+xml")), None);
        assert_eq!(image_extension(Some("evil.svg"), None), None);
        assert_eq!(image_extension(Some("scan.tiff"), Some("image/tiff")), None);
        assert_eq!(
            image_extension(Some("photo.jpeg"), Some("image/jpeg")).as_deref(),
            Some("jpg")
        );
        assert_eq!(
            image_extension(Some("cover.webp"), None).as_deref(),
            Some("webp")
        );
    }
}
