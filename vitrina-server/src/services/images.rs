//! Image validation and transcoding
//!
//! Every accepted upload goes through the same pipeline: validate the
//! declared type and size, decode, downscale wide images, and re-encode
//! as JPEG. Whatever arrived, only transcoded JPEG bytes reach storage.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, imageops::FilterType};
use shared::error::{AppError, AppResult, ErrorCode};
use std::io::Cursor;
use std::path::Path;

pub const SUPPORTED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
pub const MAX_WIDTH: u32 = 1200;
pub const JPEG_QUALITY: u8 = 80;

/// One uploaded file, as it came off the multipart stream.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Reject unsupported types, oversized files and bytes that are not a
/// decodable image. Runs before any upload so a bad file aborts the whole
/// mutation with nothing stored.
pub fn validate(file: &ImageFile, max_bytes: usize) -> AppResult<()> {
    if !SUPPORTED_TYPES.contains(&file.content_type.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::ImageInvalid,
            format!("unsupported image type: {}", file.content_type),
        )
        .with_detail("filename", file.filename.as_str()));
    }

    if file.data.len() > max_bytes {
        return Err(AppError::with_message(
            ErrorCode::ImageInvalid,
            format!("image exceeds the {max_bytes} byte limit"),
        )
        .with_detail("filename", file.filename.as_str())
        .with_detail("size", file.data.len() as u64));
    }

    let format = image::guess_format(&file.data).map_err(|_| {
        AppError::with_message(ErrorCode::ImageInvalid, "file is not a readable image")
            .with_detail("filename", file.filename.as_str())
    })?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP => Ok(()),
        other => Err(AppError::with_message(
            ErrorCode::ImageInvalid,
            format!("unsupported image format: {other:?}"),
        )
        .with_detail("filename", file.filename.as_str())),
    }
}

/// Decode, cap width at [`MAX_WIDTH`] preserving aspect ratio, re-encode
/// as JPEG.
pub fn process(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::ImageInvalid, format!("image decode failed: {e}"))
    })?;

    let img = if img.width() > MAX_WIDTH {
        let height =
            ((img.height() as u64 * MAX_WIDTH as u64) / img.width() as u64).max(1) as u32;
        img.resize_exact(MAX_WIDTH, height, FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("image encode failed: {e}")))?;

    Ok(out)
}

/// Storage path for a transcoded upload: `{prefix}/{uuid}-{stem}.jpg`.
/// The random component makes collisions across uploads a non-issue; the
/// sanitized stem keeps paths traceable to the original file.
pub fn storage_path(prefix: &str, filename: &str) -> String {
    let stem: String = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    format!("{prefix}/{}-{stem}.jpg", uuid::Uuid::new_v4())
}
