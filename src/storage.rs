// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use crate::error::ApiError;
use anyhow::Context;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Reject uploads that do not decode as an image.
pub fn validate_image(bytes: &[u8]) -> Result<(), ApiError> {
    image::load_from_memory(bytes)
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest("Files must be images".to_string()))
}

/// Relative media path for a fresh upload: `{subdir}/{uuid}{ext}`, keeping the
/// original extension only.
pub fn unique_media_path(subdir: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    format!("{subdir}/{}{ext}", Uuid::new_v4())
}

/// Write an uploaded image under the media root and return its relative path.
pub async fn save_image(subdir: &str, original_name: &str, bytes: &[u8]) -> Result<String, ApiError> {
    validate_image(bytes)?;

    let config = Config::get();
    let relative = unique_media_path(subdir, original_name);
    let full_path = Path::new(&config.media.root).join(&relative);

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .context("failed to create media directory")?;
    }

    tokio::fs::write(&full_path, bytes)
        .await
        .context("failed to write media file")?;

    debug!("stored media file {}", relative);
    Ok(relative)
}

/// Public URL for a stored media path.
pub fn media_url(relative: &str) -> String {
    let config = Config::get();
    format!("{}/{}", config.media.base_url.trim_end_matches('/'), relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_paths_keep_subdir_and_extension() {
        let path = unique_media_path("drink_imgs", "cola.png");
        assert!(path.starts_with("drink_imgs/"));
        assert!(path.ends_with(".png"));
    }

    #[test]
    fn media_paths_tolerate_missing_extension() {
        let path = unique_media_path("profile_imgs", "avatar");
        assert!(path.starts_with("profile_imgs/"));
        assert!(!path.contains(".."));
    }

    #[test]
    fn media_paths_are_unique_per_upload() {
        let a = unique_media_path("drink_imgs", "cola.png");
        let b = unique_media_path("drink_imgs", "cola.png");
        assert_ne!(a, b);
    }

    #[test_log::test]
    fn non_images_are_rejected() {
        assert!(validate_image(b"not an image at all").is_err());
    }

    #[test]
    fn png_uploads_are_accepted() {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::RgbaImage::new(1, 1)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        assert!(validate_image(buf.get_ref()).is_ok());
    }
}
