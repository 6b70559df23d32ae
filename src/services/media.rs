use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Stores uploaded recipe images under the media root. Payloads arrive
/// base64-encoded, optionally wrapped in a `data:<mime>;base64,` URI.
#[derive(Clone)]
pub struct MediaService {
    media_root: PathBuf,
}

impl MediaService {
    #[must_use]
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Decode and persist an image payload; returns the media-relative
    /// path stored on the recipe row.
    pub async fn save_recipe_image(&self, payload: &str) -> Result<String> {
        let (data, extension) = split_data_uri(payload);

        let bytes = STANDARD
            .decode(data.trim())
            .context("Invalid base64 image payload")?;

        let relative = format!("recipes/{}.{extension}", uuid::Uuid::new_v4());
        let target = self.media_root.join(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create media directory")?;
        }

        tokio::fs::write(&target, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", target.display()))?;

        Ok(relative)
    }

    pub async fn remove(&self, relative: &str) -> Result<()> {
        let target = self.media_root.join(relative);
        tokio::fs::remove_file(&target)
            .await
            .with_context(|| format!("Failed to remove {}", target.display()))
    }
}

/// Public URL for a stored media-relative path.
#[must_use]
pub fn media_url(relative: &str) -> String {
    format!("/media/{relative}")
}

/// Strip an optional `data:image/<kind>;base64,` prefix, picking the file
/// extension from the declared mime type.
fn split_data_uri(payload: &str) -> (&str, &str) {
    if let Some(rest) = payload.strip_prefix("data:")
        && let Some((mime, data)) = rest.split_once(";base64,")
    {
        let extension = match mime {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "jpg",
        };
        return (data, extension);
    }

    (payload, "jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_data_uri_prefix() {
        let (data, ext) = split_data_uri("data:image/png;base64,aGVsbG8=");
        assert_eq!(data, "aGVsbG8=");
        assert_eq!(ext, "png");
    }

    #[test]
    fn bare_payload_defaults_to_jpg() {
        let (data, ext) = split_data_uri("aGVsbG8=");
        assert_eq!(data, "aGVsbG8=");
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn unknown_mime_defaults_to_jpg() {
        let (_, ext) = split_data_uri("data:image/bmp;base64,aGVsbG8=");
        assert_eq!(ext, "jpg");
    }
}
