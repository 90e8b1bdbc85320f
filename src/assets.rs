//! Optional letterhead images, read from a fixed directory.
//!
//! A missing file is not an error: the document is laid out the same way
//! and the image is simply not drawn.

use crate::layout::AssetKind;
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const LOGO_FILE: &str = "hospital_logo.png";
pub const FOOTER_ICON_FILE: &str = "footer.png";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read image {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    DecodeError {
        path: PathBuf,
        #[source]
        source: image_crate::ImageError,
    },
}

/// The images found on disk, decoded.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    logo: Option<DynamicImage>,
    footer_icon: Option<DynamicImage>,
}

impl Assets {
    /// No images at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load whichever of the two images exist in `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        Ok(Self {
            logo: load_optional(&dir.join(LOGO_FILE))?,
            footer_icon: load_optional(&dir.join(FOOTER_ICON_FILE))?,
        })
    }

    pub fn with_image(mut self, kind: AssetKind, image: DynamicImage) -> Self {
        match kind {
            AssetKind::Logo => self.logo = Some(image),
            AssetKind::FooterIcon => self.footer_icon = Some(image),
        }
        self
    }

    pub fn get(&self, kind: AssetKind) -> Option<&DynamicImage> {
        match kind {
            AssetKind::Logo => self.logo.as_ref(),
            AssetKind::FooterIcon => self.footer_icon.as_ref(),
        }
    }

    /// Height in mm the image takes up when drawn `width` mm wide.
    pub fn scaled_height(&self, kind: AssetKind, width: f32) -> Option<f32> {
        let (w, h) = self.get(kind)?.dimensions();
        (w > 0).then(|| width * h as f32 / w as f32)
    }
}

fn load_optional(path: &Path) -> Result<Option<DynamicImage>, AssetError> {
    if !path.exists() {
        debug!(path = %path.display(), "optional image not present");
        return Ok(None);
    }
    let bytes = std::fs::read(path).map_err(|source| AssetError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image_crate::load_from_memory(&bytes).map_err(|source| AssetError::DecodeError {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loaded image");
    Ok(Some(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_dir_has_no_images() {
        let dir = TempDir::new().unwrap();
        let assets = Assets::load(dir.path()).unwrap();
        assert!(assets.get(AssetKind::Logo).is_none());
        assert!(assets.get(AssetKind::FooterIcon).is_none());
        assert_eq!(assets.scaled_height(AssetKind::Logo, 25.0), None);
    }

    #[test]
    fn test_png_is_loaded() {
        let dir = TempDir::new().unwrap();
        let image = DynamicImage::new_rgb8(40, 20);
        image.save(dir.path().join(LOGO_FILE)).unwrap();

        let assets = Assets::load(dir.path()).unwrap();
        assert!(assets.get(AssetKind::Logo).is_some());
        assert!(assets.get(AssetKind::FooterIcon).is_none());
        assert_eq!(assets.scaled_height(AssetKind::Logo, 25.0), Some(12.5));
    }

    #[test]
    fn test_corrupt_image_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(FOOTER_ICON_FILE), b"not a png").unwrap();
        assert!(matches!(
            Assets::load(dir.path()),
            Err(AssetError::DecodeError { .. })
        ));
    }
}
