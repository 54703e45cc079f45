//! Filesystem assets backed by the `image` crate.

use quadgrid_core::{GrayImage, RgbaImage};
use quadgrid_session::{AssetError, AssetSource, SessionConfig};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Decode any format `image` understands into an RGBA8 buffer.
pub fn load_rgba(path: impl AsRef<Path>) -> Result<RgbaImage, AssetError> {
    let path = path.as_ref();
    let decoded = ::image::ImageReader::open(path)?
        .decode()
        .map_err(|e| AssetError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .to_rgba8();
    let (w, h) = decoded.dimensions();
    Ok(RgbaImage::from_raw(
        w as usize,
        h as usize,
        decoded.into_raw(),
    )?)
}

/// Convert an `image::RgbaImage` into the core owned type.
pub fn rgba_from_image(img: &::image::RgbaImage) -> Result<RgbaImage, AssetError> {
    Ok(RgbaImage::from_raw(
        img.width() as usize,
        img.height() as usize,
        img.as_raw().clone(),
    )?)
}

/// Write a grayscale preview as PNG (or any format implied by the extension).
pub fn save_gray(gray: &GrayImage, path: impl AsRef<Path>) -> Result<(), AssetError> {
    let path = path.as_ref();
    let encode_err = |reason: String| AssetError::Decode {
        path: path.display().to_string(),
        reason,
    };
    let img = ::image::GrayImage::from_raw(gray.width as u32, gray.height as u32, gray.data.clone())
        .ok_or_else(|| encode_err("buffer does not match dimensions".to_string()))?;
    img.save(path).map_err(|e| encode_err(e.to_string()))
}

/// Image file plus the 32-byte corner record next to it.
#[derive(Clone, Debug)]
pub struct FsAssets {
    pub image_path: PathBuf,
    pub corners_path: PathBuf,
}

impl FsAssets {
    pub fn new(image_path: impl Into<PathBuf>, corners_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            corners_path: corners_path.into(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.image_path, &config.corners_path)
    }
}

impl AssetSource for FsAssets {
    fn load_image(&self) -> Result<RgbaImage, AssetError> {
        load_rgba(&self.image_path)
    }

    fn read_corners(&self) -> Result<Option<Vec<u8>>, AssetError> {
        match fs::read(&self.corners_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no corner record at {}", self.corners_path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_corners(&mut self, bytes: &[u8]) -> Result<(), AssetError> {
        if let Some(parent) = self.corners_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.corners_path, bytes)?;
        Ok(())
    }
}
