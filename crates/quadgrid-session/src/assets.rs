//! Asset I/O seam: image loading and the corner record file.

use quadgrid_core::{ImageError, RgbaImage};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Where the session gets its image and keeps its corner record.
pub trait AssetSource {
    /// Load the RGBA image to calibrate against.
    fn load_image(&self) -> Result<RgbaImage, AssetError>;

    /// Raw corner record bytes, or `None` if nothing was saved yet.
    fn read_corners(&self) -> Result<Option<Vec<u8>>, AssetError>;

    /// Replace the stored corner record.
    fn write_corners(&mut self, bytes: &[u8]) -> Result<(), AssetError>;
}

/// In-memory assets.
#[derive(Clone, Debug)]
pub struct MemoryAssets {
    pub image: RgbaImage,
    pub corners: Option<Vec<u8>>,
}

impl MemoryAssets {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            corners: None,
        }
    }

    pub fn with_corners(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.corners = Some(bytes.into());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load_image(&self) -> Result<RgbaImage, AssetError> {
        Ok(self.image.clone())
    }

    fn read_corners(&self) -> Result<Option<Vec<u8>>, AssetError> {
        Ok(self.corners.clone())
    }

    fn write_corners(&mut self, bytes: &[u8]) -> Result<(), AssetError> {
        self.corners = Some(bytes.to_vec());
        Ok(())
    }
}
