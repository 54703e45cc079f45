//! Core types for quadgrid decoding.
//!
//! This crate holds the pieces that do not depend on any grid layout:
//! RGBA image views, the luminance matrix and its extractor, a Sobel gradient,
//! the four-corner quad with its bilinear unit-square mapping, and the logger.

mod gradient;
mod image;
mod logger;
mod luminance;
mod quad;

pub use gradient::{sobel_at, sobel_magnitude};
pub use image::{GrayImage, ImageError, RgbaImage, RgbaImageView};
pub use luminance::{extract_luminance, luminance_into, rgb_to_luminance, LumaMatrix};
pub use quad::{CornerRecordError, QuadCorners, CORNER_RECORD_LEN};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env};

pub use nalgebra::Point2;
