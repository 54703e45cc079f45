//! Perceptual luminance of RGBA images.

use crate::{GrayImage, RgbaImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Single-channel `f32` matrix, row-major, values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LumaMatrix {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub data: Vec<f32>,
}

impl LumaMatrix {
    /// Zero-filled matrix.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stride: width,
            data: vec![0.0; width * height],
        }
    }

    /// Matrix filled with a constant value.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            stride: width,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.stride + col]
    }

    #[inline]
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut f32 {
        &mut self.data[row * self.stride + col]
    }

    /// Value at `(x, y)` with both indices clamped into the matrix.
    ///
    /// Returns `0.0` for an empty matrix.
    #[inline]
    pub fn at_clamped(&self, x: i64, y: i64) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.at(y, x)
    }

    /// Value at `(x, y)`, or `0.0` outside the matrix.
    #[inline]
    pub fn at_or_zero(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.at(y as usize, x as usize)
    }

    /// 8-bit grayscale rendering of the matrix.
    pub fn to_gray_u8(&self) -> GrayImage {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push((self.at(y, x).clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Rec. 709 luminance of an 8-bit RGB triple, in `[0, 1]`.
#[inline]
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> f32 {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Compute the luminance matrix of an image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(image), fields(width = image.width, height = image.height))
)]
pub fn extract_luminance(image: &RgbaImageView<'_>) -> LumaMatrix {
    let mut lum = LumaMatrix::zeros(image.width, image.height);
    luminance_into(image, &mut lum);
    lum
}

/// Fill `lum` with the luminance of `image`.
///
/// # Panics
///
/// Panics if the matrix and image dimensions differ.
pub fn luminance_into(image: &RgbaImageView<'_>, lum: &mut LumaMatrix) {
    assert_eq!(image.width, lum.width, "luminance matrix width mismatch");
    assert_eq!(image.height, lum.height, "luminance matrix height mismatch");

    for y in 0..lum.height {
        for x in 0..lum.width {
            let [r, g, b, _] = image.pixel(x, y);
            *lum.at_mut(y, x) = rgb_to_luminance(r, g, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RgbaImage;
    use approx::assert_relative_eq;

    #[test]
    fn primaries_use_rec709_weights() {
        assert_relative_eq!(rgb_to_luminance(255, 0, 0), 0.2126, epsilon = 1e-6);
        assert_relative_eq!(rgb_to_luminance(0, 255, 0), 0.7152, epsilon = 1e-6);
        assert_relative_eq!(rgb_to_luminance(0, 0, 255), 0.0722, epsilon = 1e-6);
        assert_relative_eq!(rgb_to_luminance(255, 255, 255), 1.0, epsilon = 1e-6);
        assert_eq!(rgb_to_luminance(0, 0, 0), 0.0);
    }

    #[test]
    fn luminance_stays_in_unit_range() {
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(17) {
                    let l = rgb_to_luminance(r as u8, g as u8, b as u8);
                    assert!((0.0..=1.0 + 1e-6).contains(&l), "L={l} for ({r},{g},{b})");
                }
            }
        }
    }

    #[test]
    fn extract_ignores_alpha_and_is_pure() {
        let mut img = RgbaImage::filled(4, 3, [0, 0, 0, 255]);
        img.put_pixel(1, 2, [255, 255, 255, 0]);
        img.put_pixel(3, 0, [0, 255, 0, 17]);

        let a = extract_luminance(&img.view());
        let b = extract_luminance(&img.view());
        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (4, 3));
        assert_relative_eq!(a.at(2, 1), 1.0, epsilon = 1e-6);
        assert_relative_eq!(a.at(0, 3), 0.7152, epsilon = 1e-6);
        assert_eq!(a.at(0, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn mismatched_matrix_panics() {
        let img = RgbaImage::filled(4, 3, [0, 0, 0, 255]);
        let mut lum = LumaMatrix::zeros(3, 3);
        luminance_into(&img.view(), &mut lum);
    }

    #[test]
    fn clamped_lookup_stays_inside() {
        let mut lum = LumaMatrix::zeros(2, 2);
        *lum.at_mut(1, 1) = 0.5;
        assert_eq!(lum.at_clamped(10, 10), 0.5);
        assert_eq!(lum.at_clamped(-3, -3), 0.0);
        assert_eq!(LumaMatrix::zeros(0, 0).at_clamped(0, 0), 0.0);
    }

    #[test]
    fn gray_preview_scales_to_u8() {
        let mut lum = LumaMatrix::zeros(2, 1);
        *lum.at_mut(0, 1) = 1.0;
        let gray = lum.to_gray_u8();
        assert_eq!(gray.data, vec![0, 255]);
    }
}
