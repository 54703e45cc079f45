//! Four-corner quad and its bilinear unit-square mapping.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Size in bytes of the on-disk corner record: 4 points × 2 `f32`.
pub const CORNER_RECORD_LEN: usize = 4 * 2 * std::mem::size_of::<f32>();

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CornerRecordError {
    #[error("unexpected corner record size (expected {expected} bytes, got {got})")]
    UnexpectedSize { expected: usize, got: usize },
}

/// Quad corners in image pixel coordinates.
///
/// Index `i` corresponds to the unit-square corner
/// `0 → (0,0)`, `1 → (1,0)`, `2 → (0,1)`, `3 → (1,1)`.
/// Note the Z order: this is *not* the TL, TR, BR, BL ring order.
///
/// No geometric validation is done; coincident or crossing corners are accepted
/// and simply produce a degenerate mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadCorners {
    pub points: [Point2<f32>; 4],
}

impl Default for QuadCorners {
    fn default() -> Self {
        Self {
            points: [Point2::origin(); 4],
        }
    }
}

impl QuadCorners {
    pub fn new(points: [Point2<f32>; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle `[x0, x1] × [y0, y1]`.
    pub fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new([
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x0, y1),
            Point2::new(x1, y1),
        ])
    }

    /// Move corner `index` to `p`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    pub fn set(&mut self, index: usize, p: Point2<f32>) {
        self.points[index] = p;
    }

    /// Map normalized `(u, v)` into image space.
    ///
    /// This is bilinear interpolation over the four corners: first along the
    /// top (0→1) and bottom (2→3) edges by `u`, then between those by `v`. It is
    /// not a projective transform, so it only approximates perspective when the
    /// quad is not a parallelogram. `u` and `v` may lie outside `[0, 1]`.
    #[inline]
    pub fn map(&self, u: f32, v: f32) -> Point2<f32> {
        let [c0, c1, c2, c3] = self.points;
        let top = lerp(c0, c1, u);
        let bottom = lerp(c2, c3, u);
        lerp(top, bottom, v)
    }

    /// Little-endian `x, y` pairs for corners 0..4.
    pub fn to_bytes(&self) -> [u8; CORNER_RECORD_LEN] {
        let mut out = [0u8; CORNER_RECORD_LEN];
        for (i, p) in self.points.iter().enumerate() {
            out[i * 8..i * 8 + 4].copy_from_slice(&p.x.to_le_bytes());
            out[i * 8 + 4..i * 8 + 8].copy_from_slice(&p.y.to_le_bytes());
        }
        out
    }

    /// Parse the record written by [`QuadCorners::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CornerRecordError> {
        if bytes.len() != CORNER_RECORD_LEN {
            return Err(CornerRecordError::UnexpectedSize {
                expected: CORNER_RECORD_LEN,
                got: bytes.len(),
            });
        }
        let read = |off: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&bytes[off..off + 4]);
            f32::from_le_bytes(b)
        };
        let mut points = [Point2::origin(); 4];
        for (i, p) in points.iter_mut().enumerate() {
            *p = Point2::new(read(i * 8), read(i * 8 + 4));
        }
        Ok(Self { points })
    }
}

#[inline]
fn lerp(a: Point2<f32>, b: Point2<f32>, t: f32) -> Point2<f32> {
    a + (b - a) * t
}
