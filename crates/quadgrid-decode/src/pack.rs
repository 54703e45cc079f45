//! Thresholding cell sums into bits and packing column groups into bytes.
//!
//! Byte order of the stream: column groups outermost, then rows top to
//! bottom, so a 22×18 grid with 6-bit groups yields rows 0..22 of columns 0..6,
//! then rows 0..22 of columns 6..12, and so on.
//!
//! Within a byte, the group's columns are shifted in from last to first: bit
//! `k` holds column `group * bits_per_group + k`. With [`PackParams::sentinel`]
//! the accumulator starts at 1, which leaves a marker bit just above the
//! payload (bit 6 for 6-bit groups).

use crate::{CellGrid, CellSampler, GridSpec, PackParams};
use rand::Rng;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Dark cells (sum below threshold) read as bit 1.
#[inline]
pub fn is_dark(sum: f32, threshold: f32) -> bool {
    sum < threshold
}

/// Pack bits MSB-first into one byte.
///
/// Bits beyond the width of a byte are shifted out.
pub fn pack_group<I>(bits: I, sentinel: bool) -> u8
where
    I: IntoIterator<Item = bool>,
{
    let mut value = u32::from(sentinel);
    for bit in bits {
        value = (value << 1) | u32::from(bit);
    }
    value as u8
}

/// Sample the grid and pack it into bytes.
///
/// The output always has `grid.output_len()` bytes. Each call draws fresh
/// jitter from `rng`, so cells near the threshold may flip between calls.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(sampler, rng),
        fields(rows = sampler.grid().rows, cols = sampler.grid().cols)
    )
)]
pub fn decode<R: Rng + ?Sized>(
    sampler: &CellSampler<'_>,
    pack: &PackParams,
    rng: &mut R,
) -> Vec<u8> {
    let threshold = sampler.params().threshold;
    let bytes = pack_stream(&sampler.grid(), pack, |row, col| {
        is_dark(sampler.sample_cell(row, col, rng), threshold)
    });
    log::debug!("decoded {} bytes", bytes.len());
    bytes
}

/// Pack an already sampled grid.
pub fn decode_from_grid(
    cells: &CellGrid,
    grid: &GridSpec,
    threshold: f32,
    pack: &PackParams,
) -> Vec<u8> {
    pack_stream(grid, pack, |row, col| is_dark(cells.at(row, col), threshold))
}

fn pack_stream<F>(grid: &GridSpec, pack: &PackParams, mut dark: F) -> Vec<u8>
where
    F: FnMut(usize, usize) -> bool,
{
    let bits = grid.bits_per_group;
    let mut out = Vec::with_capacity(grid.output_len());
    for group in 0..grid.groups() {
        for row in 0..grid.rows {
            let value = pack_group(
                (0..bits).rev().map(|offset| dark(row, group * bits + offset)),
                pack.sentinel,
            );
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleParams;
    use quadgrid_core::{extract_luminance, LumaMatrix, QuadCorners, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn decode_matrix(
        lum: &LumaMatrix,
        corners: &QuadCorners,
        grid: GridSpec,
        pack: PackParams,
    ) -> Vec<u8> {
        let sampler = CellSampler::new(lum, corners, grid, SampleParams::default());
        let mut rng = StdRng::seed_from_u64(42);
        decode(&sampler, &pack, &mut rng)
    }

    /// Paint cell `(row, col)` of a `rows × cols` grid with `px`-sized cells.
    fn paint_cell(img: &mut RgbaImage, px: usize, row: usize, col: usize, rgba: [u8; 4]) {
        for y in row * px..(row + 1) * px {
            for x in col * px..(col + 1) * px {
                img.put_pixel(x, y, rgba);
            }
        }
    }

    #[test]
    fn pack_group_shifts_msb_first() {
        assert_eq!(pack_group([true, false, true], false), 0b101);
        assert_eq!(pack_group([true, false, true], true), 0b1101);
        assert_eq!(pack_group([false; 6], true), 0b100_0000);
        assert_eq!(pack_group([true; 6], true), 0b111_1111);
        assert_eq!(pack_group(std::iter::empty(), true), 1);
    }

    #[test]
    fn white_scenario_emits_66_at_signs() {
        let img = RgbaImage::filled(100, 100, [255, 255, 255, 255]);
        let lum = extract_luminance(&img.view());
        let corners = QuadCorners::rect(0.0, 0.0, 100.0, 100.0);
        let bytes = decode_matrix(&lum, &corners, GridSpec::default(), PackParams::default());
        assert_eq!(bytes.len(), 66);
        assert!(bytes.iter().all(|&b| b == 64), "{bytes:?}");
    }

    #[test]
    fn dark_image_sets_every_bit() {
        let lum = LumaMatrix::zeros(90, 110);
        let corners = QuadCorners::rect(1.0, 1.0, 89.0, 109.0);
        let bytes = decode_matrix(&lum, &corners, GridSpec::default(), PackParams::default());
        assert_eq!(bytes.len(), 66);
        assert!(bytes.iter().all(|&b| b == 0b111_1111));
    }

    #[test]
    fn sentinel_off_yields_plain_payload() {
        let dark = LumaMatrix::zeros(36, 44);
        let bright = LumaMatrix::filled(36, 44, 1.0);
        let corners = QuadCorners::rect(0.0, 0.0, 36.0, 44.0);
        let pack = PackParams { sentinel: false };
        assert!(decode_matrix(&dark, &corners, GridSpec::default(), pack)
            .iter()
            .all(|&b| b == 0b11_1111));
        assert!(decode_matrix(&bright, &corners, GridSpec::default(), pack)
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn output_length_is_independent_of_corners() {
        let lum = LumaMatrix::filled(20, 20, 0.5);
        let grids = [
            GridSpec::default(),
            GridSpec {
                rows: 3,
                cols: 8,
                bits_per_group: 4,
            },
            GridSpec {
                rows: 1,
                cols: 7,
                bits_per_group: 7,
            },
        ];
        let quads = [
            QuadCorners::rect(0.0, 0.0, 20.0, 20.0),
            QuadCorners::rect(-50.0, 30.0, 400.0, -2.0),
            QuadCorners::default(),
        ];
        for grid in grids {
            for corners in &quads {
                let bytes = decode_matrix(&lum, corners, grid, PackParams::default());
                assert_eq!(bytes.len(), grid.rows * (grid.cols / grid.bits_per_group));
            }
        }
    }

    #[test]
    fn column_k_of_a_group_lands_in_bit_k() {
        // 2 rows x 12 cols, 10 px cells, 6-bit groups.
        let px = 10;
        let mut img = RgbaImage::filled(12 * px, 2 * px, [255, 255, 255, 255]);
        paint_cell(&mut img, px, 0, 0, [0, 0, 0, 255]);
        paint_cell(&mut img, px, 0, 5, [0, 0, 0, 255]);
        paint_cell(&mut img, px, 1, 7, [0, 0, 0, 255]);
        paint_cell(&mut img, px, 1, 11, [0, 0, 0, 255]);
        let lum = extract_luminance(&img.view());

        let grid = GridSpec {
            rows: 2,
            cols: 12,
            bits_per_group: 6,
        };
        let corners = QuadCorners::rect(0.0, 0.0, (12 * px) as f32, (2 * px) as f32);
        let bytes = decode_matrix(&lum, &corners, grid, PackParams::default());

        // group 0: row 0, row 1; group 1: row 0, row 1
        assert_eq!(
            bytes,
            vec![0b110_0001, 0b100_0000, 0b100_0000, 0b110_0010]
        );
    }

    #[test]
    fn skewed_quad_reads_rotated_pattern() {
        // A 1x6 strip drawn in image space along a rotated quad; every other
        // cell is dark. Cells are sampled through the bilinear map, so the
        // pattern is recovered even though it is not axis aligned.
        let w = 80;
        let h = 80;
        let mut img = RgbaImage::filled(w, h, [255, 255, 255, 255]);
        let corners = QuadCorners::new([
            nalgebra::Point2::new(10.0, 20.0),
            nalgebra::Point2::new(70.0, 40.0),
            nalgebra::Point2::new(5.0, 35.0),
            nalgebra::Point2::new(65.0, 55.0),
        ]);
        let grid = GridSpec {
            rows: 1,
            cols: 6,
            bits_per_group: 6,
        };
        for y in 0..h {
            for x in 0..w {
                // paint by nearest cell center
                let mut best = (f32::MAX, 0usize);
                for col in 0..6 {
                    let c = corners.map((col as f32 + 0.5) / 6.0, 0.5);
                    let d = (c.x - x as f32 - 0.5).powi(2) + (c.y - y as f32 - 0.5).powi(2);
                    if d < best.0 {
                        best = (d, col);
                    }
                }
                if best.0 < 16.0 && best.1 % 2 == 0 {
                    img.put_pixel(x, y, [0, 0, 0, 255]);
                }
            }
        }
        let lum = extract_luminance(&img.view());
        let bytes = decode_matrix(&lum, &corners, grid, PackParams::default());
        // columns 0, 2, 4 dark -> bits 0, 2, 4
        assert_eq!(bytes, vec![0b101_0101]);
    }

    #[test]
    fn grid_packing_matches_direct_decode() {
        let mut lum = LumaMatrix::filled(60, 40, 1.0);
        for y in 0..20 {
            for x in 30..60 {
                *lum.at_mut(y, x) = 0.0;
            }
        }
        let corners = QuadCorners::rect(0.0, 0.0, 60.0, 40.0);
        let grid = GridSpec {
            rows: 4,
            cols: 6,
            bits_per_group: 3,
        };
        let params = SampleParams::default();
        let sampler = CellSampler::new(&lum, &corners, grid, params);
        let mut rng = StdRng::seed_from_u64(5);
        let cells = sampler.sample_grid(&mut rng);
        let from_grid = decode_from_grid(&cells, &grid, params.threshold, &PackParams::default());
        let direct = decode(&sampler, &PackParams::default(), &mut rng);
        assert_eq!(from_grid, direct);
        assert_eq!(from_grid, vec![0b1000, 0b1000, 0b1000, 0b1000, 0b1111, 0b1111, 0b1000, 0b1000]);
    }
}
