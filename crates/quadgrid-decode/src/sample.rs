//! Jittered luminance sampling of grid cells through a quad mapping.

use crate::{GridSpec, SampleParams};
use nalgebra::Point2;
use quadgrid_core::{LumaMatrix, QuadCorners};
use rand::Rng;

/// Samples grid cells of a quad laid over a luminance matrix.
#[derive(Clone, Copy, Debug)]
pub struct CellSampler<'a> {
    lum: &'a LumaMatrix,
    corners: &'a QuadCorners,
    grid: GridSpec,
    params: SampleParams,
}

impl<'a> CellSampler<'a> {
    pub fn new(
        lum: &'a LumaMatrix,
        corners: &'a QuadCorners,
        grid: GridSpec,
        params: SampleParams,
    ) -> Self {
        Self {
            lum,
            corners,
            grid,
            params,
        }
    }

    #[inline]
    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    #[inline]
    pub fn params(&self) -> SampleParams {
        self.params
    }

    /// Normalized cell size `(1/cols, 1/rows)`.
    #[inline]
    fn cell_size(&self) -> (f32, f32) {
        (1.0 / self.grid.cols as f32, 1.0 / self.grid.rows as f32)
    }

    /// Sum of `sample_count` luminance reads inside cell `(row, col)`.
    ///
    /// Each sample is the cell center plus a uniform offset inside a window of
    /// `sample_area` × the cell size. Mapped points are truncated to pixel
    /// indices and clamped into the matrix, so off-image quads read edge pixels.
    pub fn sample_cell<R: Rng + ?Sized>(&self, row: usize, col: usize, rng: &mut R) -> f32 {
        let (cw, ch) = self.cell_size();
        let x = col as f32 * cw;
        let y = row as f32 * ch;
        let area = self.params.sample_area;

        let mut sum = 0.0;
        for _ in 0..self.params.sample_count {
            let sx = x + cw * 0.5 - cw * area * 0.5 + rng.gen::<f32>() * cw * area;
            let sy = y + ch * 0.5 - ch * area * 0.5 + rng.gen::<f32>() * ch * area;
            sum += self.lookup(self.corners.map(sx, sy));
        }
        sum
    }

    /// [`CellSampler::sample_cell`] divided by the sample count.
    pub fn sample_cell_mean<R: Rng + ?Sized>(&self, row: usize, col: usize, rng: &mut R) -> f32 {
        let n = self.params.sample_count.max(1) as f32;
        self.sample_cell(row, col, rng) / n
    }

    /// `true` when the cell's summed luminance is below the threshold.
    pub fn is_dark<R: Rng + ?Sized>(&self, row: usize, col: usize, rng: &mut R) -> bool {
        crate::is_dark(self.sample_cell(row, col, rng), self.params.threshold)
    }

    /// Image-space center of cell `(row, col)`.
    pub fn cell_center(&self, row: usize, col: usize) -> Point2<f32> {
        let (cw, ch) = self.cell_size();
        self.corners
            .map(col as f32 * cw + cw * 0.5, row as f32 * ch + ch * 0.5)
    }

    /// Sample every cell, row-major.
    pub fn sample_grid<R: Rng + ?Sized>(&self, rng: &mut R) -> CellGrid {
        let mut sums = Vec::with_capacity(self.grid.cell_count());
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                sums.push(self.sample_cell(row, col, rng));
            }
        }
        CellGrid {
            rows: self.grid.rows,
            cols: self.grid.cols,
            sums,
        }
    }

    #[inline]
    fn lookup(&self, p: Point2<f32>) -> f32 {
        // `as` truncates toward zero; NaN becomes 0.
        self.lum.at_clamped(p.x as i64, p.y as i64)
    }
}

/// Per-cell sums from one full grid pass.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGrid {
    pub rows: usize,
    pub cols: usize,
    pub sums: Vec<f32>, // row-major: row * cols + col
}

impl CellGrid {
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.sums[row * self.cols + col]
    }

    /// `(row, col)` of every cell below `threshold`.
    pub fn dark_cells(&self, threshold: f32) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.sums
            .iter()
            .enumerate()
            .filter(move |&(_, &s)| crate::is_dark(s, threshold))
            .map(move |(i, _)| (i / cols, i % cols))
    }
}
