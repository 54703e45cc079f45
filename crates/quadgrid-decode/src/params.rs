use serde::{Deserialize, Serialize};

/// Errors for grid layouts that cannot be packed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridSpecError {
    #[error("grid must have at least one row and one column (rows={rows}, cols={cols})")]
    Empty { rows: usize, cols: usize },

    #[error("bits_per_group must be positive")]
    ZeroBitsPerGroup,

    #[error("cols={cols} is not divisible by bits_per_group={bits_per_group}")]
    ColsNotDivisible { cols: usize, bits_per_group: usize },

    #[error("packed group needs {bits} bits, more than fit in a byte")]
    GroupTooWide { bits: usize },

    #[error("sample_count must be positive")]
    NoSamples,
}

/// Logical grid laid over the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Consecutive columns packed into one output byte per row.
    pub bits_per_group: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 22,
            cols: 18,
            bits_per_group: 6,
        }
    }
}

impl GridSpec {
    /// Number of column groups per row. Zero when `bits_per_group` is zero.
    #[inline]
    pub fn groups(&self) -> usize {
        self.cols.checked_div(self.bits_per_group).unwrap_or(0)
    }

    /// Length of the decoded byte stream.
    #[inline]
    pub fn output_len(&self) -> usize {
        self.rows * self.groups()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Check the layout against the packing mode.
    pub fn validate(&self, pack: &PackParams) -> Result<(), GridSpecError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridSpecError::Empty {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.bits_per_group == 0 {
            return Err(GridSpecError::ZeroBitsPerGroup);
        }
        if self.cols % self.bits_per_group != 0 {
            return Err(GridSpecError::ColsNotDivisible {
                cols: self.cols,
                bits_per_group: self.bits_per_group,
            });
        }
        let bits = self.bits_per_group + usize::from(pack.sentinel);
        if bits > 8 {
            return Err(GridSpecError::GroupTooWide { bits });
        }
        Ok(())
    }
}

/// Jittered sampling parameters.
///
/// `threshold` is compared against the *sum* of `sample_count` luminance reads,
/// so the two must be tuned together.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleParams {
    /// Samples drawn per cell.
    pub sample_count: usize,
    /// Side of the jitter window as a fraction of the cell size, centered on
    /// the cell center (0.08 keeps samples well away from cell borders).
    pub sample_area: f32,
    /// Cells whose summed luminance is below this are dark (bit 1).
    pub threshold: f32,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            sample_count: 20,
            sample_area: 0.08,
            threshold: 15.0,
        }
    }
}

impl SampleParams {
    pub fn validate(&self) -> Result<(), GridSpecError> {
        if self.sample_count == 0 {
            return Err(GridSpecError::NoSamples);
        }
        Ok(())
    }
}

/// Byte packing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackParams {
    /// Start each byte's accumulator at 1 instead of 0.
    ///
    /// With 6-bit groups this sets bit 6 of every output byte, so a group of
    /// all-light cells encodes as `0b1000000` (`'@'`) rather than `0`. Keep it
    /// on to stay byte-compatible with existing decoded streams.
    pub sentinel: bool,
}

impl Default for PackParams {
    fn default() -> Self {
        Self { sentinel: true }
    }
}
