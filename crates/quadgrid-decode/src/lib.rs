//! Grid sampling and bit decoding over a four-corner quad.
//!
//! A [`GridSpec`] lays `rows × cols` cells over the unit square, which
//! [`quadgrid_core::QuadCorners`] maps into the image. [`CellSampler`] sums
//! jittered luminance reads inside each cell, and [`decode`] thresholds those
//! sums and packs groups of columns into bytes.
//!
//! ```
//! use quadgrid_core::{LumaMatrix, QuadCorners};
//! use quadgrid_decode::{decode, CellSampler, GridSpec, PackParams, SampleParams};
//! use rand::SeedableRng;
//!
//! let lum = LumaMatrix::filled(100, 100, 1.0);
//! let corners = QuadCorners::rect(0.0, 0.0, 100.0, 100.0);
//! let sampler = CellSampler::new(&lum, &corners, GridSpec::default(), SampleParams::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let bytes = decode(&sampler, &PackParams::default(), &mut rng);
//! assert_eq!(bytes, vec![b'@'; 66]);
//! ```

mod output;
mod pack;
mod params;
mod sample;

pub use output::{to_hex, write_decoded};
pub use pack::{decode, decode_from_grid, is_dark, pack_group};
pub use params::{GridSpec, GridSpecError, PackParams, SampleParams};
pub use sample::{CellGrid, CellSampler};
