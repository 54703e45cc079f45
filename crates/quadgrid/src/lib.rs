//! High-level facade crate for the `quadgrid-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core, decode and session crates
//! - (feature-gated) filesystem assets backed by the `image` crate, so a
//!   session can be driven from a PNG and an on-disk corner record
//!
//! ## Quickstart
//!
//! ```no_run
//! use quadgrid::fs::FsAssets;
//! use quadgrid::session::{Session, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = SessionConfig::new("shot.png");
//! config.seed = Some(7);
//! let assets = FsAssets::from_config(&config);
//!
//! let mut session = Session::init(&assets, config)?;
//! let bytes = session.decode();
//! println!("{}", String::from_utf8_lossy(&bytes));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `quadgrid::core`: images, luminance matrix, Sobel gradient, quad corners.
//! - `quadgrid::decode`: grid parameters, jittered cell sampling, bit packing.
//! - `quadgrid::session`: calibration session, reload lifecycle, view state.
//! - `quadgrid::fs` (feature `image`): image decoding and corner-file I/O.

pub use quadgrid_core as core;
pub use quadgrid_decode as decode;
pub use quadgrid_session as session;

pub use quadgrid_core::{LumaMatrix, QuadCorners, RgbaImage};
pub use quadgrid_decode::{GridSpec, PackParams, SampleParams};
pub use quadgrid_session::{Session, SessionConfig, SessionError};

#[cfg(feature = "image")]
pub mod fs;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Decode a whole image in one call: luminance, sampling and packing.
///
/// Uses a seeded jitter so the result is reproducible.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, corners, pack),
        fields(width = image.width, height = image.height, rows = grid.rows, cols = grid.cols)
    )
)]
pub fn decode_rgba(
    image: &RgbaImage,
    corners: &QuadCorners,
    grid: GridSpec,
    sampling: SampleParams,
    pack: &PackParams,
    seed: u64,
) -> Result<Vec<u8>, quadgrid_decode::GridSpecError> {
    use rand::{rngs::StdRng, SeedableRng};

    grid.validate(pack)?;
    sampling.validate()?;
    let lum = quadgrid_core::extract_luminance(&image.view());
    let sampler = quadgrid_decode::CellSampler::new(&lum, corners, grid, sampling);
    Ok(quadgrid_decode::decode(&sampler, pack, &mut StdRng::seed_from_u64(seed)))
}
