//! The live calibration session and its reload lifecycle.

use nalgebra::Point2;
use quadgrid_core::{
    extract_luminance, sobel_magnitude, GrayImage, LumaMatrix, QuadCorners, RgbaImage,
};
use quadgrid_decode::{decode, to_hex, write_decoded, CellSampler, GridSpecError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    AssetError, AssetSource, Canvas, CircleStyle, InputFrame, RetainedState, SessionConfig,
    StateBlob, StateBlobError, ViewState,
};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Grid(#[from] GridSpecError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    StateBlob(#[from] StateBlobError),

    #[error("failed to write decoded output: {0}")]
    Output(#[source] std::io::Error),
}

/// Resources rebuilt from the image on every init/reload.
#[derive(Debug)]
struct Derived {
    image: RgbaImage,
    lum: LumaMatrix,
    grad: Option<LumaMatrix>,
    preview: GrayImage,
}

impl Derived {
    fn load(assets: &dyn AssetSource, config: &SessionConfig) -> Result<Self, AssetError> {
        let image = assets.load_image()?;
        let lum = extract_luminance(&image.view());
        let grad = config.compute_gradient.then(|| sobel_magnitude(&lum));
        let preview = lum.to_gray_u8();
        log::info!(
            "loaded {}x{} image from {}",
            image.width,
            image.height,
            config.image_path
        );
        Ok(Self {
            image,
            lum,
            grad,
            preview,
        })
    }
}

/// What happened during one [`Session::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Bytes emitted by a decode trigger.
    pub decoded: Option<Vec<u8>>,
    pub saved: bool,
    /// Number of cells currently below the threshold.
    pub dark_cells: usize,
}

/// Calibration context: corners, view and the image-derived matrices.
///
/// Owned by the host and passed by reference into every call; nothing here is
/// global.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: RetainedState,
    derived: Derived,
    rng: StdRng,
}

impl Session {
    /// Load assets, compute derived matrices and restore saved corners.
    ///
    /// A corner file of the wrong size is logged and ignored.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(assets, config), fields(image = %config.image_path))
    )]
    pub fn init(assets: &dyn AssetSource, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let derived = Derived::load(assets, &config)?;
        let mut state = RetainedState::default();
        if let Some(corners) = load_corners(assets, &config)? {
            state.corners = corners;
        }
        let rng = make_rng(&config);
        let mut session = Self {
            config,
            state,
            derived,
            rng,
        };
        session.reset();
        Ok(session)
    }

    /// Drop everything derived from the image and hand back the retained state.
    pub fn pre_reload(self) -> Result<StateBlob, SessionError> {
        let blob = self.state.to_blob()?;
        log::info!(
            "releasing {}x{} image before reload, retaining {} bytes of state",
            self.derived.image.width,
            self.derived.image.height,
            blob.len()
        );
        drop(self.derived);
        Ok(blob)
    }

    /// Rebuild a session from a retained blob.
    ///
    /// Blobs from older schemas are migrated; a blob that cannot be read is an
    /// error and the host must not continue with it. Corners come from the
    /// blob, not from the corner file.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(blob, assets, config), fields(blob_len = blob.len()))
    )]
    pub fn post_reload(
        blob: StateBlob,
        assets: &dyn AssetSource,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let state = RetainedState::from_blob(&blob)?;
        let derived = Derived::load(assets, &config)?;
        let rng = make_rng(&config);
        Ok(Self {
            config,
            state,
            derived,
            rng,
        })
    }

    /// Restore the default view. Corners are left alone.
    pub fn reset(&mut self) {
        self.state.view = ViewState::default();
    }

    /// Process one frame of input and draw the overlay.
    ///
    /// Only the save and decode triggers touch the corner file or `out`.
    pub fn update(
        &mut self,
        input: &InputFrame,
        canvas: &mut dyn Canvas,
        assets: &mut dyn AssetSource,
        out: &mut dyn Write,
    ) -> Result<FrameReport, SessionError> {
        let mut report = FrameReport::default();

        if input.reset {
            self.reset();
        }
        self.state
            .view
            .apply_wheel(input.wheel, self.config.zoom_step);
        self.state.drag.handle_buttons(
            input.pointer,
            input.secondary_pressed,
            input.secondary_released,
        );

        if input.save {
            assets.write_corners(&self.state.corners.to_bytes())?;
            log::info!("saved corners to {}", self.config.corners_path);
            report.saved = true;
        }
        if input.decode {
            let bytes = self.decode();
            write_decoded(out, &bytes).map_err(SessionError::Output)?;
            report.decoded = Some(bytes);
        }

        canvas.begin(&self.state.view);
        canvas.draw_image(&self.derived.preview, Point2::origin());
        for i in 0..self.state.corners.points.len() {
            let selected = input.select_held[i];
            if selected && input.primary_pressed {
                self.state.corners.set(i, input.pointer);
            }
            let style = if selected {
                CircleStyle::SelectedCorner
            } else {
                CircleStyle::Corner
            };
            canvas.draw_circle(self.state.corners.points[i], self.config.corner_radius, style);
        }

        let sampler = CellSampler::new(
            &self.derived.lum,
            &self.state.corners,
            self.config.grid,
            self.config.sampling,
        );
        let cells = sampler.sample_grid(&mut self.rng);
        for (row, col) in cells.dark_cells(self.config.sampling.threshold) {
            canvas.draw_circle(
                sampler.cell_center(row, col),
                self.config.cell_marker_radius,
                CircleStyle::DarkCell,
            );
            report.dark_cells += 1;
        }

        self.state.drag.pan(&mut self.state.view, input.pointer);
        Ok(report)
    }

    /// Decode the grid under the current corners.
    pub fn decode(&mut self) -> Vec<u8> {
        let sampler = CellSampler::new(
            &self.derived.lum,
            &self.state.corners,
            self.config.grid,
            self.config.sampling,
        );
        let bytes = decode(&sampler, &self.config.pack, &mut self.rng);
        log::debug!("decoded: {}", to_hex(&bytes));
        bytes
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &RetainedState {
        &self.state
    }

    pub fn corners(&self) -> &QuadCorners {
        &self.state.corners
    }

    /// Replace all four corners.
    pub fn set_corners(&mut self, corners: QuadCorners) {
        self.state.corners = corners;
    }

    pub fn view(&self) -> &ViewState {
        &self.state.view
    }

    pub fn luminance(&self) -> &LumaMatrix {
        &self.derived.lum
    }

    pub fn gradient(&self) -> Option<&LumaMatrix> {
        self.derived.grad.as_ref()
    }

    pub fn preview(&self) -> &GrayImage {
        &self.derived.preview
    }
}

fn load_corners(
    assets: &dyn AssetSource,
    config: &SessionConfig,
) -> Result<Option<QuadCorners>, AssetError> {
    let Some(bytes) = assets.read_corners()? else {
        return Ok(None);
    };
    match QuadCorners::from_bytes(&bytes) {
        Ok(corners) => Ok(Some(corners)),
        Err(err) => {
            log::error!("ignoring {}: {}", config.corners_path, err);
            Ok(None)
        }
    }
}

fn make_rng(config: &SessionConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
