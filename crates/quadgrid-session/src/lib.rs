//! Interactive calibration session for quadgrid decoding.
//!
//! A [`Session`] owns the four quad corners, the pan/zoom view and the
//! matrices derived from the loaded image. Hosts drive it through a small
//! lifecycle:
//!
//! - [`Session::init`]: load assets, compute luminance, restore saved corners;
//! - [`Session::update`]: consume one [`InputFrame`], draw onto a [`Canvas`],
//!   save corners or emit a decode on request;
//! - [`Session::reset`]: default view;
//! - [`Session::pre_reload`] / [`Session::post_reload`]: hand the retained
//!   state to the host as a [`StateBlob`] across a code swap and rebuild.
//!
//! Window management, image decoding and file access stay behind the
//! [`Canvas`] and [`AssetSource`] traits.

mod assets;
mod canvas;
mod config;
mod host;
mod input;
mod session;
mod state;
mod view;

pub use assets::{AssetError, AssetSource, MemoryAssets};
pub use canvas::{Canvas, CircleStyle, DrawCommand, RecordingCanvas};
pub use config::{ConfigIoError, SessionConfig};
pub use host::{run_script, ReplayReport, ReplayScript, ScriptStep};
pub use input::InputFrame;
pub use session::{FrameReport, Session, SessionError};
pub use state::{RetainedState, StateBlob, StateBlobError, CURRENT_SCHEMA};
pub use view::{DragState, ViewState, MIN_ZOOM};
