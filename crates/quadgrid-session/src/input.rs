use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Input gathered by the host for one frame.
///
/// `pointer` is already in world (image) coordinates; see
/// [`crate::ViewState::screen_to_world`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    pub pointer: Point2<f32>,
    /// Wheel movement this frame; only the sign matters.
    pub wheel: f32,
    /// Corner select keys (`1`..`4`) currently held.
    pub select_held: [bool; 4],
    /// Primary button went down this frame (places held corners).
    pub primary_pressed: bool,
    /// Secondary button went down / up this frame (pan drag).
    pub secondary_pressed: bool,
    pub secondary_released: bool,
    pub save: bool,
    pub decode: bool,
    pub reset: bool,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            pointer: Point2::origin(),
            wheel: 0.0,
            select_held: [false; 4],
            primary_pressed: false,
            secondary_pressed: false,
            secondary_released: false,
            save: false,
            decode: false,
            reset: false,
        }
    }
}

impl InputFrame {
    /// Frame with only the pointer set.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pointer: Point2::new(x, y),
            ..Self::default()
        }
    }

    /// Hold select key for `corner` and click.
    ///
    /// # Panics
    ///
    /// Panics if `corner >= 4`.
    pub fn place_corner(corner: usize, x: f32, y: f32) -> Self {
        let mut frame = Self::at(x, y);
        frame.select_held[corner] = true;
        frame.primary_pressed = true;
        frame
    }
}
