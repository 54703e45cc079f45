use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Smallest zoom reachable with the wheel; keeps the camera invertible.
pub const MIN_ZOOM: f32 = 0.1;

/// Pan/zoom of the 2D camera looking at the image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f32,
    /// World point shown at the viewport center.
    pub target: Point2<f32>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            target: Point2::origin(),
        }
    }
}

impl ViewState {
    /// One wheel event: any positive movement zooms in by `step`, any negative
    /// movement zooms out by `step`.
    pub fn apply_wheel(&mut self, wheel: f32, step: f32) {
        if wheel > 0.0 {
            self.zoom += step;
        } else if wheel < 0.0 {
            self.zoom = (self.zoom - step).max(MIN_ZOOM);
        }
    }

    /// Screen pixel to world coordinates for a camera centered in `viewport`.
    pub fn screen_to_world(&self, screen: Point2<f32>, viewport: Vector2<f32>) -> Point2<f32> {
        let offset = viewport * 0.5;
        let rel = screen.coords - offset;
        self.target + rel / self.zoom
    }

    pub fn world_to_screen(&self, world: Point2<f32>, viewport: Vector2<f32>) -> Point2<f32> {
        let offset = viewport * 0.5;
        Point2::from((world - self.target) * self.zoom + offset)
    }
}

/// Right-button drag used to pan the view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub dragging: bool,
    /// World point grabbed when the drag started.
    pub anchor: Point2<f32>,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            dragging: false,
            anchor: Point2::origin(),
        }
    }
}

impl DragState {
    /// Start or stop dragging. A release is only looked at while dragging and a
    /// press only while idle, so both in one frame toggle at most once.
    pub fn handle_buttons(&mut self, pointer: Point2<f32>, pressed: bool, released: bool) {
        if self.dragging {
            if released {
                self.dragging = false;
            }
        } else if pressed {
            self.dragging = true;
            self.anchor = pointer;
        }
    }

    /// Move `view` so the anchor stays under the pointer.
    pub fn pan(&self, view: &mut ViewState, pointer: Point2<f32>) {
        if self.dragging {
            view.target -= pointer - self.anchor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wheel_steps_zoom() {
        let mut view = ViewState::default();
        view.apply_wheel(3.0, 0.1);
        assert_relative_eq!(view.zoom, 1.1, epsilon = 1e-6);
        view.apply_wheel(-0.5, 0.1);
        view.apply_wheel(-0.5, 0.1);
        assert_relative_eq!(view.zoom, 0.9, epsilon = 1e-6);
        view.apply_wheel(0.0, 0.1);
        assert_relative_eq!(view.zoom, 0.9, epsilon = 1e-6);
        for _ in 0..50 {
            view.apply_wheel(-1.0, 0.1);
        }
        assert_relative_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn screen_world_round_trip() {
        let view = ViewState {
            zoom: 2.0,
            target: Point2::new(50.0, 20.0),
        };
        let viewport = Vector2::new(1600.0, 900.0);
        let center = view.screen_to_world(Point2::new(800.0, 450.0), viewport);
        assert_eq!(center, view.target);

        let w = view.screen_to_world(Point2::new(900.0, 350.0), viewport);
        assert_relative_eq!(w.x, 100.0);
        assert_relative_eq!(w.y, -30.0);
        let s = view.world_to_screen(w, viewport);
        assert_relative_eq!(s.x, 900.0);
        assert_relative_eq!(s.y, 350.0);
    }

    #[test]
    fn drag_pans_by_pointer_delta() {
        let mut view = ViewState::default();
        let mut drag = DragState::default();

        drag.handle_buttons(Point2::new(10.0, 10.0), true, false);
        assert!(drag.dragging);
        drag.pan(&mut view, Point2::new(15.0, 7.0));
        assert_eq!(view.target, Point2::new(-5.0, 3.0));

        drag.handle_buttons(Point2::new(15.0, 7.0), false, true);
        assert!(!drag.dragging);
        drag.pan(&mut view, Point2::new(100.0, 100.0));
        assert_eq!(view.target, Point2::new(-5.0, 3.0));
    }
}
