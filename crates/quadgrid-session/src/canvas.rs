//! Drawing surface the session renders its overlay onto.

use nalgebra::Point2;
use quadgrid_core::GrayImage;
use serde::Serialize;

use crate::ViewState;

/// What a circle marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CircleStyle {
    Corner,
    SelectedCorner,
    DarkCell,
}

/// Renderer-side primitives. Coordinates are world (image) coordinates.
pub trait Canvas {
    /// Camera for the primitives that follow.
    fn begin(&mut self, view: &ViewState);
    fn draw_image(&mut self, image: &GrayImage, origin: Point2<f32>);
    fn draw_circle(&mut self, center: Point2<f32>, radius: f32, style: CircleStyle);
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    Begin { zoom: f32, target: [f32; 2] },
    Image { width: usize, height: usize, origin: [f32; 2] },
    Circle { center: [f32; 2], radius: f32, style: CircleStyle },
}

/// Canvas that records every call; used by headless hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn circles(&self, style: CircleStyle) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.commands.iter().filter_map(move |c| match c {
            DrawCommand::Circle { center, style: s, .. } if *s == style => Some(*center),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn begin(&mut self, view: &ViewState) {
        self.commands.push(DrawCommand::Begin {
            zoom: view.zoom,
            target: [view.target.x, view.target.y],
        });
    }

    fn draw_image(&mut self, image: &GrayImage, origin: Point2<f32>) {
        self.commands.push(DrawCommand::Image {
            width: image.width,
            height: image.height,
            origin: [origin.x, origin.y],
        });
    }

    fn draw_circle(&mut self, center: Point2<f32>, radius: f32, style: CircleStyle) {
        self.commands.push(DrawCommand::Circle {
            center: [center.x, center.y],
            radius,
            style,
        });
    }
}
