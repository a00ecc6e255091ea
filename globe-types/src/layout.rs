//! Layout geometry in CSS-like pixels. Origin is the top-left of the viewport.

use derive_more::Display;
use serde::Serialize;

/// A bounding rectangle
#[derive(Copy, Clone, PartialEq, Debug, Default, Display, Serialize)]
#[display(
    fmt = "{{top: {}, left: {}, width: {}, height: {}}}",
    "top",
    "left",
    "width",
    "height"
)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Size of the renderer's canvas
#[derive(Copy, Clone, PartialEq, Debug, Default, Display, Serialize)]
#[display(fmt = "{}x{}", "width", "height")]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// Per-edge margins applied to the element wrapping the canvas
#[derive(Copy, Clone, PartialEq, Debug, Default, Display, Serialize)]
#[display(fmt = "{}px {}px {}px {}px", "top", "right", "bottom", "left")]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn uniform(v: f64) -> Self {
        Margins {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// One measurement of the hosting container and the client viewport
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ViewportMetrics {
    pub container_top: f64,
    pub container_left: f64,
    pub container_width: f64,
    pub container_height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl ViewportMetrics {
    pub fn new(container: Rect, viewport: CanvasSize) -> Self {
        ViewportMetrics {
            container_top: container.top,
            container_left: container.left,
            container_width: container.width,
            container_height: container.height,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
        }
    }

    /// Margins that stretch a full-viewport element so its visible part lines
    /// up with the container
    pub fn margins(&self) -> Margins {
        Margins {
            top: -self.container_top,
            right: -(self.viewport_width - self.container_width - self.container_left),
            bottom: -(self.viewport_height - self.container_height - self.container_top),
            left: -self.container_left,
        }
    }

    pub fn viewport(&self) -> CanvasSize {
        CanvasSize {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}
