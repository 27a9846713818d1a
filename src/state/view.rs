//! Canvas view state (zoom/pan) and the in-flight drag target.

use crate::overlay::OverlayId;
use eframe::egui::Vec2;

/// View controls for the overlay canvas.
pub struct ViewState {
    /// Current zoom level (1.0 = fit to canvas)
    pub zoom: f32,

    /// Current pan offset from center, screen pixels
    pub pan_offset: Vec2,

    /// Overlay currently being dragged, if the active pointer gesture
    /// started on one (otherwise the gesture pans the view)
    pub dragging: Option<OverlayId>,

    /// Show overlay name labels on the canvas
    pub labels: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
            dragging: None,
            labels: true,
        }
    }
}

impl ViewState {
    /// Resets zoom and pan (double-click behavior).
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_offset = Vec2::ZERO;
    }
}
