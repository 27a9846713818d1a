//! UI modules for the workbench application.
//!
//! The UI is split into distinct panels:
//! - Top bar: title, projection center, status
//! - Left panel: selection dropdowns, overlay list, center and export controls
//! - Central canvas: the true-scale overlay plane

mod canvas;
pub(crate) mod colors;
mod left_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use left_panel::render_left_panel;
pub use top_bar::render_top_bar;
