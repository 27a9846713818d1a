//! Overlay session: registry of placed outlines plus drag alignment.

mod alignment;
mod registry;

pub use alignment::DragController;
pub use registry::{
    OverlayEntry, OverlayId, OverlayIdentity, PlacementOffset, Session,
};
