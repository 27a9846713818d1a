//! Error taxonomy for the workbench core.
//!
//! The library layer never logs or prints; every fallible operation returns
//! one of these variants for the UI or export layer to present.

use thiserror::Error;

/// Errors surfaced by the workbench core.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    /// A ring had fewer than four points or a coordinate was out of range.
    #[error("invalid geometry in feature '{feature}': {reason}")]
    InvalidGeometry { feature: String, reason: String },

    /// A source point is exactly antipodal to the projection center, so no
    /// finite bearing exists.
    #[error("point ({lon}, {lat}) is antipodal to the projection center")]
    AntipodalPoint { lon: f64, lat: f64 },

    /// The same sub-item was added twice while duplicates are disallowed.
    #[error("'{sub_item}' from category '{category}' is already on the canvas")]
    DuplicateSelection { category: String, sub_item: String },

    /// An overlay id was not present in the registry.
    #[error("overlay {0} not found")]
    NotFound(crate::overlay::OverlayId),

    /// A projection was attempted before a center was configured.
    #[error("no projection center configured")]
    ProjectionCenterUndefined,

    /// A `where` filter expression failed to parse.
    #[error("invalid filter expression '{expression}': {reason}")]
    FilterParse { expression: String, reason: String },

    /// The configuration document could not be read or deserialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// A data source file could not be read or parsed.
    #[error("dataset '{path}': {reason}")]
    Dataset { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;
