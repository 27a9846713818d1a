//! True-scale outline comparison core.
//!
//! Everything behind the workbench application: the geometry model and
//! azimuthal-equidistant projection, dataset readers, configuration and
//! catalog layers, the overlay session with drag alignment, and the
//! export/render adapter. The core modules never log or print; fallible
//! operations return an [`error::WorkbenchError`] for the app layer
//! ([`state`], [`ui`]) to present.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod overlay;
pub mod state;
pub mod ui;
