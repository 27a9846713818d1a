//! Application state management.
//!
//! The root state owns the loaded configuration and catalog, the overlay
//! session (the single point of truth for everything on the canvas), and
//! the UI-side view/selection state. All mutations run synchronously in
//! the event handlers that trigger them.

mod selection;
mod view;

pub use selection::SelectionState;
pub use view::ViewState;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::geo::projection::ProjectionCenter;
use crate::overlay::{DragController, OverlayId, OverlayIdentity, Session};

/// Root application state.
pub struct AppState {
    /// Loaded session configuration
    pub config: Config,

    /// Category -> sub-item catalog backing the dropdowns
    pub catalog: Catalog,

    /// Projection center + overlay registry
    pub session: Session,

    /// In-flight drag gestures
    pub drags: DragController,

    /// Dropdown selection
    pub selection: SelectionState,

    /// Canvas view controls
    pub view: ViewState,

    /// Status message displayed in the top bar
    pub status_message: String,

    /// Re-center input fields (degrees, parsed on apply)
    pub center_lon_input: String,
    pub center_lat_input: String,
}

impl AppState {
    /// Builds the initial state: the session center comes from the config
    /// or, failing that, from the first catalog entry's extent.
    pub fn new(config: Config, catalog: Catalog) -> Self {
        let center = config.center().or_else(|| catalog.fallback_center());
        let session = Session::new(center, config.allow_duplicates);

        let (lon_input, lat_input) = match center {
            Some(c) => (format!("{:.4}", c.point().lon), format!("{:.4}", c.point().lat)),
            None => (String::new(), String::new()),
        };

        Self {
            config,
            catalog,
            session,
            drags: DragController::new(),
            selection: SelectionState::default(),
            view: ViewState::default(),
            status_message: "Ready".to_string(),
            center_lon_input: lon_input,
            center_lat_input: lat_input,
        }
    }

    /// Adds the currently selected sub-item to the canvas.
    pub fn add_selected(&mut self) -> Result<OverlayId> {
        let category = self
            .catalog
            .categories()
            .get(self.selection.category_index)
            .ok_or_else(|| {
                crate::error::WorkbenchError::Config("no category selected".to_string())
            })?;
        let sub_item = category
            .sub_items
            .get(self.selection.sub_item_index)
            .ok_or_else(|| {
                crate::error::WorkbenchError::Config("no sub-item selected".to_string())
            })?;

        let identity = OverlayIdentity {
            category: category.name.clone(),
            sub_item_id: sub_item.id.clone(),
            display_name: sub_item.display_name.clone(),
        };
        let color = self.config.color_for(self.session.list().len());
        self.session.add(identity, sub_item.outline.clone(), color)
    }

    /// Removes an overlay, dropping any drag still attached to it.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Result<()> {
        self.drags.end_drag(id);
        if self.view.dragging == Some(id) {
            self.view.dragging = None;
        }
        self.session.remove(id)?;
        Ok(())
    }

    /// Re-centers the session from the input fields and re-projects every
    /// overlay. Placement offsets survive.
    pub fn apply_center(&mut self) -> Result<()> {
        let lon: f64 = self.center_lon_input.trim().parse().map_err(|_| {
            crate::error::WorkbenchError::Config(format!(
                "invalid longitude '{}'",
                self.center_lon_input
            ))
        })?;
        let lat: f64 = self.center_lat_input.trim().parse().map_err(|_| {
            crate::error::WorkbenchError::Config(format!(
                "invalid latitude '{}'",
                self.center_lat_input
            ))
        })?;

        let center = ProjectionCenter::new(lon, lat)?;
        self.session.reproject(center)
    }
}
