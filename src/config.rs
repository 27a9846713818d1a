//! YAML configuration.
//!
//! A session is described by a declarative document: the projection center,
//! one or more named categories (each a data source path, an optional
//! `where` filter, and the attribute used to label sub-items), plus display
//! options. Dataset paths resolve relative to the config file's directory.
//!
//! ```yaml
//! title: Island comparison
//! projection_center: { lon: 139.767, lat: 35.681 }
//! allow_duplicates: false
//! categories:
//!   - name: Countries
//!     path: data/countries.geojson
//!     where: SCALERANK <= 1
//!     name_field: ADMIN
//!   - name: US States
//!     path: data/states.shp
//! ```

use crate::error::{Result, WorkbenchError};
use crate::filter::Filter;
use crate::geo::projection::ProjectionCenter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Fallback palette cycled by overlay insertion index when the config does
/// not supply its own `colors` list.
const DEFAULT_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
    "#7f7f7f", "#bcbd22", "#17becf",
];

fn default_title() -> String {
    "True-scale overlay".to_string()
}

fn default_allow_duplicates() -> bool {
    true
}

fn default_name_field() -> String {
    "NAME".to_string()
}

/// The projection center as written in the document.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CenterConfig {
    pub lon: f64,
    pub lat: f64,
}

/// One category definition: a data source plus record selection.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    /// Display name, also the dropdown label.
    pub name: String,
    /// Data source path, relative to the config file.
    pub path: PathBuf,
    /// Optional record filter over feature attributes.
    #[serde(rename = "where")]
    pub where_expr: Option<String>,
    /// Attribute naming each sub-item.
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

impl CategoryConfig {
    /// Compiles the category's `where` expression, if any.
    pub fn filter(&self) -> Result<Option<Filter>> {
        self.where_expr.as_deref().map(Filter::parse).transpose()
    }
}

/// The full session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_title")]
    pub title: String,
    pub projection_center: Option<CenterConfig>,
    /// Whether the same sub-item may be added to the canvas twice.
    #[serde(default = "default_allow_duplicates")]
    pub allow_duplicates: bool,
    /// Overlay color palette, cycled by insertion index.
    #[serde(default)]
    pub colors: Vec<String>,
    pub categories: Vec<CategoryConfig>,
    /// Directory the config file was loaded from; dataset paths resolve
    /// against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Loads and validates a configuration file.
    ///
    /// Validation covers YAML structure, a non-empty category list, filter
    /// expressions, and projection center range, so a bad document fails
    /// here rather than mid-session.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WorkbenchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&text)?;
        config.base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(config)
    }

    /// Parses and validates a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)
            .map_err(|e| WorkbenchError::Config(e.to_string()))?;

        if config.categories.is_empty() {
            return Err(WorkbenchError::Config(
                "config must define at least one category".to_string(),
            ));
        }
        for category in &config.categories {
            category.filter()?;
        }
        if let Some(center) = config.projection_center {
            ProjectionCenter::new(center.lon, center.lat)?;
        }

        Ok(config)
    }

    /// The configured projection center, if any.
    pub fn center(&self) -> Option<ProjectionCenter> {
        self.projection_center
            .and_then(|c| ProjectionCenter::new(c.lon, c.lat).ok())
    }

    /// Resolves a dataset path against the config file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Color for the overlay at the given insertion index.
    pub fn color_for(&self, index: usize) -> String {
        if self.colors.is_empty() {
            DEFAULT_COLORS[index % DEFAULT_COLORS.len()].to_string()
        } else {
            self.colors[index % self.colors.len()].clone()
        }
    }
}
