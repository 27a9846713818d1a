//! The category / sub-item catalog behind the selection dropdowns.
//!
//! Each configured category loads its data source once at startup, applies
//! its `where` filter, and labels every matching feature via the category's
//! name field. Sub-item ids are stable across reloads so removing and
//! re-adding the same selection reproduces identical projected output.

use crate::config::{CategoryConfig, Config};
use crate::error::Result;
use crate::geo::model::{Outline, RawFeature};
use crate::geo::projection::ProjectionCenter;
use crate::geo::reader;
use std::collections::HashMap;

/// One selectable feature: stable id, dropdown label, and its normalized
/// outline (retained for projection and re-projection).
#[derive(Debug, Clone)]
pub struct SubItem {
    pub id: String,
    pub display_name: String,
    pub outline: Outline,
}

/// A named category and its ordered sub-items.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub sub_items: Vec<SubItem>,
}

/// The two-level category -> sub-item mapping.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Loads every configured category. A category whose dataset contains
    /// an invalid feature fails as a whole rather than silently dropping
    /// records.
    pub fn load(config: &Config) -> Result<Self> {
        let mut categories = Vec::with_capacity(config.categories.len());
        for category in &config.categories {
            let path = config.resolve_path(&category.path);
            let features = reader::read_dataset(&path)?;
            categories.push(build_category(category, features)?);
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, category: &str, sub_item_id: &str) -> Option<&SubItem> {
        self.categories
            .iter()
            .find(|c| c.name == category)?
            .sub_items
            .iter()
            .find(|s| s.id == sub_item_id)
    }

    /// A center derived from the first sub-item's geographic extent, used
    /// when the configuration does not pin one: the midpoint of its
    /// bounding box.
    pub fn fallback_center(&self) -> Option<ProjectionCenter> {
        let outline = &self
            .categories
            .iter()
            .find(|c| !c.sub_items.is_empty())?
            .sub_items[0]
            .outline;
        let (min_lon, min_lat, max_lon, max_lat) = outline.bounding_box()?;
        ProjectionCenter::new((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0).ok()
    }
}

/// Filters, labels, and normalizes one category's raw features.
fn build_category(config: &CategoryConfig, features: Vec<RawFeature>) -> Result<Category> {
    let filter = config.filter()?;

    let mut sub_items = Vec::new();
    let mut name_counts: HashMap<String, usize> = HashMap::new();

    for (index, raw) in features.into_iter().enumerate() {
        if let Some(filter) = &filter {
            if !filter.matches(&raw.attributes) {
                continue;
            }
        }

        let display_name = raw
            .attributes
            .get(&config.name_field)
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| format!("{} #{}", config.name, index + 1));

        // Repeated names (multipart datasets) get a numbered id so each
        // feature stays individually addressable.
        let count = name_counts.entry(display_name.clone()).or_insert(0);
        *count += 1;
        let id = if *count == 1 {
            format!("{}/{}", config.name, display_name)
        } else {
            format!("{}/{} #{}", config.name, display_name, count)
        };

        let outline = Outline::from_raw(raw, &display_name)?;
        sub_items.push(SubItem {
            id,
            display_name,
            outline,
        });
    }

    Ok(Category {
        name: config.name.clone(),
        sub_items,
    })
}
