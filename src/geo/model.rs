//! Normalized geometry model.
//!
//! Readers hand over raw coordinate arrays and an attribute mapping; this
//! module validates them and produces the [`Outline`] form the rest of the
//! workbench operates on. Everything here is a pure transformation.

use crate::error::{Result, WorkbenchError};
use geo_types::Coord;
use std::collections::BTreeMap;

/// A geographic position in degrees, WGS84.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether the coordinates are within WGS84 bounds.
    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A closed loop of geographic positions.
///
/// Stored explicitly closed (first == last). Construction closes an open
/// sequence by repeating its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<GeoPoint>,
}

impl Ring {
    /// Validates and closes a point sequence.
    ///
    /// The input must carry at least four points (a closed triangle) and
    /// every coordinate must be within WGS84 range. `feature` names the
    /// owning feature in error messages.
    pub fn new(points: Vec<GeoPoint>, feature: &str) -> Result<Self> {
        if points.len() < 4 {
            return Err(WorkbenchError::InvalidGeometry {
                feature: feature.to_string(),
                reason: format!("ring has {} points, need at least 4", points.len()),
            });
        }

        if let Some(bad) = points.iter().find(|p| !p.in_range()) {
            return Err(WorkbenchError::InvalidGeometry {
                feature: feature.to_string(),
                reason: format!("coordinate ({}, {}) out of range", bad.lon, bad.lat),
            });
        }

        let mut points = points;
        if points.first() != points.last() {
            points.push(points[0]);
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

/// A single polygon: exterior ring plus holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// An attribute value as produced by the vector readers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Feature attribute mapping (key -> value).
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A raw feature as delivered by a reader: rings as coordinate arrays plus
/// the attribute mapping, not yet validated.
#[derive(Debug, Clone, Default)]
pub struct RawFeature {
    /// Each entry is (exterior, holes) in source order.
    pub polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)>,
    pub attributes: Attributes,
}

/// One named geographic feature, normalized: an ordered sequence of polygons
/// (multipolygon parts) plus its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    polygons: Vec<PolygonRings>,
    attributes: Attributes,
}

impl Outline {
    /// Normalizes a raw feature, validating every ring.
    ///
    /// Fails on the first degenerate ring or out-of-range coordinate; the
    /// caller is expected to abort the batch that contained the feature.
    pub fn from_raw(raw: RawFeature, feature: &str) -> Result<Self> {
        if raw.polygons.is_empty() {
            return Err(WorkbenchError::InvalidGeometry {
                feature: feature.to_string(),
                reason: "feature has no polygon geometry".to_string(),
            });
        }

        let mut polygons = Vec::with_capacity(raw.polygons.len());
        for (exterior, holes) in raw.polygons {
            let exterior = Ring::new(coords_to_points(&exterior), feature)?;
            let holes = holes
                .into_iter()
                .map(|h| Ring::new(coords_to_points(&h), feature))
                .collect::<Result<Vec<_>>>()?;
            polygons.push(PolygonRings { exterior, holes });
        }

        Ok(Self {
            polygons,
            attributes: raw.attributes,
        })
    }

    pub fn polygons(&self) -> &[PolygonRings] {
        &self.polygons
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Geographic bounds across all exterior rings:
    /// (min_lon, min_lat, max_lon, max_lat).
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for polygon in &self.polygons {
            for p in polygon.exterior.points() {
                bounds = Some(match bounds {
                    None => (p.lon, p.lat, p.lon, p.lat),
                    Some((min_lon, min_lat, max_lon, max_lat)) => (
                        min_lon.min(p.lon),
                        min_lat.min(p.lat),
                        max_lon.max(p.lon),
                        max_lat.max(p.lat),
                    ),
                });
            }
        }
        bounds
    }
}

fn coords_to_points(coords: &[Coord<f64>]) -> Vec<GeoPoint> {
    coords.iter().map(|c| GeoPoint::new(c.x, c.y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_coords() -> Vec<Coord<f64>> {
        vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 1.0 },
        ]
    }

    #[test]
    fn test_ring_closes_open_sequence() {
        let points: Vec<GeoPoint> = square_coords()
            .iter()
            .map(|c| GeoPoint::new(c.x, c.y))
            .collect();
        let ring = Ring::new(points, "test").unwrap();

        assert_eq!(ring.points().len(), 5);
        assert_eq!(ring.points().first(), ring.points().last());
    }

    #[test]
    fn test_ring_rejects_too_few_points() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ];
        let err = Ring::new(points, "triangle").unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkbenchError::InvalidGeometry { .. }
        ));
    }

    #[test]
    fn test_ring_rejects_out_of_range_coordinates() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(181.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 1.0),
        ];
        assert!(Ring::new(points, "test").is_err());

        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, -91.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 1.0),
        ];
        assert!(Ring::new(points, "test").is_err());
    }

    #[test]
    fn test_outline_from_raw() {
        let raw = RawFeature {
            polygons: vec![(square_coords(), vec![])],
            attributes: Attributes::from([(
                "NAME".to_string(),
                AttributeValue::Text("Square".to_string()),
            )]),
        };

        let outline = Outline::from_raw(raw, "Square").unwrap();
        assert_eq!(outline.polygons().len(), 1);
        assert!(outline.polygons()[0].holes.is_empty());
        assert_eq!(
            outline.attributes().get("NAME").and_then(|v| v.as_text()),
            Some("Square")
        );
    }

    #[test]
    fn test_outline_rejects_empty_feature() {
        let raw = RawFeature::default();
        assert!(Outline::from_raw(raw, "empty").is_err());
    }

    #[test]
    fn test_outline_rejects_degenerate_hole() {
        let raw = RawFeature {
            polygons: vec![(
                square_coords(),
                vec![vec![Coord { x: 0.2, y: 0.2 }, Coord { x: 0.4, y: 0.4 }]],
            )],
            attributes: Attributes::new(),
        };
        assert!(Outline::from_raw(raw, "holey").is_err());
    }
}
