//! Vector dataset readers.
//!
//! Parses GeoJSON and Shapefile sources into raw feature records: ring
//! coordinate sequences plus the full attribute mapping. Only areal
//! geometry (Polygon/MultiPolygon) is kept; other geometry types in a
//! dataset are skipped. Normalization and validation happen afterwards in
//! the geometry model.

use crate::error::{Result, WorkbenchError};
use crate::geo::model::{AttributeValue, Attributes, RawFeature};
use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};
use shapefile::dbase::FieldValue;
use std::io::Cursor;
use std::path::Path;

/// Reads a dataset file, dispatching on its extension.
///
/// `.json` / `.geojson` parse as GeoJSON; `.shp` reads the shapefile plus
/// its sibling `.dbf` for attributes (missing `.dbf` means featureless
/// attribute maps, not an error).
pub fn read_dataset(path: &Path) -> Result<Vec<RawFeature>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" | "geojson" => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| dataset_error(path, &e.to_string()))?;
            read_geojson(&text).map_err(|e| dataset_error(path, &e.to_string()))
        }
        "shp" => {
            let shp_bytes =
                std::fs::read(path).map_err(|e| dataset_error(path, &e.to_string()))?;
            let dbf_bytes = std::fs::read(path.with_extension("dbf")).ok();
            read_shapefile(&shp_bytes, dbf_bytes.as_deref())
                .map_err(|e| dataset_error(path, &e.to_string()))
        }
        other => Err(dataset_error(
            path,
            &format!("unsupported dataset extension '{other}'"),
        )),
    }
}

fn dataset_error(path: &Path, reason: &str) -> WorkbenchError {
    WorkbenchError::Dataset {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Parses GeoJSON text into raw features.
pub fn read_geojson(text: &str) -> Result<Vec<RawFeature>> {
    let geojson: GeoJson = text.parse().map_err(|e| WorkbenchError::Dataset {
        path: "<geojson>".to_string(),
        reason: format!("failed to parse GeoJSON: {e}"),
    })?;

    let mut features = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(raw) = convert_feature(&feature) {
                    features.push(raw);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(raw) = convert_feature(&feature) {
                features.push(raw);
            }
        }
        GeoJson::Geometry(geometry) => {
            if let Some(polygons) = convert_geometry(&geometry) {
                features.push(RawFeature {
                    polygons,
                    attributes: Attributes::new(),
                });
            }
        }
    }

    Ok(features)
}

fn convert_feature(feature: &Feature) -> Option<RawFeature> {
    let polygons = feature.geometry.as_ref().and_then(convert_geometry)?;

    let mut attributes = Attributes::new();
    if let Some(properties) = &feature.properties {
        for (key, value) in properties {
            if let Some(attr) = json_to_attribute(value) {
                attributes.insert(key.clone(), attr);
            }
        }
    }

    Some(RawFeature {
        polygons,
        attributes,
    })
}

fn json_to_attribute(value: &serde_json::Value) -> Option<AttributeValue> {
    match value {
        serde_json::Value::String(s) => Some(AttributeValue::Text(s.clone())),
        serde_json::Value::Number(n) => n.as_f64().map(AttributeValue::Number),
        serde_json::Value::Bool(b) => Some(AttributeValue::Boolean(*b)),
        _ => None,
    }
}

type RawPolygons = Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)>;

fn convert_geometry(geometry: &Geometry) -> Option<RawPolygons> {
    match &geometry.value {
        Value::Polygon(rings) => convert_polygon_rings(rings).map(|p| vec![p]),
        Value::MultiPolygon(polygons) => {
            let converted: RawPolygons = polygons
                .iter()
                .filter_map(|rings| convert_polygon_rings(rings))
                .collect();
            (!converted.is_empty()).then_some(converted)
        }
        Value::GeometryCollection(geometries) => {
            let mut all = RawPolygons::new();
            for g in geometries {
                if let Some(polygons) = convert_geometry(g) {
                    all.extend(polygons);
                }
            }
            (!all.is_empty()).then_some(all)
        }
        // Points and lines are not outlines; skip them.
        _ => None,
    }
}

fn convert_polygon_rings(
    rings: &[Vec<Vec<f64>>],
) -> Option<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)> {
    if rings.is_empty() {
        return None;
    }
    let exterior: Vec<Coord<f64>> = rings[0]
        .iter()
        .map(|c| Coord { x: c[0], y: c[1] })
        .collect();
    let holes: Vec<Vec<Coord<f64>>> = rings[1..]
        .iter()
        .map(|ring| ring.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
        .collect();
    Some((exterior, holes))
}

/// Reads features from shapefile bytes (.shp contents, optional .dbf
/// contents for attributes).
pub fn read_shapefile(shp_bytes: &[u8], dbf_bytes: Option<&[u8]>) -> Result<Vec<RawFeature>> {
    let shp_cursor = Cursor::new(shp_bytes);
    let mut shape_reader =
        shapefile::ShapeReader::new(shp_cursor).map_err(|e| WorkbenchError::Dataset {
            path: "<shapefile>".to_string(),
            reason: format!("failed to read shapefile: {e}"),
        })?;

    let dbf_records: Option<Vec<shapefile::dbase::Record>> = dbf_bytes.and_then(|bytes| {
        let dbf_cursor = Cursor::new(bytes);
        shapefile::dbase::Reader::new(dbf_cursor)
            .ok()
            .and_then(|mut r: shapefile::dbase::Reader<Cursor<&[u8]>>| r.read().ok())
    });

    let mut features = Vec::new();
    for (idx, result) in shape_reader.iter_shapes().enumerate() {
        let shape: shapefile::Shape = result.map_err(|e| WorkbenchError::Dataset {
            path: "<shapefile>".to_string(),
            reason: format!("failed to read shape: {e}"),
        })?;

        let attributes = dbf_records
            .as_ref()
            .and_then(|records| records.get(idx))
            .map(record_attributes)
            .unwrap_or_default();

        if let Some(polygons) = convert_shape(&shape) {
            features.push(RawFeature {
                polygons,
                attributes,
            });
        }
    }

    Ok(features)
}

fn record_attributes(record: &shapefile::dbase::Record) -> Attributes {
    let mut attributes = Attributes::new();
    for (name, value) in record.clone() {
        let attr = match value {
            FieldValue::Character(Some(s)) => {
                Some(AttributeValue::Text(s.trim().to_string()))
            }
            FieldValue::Numeric(Some(n)) => Some(AttributeValue::Number(n)),
            FieldValue::Float(Some(f)) => Some(AttributeValue::Number(f as f64)),
            FieldValue::Double(d) => Some(AttributeValue::Number(d)),
            FieldValue::Integer(i) => Some(AttributeValue::Number(i as f64)),
            FieldValue::Logical(Some(b)) => Some(AttributeValue::Boolean(b)),
            _ => None,
        };
        if let Some(attr) = attr {
            attributes.insert(name, attr);
        }
    }
    attributes
}

fn convert_shape(shape: &shapefile::Shape) -> Option<RawPolygons> {
    match shape {
        shapefile::Shape::Polygon(poly) => {
            use shapefile::PolygonRing;

            let mut outer_rings: Vec<Vec<Coord<f64>>> = Vec::new();
            let mut holes: Vec<Vec<Coord<f64>>> = Vec::new();

            for ring in poly.rings() {
                let coords: Vec<Coord<f64>> = ring
                    .points()
                    .iter()
                    .map(|p| Coord { x: p.x, y: p.y })
                    .collect();

                match ring {
                    PolygonRing::Outer(_) => outer_rings.push(coords),
                    PolygonRing::Inner(_) => holes.push(coords),
                }
            }

            if outer_rings.is_empty() {
                return None;
            }

            // A single outer ring keeps its holes; with multiple outer
            // rings the hole-to-ring association is not recoverable from
            // the shapefile part order alone, so holes are dropped.
            if outer_rings.len() == 1 {
                Some(vec![(outer_rings.remove(0), holes)])
            } else {
                Some(outer_rings.into_iter().map(|ext| (ext, Vec::new())).collect())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_FEATURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"NAME": "Square", "POP": 1200, "ISLAND": false},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        }, {
            "type": "Feature",
            "properties": {"NAME": "Route"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[0.0, 0.0], [1.0, 1.0]]
            }
        }]
    }"#;

    #[test]
    fn test_geojson_polygon_with_attributes() {
        let features = read_geojson(SQUARE_FEATURE).unwrap();

        // The LineString feature is skipped.
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature.polygons.len(), 1);
        assert_eq!(feature.polygons[0].0.len(), 5);
        assert_eq!(
            feature.attributes.get("NAME"),
            Some(&AttributeValue::Text("Square".to_string()))
        );
        assert_eq!(
            feature.attributes.get("POP"),
            Some(&AttributeValue::Number(1200.0))
        );
        assert_eq!(
            feature.attributes.get("ISLAND"),
            Some(&AttributeValue::Boolean(false))
        );
    }

    #[test]
    fn test_geojson_multipolygon() {
        let text = r#"{
            "type": "Feature",
            "properties": {"NAME": "Twin"},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
                ]
            }
        }"#;

        let features = read_geojson(text).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].polygons.len(), 2);
    }

    #[test]
    fn test_geojson_polygon_with_hole() {
        let text = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                    [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0], [1.0, 1.0]]
                ]
            }
        }"#;

        let features = read_geojson(text).unwrap();
        assert_eq!(features[0].polygons[0].1.len(), 1);
    }

    #[test]
    fn test_geojson_parse_failure() {
        assert!(read_geojson("not geojson").is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_dataset(Path::new("data/outlines.gpkg")).unwrap_err();
        assert!(matches!(err, WorkbenchError::Dataset { .. }));
    }
}
