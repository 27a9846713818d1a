//! Azimuthal-equidistant projection engine.
//!
//! Converts geographic coordinates to and from a local tangent plane
//! centered at a configurable point. Distances and initial bearings are
//! computed on a spherical earth model; the same model is used for every
//! transform in a session so relative scale between overlays stays exact.
//!
//! In the projected plane, (0, 0) is the center, +y is north, +x is east,
//! and the straight-line distance from the origin to any projected point
//! equals the geodesic distance from the center to the source point.

use crate::error::{Result, WorkbenchError};
use crate::geo::model::{GeoPoint, Outline, Ring};

/// Mean radius of Earth in meters (IUGG derived geometric constant).
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Central angle below which a point is treated as coincident with the
/// center.
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Margin to pi within which a point is treated as antipodal. Wider than
/// the coincident threshold: the haversine loses about eight digits of
/// angle resolution next to the antipode.
const ANTIPODAL_EPSILON: f64 = 1e-7;

/// The tangent point anchoring the projection for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionCenter(pub GeoPoint);

impl ProjectionCenter {
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        let point = GeoPoint::new(lon, lat);
        if !point.in_range() {
            return Err(WorkbenchError::Config(format!(
                "projection center ({lon}, {lat}) out of WGS84 range"
            )));
        }
        Ok(Self(point))
    }

    pub fn point(&self) -> GeoPoint {
        self.0
    }
}

/// A position in the tangent plane, meters relative to the center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarPoint {
    /// Meters east of the center.
    pub x: f64,
    /// Meters north of the center.
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Geodesic distance in meters between two points (haversine).
pub fn geodesic_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    central_angle(a, b) * MEAN_EARTH_RADIUS
}

/// Central angle in radians between two points.
fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    // Rounding can push h a ulp past 1 near the antipode, which would turn
    // sqrt(1 - h) into NaN.
    let h = ((dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing in radians from `a` to `b`, clockwise from north.
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    y.atan2(x)
}

/// Projects a geographic point into the tangent plane.
///
/// A point coincident with the center maps to (0, 0). An antipodal point is
/// rejected: its bearing is undefined and it should have been excluded at
/// configuration time.
pub fn project(center: ProjectionCenter, point: GeoPoint) -> Result<PlanarPoint> {
    let delta = central_angle(center.0, point);

    if delta < COINCIDENT_EPSILON {
        return Ok(PlanarPoint::default());
    }
    if std::f64::consts::PI - delta < ANTIPODAL_EPSILON {
        return Err(WorkbenchError::AntipodalPoint {
            lon: point.lon,
            lat: point.lat,
        });
    }

    let distance = delta * MEAN_EARTH_RADIUS;
    let bearing = initial_bearing(center.0, point);
    Ok(PlanarPoint::new(
        distance * bearing.sin(),
        distance * bearing.cos(),
    ))
}

/// Recovers the geographic point for a planar position (direct geodesic
/// problem on the sphere).
pub fn unproject(center: ProjectionCenter, point: PlanarPoint) -> GeoPoint {
    let distance = point.x.hypot(point.y);
    if distance == 0.0 {
        return center.0;
    }

    let delta = distance / MEAN_EARTH_RADIUS;
    let bearing = point.x.atan2(point.y);

    let phi1 = center.0.lat.to_radians();
    let lambda1 = center.0.lon.to_radians();

    let phi2 =
        (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * bearing.cos()).asin();
    let lambda2 = lambda1
        + (bearing.sin() * delta.sin() * phi1.cos())
            .atan2(delta.cos() - phi1.sin() * phi2.sin());

    GeoPoint::new(normalize_lon(lambda2.to_degrees()), phi2.to_degrees())
}

fn normalize_lon(lon: f64) -> f64 {
    let mut lon = lon;
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}

/// A ring projected into the tangent plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRing {
    pub points: Vec<PlanarPoint>,
}

/// A polygon projected into the tangent plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    pub exterior: ProjectedRing,
    pub holes: Vec<ProjectedRing>,
}

/// An outline with every ring mapped into the tangent plane.
///
/// Created once when an outline is added to the comparison; immutable until
/// the projection center changes, at which point it is rebuilt from the
/// retained source outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedOutline {
    polygons: Vec<ProjectedPolygon>,
}

impl ProjectedOutline {
    pub fn polygons(&self) -> &[ProjectedPolygon] {
        &self.polygons
    }

    /// Axis-aligned bounds in meters: (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for polygon in &self.polygons {
            for p in &polygon.exterior.points {
                bounds = Some(match bounds {
                    None => (p.x, p.y, p.x, p.y),
                    Some((min_x, min_y, max_x, max_y)) => (
                        min_x.min(p.x),
                        min_y.min(p.y),
                        max_x.max(p.x),
                        max_y.max(p.y),
                    ),
                });
            }
        }
        bounds
    }
}

/// Projects every ring of an outline. All-or-nothing: any failing point
/// (antipodal) fails the whole outline.
pub fn project_outline(
    center: ProjectionCenter,
    outline: &Outline,
) -> Result<ProjectedOutline> {
    let mut polygons = Vec::with_capacity(outline.polygons().len());
    for polygon in outline.polygons() {
        polygons.push(ProjectedPolygon {
            exterior: project_ring(center, &polygon.exterior)?,
            holes: polygon
                .holes
                .iter()
                .map(|h| project_ring(center, h))
                .collect::<Result<Vec<_>>>()?,
        });
    }
    Ok(ProjectedOutline { polygons })
}

fn project_ring(center: ProjectionCenter, ring: &Ring) -> Result<ProjectedRing> {
    let points = ring
        .points()
        .iter()
        .map(|p| project(center, *p))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProjectedRing { points })
}
