//! Session state: the projection center and the ordered overlay registry.
//!
//! The session object is the single point of truth for everything on the
//! canvas. Entries keep their source outline alongside the projected form
//! so a center change can rebuild every projection from original
//! coordinates rather than from already-projected (and thus lossy) data.

use crate::error::{Result, WorkbenchError};
use crate::geo::model::Outline;
use crate::geo::projection::{project_outline, ProjectedOutline, ProjectionCenter};
use std::fmt;
use std::ops::Add;

/// Unique handle for an overlay instance on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an overlay is: which category and sub-item it came from, and what
/// to call it in the UI and exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayIdentity {
    pub category: String,
    pub sub_item_id: String,
    pub display_name: String,
}

/// User-controlled translation in meters, applied at render time only.
///
/// Never scales or rotates the geometry, so the relative scale between any
/// two overlays is independent of how they have been dragged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlacementOffset {
    pub dx: f64,
    pub dy: f64,
}

impl PlacementOffset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Add for PlacementOffset {
    type Output = PlacementOffset;

    fn add(self, other: PlacementOffset) -> PlacementOffset {
        PlacementOffset::new(self.dx + other.dx, self.dy + other.dy)
    }
}

/// One overlay on the canvas.
#[derive(Debug, Clone)]
pub struct OverlayEntry {
    id: OverlayId,
    identity: OverlayIdentity,
    color: String,
    source: Outline,
    projected: ProjectedOutline,
    offset: PlacementOffset,
}

impl OverlayEntry {
    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn identity(&self) -> &OverlayIdentity {
        &self.identity
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn projected(&self) -> &ProjectedOutline {
        &self.projected
    }

    pub fn offset(&self) -> PlacementOffset {
        self.offset
    }

    /// Placement mutation is reserved for the drag controller.
    pub(in crate::overlay) fn set_offset(&mut self, offset: PlacementOffset) {
        self.offset = offset;
    }
}

/// A comparison session: one projection center, one ordered registry.
///
/// Insertion order is render order (later additions draw on top). All
/// mutating operations are all-or-nothing: a failure leaves the session
/// exactly as it was.
#[derive(Debug, Default)]
pub struct Session {
    center: Option<ProjectionCenter>,
    allow_duplicates: bool,
    entries: Vec<OverlayEntry>,
    next_id: u64,
}

impl Session {
    pub fn new(center: Option<ProjectionCenter>, allow_duplicates: bool) -> Self {
        Self {
            center,
            allow_duplicates,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn center(&self) -> Option<ProjectionCenter> {
        self.center
    }

    /// Projects an outline with the session center and appends it.
    ///
    /// Fails with `ProjectionCenterUndefined` before a center is set, and
    /// with `DuplicateSelection` when the same sub-item is already present
    /// and duplicates are disallowed.
    pub fn add(
        &mut self,
        identity: OverlayIdentity,
        outline: Outline,
        color: String,
    ) -> Result<OverlayId> {
        let center = self
            .center
            .ok_or(WorkbenchError::ProjectionCenterUndefined)?;

        if !self.allow_duplicates {
            let duplicate = self.entries.iter().any(|e| {
                e.identity.category == identity.category
                    && e.identity.sub_item_id == identity.sub_item_id
            });
            if duplicate {
                return Err(WorkbenchError::DuplicateSelection {
                    category: identity.category,
                    sub_item: identity.display_name,
                });
            }
        }

        let projected = project_outline(center, &outline)?;

        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.entries.push(OverlayEntry {
            id,
            identity,
            color,
            source: outline,
            projected,
            offset: PlacementOffset::default(),
        });
        Ok(id)
    }

    /// Removes an entry, returning it. Removing an unknown id is an error,
    /// not a silent no-op.
    pub fn remove(&mut self, id: OverlayId) -> Result<OverlayEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(WorkbenchError::NotFound(id))?;
        Ok(self.entries.remove(index))
    }

    /// Read-only snapshot in insertion order.
    pub fn list(&self) -> &[OverlayEntry] {
        &self.entries
    }

    pub fn get(&self, id: OverlayId) -> Option<&OverlayEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(in crate::overlay) fn get_mut(&mut self, id: OverlayId) -> Option<&mut OverlayEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-projects every entry's source outline against a new center.
    ///
    /// Identity, order, and placement offsets are preserved; only the
    /// projected geometry changes. If any outline fails against the new
    /// center (antipodal point), nothing changes and the old center stays
    /// in effect.
    pub fn reproject(&mut self, new_center: ProjectionCenter) -> Result<()> {
        let reprojected = self
            .entries
            .iter()
            .map(|e| project_outline(new_center, &e.source))
            .collect::<Result<Vec<_>>>()?;

        for (entry, projected) in self.entries.iter_mut().zip(reprojected) {
            entry.projected = projected;
        }
        self.center = Some(new_center);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::model::{Attributes, GeoPoint, RawFeature};
    use crate::geo::projection::geodesic_distance;
    use approx::assert_relative_eq;
    use geo_types::Coord;

    fn outline_from_bbox(name: &str, lons: (f64, f64), lats: (f64, f64)) -> Outline {
        let ring = vec![
            Coord { x: lons.0, y: lats.0 },
            Coord { x: lons.1, y: lats.0 },
            Coord { x: lons.1, y: lats.1 },
            Coord { x: lons.0, y: lats.1 },
        ];
        Outline::from_raw(
            RawFeature {
                polygons: vec![(ring, vec![])],
                attributes: Attributes::new(),
            },
            name,
        )
        .unwrap()
    }

    fn identity(category: &str, name: &str) -> OverlayIdentity {
        OverlayIdentity {
            category: category.to_string(),
            sub_item_id: format!("{category}/{name}"),
            display_name: name.to_string(),
        }
    }

    fn tokyo() -> ProjectionCenter {
        ProjectionCenter::new(139.767, 35.681).unwrap()
    }

    // Coarse bounding quads; enough geometry for scale assertions.
    fn japan() -> Outline {
        outline_from_bbox("Japan", (129.4, 145.8), (31.0, 45.5))
    }

    fn united_kingdom() -> Outline {
        outline_from_bbox("United Kingdom", (-8.6, 1.8), (49.9, 58.7))
    }

    #[test]
    fn test_add_requires_center() {
        let mut session = Session::new(None, true);
        let err = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::ProjectionCenterUndefined));
        assert!(session.is_empty());
    }

    #[test]
    fn test_add_and_list_in_insertion_order() {
        let mut session = Session::new(Some(tokyo()), true);
        let a = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        let b = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#222".to_string(),
            )
            .unwrap();

        let names: Vec<&str> = session
            .list()
            .iter()
            .map(|e| e.identity().display_name.as_str())
            .collect();
        assert_eq!(names, ["Japan", "United Kingdom"]);
        assert_ne!(a, b);
        assert_eq!(session.get(a).unwrap().offset(), PlacementOffset::default());
    }

    #[test]
    fn test_duplicate_policy() {
        let mut strict = Session::new(Some(tokyo()), false);
        strict
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        let err = strict
            .add(identity("Countries", "Japan"), japan(), "#222".to_string())
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::DuplicateSelection { .. }));
        assert_eq!(strict.list().len(), 1);

        let mut lenient = Session::new(Some(tokyo()), true);
        lenient
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        lenient
            .add(identity("Countries", "Japan"), japan(), "#222".to_string())
            .unwrap();
        assert_eq!(lenient.list().len(), 2);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut session = Session::new(Some(tokyo()), true);
        let id = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        session.remove(id).unwrap();
        let err = session.remove(id).unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
    }

    #[test]
    fn test_remove_and_readd_is_deterministic() {
        let mut session = Session::new(Some(tokyo()), true);
        let id = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#111".to_string(),
            )
            .unwrap();
        let first = session.get(id).unwrap().projected().clone();
        session.remove(id).unwrap();

        let id = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#111".to_string(),
            )
            .unwrap();
        assert_eq!(session.get(id).unwrap().projected(), &first);
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        // An outline with a vertex at the center's antipode must not leave
        // a partial entry behind.
        let mut session = Session::new(Some(ProjectionCenter::new(0.0, 0.0).unwrap()), true);
        let ring = vec![
            Coord { x: 179.0, y: -1.0 },
            Coord { x: 180.0, y: 0.0 },
            Coord { x: 179.0, y: 1.0 },
            Coord { x: 178.0, y: 0.0 },
        ];
        let poisoned = Outline::from_raw(
            RawFeature {
                polygons: vec![(ring, vec![])],
                attributes: Attributes::new(),
            },
            "Antipode",
        )
        .unwrap();
        assert!(session
            .add(identity("Test", "Antipode"), poisoned, "#111".to_string())
            .is_err());
        assert!(session.is_empty());
    }

    #[test]
    fn test_reproject_preserves_identity_order_and_offsets() {
        let mut session = Session::new(Some(tokyo()), true);
        let a = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        let b = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#222".to_string(),
            )
            .unwrap();

        // Give one overlay a non-trivial placement before re-centering.
        session
            .get_mut(a)
            .unwrap()
            .set_offset(PlacementOffset::new(50_000.0, -20_000.0));

        let before: Vec<ProjectedOutline> =
            session.list().iter().map(|e| e.projected().clone()).collect();

        let london = ProjectionCenter::new(-0.128, 51.507).unwrap();
        session.reproject(london).unwrap();

        assert_eq!(session.center(), Some(london));
        let ids: Vec<OverlayId> = session.list().iter().map(|e| e.id()).collect();
        assert_eq!(ids, [a, b]);
        for (entry, old) in session.list().iter().zip(&before) {
            assert_ne!(entry.projected(), old);
        }
        assert_eq!(
            session.get(a).unwrap().offset(),
            PlacementOffset::new(50_000.0, -20_000.0)
        );
    }

    #[test]
    fn test_reproject_failure_changes_nothing() {
        let mut session = Session::new(Some(tokyo()), true);
        let id = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();
        let before = session.get(id).unwrap().projected().clone();

        // Exactly antipodal to Japan's south-west bounding vertex.
        let bad_center = ProjectionCenter::new(-50.6, -31.0).unwrap();
        assert!(session.reproject(bad_center).is_err());

        assert_eq!(session.center(), Some(tokyo()));
        assert_eq!(session.get(id).unwrap().projected(), &before);
    }

    #[test]
    fn test_japan_extent_near_center_is_true_scale() {
        // Near the projection center the planar extent must match the
        // geodesic extent closely.
        let mut session = Session::new(Some(tokyo()), true);
        let id = session
            .add(identity("Countries", "Japan"), japan(), "#111".to_string())
            .unwrap();

        let projected = session.get(id).unwrap().projected();
        let corners = &projected.polygons()[0].exterior.points;
        let geodesic_diagonal =
            geodesic_distance(GeoPoint::new(129.4, 31.0), GeoPoint::new(145.8, 45.5));

        // SW-to-NE corner separation is the clean scale check; the
        // axis-aligned bounds also pick up the outline's slight rotation
        // in the plane (meridian convergence), so they get more slack.
        let corner_distance = corners[0].distance_to(&corners[2]);
        assert_relative_eq!(corner_distance, geodesic_diagonal, max_relative = 0.01);

        let (min_x, min_y, max_x, max_y) = projected.bounds().unwrap();
        let diagonal = (max_x - min_x).hypot(max_y - min_y);
        assert_relative_eq!(diagonal, geodesic_diagonal, max_relative = 0.08);
    }

    #[test]
    fn test_uk_centered_extent_not_mercator_inflated() {
        // With the center on the UK itself, the projected extent reads the
        // true ~1200 km diagonal. A Mercator rendering at these latitudes
        // would inflate linear scale by about 1/cos(54 deg) = 1.7x.
        let center = ProjectionCenter::new(-2.5, 54.5).unwrap();
        let mut session = Session::new(Some(center), true);
        let id = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#111".to_string(),
            )
            .unwrap();

        let (min_x, min_y, max_x, max_y) = session.get(id).unwrap().projected().bounds().unwrap();
        let diagonal = (max_x - min_x).hypot(max_y - min_y);

        let geodesic_diagonal =
            geodesic_distance(GeoPoint::new(-8.6, 49.9), GeoPoint::new(1.8, 58.7));
        assert_relative_eq!(diagonal, geodesic_diagonal, max_relative = 0.05);

        let mercator_diagonal = geodesic_diagonal / 54.5_f64.to_radians().cos();
        assert!(diagonal < 0.75 * mercator_diagonal);
    }

    #[test]
    fn test_uk_from_tokyo_distance_preserved_along_radial() {
        // 9500 km from the center the tangential direction stretches (the
        // projection is only locally distortion-free), but separation along
        // the radial from the center is preserved exactly. The UK's SW-NE
        // diagonal happens to lie nearly along the radial from Tokyo.
        let mut session = Session::new(Some(tokyo()), true);
        let id = session
            .add(
                identity("Countries", "United Kingdom"),
                united_kingdom(),
                "#111".to_string(),
            )
            .unwrap();

        let projected = session.get(id).unwrap().projected();
        let corners = &projected.polygons()[0].exterior.points;
        // Ring order: SW, SE, NE, NW (then closing point).
        let sw = corners[0];
        let ne = corners[2];

        let planar = sw.distance_to(&ne);
        let geodesic =
            geodesic_distance(GeoPoint::new(-8.6, 49.9), GeoPoint::new(1.8, 58.7));
        assert_relative_eq!(planar, geodesic, max_relative = 0.02);

        // Distortion at that range stays bounded: the axis-aligned extent
        // never blows up past the tangential stretch factor.
        let (min_x, min_y, max_x, max_y) = projected.bounds().unwrap();
        let diagonal = (max_x - min_x).hypot(max_y - min_y);
        assert!(diagonal < 1.8 * geodesic);
    }
}
