//! Drag-to-align controller.
//!
//! Translates pointer gestures into placement offsets. Pointer positions
//! arrive already converted to plane meters (the canvas divides out its
//! pixels-per-meter factor), so an offset accumulated over any number of
//! drags stays a pure translation and never touches projected geometry.

use crate::error::{Result, WorkbenchError};
use crate::geo::projection::PlanarPoint;
use crate::overlay::registry::{OverlayId, PlacementOffset, Session};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct DragState {
    pointer_start: PlanarPoint,
    start_offset: PlacementOffset,
}

/// Tracks in-flight drags by overlay id.
///
/// Drags on different overlays are independent; a second `begin_drag` on
/// the same overlay restarts its gesture from the current offset.
#[derive(Debug, Default)]
pub struct DragController {
    active: HashMap<OverlayId, DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag: records the pointer position and the entry's offset
    /// at gesture start.
    pub fn begin_drag(
        &mut self,
        session: &Session,
        id: OverlayId,
        pointer: PlanarPoint,
    ) -> Result<()> {
        let entry = session.get(id).ok_or(WorkbenchError::NotFound(id))?;
        self.active.insert(
            id,
            DragState {
                pointer_start: pointer,
                start_offset: entry.offset(),
            },
        );
        Ok(())
    }

    /// Applies the gesture's current delta:
    /// `offset = start_offset + (pointer - pointer_start)`.
    ///
    /// Repeated calls with the same pointer position are idempotent: the
    /// offset is always derived from the gesture start, never incremented.
    /// An update without an active drag (stray pointer event after the
    /// gesture ended) is a no-op.
    pub fn update_drag(
        &mut self,
        session: &mut Session,
        id: OverlayId,
        pointer: PlanarPoint,
    ) -> Result<()> {
        let Some(drag) = self.active.get(&id) else {
            return Ok(());
        };
        let entry = session.get_mut(id).ok_or(WorkbenchError::NotFound(id))?;

        let delta = PlacementOffset::new(
            pointer.x - drag.pointer_start.x,
            pointer.y - drag.pointer_start.y,
        );
        entry.set_offset(drag.start_offset + delta);
        Ok(())
    }

    /// Finalizes a drag; whatever offset the last update computed stands.
    /// Also covers abandoned gestures (pointer released off-canvas): the
    /// caller simply ends the drag with no further update. Ending an
    /// inactive drag is a no-op.
    pub fn end_drag(&mut self, id: OverlayId) {
        self.active.remove(&id);
    }

    pub fn is_dragging(&self, id: OverlayId) -> bool {
        self.active.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::model::{Attributes, Outline, RawFeature};
    use crate::geo::projection::ProjectionCenter;
    use crate::overlay::registry::OverlayIdentity;
    use geo_types::Coord;

    // A coarse California bounding quad.
    fn california() -> Outline {
        let ring = vec![
            Coord { x: -124.4, y: 32.5 },
            Coord { x: -114.1, y: 32.5 },
            Coord { x: -114.1, y: 42.0 },
            Coord { x: -124.4, y: 42.0 },
        ];
        Outline::from_raw(
            RawFeature {
                polygons: vec![(ring, vec![])],
                attributes: Attributes::new(),
            },
            "California",
        )
        .unwrap()
    }

    fn session_with_california() -> (Session, OverlayId) {
        let center = ProjectionCenter::new(-119.4, 37.2).unwrap();
        let mut session = Session::new(Some(center), true);
        let id = session
            .add(
                OverlayIdentity {
                    category: "US States".to_string(),
                    sub_item_id: "US States/California".to_string(),
                    display_name: "California".to_string(),
                },
                california(),
                "#1f77b4".to_string(),
            )
            .unwrap();
        (session, id)
    }

    #[test]
    fn test_drag_sets_offset_and_leaves_geometry_alone() {
        let (mut session, id) = session_with_california();
        let mut drags = DragController::new();
        let projected_before = session.get(id).unwrap().projected().clone();

        drags
            .begin_drag(&session, id, PlanarPoint::new(1000.0, 2000.0))
            .unwrap();
        drags
            .update_drag(&mut session, id, PlanarPoint::new(51_000.0, -18_000.0))
            .unwrap();
        drags.end_drag(id);

        let entry = session.get(id).unwrap();
        assert_eq!(entry.offset(), PlacementOffset::new(50_000.0, -20_000.0));
        assert_eq!(entry.projected(), &projected_before);
    }

    #[test]
    fn test_drag_additivity() {
        // Dragging by v then by w must equal a single drag by v + w.
        let (mut session, id) = session_with_california();
        let mut drags = DragController::new();

        drags
            .begin_drag(&session, id, PlanarPoint::new(0.0, 0.0))
            .unwrap();
        drags
            .update_drag(&mut session, id, PlanarPoint::new(50_000.0, -20_000.0))
            .unwrap();
        drags.end_drag(id);

        drags
            .begin_drag(&session, id, PlanarPoint::new(300.0, 400.0))
            .unwrap();
        drags
            .update_drag(&mut session, id, PlanarPoint::new(-9_700.0, 5_400.0))
            .unwrap();
        drags.end_drag(id);

        assert_eq!(
            session.get(id).unwrap().offset(),
            PlacementOffset::new(50_000.0, -20_000.0) + PlacementOffset::new(-10_000.0, 5_000.0)
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let (mut session, id) = session_with_california();
        let mut drags = DragController::new();

        drags
            .begin_drag(&session, id, PlanarPoint::new(0.0, 0.0))
            .unwrap();
        for _ in 0..5 {
            drags
                .update_drag(&mut session, id, PlanarPoint::new(7_000.0, 3_000.0))
                .unwrap();
        }
        assert_eq!(
            session.get(id).unwrap().offset(),
            PlacementOffset::new(7_000.0, 3_000.0)
        );
    }

    #[test]
    fn test_restarted_drag_keeps_current_offset_as_base() {
        let (mut session, id) = session_with_california();
        let mut drags = DragController::new();

        drags
            .begin_drag(&session, id, PlanarPoint::new(0.0, 0.0))
            .unwrap();
        drags
            .update_drag(&mut session, id, PlanarPoint::new(1_000.0, 0.0))
            .unwrap();

        // Restart mid-gesture; the accumulated 1 km becomes the new base.
        drags
            .begin_drag(&session, id, PlanarPoint::new(500.0, 500.0))
            .unwrap();
        drags
            .update_drag(&mut session, id, PlanarPoint::new(500.0, 1_500.0))
            .unwrap();

        assert_eq!(
            session.get(id).unwrap().offset(),
            PlacementOffset::new(1_000.0, 1_000.0)
        );
    }

    #[test]
    fn test_update_without_begin_is_noop() {
        let (mut session, id) = session_with_california();
        let mut drags = DragController::new();

        drags
            .update_drag(&mut session, id, PlanarPoint::new(9_000.0, 9_000.0))
            .unwrap();
        assert_eq!(session.get(id).unwrap().offset(), PlacementOffset::default());
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let (_, id) = session_with_california();
        let mut drags = DragController::new();
        drags.end_drag(id);
        assert!(!drags.is_dragging(id));
    }

    #[test]
    fn test_begin_drag_unknown_overlay() {
        let (session, id) = session_with_california();
        let other = Session::new(session.center(), true);
        let mut drags = DragController::new();
        let err = drags
            .begin_drag(&other, id, PlanarPoint::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
    }

    #[test]
    fn test_independent_drags_commute() {
        let center = ProjectionCenter::new(-119.4, 37.2).unwrap();
        let mut session = Session::new(Some(center), true);
        let a = session
            .add(
                OverlayIdentity {
                    category: "US States".to_string(),
                    sub_item_id: "US States/California".to_string(),
                    display_name: "California".to_string(),
                },
                california(),
                "#111".to_string(),
            )
            .unwrap();
        let b = session
            .add(
                OverlayIdentity {
                    category: "US States".to_string(),
                    sub_item_id: "US States/California".to_string(),
                    display_name: "California".to_string(),
                },
                california(),
                "#222".to_string(),
            )
            .unwrap();

        let mut drags = DragController::new();
        drags.begin_drag(&session, a, PlanarPoint::new(0.0, 0.0)).unwrap();
        drags.begin_drag(&session, b, PlanarPoint::new(0.0, 0.0)).unwrap();

        // Interleaved updates on the two gestures.
        drags
            .update_drag(&mut session, a, PlanarPoint::new(1_000.0, 0.0))
            .unwrap();
        drags
            .update_drag(&mut session, b, PlanarPoint::new(0.0, 2_000.0))
            .unwrap();
        drags
            .update_drag(&mut session, a, PlanarPoint::new(3_000.0, 0.0))
            .unwrap();
        drags.end_drag(a);
        drags.end_drag(b);

        assert_eq!(session.get(a).unwrap().offset(), PlacementOffset::new(3_000.0, 0.0));
        assert_eq!(session.get(b).unwrap().offset(), PlacementOffset::new(0.0, 2_000.0));
    }
}
