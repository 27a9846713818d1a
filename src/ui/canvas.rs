//! Central canvas UI: the true-scale overlay plane.
//!
//! Draws every overlay with its placement offset applied, routes pointer
//! gestures either to the drag controller (when the gesture starts on an
//! overlay) or to view pan, and keeps scroll zoom anchored under the
//! cursor. Zoom and pan only change how the plane is mapped to the screen;
//! placement offsets live in meters and are independent of the view.

use crate::export::{fit_transform, PlaneTransform};
use crate::geo::projection::PlanarPoint;
use crate::overlay::{OverlayId, PlacementOffset};
use crate::state::AppState;
use crate::ui::colors;
use eframe::egui::{self, Align2, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke};

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, colors::BACKGROUND);

        let Some(bounds) = projected_bounds(state) else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Add an outline from the left panel",
                FontId::proportional(14.0),
                colors::LABEL,
            );
            handle_view_interaction(&response, &rect, state);
            return;
        };

        let transform = view_transform(bounds, &rect, state);

        draw_center_marker(&painter, &rect, &transform);
        draw_overlays(&painter, &transform, state);
        draw_scale_readout(&painter, &rect, &transform);

        handle_overlay_drag(&response, &transform, state);
        handle_view_interaction(&response, &rect, state);
    });
}

/// Union of every overlay's projected bounds, ignoring placement offsets:
/// (min_x, min_y, max_x, max_y) in meters.
///
/// The fit deliberately ignores offsets so an in-flight drag never
/// rescales the plane under the pointer.
fn projected_bounds(state: &AppState) -> Option<(f64, f64, f64, f64)> {
    let mut combined: Option<(f64, f64, f64, f64)> = None;
    for entry in state.session.list() {
        let Some((min_x, min_y, max_x, max_y)) = entry.projected().bounds() else {
            continue;
        };
        combined = Some(match combined {
            None => (min_x, min_y, max_x, max_y),
            Some((a, b, c, d)) => (
                a.min(min_x),
                b.min(min_y),
                c.max(max_x),
                d.max(max_y),
            ),
        });
    }
    combined
}

/// Maps plane meters to screen pixels: the projected union is fitted to
/// the canvas, then the view zoom and pan are applied about the canvas
/// center.
fn view_transform(bounds: (f64, f64, f64, f64), rect: &Rect, state: &AppState) -> PlaneTransform {
    let fit = fit_transform(bounds, rect.width() as f64, rect.height() as f64);
    let scale = fit.scale * state.view.zoom as f64;

    let (min_x, min_y, max_x, max_y) = bounds;
    let extent_cx = (min_x + max_x) / 2.0;
    let extent_cy = (min_y + max_y) / 2.0;

    let center = rect.center() + state.view.pan_offset;
    PlaneTransform {
        scale,
        ox: center.x as f64 - extent_cx * scale,
        oy: center.y as f64 + extent_cy * scale,
    }
}

fn to_plane(transform: &PlaneTransform, pos: Pos2) -> PlanarPoint {
    PlanarPoint::new(
        (pos.x as f64 - transform.ox) / transform.scale,
        (transform.oy - pos.y as f64) / transform.scale,
    )
}

fn to_pos2(transform: &PlaneTransform, point: PlanarPoint) -> Pos2 {
    let (x, y) = transform.to_screen(point);
    Pos2::new(x as f32, y as f32)
}

/// Topmost overlay whose translated bounding box contains the point.
/// Later additions draw on top, so entries are tested in reverse order.
fn hit_test(state: &AppState, point: PlanarPoint) -> Option<OverlayId> {
    for entry in state.session.list().iter().rev() {
        let Some((min_x, min_y, max_x, max_y)) = entry.projected().bounds() else {
            continue;
        };
        let offset = entry.offset();
        if point.x >= min_x + offset.dx
            && point.x <= max_x + offset.dx
            && point.y >= min_y + offset.dy
            && point.y <= max_y + offset.dy
        {
            return Some(entry.id());
        }
    }
    None
}

fn handle_overlay_drag(response: &egui::Response, transform: &PlaneTransform, state: &mut AppState) {
    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let point = to_plane(transform, pos);
            if let Some(id) = hit_test(state, point) {
                if state.drags.begin_drag(&state.session, id, point).is_ok() {
                    state.view.dragging = Some(id);
                }
            }
        }
    }

    if response.dragged() {
        match state.view.dragging {
            Some(id) => {
                if let Some(pos) = response.interact_pointer_pos() {
                    let point = to_plane(transform, pos);
                    if state.drags.update_drag(&mut state.session, id, point).is_err() {
                        // The overlay went away mid-gesture; drop the drag.
                        state.drags.end_drag(id);
                        state.view.dragging = None;
                    }
                }
            }
            None => state.view.pan_offset += response.drag_delta(),
        }
    }

    // Covers both a normal release and an abandoned gesture (pointer
    // released off-canvas): whatever offset the last update computed
    // stands.
    if response.drag_stopped() {
        if let Some(id) = state.view.dragging.take() {
            state.drags.end_drag(id);
        }
    }
}

fn handle_view_interaction(response: &egui::Response, rect: &Rect, state: &mut AppState) {
    // Scroll zooms relative to the cursor position.
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.001;
            let old_zoom = state.view.zoom;
            let new_zoom = (old_zoom * zoom_factor).clamp(0.05, 50.0);

            // Adjust pan offset to keep the point under cursor stationary
            if let Some(cursor_pos) = response.hover_pos() {
                let cursor_rel = cursor_pos - rect.center();
                let ratio = new_zoom / old_zoom;
                state.view.pan_offset =
                    cursor_rel * (1.0 - ratio) + state.view.pan_offset * ratio;
            }

            state.view.zoom = new_zoom;
        }
    }

    // Reset view on double-click
    if response.double_clicked() {
        state.view.reset();
    }
}

/// Marks the projection center, the one point of the plane with zero
/// distortion.
fn draw_center_marker(painter: &Painter, rect: &Rect, transform: &PlaneTransform) {
    let pos = to_pos2(transform, PlanarPoint::default());
    if !rect.contains(pos) {
        return;
    }
    painter.circle_filled(pos, 3.0, colors::CENTER_MARKER);
    painter.circle_stroke(pos, 7.0, Stroke::new(1.0, colors::CENTER_MARKER));
}

fn draw_overlays(painter: &Painter, transform: &PlaneTransform, state: &AppState) {
    for entry in state.session.list() {
        let color = colors::parse_hex_color(entry.color());
        let width = if state.view.dragging == Some(entry.id()) {
            3.0
        } else {
            2.0
        };
        let stroke = Stroke::new(width, color);
        let offset = entry.offset();

        for polygon in entry.projected().polygons() {
            draw_ring(painter, transform, &polygon.exterior.points, offset, stroke);
            for hole in &polygon.holes {
                draw_ring(painter, transform, &hole.points, offset, stroke);
            }
        }

        if state.view.labels {
            if let Some((min_x, _, max_x, max_y)) = entry.projected().bounds() {
                let top = to_pos2(
                    transform,
                    PlanarPoint::new((min_x + max_x) / 2.0 + offset.dx, max_y + offset.dy),
                );
                painter.text(
                    Pos2::new(top.x, top.y - 4.0),
                    Align2::CENTER_BOTTOM,
                    &entry.identity().display_name,
                    FontId::proportional(12.0),
                    color,
                );
            }
        }
    }
}

fn draw_ring(
    painter: &Painter,
    transform: &PlaneTransform,
    points: &[PlanarPoint],
    offset: PlacementOffset,
    stroke: Stroke,
) {
    // Rings are stored explicitly closed, so a polyline closes the shape.
    let screen: Vec<Pos2> = points
        .iter()
        .map(|p| to_pos2(transform, PlanarPoint::new(p.x + offset.dx, p.y + offset.dy)))
        .collect();
    painter.add(Shape::line(screen, stroke));
}

/// Corner readout of the current pixels-to-meters mapping.
fn draw_scale_readout(painter: &Painter, rect: &Rect, transform: &PlaneTransform) {
    let meters_per_100px = 100.0 / transform.scale;
    let label = if meters_per_100px >= 1000.0 {
        format!("100 px = {:.0} km", meters_per_100px / 1000.0)
    } else {
        format!("100 px = {meters_per_100px:.0} m")
    };
    painter.text(
        rect.left_bottom() + egui::Vec2::new(10.0, -10.0),
        Align2::LEFT_BOTTOM,
        label,
        FontId::monospace(11.0),
        colors::LABEL,
    );
}
