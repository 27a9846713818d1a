//! Export/render adapter.
//!
//! Turns the session registry into drawable output: a pixel-space payload
//! (rings of screen coordinates per overlay, after placement offsets and a
//! fit-to-extent scale) and a self-contained static HTML document that
//! renders the payload as SVG and keeps the overlays draggable.

use crate::geo::projection::PlanarPoint;
use crate::overlay::{OverlayEntry, Session};
use serde::Serialize;

/// Virtual canvas used by the static HTML export.
pub const EXPORT_WIDTH: f64 = 1200.0;
pub const EXPORT_HEIGHT: f64 = 800.0;

/// Fraction of the canvas kept free around the fitted geometry.
const FIT_MARGIN: f64 = 0.05;

/// Plane-meters to screen-pixels mapping: `sx = ox + x * scale`,
/// `sy = oy - y * scale` (north up on screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneTransform {
    pub scale: f64,
    pub ox: f64,
    pub oy: f64,
}

impl PlaneTransform {
    pub fn to_screen(&self, p: PlanarPoint) -> (f64, f64) {
        (self.ox + p.x * self.scale, self.oy - p.y * self.scale)
    }
}

/// Bounds of every overlay's projected geometry with its placement offset
/// applied: (min_x, min_y, max_x, max_y) in meters. None while the canvas
/// is empty.
pub fn combined_bounds(session: &Session) -> Option<(f64, f64, f64, f64)> {
    let mut combined: Option<(f64, f64, f64, f64)> = None;
    for entry in session.list() {
        let Some((min_x, min_y, max_x, max_y)) = entry.projected().bounds() else {
            continue;
        };
        let offset = entry.offset();
        let shifted = (
            min_x + offset.dx,
            min_y + offset.dy,
            max_x + offset.dx,
            max_y + offset.dy,
        );
        combined = Some(match combined {
            None => shifted,
            Some((a, b, c, d)) => (
                a.min(shifted.0),
                b.min(shifted.1),
                c.max(shifted.2),
                d.max(shifted.3),
            ),
        });
    }
    combined
}

/// Chooses a scale and origin so the given bounds fit a canvas of
/// `width` x `height` pixels, centered, with a margin.
pub fn fit_transform(
    bounds: (f64, f64, f64, f64),
    width: f64,
    height: f64,
) -> PlaneTransform {
    let (min_x, min_y, max_x, max_y) = bounds;
    let extent_x = max_x - min_x;
    let extent_y = max_y - min_y;

    let usable_w = width * (1.0 - 2.0 * FIT_MARGIN);
    let usable_h = height * (1.0 - 2.0 * FIT_MARGIN);

    // Degenerate extents (a single point) fall back to a unit scale.
    let scale = if extent_x <= 0.0 && extent_y <= 0.0 {
        1.0
    } else {
        let sx = if extent_x > 0.0 { usable_w / extent_x } else { f64::INFINITY };
        let sy = if extent_y > 0.0 { usable_h / extent_y } else { f64::INFINITY };
        sx.min(sy)
    };

    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;
    PlaneTransform {
        scale,
        ox: width / 2.0 - center_x * scale,
        oy: height / 2.0 + center_y * scale,
    }
}

/// One overlay in screen space: ordered rings (exterior first, then holes,
/// per polygon part) of pixel coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenOverlay {
    pub overlay_id: String,
    pub name: String,
    pub color: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

fn screen_overlay(entry: &OverlayEntry, transform: &PlaneTransform) -> ScreenOverlay {
    let offset = entry.offset();
    let shift = |p: &PlanarPoint| {
        transform.to_screen(PlanarPoint::new(p.x + offset.dx, p.y + offset.dy))
    };

    let mut rings = Vec::new();
    for polygon in entry.projected().polygons() {
        rings.push(polygon.exterior.points.iter().map(&shift).collect());
        for hole in &polygon.holes {
            rings.push(hole.points.iter().map(&shift).collect());
        }
    }

    ScreenOverlay {
        overlay_id: entry.id().to_string(),
        name: entry.identity().display_name.clone(),
        color: entry.color().to_string(),
        rings,
    }
}

/// Renders the registry into pixel space for an external shell, fitting
/// every overlay (with current offsets) to the given canvas.
pub fn pixel_payload(session: &Session, width: f64, height: f64) -> Vec<ScreenOverlay> {
    let Some(bounds) = combined_bounds(session) else {
        return Vec::new();
    };
    let transform = fit_transform(bounds, width, height);
    session
        .list()
        .iter()
        .map(|e| screen_overlay(e, &transform))
        .collect()
}

#[derive(Debug, Serialize)]
struct HtmlPayload {
    title: String,
    center: Option<(f64, f64)>,
    width: f64,
    height: f64,
    overlays: Vec<ScreenOverlay>,
}

/// Serializes the session into a self-contained HTML document: SVG
/// rendering, a legend, and pointer-based dragging, no external assets.
pub fn export_html(session: &Session, title: &str) -> String {
    let payload = HtmlPayload {
        title: title.to_string(),
        center: session.center().map(|c| (c.point().lon, c.point().lat)),
        width: EXPORT_WIDTH,
        height: EXPORT_HEIGHT,
        overlays: pixel_payload(session, EXPORT_WIDTH, EXPORT_HEIGHT),
    };
    // Serialization of this payload cannot fail: it is plain strings and
    // numbers.
    let json = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());

    HTML_TEMPLATE
        .replace("__TITLE__", &html_escape(title))
        .replace("__PAYLOAD__", &json)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

const HTML_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1"/>
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  header h1 { font-size: 16px; margin: 0 0 4px 0; }
  header .meta { color: #555; font-size: 12px; }
  #overlay { width: 100%; height: 80vh; display: block; }
  #overlay path { cursor: grab; }
  .legend { display: flex; flex-wrap: wrap; gap: 10px; padding: 10px 12px; border-top: 1px solid #eee; }
  .chip { display: inline-flex; align-items: center; gap: 6px; font-size: 12px; }
  .dot { width: 10px; height: 10px; border-radius: 999px; display: inline-block; }
</style>
</head>
<body>
<header>
  <h1>__TITLE__</h1>
  <div class="meta" id="meta"></div>
</header>
<svg id="overlay" preserveAspectRatio="xMidYMid meet"></svg>
<div class="legend" id="legend"></div>
<script>
const DATA = __PAYLOAD__;

const svg = document.getElementById("overlay");
svg.setAttribute("viewBox", "0 0 " + DATA.width + " " + DATA.height);

const meta = document.getElementById("meta");
meta.textContent = DATA.center
  ? "True-scale overlay, azimuthal equidistant about (" +
    DATA.center[0].toFixed(4) + ", " + DATA.center[1].toFixed(4) +
    "). Drag shapes to compare."
  : "True-scale overlay. Drag shapes to compare.";

function ringPath(ring) {
  return "M" + ring.map(p => p[0].toFixed(1) + "," + p[1].toFixed(1)).join("L") + "Z";
}

for (const overlay of DATA.overlays) {
  const g = document.createElementNS("http://www.w3.org/2000/svg", "g");
  g.setAttribute("data-id", overlay.overlay_id);
  const path = document.createElementNS("http://www.w3.org/2000/svg", "path");
  path.setAttribute("d", overlay.rings.map(ringPath).join(""));
  path.setAttribute("fill", "none");
  path.setAttribute("stroke", overlay.color);
  path.setAttribute("stroke-width", "2");
  g.appendChild(path);
  svg.appendChild(g);

  let drag = null;
  let dx = 0, dy = 0;
  g.addEventListener("pointerdown", e => {
    drag = { x: e.clientX, y: e.clientY, dx, dy };
    g.setPointerCapture(e.pointerId);
  });
  g.addEventListener("pointermove", e => {
    if (!drag) return;
    const scale = DATA.width / svg.getBoundingClientRect().width;
    dx = drag.dx + (e.clientX - drag.x) * scale;
    dy = drag.dy + (e.clientY - drag.y) * scale;
    g.setAttribute("transform", "translate(" + dx + "," + dy + ")");
  });
  const end = () => { drag = null; };
  g.addEventListener("pointerup", end);
  g.addEventListener("pointercancel", end);
}

const legend = document.getElementById("legend");
for (const overlay of DATA.overlays) {
  const chip = document.createElement("div");
  chip.className = "chip";
  const dot = document.createElement("span");
  dot.className = "dot";
  dot.style.background = overlay.color;
  const label = document.createElement("span");
  label.textContent = overlay.name;
  chip.append(dot, label);
  legend.appendChild(chip);
}
</script>
</body>
</html>
"#;
