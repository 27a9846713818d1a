//! Centralized color handling for the UI.

use eframe::egui::Color32;

/// Canvas background.
pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);

/// Projection center marker.
pub const CENTER_MARKER: Color32 = Color32::from_rgb(180, 180, 200);

/// Muted gray for secondary labels.
pub const LABEL: Color32 = Color32::from_rgb(140, 140, 150);

/// Parses a `#rrggbb` palette color; anything unparsable falls back to a
/// neutral gray rather than failing the draw.
pub fn parse_hex_color(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color32::GRAY;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color32::from_rgb(r, g, b),
        _ => Color32::GRAY,
    }
}
