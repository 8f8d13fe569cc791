//! Units and fixed rendering values.

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

/// Font used when a field resolves to no font name.
pub const DEFAULT_FONT: &str = "Helvetica";

/// Font size (points) used when a field resolves to size 0.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Border width (points) every widget gets in debug mode.
pub const DEBUG_BORDER_WIDTH: f32 = 2.0;

/// Annotation flag `Print`.
pub const ANNOT_FLAG_PRINT: i64 = 4;

/// Appearance state used for a checked box when the widget names none.
pub const DEFAULT_ON_STATE: &[u8] = b"Yes";

/// Grid: major and minor line spacing, page margin (mm) and label size (pt).
pub const GRID_MAJOR_STEP_MM: f32 = 10.0;
pub const GRID_MINOR_STEP_MM: f32 = 2.0;
pub const GRID_MARGIN_MM: f32 = 10.0;
pub const GRID_LABEL_SIZE: f32 = 8.0;
