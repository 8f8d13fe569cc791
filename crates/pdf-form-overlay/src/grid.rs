//! Millimeter coordinate grid drawn behind the widgets
//!
//! Produces content stream operations only; the caller provides the label font.

use crate::constants::{
    GRID_LABEL_SIZE, GRID_MAJOR_STEP_MM, GRID_MARGIN_MM, GRID_MINOR_STEP_MM, mm_to_pt,
};

/// Line weights in points
const MAJOR_LINE_WIDTH: f32 = 0.5;
const MINOR_LINE_WIDTH: f32 = 0.2;

/// Stroke colors (light blue, the minor lines lighter)
const MAJOR_LINE_COLOR: &str = "0.6 0.6 1";
const MINOR_LINE_COLOR: &str = "0.85 0.85 1";

/// Grid geometry, in millimeters except for the label size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub major_step_mm: f32,
    pub minor_step_mm: f32,
    pub margin_mm: f32,
    pub label_size: f32,
}

impl GridConfig {
    pub fn for_page(page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            page_width_mm,
            page_height_mm,
            major_step_mm: GRID_MAJOR_STEP_MM,
            minor_step_mm: GRID_MINOR_STEP_MM,
            margin_mm: GRID_MARGIN_MM,
            label_size: GRID_LABEL_SIZE,
        }
    }
}

/// Generate the grid as PDF content stream operations.
///
/// `font` is the resource name used for the coordinate labels.
pub fn generate_grid(config: &GridConfig, font: &str) -> String {
    let mut ops = String::new();
    ops.push_str("q\n");

    ops.push_str(&format!("{} RG {} w\n", MINOR_LINE_COLOR, MINOR_LINE_WIDTH));
    ops.push_str(&grid_lines(config, config.minor_step_mm));

    ops.push_str(&format!("{} RG {} w\n", MAJOR_LINE_COLOR, MAJOR_LINE_WIDTH));
    ops.push_str(&grid_lines(config, config.major_step_mm));

    ops.push_str("0 0 1 rg\n");
    ops.push_str(&grid_labels(config, font));

    ops.push_str("Q\n");
    ops
}

/// Positions `k * step` lying inside `[margin, extent - margin)`.
fn positions(step: f32, margin: f32, extent: f32) -> Vec<f32> {
    if step <= 0.0 {
        return Vec::new();
    }
    (1..)
        .map(|k| k as f32 * step)
        .skip_while(|&v| v < margin)
        .take_while(|&v| v < extent - margin)
        .collect()
}

fn grid_lines(config: &GridConfig, step: f32) -> String {
    let mut ops = String::new();
    let left = mm_to_pt(config.margin_mm);
    let bottom = mm_to_pt(config.margin_mm);
    let right = mm_to_pt(config.page_width_mm - config.margin_mm);
    let top = mm_to_pt(config.page_height_mm - config.margin_mm);

    for x in positions(step, config.margin_mm, config.page_width_mm) {
        let x = mm_to_pt(x);
        ops.push_str(&format!("{} {} m {} {} l S\n", x, bottom, x, top));
    }
    for y in positions(step, config.margin_mm, config.page_height_mm) {
        let y = mm_to_pt(y);
        ops.push_str(&format!("{} {} m {} {} l S\n", left, y, right, y));
    }
    ops
}

fn grid_labels(config: &GridConfig, font: &str) -> String {
    let mut ops = String::new();
    let size = config.label_size;
    let bottom = mm_to_pt(config.margin_mm);
    let top = mm_to_pt(config.page_height_mm - config.margin_mm);
    let left = mm_to_pt(config.margin_mm);
    let right = mm_to_pt(config.page_width_mm - config.margin_mm);

    // Vertical lines: labelled above and below the grid
    for x_mm in positions(config.major_step_mm, config.margin_mm, config.page_width_mm) {
        let x = mm_to_pt(x_mm) - 10.0;
        ops.push_str(&label(font, size, x, top + 2.0, x_mm));
        ops.push_str(&label(font, size, x, bottom - size - 2.0, x_mm));
    }

    // Horizontal lines: labelled left and right of the grid
    for y_mm in positions(config.major_step_mm, config.margin_mm, config.page_height_mm) {
        let y = mm_to_pt(y_mm) - 3.0;
        ops.push_str(&label(font, size, left - 3.0 * size, y, y_mm));
        ops.push_str(&label(font, size, right + 2.0, y, y_mm));
    }
    ops
}

fn label(font: &str, size: f32, x: f32, y: f32, value_mm: f32) -> String {
    format!(
        "BT /{} {} Tf {} {} Td ({:05.1}) Tj ET\n",
        font, size, x, y, value_mm
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_respect_margin() {
        let xs = positions(10.0, 10.0, 210.0);
        assert_eq!(xs.first(), Some(&10.0));
        assert_eq!(xs.last(), Some(&190.0));
        assert_eq!(xs.len(), 19);
    }

    #[test]
    fn test_grid_is_balanced_and_labelled() {
        let ops = generate_grid(&GridConfig::for_page(210.0, 297.0), "F1");
        assert!(ops.starts_with("q\n"));
        assert!(ops.ends_with("Q\n"));
        assert!(ops.contains("(100.0) Tj"));
        assert!(ops.contains("(010.0) Tj"));
        assert!(ops.contains("/F1 8 Tf"));
    }
}
