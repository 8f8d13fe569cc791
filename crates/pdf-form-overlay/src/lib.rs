mod constants;
mod error;
mod fill;
mod grid;
mod io;
mod merge;
mod options;
mod render;
mod xobject;

pub use constants::{POINTS_PER_MM, mm_to_pt, pt_to_mm};
pub use error::{OverlayError, Result};
pub use fill::{FillSummary, fill};
pub use grid::{GridConfig, generate_grid};
pub use io::{load_pdf, load_pdf_bytes, pdf_to_bytes, save_pdf};
pub use merge::{MergeSummary, attach, merge, merge_with_summary};
pub use options::{OverlayOptions, PaperSize};
pub use render::render_overlay;
