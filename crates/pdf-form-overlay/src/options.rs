/// Standard paper sizes for generated overlay pages
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Portrait dimensions (width, height) in millimeters
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Portrait dimensions (width, height) in points
    pub fn dimensions_pt(self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (crate::mm_to_pt(w), crate::mm_to_pt(h))
    }
}

/// Overlay rendering configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayOptions {
    pub paper_size: PaperSize,
    /// Outline every widget with a thick red border
    pub debug: bool,
    /// Draw a labelled millimeter grid behind the widgets
    pub grid: bool,
}

impl OverlayOptions {
    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = paper_size;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }
}
