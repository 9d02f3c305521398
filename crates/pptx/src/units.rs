//! Conversion from design-canvas pixels to PowerPoint EMUs.
//!
//! Layout positions were measured on a 1920x1080 design canvas. A deck that
//! goes through the design tool's PPTX import comes back shifted and scaled,
//! so each axis carries a fixed correction ratio measured once from a
//! calibration sample (desired value / observed value).

/// English Metric Units, the native length unit of OOXML.
pub type Emu = i64;

pub const EMU_PER_INCH: i64 = 914_400;

/// Widescreen 16:9 slide.
pub const SLIDE_WIDTH_IN: f64 = 13.333;
pub const SLIDE_HEIGHT_IN: f64 = 7.5;

/// Design canvas the template was measured on.
pub const CANVAS_WIDTH_PX: f64 = 1920.0;
pub const CANVAS_HEIGHT_PX: f64 = 1080.0;

/// Calibration ratios for the design tool round trip.
///
/// Recalibrate by placing a box at a known spot, importing the deck, and
/// dividing the intended value by the value the tool reports.
pub mod calibration {
    /// Intended X 73.6px, observed 88.1px.
    pub const LEFT: f64 = 73.6 / 88.1;
    /// Intended Y 162.3px, observed 176.8px.
    pub const TOP: f64 = 162.3 / 176.8;
    /// Intended width 1773.3px, observed 1745.8px.
    pub const WIDTH: f64 = 1773.3 / 1745.8;
    /// Intended height 510.7px, observed 482.3px.
    pub const HEIGHT: f64 = 510.7 / 482.3;
    /// 32pt in the deck shows as 48pt in the design tool.
    pub const FONT: f64 = 48.0 / 32.0;
}

/// Convert inches to EMU, truncating toward zero.
pub fn inches(value: f64) -> Emu {
    (value * EMU_PER_INCH as f64) as Emu
}

/// Horizontal canvas pixels to inches.
pub fn px_to_inches_x(px: f64) -> f64 {
    px * (SLIDE_WIDTH_IN / CANVAS_WIDTH_PX)
}

/// Vertical canvas pixels to inches.
pub fn px_to_inches_y(px: f64) -> f64 {
    px * (SLIDE_HEIGHT_IN / CANVAS_HEIGHT_PX)
}

/// Deck font size (points) that shows as `canvas_pt` after the round trip,
/// rounded to a whole point.
pub fn font_size_for_canvas(canvas_pt: f64) -> f64 {
    (canvas_pt / calibration::FONT).round()
}

/// Font size in the hundredths of a point used by `a:rPr/@sz`.
pub fn font_size_hundredths(pt: f64) -> u32 {
    (pt * 100.0).round() as u32
}

/// A placement rectangle in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Rect {
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bottom edge.
    pub fn bottom(&self) -> Emu {
        self.top + self.height
    }

    /// Build a rectangle from design-canvas pixels, applying the calibration
    /// ratios. No clamping: out-of-range input gives out-of-range output.
    pub fn from_canvas(left_px: f64, top_px: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            left: inches(px_to_inches_x(left_px) * calibration::LEFT),
            top: inches(px_to_inches_y(top_px) * calibration::TOP),
            width: inches(px_to_inches_x(width_px) * calibration::WIDTH),
            height: inches(px_to_inches_y(height_px) * calibration::HEIGHT),
        }
    }
}

/// Slide width in EMU.
pub fn slide_width() -> Emu {
    inches(SLIDE_WIDTH_IN)
}

/// Slide height in EMU.
pub fn slide_height() -> Emu {
    inches(SLIDE_HEIGHT_IN)
}
