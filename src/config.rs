// ============================================================================
// GAUGE GEOMETRY CONSTANTS
// ============================================================================

/// Side length of the square SVG viewport.
pub const SVG_SIZE: f64 = 94.0;

/// Radius of the circle all arcs are drawn on.
pub const GAUGE_RADIUS: f64 = 40.0;

/// Stroke width of the track and the value fill.
pub const GAUGE_WIDTH: f64 = 6.0;

/// Stroke width of segment wedges and tick marks.
pub const SEGMENT_WIDTH: f64 = 12.0;

/// Start of the visible arc, degrees from 12 o'clock, clockwise positive.
pub const ARC_START_ANGLE: f64 = -155.0;

/// End of the visible arc. The 310-degree sweep leaves a 50-degree gap at
/// the bottom of the dial.
pub const ARC_END_ANGLE: f64 = 155.0;

/// Angular width of a tick mark, in value units (percent of the gauge).
pub const TICK_LENGTH: f64 = 2.0;

// ============================================================================
// PRESENTATION DEFAULTS
// ============================================================================

/// Opacity of a segment wedge while hovered.
pub const HOVER_OPACITY: f64 = 0.25;

/// Duration of the fill draw-in transition, seconds.
pub const DRAW_DURATION_SECS: f64 = 3.0;

/// Default preview window size, logical pixels.
pub const WINDOW_SIZE: usize = 300;

/// Default preview frame-rate cap.
pub const MAX_FRAMERATE: f64 = 60.0;
