// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::sync::mpsc::Receiver;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub mod config;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for gauge strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// CSS serialization used in generated SVG attributes.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    // Demo palette
    pub const BLUE: Self = Self::new(0x25, 0x63, 0xeb);
    pub const YELLOW: Self = Self::new(0xca, 0x8a, 0x04);
    pub const ORANGE: Self = Self::new(0xea, 0x58, 0x0c);
    pub const GREEN: Self = Self::new(0x16, 0xa3, 0x4a);

    /// Neutral track color.
    pub const TRACK: Self = Self::new(0xf1, 0xf5, 0xf9);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
}

// ============================================================================
// ARC GEOMETRY
// ============================================================================

/// Cartesian coordinate on the gauge face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Angular interval, in degrees, over which a stroke is drawn.
///
/// 0 degrees is the 12-o'clock position and positive angles sweep clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub start_deg: f64,
    pub end_deg: f64,
}

/// Converts a gauge angle to radians, rotating the zero reference from the
/// positive x-axis to the top of the circle.
pub fn to_radians(angle_deg: f64) -> f64 {
    (angle_deg - 90.0) * PI / 180.0
}

/// Point on the circle of the given center and radius at a gauge angle.
///
/// Pure and total; a negative radius mirrors the point through the center.
pub fn polar_to_cartesian(center_x: f64, center_y: f64, radius: f64, angle_deg: f64) -> Point {
    let angle_rad = to_radians(angle_deg);
    Point {
        x: center_x + radius * angle_rad.cos(),
        y: center_y + radius * angle_rad.sin(),
    }
}

/// SVG path data for an arc stroke between two gauge angles.
///
/// The path runs from the point at `end_deg` back to the point at
/// `start_deg` with the sweep flag fixed at 0; in SVG's y-down coordinate
/// space this renders the intended clockwise sweep. The large-arc flag
/// selects the minor arc for spans of exactly 180 degrees.
pub fn describe_arc(x: f64, y: f64, radius: f64, start_deg: f64, end_deg: f64) -> String {
    let start = polar_to_cartesian(x, y, radius, end_deg);
    let end = polar_to_cartesian(x, y, radius, start_deg);

    let large_arc_flag = if end_deg - start_deg <= 180.0 { "0" } else { "1" };
    // x-axis rotation is always 0 for circular arcs
    format!(
        "M {} {} A {} {} 0 {} 0 {} {}",
        start.x, start.y, radius, radius, large_arc_flag, end.x, end.y
    )
}

/// Geometric length of an arc for a radius and angle span.
///
/// Uses the plain degree-to-radian conversion, not the offset conversion for
/// coordinates. Negative when `end_deg < start_deg`; the value is returned
/// unchanged so callers driving a dash-offset animation see it as-is.
pub fn arc_length(radius: f64, start_deg: f64, end_deg: f64) -> f64 {
    let start_rad = start_deg * PI / 180.0;
    let end_rad = end_deg * PI / 180.0;
    radius * (end_rad - start_rad)
}

/// Interior tick positions splitting [0, 100] into `segments` equal parts.
///
/// Yields `segments - 1` values; empty for one segment (or zero, where the
/// output is degenerate rather than an error).
pub fn tick_positions(segments: usize) -> Vec<f64> {
    let multiplier = 100.0 / segments as f64;
    (1..segments).map(|i| i as f64 * multiplier).collect()
}

/// Value-domain wedge boundaries `(start, end, rounded)` for each gauge
/// segment, in draw order.
///
/// The first wedge starts at 0 and the last ends at 100 minus half a tick;
/// interior boundaries sit one tick length below their tick position. Only
/// the two end wedges are rounded.
pub fn wedge_spans(segments: usize, tick_length: f64) -> Vec<(f64, f64, bool)> {
    let ticks = tick_positions(segments);
    let mut spans = Vec::with_capacity(ticks.len() + 1);
    for (index, &tick) in ticks.iter().enumerate() {
        if index == 0 {
            spans.push((0.0, tick - tick_length, true));
        } else {
            spans.push((ticks[index - 1] - tick_length, tick - tick_length, false));
        }
    }
    let last_tick = ticks.last().copied().unwrap_or(0.0);
    spans.push((last_tick + tick_length / 2.0, 100.0 - tick_length / 2.0, true));
    spans
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for type-safe gauge updates
#[derive(Debug, Clone)]
pub enum GaugeCommand {
    SetValue(f64),
    SetSegments(usize),
    SetColor(Color),
}

/// Main gauge struct - the primary public interface
#[derive(Debug, Clone)]
pub struct Gauge {
    config: GaugeConfig,
    state: GaugeState,
}

#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    /// Gauge reading, 0 to 100. Out-of-range values pass through and produce
    /// degenerate geometry rather than errors.
    pub value: f64,
    /// Number of segments the dial is partitioned into.
    pub segments: usize,
    /// Stroke color of the value fill and the segment wedges.
    pub color: Color,

    // Geometry configuration
    #[builder(default = config::SVG_SIZE)]
    pub size: f64,
    #[builder(default = config::GAUGE_RADIUS)]
    pub radius: f64,
    #[builder(default = config::GAUGE_WIDTH)]
    pub stroke_width: f64,
    #[builder(default = config::SEGMENT_WIDTH)]
    pub segment_width: f64,
    #[builder(default = config::ARC_START_ANGLE)]
    pub arc_start_angle: f64,
    #[builder(default = config::ARC_END_ANGLE)]
    pub arc_end_angle: f64,
    #[builder(default = config::TICK_LENGTH)]
    pub tick_length: f64,

    // Presentation configuration
    #[builder(default = Color::TRACK)]
    pub track_color: Color,
    #[builder(default = Color::WHITE)]
    pub tick_color: Color,
    #[builder(default = config::HOVER_OPACITY)]
    pub hover_opacity: f64,
    #[builder(default = config::DRAW_DURATION_SECS)]
    pub draw_duration_secs: f64,

    // Window configuration
    #[builder(default = "gauge".to_string())]
    pub title: String,
    #[builder(default = config::WINDOW_SIZE)]
    pub window_width: usize,
    #[builder(default = config::WINDOW_SIZE)]
    pub window_height: usize,
    #[builder(default = config::MAX_FRAMERATE)]
    pub max_framerate: f64,
}

#[derive(Debug, Clone)]
struct GaugeState {
    value: f64,
    segments: usize,
    color: Color,
    hovered_segment: Option<usize>,
}

impl GaugeState {
    /// Drains pending commands without blocking. Returns true when the value
    /// changed, so the caller can restart the draw-in transition.
    fn update_with_commands(&mut self, receiver: &Receiver<GaugeCommand>) -> bool {
        let mut value_changed = false;
        while let Ok(command) = receiver.try_recv() {
            match command {
                GaugeCommand::SetValue(value) => {
                    if value != self.value {
                        self.value = value;
                        value_changed = true;
                    }
                }
                GaugeCommand::SetSegments(segments) => {
                    self.segments = segments;
                }
                GaugeCommand::SetColor(color) => {
                    self.color = color;
                }
            }
        }
        value_changed
    }
}

impl Gauge {
    pub fn new(config: GaugeConfig) -> Self {
        let state = GaugeState {
            value: config.value,
            segments: config.segments,
            color: config.color,
            hovered_segment: None,
        };

        Self { config, state }
    }

    // Setters deliberately do not clamp: out-of-domain inputs yield
    // degenerate geometry, never failures.
    pub fn set_value(&mut self, value: f64) {
        self.state.value = value;
    }

    pub fn set_segments(&mut self, segments: usize) {
        self.state.segments = segments;
    }

    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    pub fn value(&self) -> f64 {
        self.state.value
    }

    pub fn segments(&self) -> usize {
        self.state.segments
    }

    /// Builds the retained-mode scene for the current state.
    pub fn scene(&self) -> Scene {
        build_scene(&self.state, &self.config)
    }

    /// Renders the current state as a self-contained SVG document.
    pub fn to_svg(&self) -> String {
        self.scene().to_svg(&self.config)
    }

    /// Opens a preview window showing the gauge until it is closed.
    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    /// Opens a preview window driven by a command channel.
    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<GaugeCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<GaugeCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.config.clone();
        let mut state = self.state.clone();

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();
        // The fill replays its draw-in whenever the value changes, emulating
        // the SVG dash-offset transition.
        let mut draw_started = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.hovered_segment = hover_segment(
                            position.x,
                            position.y,
                            fb_width as f64,
                            fb_height as f64,
                            state.segments,
                            &config,
                        );
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            if state.update_with_commands(receiver) {
                                draw_started = Instant::now();
                            }
                        }

                        let progress = (draw_started.elapsed().as_secs_f64()
                            / config.draw_duration_secs)
                            .clamp(0.0, 1.0);

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        canvas.clear(Color::WHITE.as_tuple());
                        let scene = build_scene(&state, &config);
                        scene.render(&mut canvas, &config, progress);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

/// A single drawable primitive of the gauge, back-to-front.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    /// Background track over the full visible arc.
    Track { span: ArcSpan },
    /// Value fill; `dash_length` drives the dash-offset draw-in.
    Fill {
        span: ArcSpan,
        dash_length: f64,
        color: Color,
    },
    /// Hover-highlightable segment wedge, transparent unless hovered.
    Segment {
        span: ArcSpan,
        rounded: bool,
        color: Color,
        hovered: bool,
    },
    /// Opaque divider between two segments, drawn above the wedges.
    Tick { span: ArcSpan },
}

/// Ordered list of drawable primitives; a pure function of the gauge state,
/// consumed by the SVG and window surfaces.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Serializes the scene as a self-contained SVG document.
    ///
    /// Path data strings follow [`describe_arc`] exactly; hover highlighting
    /// of the segment wedges is expressed with an embedded style block.
    pub fn to_svg(&self, config: &GaugeConfig) -> String {
        let size = config.size;
        let center = size / 2.0;
        let radius = config.radius;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" xmlns="http://www.w3.org/2000/svg">"#
        );
        let _ = writeln!(
            svg,
            "  <style>.segment{{opacity:0;transition:opacity .3s ease-in-out}}.segment:hover{{opacity:{}}}</style>",
            config.hover_opacity
        );

        for command in &self.commands {
            match command {
                DrawCommand::Track { span } => {
                    let _ = writeln!(
                        svg,
                        r#"  <path fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" d="{}"/>"#,
                        config.track_color.to_css(),
                        config.stroke_width,
                        describe_arc(center, center, radius, span.start_deg, span.end_deg)
                    );
                }
                DrawCommand::Fill {
                    span,
                    dash_length,
                    color,
                } => {
                    let _ = writeln!(
                        svg,
                        r#"  <path fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-dasharray="{}" d="{}">"#,
                        color.to_css(),
                        config.stroke_width,
                        dash_length,
                        describe_arc(center, center, radius, span.start_deg, span.end_deg)
                    );
                    let _ = writeln!(
                        svg,
                        r#"    <animate attributeName="stroke-dashoffset" from="{}" to="{}" dur="{}s"/>"#,
                        dash_length,
                        dash_length * 2.0,
                        config.draw_duration_secs
                    );
                    let _ = writeln!(svg, "  </path>");
                }
                DrawCommand::Segment {
                    span,
                    rounded,
                    color,
                    ..
                } => {
                    let linecap = if *rounded { "round" } else { "butt" };
                    let _ = writeln!(
                        svg,
                        r#"  <path class="segment" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="{}" d="{}"/>"#,
                        color.to_css(),
                        config.segment_width,
                        linecap,
                        describe_arc(center, center, radius, span.start_deg, span.end_deg)
                    );
                }
                DrawCommand::Tick { span } => {
                    let _ = writeln!(
                        svg,
                        r#"  <path fill="none" stroke="{}" stroke-width="{}" d="{}"/>"#,
                        config.tick_color.to_css(),
                        config.segment_width,
                        describe_arc(center, center, radius, span.start_deg, span.end_deg)
                    );
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Rasterizes the scene into a framebuffer.
    ///
    /// `draw_progress` in [0, 1] sweeps the fill span, standing in for the
    /// declarative dash-offset transition of the SVG surface.
    fn render(&self, canvas: &mut Canvas, config: &GaugeConfig, draw_progress: f64) {
        let width = canvas.width as f64;
        let height = canvas.height as f64;
        let scale = width.min(height) / config.size;
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let radius = config.radius * scale;

        for command in &self.commands {
            match command {
                DrawCommand::Track { span } => {
                    render_arc_stroke(
                        canvas,
                        center_x,
                        center_y,
                        radius,
                        config.stroke_width * scale,
                        span.start_deg,
                        span.end_deg,
                        config.track_color,
                        1.0,
                        true,
                    );
                }
                DrawCommand::Fill { span, color, .. } => {
                    let sweep = (span.end_deg - span.start_deg) * draw_progress;
                    render_arc_stroke(
                        canvas,
                        center_x,
                        center_y,
                        radius,
                        config.stroke_width * scale,
                        span.start_deg,
                        span.start_deg + sweep,
                        *color,
                        1.0,
                        true,
                    );
                }
                DrawCommand::Segment {
                    span,
                    rounded,
                    color,
                    hovered,
                } => {
                    if *hovered {
                        render_arc_stroke(
                            canvas,
                            center_x,
                            center_y,
                            radius,
                            config.segment_width * scale,
                            span.start_deg,
                            span.end_deg,
                            *color,
                            config.hover_opacity,
                            *rounded,
                        );
                    }
                }
                DrawCommand::Tick { span } => {
                    render_arc_stroke(
                        canvas,
                        center_x,
                        center_y,
                        radius,
                        config.segment_width * scale,
                        span.start_deg,
                        span.end_deg,
                        config.tick_color,
                        1.0,
                        false,
                    );
                }
            }
        }
    }
}

// ============================================================================
// SCENE COMPOSITION
// ============================================================================

/// Maps a value-domain position (0 to 100) onto the dial.
///
/// The pi-scaled value mixed with the degree-domain end angle is the
/// established angle convention of this gauge and is kept verbatim.
fn value_to_angle(position: f64, config: &GaugeConfig) -> f64 {
    position * PI - config.arc_end_angle
}

fn build_scene(state: &GaugeState, config: &GaugeConfig) -> Scene {
    let mut scene = Scene::new();

    // Background track
    scene.add_command(DrawCommand::Track {
        span: ArcSpan {
            start_deg: config.arc_start_angle,
            end_deg: config.arc_end_angle,
        },
    });

    // Value fill with its dash length for the draw-in transition
    let fill_end = value_to_angle(state.value, config) - config.stroke_width / 2.0;
    let dash_length = arc_length(config.radius, config.arc_start_angle, fill_end);
    scene.add_command(DrawCommand::Fill {
        span: ArcSpan {
            start_deg: config.arc_start_angle,
            end_deg: fill_end,
        },
        dash_length,
        color: state.color,
    });

    // Segment wedges
    for (index, &(start, end, rounded)) in wedge_spans(state.segments, config.tick_length)
        .iter()
        .enumerate()
    {
        scene.add_command(DrawCommand::Segment {
            span: ArcSpan {
                start_deg: value_to_angle(start, config),
                end_deg: value_to_angle(end, config),
            },
            rounded,
            color: state.color,
            hovered: state.hovered_segment == Some(index),
        });
    }

    // Tick marks sit above the wedges
    for &tick in &tick_positions(state.segments) {
        scene.add_command(DrawCommand::Tick {
            span: ArcSpan {
                start_deg: value_to_angle(tick - config.tick_length, config),
                end_deg: value_to_angle(tick, config),
            },
        });
    }

    scene
}

/// Finds the segment wedge under a window cursor position, if any.
///
/// Inverts the value-to-angle mapping and accepts cursor positions within
/// the segment stroke band around the gauge radius.
fn hover_segment(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    segments: usize,
    config: &GaugeConfig,
) -> Option<usize> {
    let scale = width.min(height) / config.size;
    let dx = x - width / 2.0;
    let dy = y - height / 2.0;
    let dist = (dx * dx + dy * dy).sqrt();
    if (dist - config.radius * scale).abs() > config.segment_width * scale / 2.0 {
        return None;
    }

    let mut angle_deg = dy.atan2(dx).to_degrees() + 90.0;
    if angle_deg > 180.0 {
        angle_deg -= 360.0;
    }
    let position = (angle_deg + config.arc_end_angle) / PI;

    wedge_spans(segments, config.tick_length)
        .iter()
        .position(|&(start, end, _)| position >= start && position <= end)
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color, alpha: f64) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.r as f64, color.g as f64, color.b as f64];
        let out = [
            (src[0] * a + frame[idx] as f64 * (1.0 - a)).round() as u8,
            (src[1] * a + frame[idx + 1] as f64 * (1.0 - a)).round() as u8,
            (src[2] * a + frame[idx + 2] as f64 * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

/// Anti-aliased thick arc stroke centered on the given radius.
///
/// Gauge angle convention, degrees; rounded strokes get circular caps at
/// both ends, otherwise the ends are cut flat. A non-positive sweep draws
/// nothing, the raster reading of degenerate input.
fn render_arc_stroke(
    canvas: &mut Canvas,
    center_x: f64,
    center_y: f64,
    radius: f64,
    thickness: f64,
    start_deg: f64,
    end_deg: f64,
    color: Color,
    opacity: f64,
    rounded: bool,
) {
    let span = end_deg - start_deg;
    if span <= 0.0 || radius <= 0.0 {
        return;
    }
    let half = thickness / 2.0;

    let cap_start = polar_to_cartesian(center_x, center_y, radius, start_deg);
    let cap_end = polar_to_cartesian(center_x, center_y, radius, end_deg);

    let reach = radius + half + 2.0;
    let min_x = ((center_x - reach).floor() as i64).max(0) as usize;
    let max_x = ((center_x + reach).ceil() as i64).max(0) as usize;
    let min_y = ((center_y - reach).floor() as i64).max(0) as usize;
    let max_y = ((center_y + reach).ceil() as i64).max(0) as usize;

    for y in min_y..=max_y.min(canvas.height.saturating_sub(1)) {
        for x in min_x..=max_x.min(canvas.width.saturating_sub(1)) {
            let dx = x as f64 - center_x;
            let dy = y as f64 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();

            // Radial coverage of the stroke band, 1 px feather
            let band = (half - (dist - radius).abs() + 0.5).clamp(0.0, 1.0);
            if band <= 0.0 && !rounded {
                continue;
            }

            // Angular offset into the span, wrapped to [0, 360)
            let angle_deg = dy.atan2(dx).to_degrees() + 90.0;
            let offset = (angle_deg - start_deg).rem_euclid(360.0);

            let mut alpha = if offset <= span {
                // Distance to the nearer angular edge, in pixels
                let edge = (offset.min(span - offset)).to_radians() * radius;
                band * (edge + 0.5).clamp(0.0, 1.0)
            } else {
                0.0
            };

            if rounded {
                for cap in [cap_start, cap_end] {
                    let cap_dist = ((x as f64 - cap.x).powi(2) + (y as f64 - cap.y).powi(2)).sqrt();
                    alpha = alpha.max((half - cap_dist + 0.5).clamp(0.0, 1.0));
                }
            }

            if alpha > 0.01 {
                set_pixel(canvas.frame, canvas.width, x, y, color, alpha * opacity);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPSILON, "{a} != {b}");
    }

    fn test_config(value: f64, segments: usize) -> GaugeConfig {
        GaugeConfig::builder()
            .value(value)
            .segments(segments)
            .color(Color::BLUE)
            .build()
    }

    #[test]
    fn to_radians_places_zero_at_top() {
        assert_close(to_radians(90.0), 0.0);
        assert_close(to_radians(0.0), -PI / 2.0);
        assert_close(to_radians(180.0), PI / 2.0);
    }

    #[test]
    fn polar_points_lie_on_the_circle() {
        for &angle in &[-155.0, -90.0, 0.0, 33.3, 90.0, 155.0, 400.0] {
            for &radius in &[40.0, 1.0, 0.0, -10.0] {
                let p = polar_to_cartesian(47.0, 47.0, radius, angle);
                let dist = ((p.x - 47.0).powi(2) + (p.y - 47.0).powi(2)).sqrt();
                assert_close(dist, radius.abs());
            }
        }
    }

    #[test]
    fn negative_radius_mirrors_the_point() {
        let p = polar_to_cartesian(0.0, 0.0, 40.0, 30.0);
        let q = polar_to_cartesian(0.0, 0.0, -40.0, 30.0);
        assert_close(p.x, -q.x);
        assert_close(p.y, -q.y);
    }

    #[test]
    fn describe_arc_runs_from_end_angle_to_start_angle() {
        let d = describe_arc(47.0, 47.0, 40.0, -155.0, 155.0);
        let parts: Vec<&str> = d.split(' ').collect();
        assert_eq!(parts[0], "M");
        assert_eq!(parts[3], "A");

        let start = polar_to_cartesian(47.0, 47.0, 40.0, 155.0);
        let end = polar_to_cartesian(47.0, 47.0, 40.0, -155.0);
        assert_close(parts[1].parse::<f64>().unwrap(), start.x);
        assert_close(parts[2].parse::<f64>().unwrap(), start.y);
        assert_close(parts[9].parse::<f64>().unwrap(), end.x);
        assert_close(parts[10].parse::<f64>().unwrap(), end.y);
    }

    #[test]
    fn large_arc_flag_switches_just_above_half_turn() {
        // Exactly 180 degrees takes the minor arc
        let d = describe_arc(47.0, 47.0, 40.0, 0.0, 180.0);
        let parts: Vec<&str> = d.split(' ').collect();
        assert_eq!(parts[7], "0");

        let d = describe_arc(47.0, 47.0, 40.0, 0.0, 180.0001);
        let parts: Vec<&str> = d.split(' ').collect();
        assert_eq!(parts[7], "1");

        // Sweep flag is always 0
        assert_eq!(parts[8], "0");
    }

    #[test]
    fn arc_length_of_a_quarter_turn() {
        assert_close(arc_length(40.0, 0.0, 90.0), 40.0 * PI / 2.0);
    }

    #[test]
    fn arc_length_is_signed() {
        let forward = arc_length(40.0, 0.0, 90.0);
        let backward = arc_length(40.0, 90.0, 0.0);
        assert_close(backward, -forward);
        assert!(backward < 0.0);
    }

    #[test]
    fn tick_positions_partition_evenly() {
        assert_eq!(tick_positions(5), vec![20.0, 40.0, 60.0, 80.0]);
        assert_eq!(tick_positions(1), Vec::<f64>::new());

        let thirds = tick_positions(3);
        assert_eq!(thirds.len(), 2);
        assert_close(thirds[0], 100.0 / 3.0);
        assert_close(thirds[1], 200.0 / 3.0);
    }

    #[test]
    fn tick_positions_zero_segments_is_degenerate_not_a_panic() {
        assert!(tick_positions(0).is_empty());
    }

    #[test]
    fn wedge_spans_cover_segments_in_order() {
        let spans = wedge_spans(5, config::TICK_LENGTH);
        assert_eq!(spans.len(), 5);
        assert_eq!(spans[0], (0.0, 18.0, true));
        assert_eq!(spans[1], (18.0, 38.0, false));
        assert_eq!(spans[2], (38.0, 58.0, false));
        assert_eq!(spans[3], (58.0, 78.0, false));
        assert_eq!(spans[4], (81.0, 99.0, true));
    }

    #[test]
    fn single_segment_is_one_rounded_wedge() {
        let spans = wedge_spans(1, config::TICK_LENGTH);
        assert_eq!(spans, vec![(1.0, 99.0, true)]);
    }

    #[test]
    fn scene_composition_for_the_reference_gauge() {
        let gauge = Gauge::new(test_config(45.0, 5));
        let scene = gauge.scene();

        let mut tracks = 0;
        let mut wedges = Vec::new();
        let mut ticks = 0;
        let mut fill = None;
        for command in scene.commands() {
            match command {
                DrawCommand::Track { .. } => tracks += 1,
                DrawCommand::Fill { span, .. } => fill = Some(*span),
                DrawCommand::Segment { rounded, .. } => wedges.push(*rounded),
                DrawCommand::Tick { .. } => ticks += 1,
            }
        }

        assert_eq!(tracks, 1);
        assert_eq!(ticks, 4);
        assert_eq!(wedges, vec![true, false, false, false, true]);

        // Fill end angle follows the established formula: value*pi - 155 - 3
        // (stroke width 6, half 3).
        let fill = fill.unwrap();
        assert_close(fill.start_deg, -155.0);
        assert_close(fill.end_deg, 45.0 * PI - 155.0 - 3.0);
    }

    #[test]
    fn fill_dash_length_matches_arc_length() {
        let gauge = Gauge::new(test_config(45.0, 5));
        let dash = gauge
            .scene()
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Fill { dash_length, .. } => Some(*dash_length),
                _ => None,
            })
            .unwrap();
        let fill_end = 45.0 * PI - 155.0 - 3.0;
        assert_close(dash, arc_length(40.0, -155.0, fill_end));
    }

    #[test]
    fn low_value_yields_a_reversed_fill_span_unchanged() {
        // value 0 maps below the arc start; the negative dash length passes
        // through rather than being corrected.
        let gauge = Gauge::new(test_config(0.0, 5));
        for command in gauge.scene().commands() {
            if let DrawCommand::Fill { span, dash_length, .. } = command {
                assert!(span.end_deg < span.start_deg);
                assert!(*dash_length < 0.0);
            }
        }
    }

    #[test]
    fn out_of_domain_inputs_do_not_panic() {
        let mut gauge = Gauge::new(test_config(45.0, 5));
        gauge.set_value(250.0);
        gauge.set_segments(0);
        let svg = gauge.to_svg();
        assert!(svg.contains("<svg"));

        gauge.set_value(-40.0);
        gauge.set_segments(1);
        let _ = gauge.to_svg();
    }

    #[test]
    fn svg_document_shape() {
        let gauge = Gauge::new(test_config(45.0, 5));
        let svg = gauge.to_svg();

        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains(r#"viewBox="0 0 94 94""#));

        // One white tick path per interior tick
        assert_eq!(svg.matches(r#"stroke="rgb(255,255,255)""#).count(), 4);
        // Five hoverable wedges
        assert_eq!(svg.matches(r#"class="segment""#).count(), 5);
        // Dash-offset draw-in over 3 seconds
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(r#"attributeName="stroke-dashoffset""#));
        assert!(svg.contains(r#"dur="3s""#));
    }

    #[test]
    fn svg_fill_path_matches_the_arc_contract() {
        let gauge = Gauge::new(test_config(45.0, 5));
        let svg = gauge.to_svg();
        let fill_end = 45.0 * PI - 155.0 - 3.0;
        let expected = describe_arc(47.0, 47.0, 40.0, -155.0, fill_end);
        assert!(svg.contains(&expected));
    }

    #[test]
    fn hover_maps_cursor_to_wedge() {
        let config = test_config(45.0, 5);
        let size = 300.0;
        // Place the cursor on the gauge circle at known value positions.
        let scale = size / config.size;
        for (position, expected) in [
            (9.0, Some(0)),
            (28.0, Some(1)),
            (90.0, Some(4)),
            (105.0, None),
        ] {
            let angle = position * PI - config.arc_end_angle;
            let rad = to_radians(angle);
            let x = size / 2.0 + config.radius * scale * rad.cos();
            let y = size / 2.0 + config.radius * scale * rad.sin();
            assert_eq!(hover_segment(x, y, size, size, 5, &config), expected);
        }

        // Center of the dial is not on any wedge
        assert_eq!(hover_segment(150.0, 150.0, size, size, 5, &config), None);
    }

    #[test]
    fn builder_defaults_follow_the_reference_geometry() {
        let config = test_config(45.0, 5);
        assert_close(config.size, 94.0);
        assert_close(config.radius, 40.0);
        assert_close(config.stroke_width, 6.0);
        assert_close(config.segment_width, 12.0);
        assert_close(config.arc_start_angle, -155.0);
        assert_close(config.arc_end_angle, 155.0);
        assert_close(config.tick_length, 2.0);
    }
}
