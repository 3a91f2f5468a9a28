use eframe::egui::{
    Align2, Color32, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, pos2,
};
use egui_plot::{PlotPoint, PlotTransform};
use itertools::Itertools;
use strum_macros::{Display, EnumIter};

use crate::config::{ANIMATION, PLOT_CONFIG};
use crate::domain::{BiasType, FillDirection, OverlayKind};
use crate::engine::{CategoryOverlay, OverlayController, ShadeMatch};
use crate::models::Operand;
use crate::ui::styles::{BiasColor, apply_opacity};

/// Drawing surface handed to overlay layers once per frame.
pub trait DrawTarget {
    /// Plot area in points.
    fn frame(&self) -> Rect;
    /// Physical pixels per point on the host surface.
    fn pixels_per_point(&self) -> f32;
    fn fill_mesh(&mut self, mesh: Mesh);
    fn stroke_line(&mut self, points: Vec<Pos2>, stroke: Stroke);
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn label(&mut self, pos: Pos2, text: &str, color: Color32, size: f32);
}

/// Bidirectional mapping between chart values and screen points.
pub trait ChartScale {
    fn price_to_y(&self, price: f64) -> f32;
    fn y_to_price(&self, y: f32) -> f64;
    fn time_to_x(&self, timestamp: i64) -> f32;
    fn x_to_time(&self, x: f32) -> i64;
}

// --- Host implementations ---

pub struct PainterTarget<'a> {
    painter: &'a Painter,
}

impl<'a> PainterTarget<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl DrawTarget for PainterTarget<'_> {
    fn frame(&self) -> Rect {
        self.painter.clip_rect()
    }

    fn pixels_per_point(&self) -> f32 {
        self.painter.pixels_per_point()
    }

    fn fill_mesh(&mut self, mesh: Mesh) {
        self.painter.add(Shape::mesh(mesh));
    }

    fn stroke_line(&mut self, points: Vec<Pos2>, stroke: Stroke) {
        self.painter.add(Shape::line(points, stroke));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn label(&mut self, pos: Pos2, text: &str, color: Color32, size: f32) {
        self.painter
            .text(pos, Align2::CENTER_CENTER, text, FontId::proportional(size), color);
    }
}

/// Plot x is epoch milliseconds, y is price.
impl ChartScale for PlotTransform {
    fn price_to_y(&self, price: f64) -> f32 {
        self.position_from_point(&PlotPoint::new(0.0, price)).y
    }

    fn y_to_price(&self, y: f32) -> f64 {
        self.value_from_position(pos2(0.0, y)).y
    }

    fn time_to_x(&self, timestamp: i64) -> f32 {
        self.position_from_point(&PlotPoint::new(timestamp as f64, 0.0)).x
    }

    fn x_to_time(&self, x: f32) -> i64 {
        self.value_from_position(pos2(x, 0.0)).x.round() as i64
    }
}

// --- Interpolation ---

/// How a zone boundary is drawn between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    Smooth,
}

impl Interpolation {
    pub fn apply(self, points: &[Pos2]) -> Vec<Pos2> {
        match self {
            Self::Linear => points.to_vec(),
            Self::Step => step_points(points),
            Self::Smooth => catmull_rom(points, PLOT_CONFIG.smooth_subdivisions),
        }
    }
}

fn step_points(points: &[Pos2]) -> Vec<Pos2> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (a, b) in points.iter().tuple_windows() {
        out.push(*a);
        out.push(pos2(b.x, a.y));
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

fn catmull_rom(points: &[Pos2], subdivisions: usize) -> Vec<Pos2> {
    if points.len() < 3 || subdivisions < 2 {
        return points.to_vec();
    }
    let n = points.len();
    let mut out = Vec::with_capacity((n - 1) * subdivisions + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for s in 0..subdivisions {
            let t = s as f32 / subdivisions as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let blend = |a: f32, b: f32, c: f32, d: f32| {
                0.5 * (2.0 * b
                    + (c - a) * t
                    + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
                    + (3.0 * b - a - 3.0 * c + d) * t3)
            };
            // x stays monotonic with the linear blend; only y is curved.
            out.push(pos2(
                p1.x + (p2.x - p1.x) * t,
                blend(p0.y, p1.y, p2.y, p3.y),
            ));
        }
    }
    out.push(points[n - 1]);
    out
}

// --- Renderers ---

fn is_degenerate(frame: Rect) -> bool {
    !frame.is_finite() || frame.width() <= 0.0 || frame.height() <= 0.0
}

fn label_pos(bias: BiasType, frame: Rect) -> Pos2 {
    let margin = PLOT_CONFIG.overlay_label_margin_px;
    let y = match bias {
        BiasType::Bullish => frame.top() + margin,
        BiasType::Bearish => frame.bottom() - margin,
        BiasType::Neutral => frame.center().y,
    };
    pos2(frame.center().x, y)
}

/// Screen polyline of a boundary, clamped to the frame vertically. A constant
/// or single-sample boundary is a level line across the frame.
fn boundary_points(boundary: &Operand, scale: &dyn ChartScale, frame: Rect) -> Vec<Pos2> {
    let level = |price: f64| {
        let y = scale.price_to_y(price);
        vec![pos2(frame.left(), y), pos2(frame.right(), y)]
    };
    let raw: Vec<Pos2> = match boundary {
        Operand::Constant(price) => level(*price),
        Operand::Series(series) if series.len() == 1 => level(series.points()[0].value),
        Operand::Series(series) => series
            .points()
            .iter()
            .map(|p| pos2(scale.time_to_x(p.timestamp), scale.price_to_y(p.value)))
            .collect(),
    };
    raw.into_iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .map(|p| pos2(p.x, p.y.clamp(frame.top(), frame.bottom())))
        .collect()
}

/// Strip between the boundary and one plot edge, strongest at the boundary.
fn gradient_strip(line: &[Pos2], edge_y: f32, near: Color32, far: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for p in line {
        mesh.colored_vertex(*p, near);
        mesh.colored_vertex(pos2(p.x, edge_y), far);
    }
    for i in 0..line.len().saturating_sub(1) as u32 {
        let a = 2 * i;
        mesh.add_triangle(a, a + 1, a + 2);
        mesh.add_triangle(a + 1, a + 3, a + 2);
    }
    mesh
}

/// Draws one price-based zone: gradient fill toward `fill` (if any), the
/// boundary line, and the category label.
pub fn draw_zone(
    target: &mut dyn DrawTarget,
    scale: &dyn ChartScale,
    bias: BiasType,
    boundary: &Operand,
    fill: Option<FillDirection>,
    interpolation: Interpolation,
    opacity: f32,
) {
    let frame = target.frame();
    if opacity < ANIMATION.visibility_threshold || boundary.is_empty() || is_degenerate(frame) {
        return;
    }
    let line = interpolation.apply(&boundary_points(boundary, scale, frame));
    if line.len() < 2 {
        return;
    }

    let base = bias.color();
    if let Some(direction) = fill {
        let edge_y = match direction {
            FillDirection::Top => frame.top(),
            FillDirection::Bottom => frame.bottom(),
        };
        let near = apply_opacity(base, PLOT_CONFIG.zone_gradient_near_pct * opacity);
        let far = apply_opacity(base, PLOT_CONFIG.zone_gradient_far_pct * opacity);
        target.fill_mesh(gradient_strip(&line, edge_y, near, far));
    }

    target.stroke_line(
        line,
        Stroke::new(
            PLOT_CONFIG.zone_boundary_line_width,
            apply_opacity(base, opacity),
        ),
    );
    target.label(
        label_pos(bias, frame),
        bias.short_label(),
        apply_opacity(base, opacity),
        PLOT_CONFIG.overlay_label_font_size,
    );
}

/// Full-height rectangles for the active bars of `matched`. Each bar spans to
/// the next bar (or as wide as the previous one at the series end), but never
/// narrower than `min_width` points.
fn shade_rects(
    truth: &[(i64, bool)],
    matched: ShadeMatch,
    scale: &dyn ChartScale,
    frame: Rect,
    min_width: f32,
) -> Vec<Rect> {
    let xs: Vec<f32> = truth.iter().map(|(t, _)| scale.time_to_x(*t)).collect();
    let next_gap: Vec<Option<f32>> = xs
        .iter()
        .tuple_windows()
        .map(|(a, b)| Some(b - a))
        .chain(std::iter::once(None))
        .collect();

    let mut rects: Vec<Rect> = truth
        .iter()
        .enumerate()
        .filter(|(_, (t, holds))| *holds && matched.range.contains(*t))
        .map(|(i, _)| {
            let prev_gap = i.checked_sub(1).and_then(|p| next_gap[p]);
            let width = next_gap[i].or(prev_gap).unwrap_or(min_width).max(min_width);
            Rect::from_min_max(pos2(xs[i], frame.top()), pos2(xs[i] + width, frame.bottom()))
        })
        .collect();

    if matched.is_final {
        rects.pop();
    }
    rects
}

/// Draws the time shade of one matched range, plus its label.
pub fn draw_shade(
    target: &mut dyn DrawTarget,
    scale: &dyn ChartScale,
    bias: BiasType,
    truth: &[(i64, bool)],
    matched: Option<ShadeMatch>,
    opacity: f32,
) {
    let frame = target.frame();
    let Some(matched) = matched else {
        return;
    };
    if opacity < ANIMATION.visibility_threshold || truth.is_empty() || is_degenerate(frame) {
        return;
    }

    let ppp = target.pixels_per_point();
    let min_width = if ppp > 0.0 {
        PLOT_CONFIG.min_shade_width_px / ppp
    } else {
        PLOT_CONFIG.min_shade_width_px
    };
    let rects = shade_rects(truth, matched, scale, frame, min_width);
    let (Some(first), Some(last)) = (rects.first(), rects.last()) else {
        return;
    };
    let span_center = pos2((first.left() + last.right()) / 2.0, frame.center().y);

    let base = bias.color();
    let fill = apply_opacity(base, PLOT_CONFIG.shade_fill_opacity_pct * opacity);
    for rect in &rects {
        target.fill_rect(*rect, fill);
    }
    target.label(
        span_center,
        bias.short_label(),
        apply_opacity(base, opacity),
        PLOT_CONFIG.overlay_label_font_size,
    );
}

// --- Layer stack ---

pub struct OverlayContext<'a> {
    pub controller: &'a OverlayController,
    pub interpolation: Interpolation,
}

/// One overlay drawn on top of the chart.
pub trait OverlayLayer {
    fn render(&self, target: &mut dyn DrawTarget, scale: &dyn ChartScale, ctx: &OverlayContext);
}

pub struct ZoneLayer {
    pub bias: BiasType,
}

impl OverlayLayer for ZoneLayer {
    fn render(&self, target: &mut dyn DrawTarget, scale: &dyn ChartScale, ctx: &OverlayContext) {
        let Some((boundary, fill)) = ctx.controller.zone_boundary(self.bias) else {
            return;
        };
        draw_zone(
            target,
            scale,
            self.bias,
            boundary,
            fill,
            ctx.interpolation,
            ctx.controller.visual().opacity(self.bias, OverlayKind::Zone),
        );
    }
}

pub struct ShadeLayer {
    pub bias: BiasType,
}

impl OverlayLayer for ShadeLayer {
    fn render(&self, target: &mut dyn DrawTarget, scale: &dyn ChartScale, ctx: &OverlayContext) {
        let Some(CategoryOverlay::Shade { evaluation }) = ctx.controller.overlay(self.bias) else {
            return;
        };
        draw_shade(
            target,
            scale,
            self.bias,
            &evaluation.truth,
            ctx.controller.shade_match(self.bias),
            ctx.controller.visual().opacity(self.bias, OverlayKind::Shade),
        );
    }
}

/// Layers for every category with an overlay. Shades sit beneath zones and the
/// highest-priority zone is painted last.
pub fn overlay_stack(controller: &OverlayController) -> Vec<Box<dyn OverlayLayer>> {
    let mut shades: Vec<Box<dyn OverlayLayer>> = Vec::new();
    let mut zones: Vec<Box<dyn OverlayLayer>> = Vec::new();
    for bias in BiasType::ZONE_PRIORITY.into_iter().rev() {
        match controller.overlay(bias).and_then(CategoryOverlay::kind) {
            Some(OverlayKind::Shade) => shades.push(Box::new(ShadeLayer { bias })),
            Some(OverlayKind::Zone) => zones.push(Box::new(ZoneLayer { bias })),
            None => {}
        }
    }
    shades.extend(zones);
    shades
}
