use std::time::Duration;

use argminmax::ArgMinMax;
use eframe::egui::{Context, Pos2, Stroke, Ui, pos2};
use egui_plot::{Axis, AxisHints, HPlacement, Line, Plot, PlotPoints, Points, VPlacement};
use strum_macros::{Display, EnumIter};

use crate::config::PLOT_CONFIG;
use crate::engine::{FrameHost, OverlayController};
use crate::models::{HoverContext, Prediction, ScanResult};
use crate::ui::overlay_layers::{
    ChartScale, Interpolation, OverlayContext, PainterTarget, overlay_stack,
};
use crate::ui::ui_text::UI_TEXT;
use crate::utils::{epoch_ms_to_date_time, epoch_ms_to_utc};

/// Repaint requests routed to egui.
pub struct EguiFrameHost<'a> {
    ctx: &'a Context,
}

impl<'a> EguiFrameHost<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }
}

impl FrameHost for EguiFrameHost<'_> {
    fn schedule_tick(&self, after: Duration) {
        self.ctx.request_repaint_after(after);
    }

    fn request_redraw(&self) {
        self.ctx.request_repaint();
    }
}

/// What the pointer price means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum ChartMode {
    /// Classify whatever price sits under the pointer.
    #[default]
    Explore,
    /// Snap to the nearest prediction and classify its realised price.
    Actual,
}

/// Hover outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverReadout {
    pub context: HoverContext,
    /// Set in actual mode.
    pub prediction: Option<Prediction>,
}

impl HoverReadout {
    pub fn describe(&self) -> String {
        let zone = self
            .context
            .zone
            .map_or_else(|| UI_TEXT.hv_no_zone.clone(), |z| format!("{} {z}", z.emoji()));
        let mut text = format!(
            "{}  {:.4}  {}",
            epoch_ms_to_date_time(self.context.timestamp),
            self.context.price,
            zone
        );
        if let Some(p) = &self.prediction {
            let verdict = if p.correct {
                &UI_TEXT.hv_correct
            } else {
                &UI_TEXT.hv_wrong
            };
            text.push_str(&format!(
                "  |  {}: {}  {}: {}  {}",
                UI_TEXT.hv_predicted,
                p.predicted_bias,
                UI_TEXT.hv_actual,
                p.actual_direction,
                verdict
            ));
        }
        text
    }
}

/// Price (y) range of the line with configured padding.
fn calculate_y_bounds(prices: &[f64]) -> Option<(f64, f64)> {
    if prices.is_empty() || prices.iter().any(|p| !p.is_finite()) {
        return None;
    }
    let (min_i, max_i) = prices.argminmax();
    let (lo, hi) = (prices[min_i], prices[max_i]);
    let range = (hi - lo).max(hi.abs() * 0.01).max(f64::EPSILON);
    let pad = range * PLOT_CONFIG.plot_y_padding_pct;
    Some((lo - pad, hi + pad))
}

// Helper to build the Time Axis (plot x is epoch ms)
fn create_time_axis() -> AxisHints<'static> {
    AxisHints::new(Axis::X)
        .label(UI_TEXT.plot_x_axis.as_str())
        .formatter(|mark, _range| epoch_ms_to_utc(mark.value as i64))
        .placement(VPlacement::Bottom)
}

fn create_price_axis() -> AxisHints<'static> {
    AxisHints::new_y()
        .label(UI_TEXT.plot_y_axis.as_str())
        .formatter(|mark, _range| format!("{:.2}", mark.value))
        .placement(HPlacement::Right)
}

#[derive(Default)]
pub struct ChartView {
    was_hovering: bool,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the price chart with overlays, routing pointer movement through
    /// the controller first so overlays see this frame's targets.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        result: &ScanResult,
        controller: &mut OverlayController,
        mode: ChartMode,
        interpolation: Interpolation,
    ) -> Option<HoverReadout> {
        let price_line = result.price_line();
        let prices: Vec<f64> = price_line.iter().map(|(_, p)| *p).collect();

        let mut plot = Plot::new("bias_chart")
            .custom_x_axes(vec![create_time_axis()])
            .custom_y_axes(vec![create_price_axis()])
            .label_formatter(|_, _| String::new())
            .allow_double_click_reset(true);
        if let Some((y_min, y_max)) = calculate_y_bounds(&prices) {
            plot = plot.include_y(y_min).include_y(y_max);
        }

        let response = plot.show(ui, |plot_ui| {
            let line: PlotPoints = price_line
                .iter()
                .map(|(t, p)| [*t as f64, *p])
                .collect();
            plot_ui.line(
                Line::new(UI_TEXT.plot_price_line.as_str(), line)
                    .color(PLOT_CONFIG.price_line_color)
                    .width(PLOT_CONFIG.price_line_width),
            );

            let (correct, wrong): (Vec<&Prediction>, Vec<&Prediction>) =
                result.predictions().iter().partition(|p| p.correct);
            for (group, color) in [
                (correct, PLOT_CONFIG.marker_correct_color),
                (wrong, PLOT_CONFIG.marker_wrong_color),
            ] {
                let pts: PlotPoints = group
                    .iter()
                    .map(|p| [p.timestamp as f64, p.price_at_prediction])
                    .collect();
                plot_ui.points(
                    Points::new("", pts)
                        .color(color)
                        .radius(PLOT_CONFIG.marker_radius),
                );
            }
        });

        let transform = response.transform;
        let frame = *transform.frame();
        let host = EguiFrameHost::new(ui.ctx());

        let pointer = response
            .response
            .hover_pos()
            .filter(|pos| frame.contains(*pos));

        let readout = match pointer {
            Some(pos) => {
                self.was_hovering = true;
                self.hover(pos, &transform, result, controller, &host, mode)
            }
            None => {
                if self.was_hovering {
                    self.was_hovering = false;
                    controller.on_pointer_leave(&host);
                }
                None
            }
        };

        // --- OVERLAY STACK ---
        let painter = ui.painter_at(frame);
        let mut target = PainterTarget::new(&painter);
        let ctx = OverlayContext {
            controller,
            interpolation,
        };
        for layer in overlay_stack(controller) {
            layer.render(&mut target, &transform, &ctx);
        }

        if let Some(r) = &readout {
            let x = transform.time_to_x(r.context.timestamp);
            painter.line_segment(
                [pos2(x, frame.top()), pos2(x, frame.bottom())],
                Stroke::new(1.0, PLOT_CONFIG.hover_crosshair_color),
            );
        }

        readout
    }

    fn hover(
        &self,
        pos: Pos2,
        scale: &dyn ChartScale,
        result: &ScanResult,
        controller: &mut OverlayController,
        host: &dyn FrameHost,
        mode: ChartMode,
    ) -> Option<HoverReadout> {
        let pointer_time = scale.x_to_time(pos.x);
        let (price, timestamp, prediction) = match mode {
            ChartMode::Explore => (scale.y_to_price(pos.y), pointer_time, None),
            ChartMode::Actual => {
                let p = *result.nearest_prediction(pointer_time)?;
                (p.price_at_prediction, p.timestamp, Some(p))
            }
        };
        let context = controller.on_pointer_move(price, timestamp, host)?;
        Some(HoverReadout {
            context,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BiasType;

    #[test]
    fn y_bounds_pad_the_price_range() {
        let (lo, hi) = calculate_y_bounds(&[100.0, 120.0, 110.0]).unwrap();
        assert!((lo - 99.0).abs() < 1e-9);
        assert!((hi - 121.0).abs() < 1e-9);
        assert!(calculate_y_bounds(&[]).is_none());
        assert!(calculate_y_bounds(&[1.0, f64::NAN]).is_none());
    }

    #[test]
    fn flat_price_still_gets_height() {
        let (lo, hi) = calculate_y_bounds(&[50.0, 50.0]).unwrap();
        assert!(hi > lo);
    }

    #[test]
    fn readout_text_mentions_zone_and_outcome() {
        let r = HoverReadout {
            context: HoverContext {
                price: 101.5,
                timestamp: 0,
                zone: Some(BiasType::Bearish),
            },
            prediction: Some(Prediction {
                timestamp: 0,
                predicted_bias: BiasType::Bearish,
                actual_direction: BiasType::Bullish,
                correct: false,
                price_at_prediction: 101.5,
                price_at_validation: None,
            }),
        };
        let text = r.describe();
        assert!(text.contains("1970-01-01 00:00"));
        assert!(text.contains("Bearish"));
        assert!(text.contains(&UI_TEXT.hv_wrong));
    }
}
