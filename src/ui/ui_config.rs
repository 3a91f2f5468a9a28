use eframe::egui::{Color32, Context, Frame, Margin, Stroke, Visuals};

pub use crate::ui::ui_text::UI_TEXT;

/// Panel and text colours shared by every screen.
#[derive(Clone, Copy)]
pub struct UiColors {
    pub label: Color32,
    pub heading: Color32,
    pub subsection_heading: Color32,
    /// Behind the chart
    pub chart_background: Color32,
    /// Builder, toolbar and status bar
    pub panel_background: Color32,
}

#[derive(Clone, Copy)]
pub struct UiConfig {
    pub colors: UiColors,
    pub side_panel_width: f32,
    pub param_input_width: f32,
    pub panel_padding: i8,
}

pub static UI_CONFIG: UiConfig = UiConfig {
    colors: UiColors {
        label: Color32::GRAY,
        heading: Color32::YELLOW,
        subsection_heading: Color32::ORANGE,
        chart_background: Color32::from_rgb(18, 18, 22),
        panel_background: Color32::from_rgb(25, 25, 25),
    },
    side_panel_width: 340.0,
    param_input_width: 56.0,
    panel_padding: 8,
};

impl UiConfig {
    fn frame(&self, fill: Color32, inner_margin: Margin) -> Frame {
        Frame {
            fill,
            stroke: Stroke::NONE,
            inner_margin,
            ..Default::default()
        }
    }

    /// Formula builder and top toolbar.
    pub fn panel_frame(&self) -> Frame {
        self.frame(
            self.colors.panel_background,
            Margin::same(self.panel_padding),
        )
    }

    /// Status bar: same padding sideways, half vertically.
    pub fn status_frame(&self) -> Frame {
        self.frame(
            self.colors.panel_background,
            Margin::symmetric(self.panel_padding, self.panel_padding / 2),
        )
    }

    /// The plot hugs the builder on the left.
    pub fn chart_frame(&self) -> Frame {
        self.frame(
            self.colors.chart_background,
            Margin {
                left: 0,
                right: self.panel_padding,
                top: 0,
                bottom: 0,
            },
        )
    }

    /// Dark theme tinted with the configured colours.
    pub fn apply_visuals(&self, ctx: &Context) {
        let mut visuals = Visuals::dark();
        visuals.window_fill = self.colors.chart_background;
        visuals.panel_fill = self.colors.panel_background;
        visuals.widgets.noninteractive.fg_stroke.color = self.colors.label;
        visuals.widgets.inactive.fg_stroke.color = self.colors.label;
        visuals.widgets.hovered.fg_stroke.color = self.colors.heading;
        visuals.widgets.active.fg_stroke.color = self.colors.heading;
        ctx.set_visuals(visuals);
        ctx.style_mut(|s| s.interaction.selectable_labels = false);
    }
}
