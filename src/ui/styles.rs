use {
    crate::{config::PLOT_CONFIG, domain::BiasType, ui::UI_CONFIG, ui::ui_text::ICON_CHECK},
    eframe::egui::{
        Color32, CornerRadius, FontId, Response, RichText, Sense, Stroke, StrokeKind, Ui, Vec2,
        WidgetInfo, WidgetType, pos2,
    },
};

pub trait BiasColor {
    fn color(&self) -> Color32;
}

impl BiasColor for BiasType {
    fn color(&self) -> Color32 {
        match self {
            Self::Bullish => PLOT_CONFIG.bullish_color,
            Self::Neutral => PLOT_CONFIG.neutral_color,
            Self::Bearish => PLOT_CONFIG.bearish_color,
        }
    }
}

pub fn apply_opacity(color: Color32, factor: f32) -> Color32 {
    color.linear_multiply(factor)
}

pub fn get_outcome_color(correct: bool) -> Color32 {
    if correct {
        PLOT_CONFIG.color_profit
    } else {
        PLOT_CONFIG.color_loss
    }
}

pub(crate) trait UiStyleExt {
    /// Clickable category tab: colour dot, name and a check once a formula is saved.
    /// Filled when selected, outlined when saved, bare otherwise.
    fn category_chip(&mut self, bias: BiasType, is_selected: bool, is_saved: bool) -> Response;

    fn label_subdued(&mut self, text: impl Into<String>);
    fn label_warning(&mut self, text: impl Into<String>);
    fn metric(&mut self, label: &str, value: &str, color: Color32);
    fn label_subheader(&mut self, text: impl Into<String>);
    fn button_text_primary(&self, text: impl Into<String>) -> RichText;
    fn button_text_secondary(&self, text: impl Into<String>) -> RichText;
}

impl UiStyleExt for Ui {
    fn category_chip(&mut self, bias: BiasType, is_selected: bool, is_saved: bool) -> Response {
        const DOT_RADIUS: f32 = 4.0;
        let padding = Vec2::new(6.0, 4.0);
        let text = if is_saved {
            format!("{bias} {ICON_CHECK}")
        } else {
            bias.to_string()
        };
        let text_color = if is_selected { Color32::WHITE } else { bias.color() };
        let galley = self
            .painter()
            .layout_no_wrap(text.clone(), FontId::proportional(14.0), text_color);

        let dot_space = DOT_RADIUS * 2.0 + padding.x;
        let desired = Vec2::new(galley.size().x + dot_space, galley.size().y) + padding * 2.0;
        let (rect, response) = self.allocate_exact_size(desired, Sense::click());
        response.widget_info(|| WidgetInfo::selected(WidgetType::Button, true, is_selected, &text));

        if self.is_rect_visible(rect) {
            let painter = self.painter();
            let radius = CornerRadius::same(4);
            if is_selected {
                painter.rect_filled(rect, radius, apply_opacity(bias.color(), 0.6));
            } else if response.hovered() {
                painter.rect_filled(rect, radius, self.visuals().widgets.hovered.bg_fill);
            }
            if is_saved && !is_selected {
                painter.rect_stroke(
                    rect,
                    radius,
                    Stroke::new(1.0, PLOT_CONFIG.color_widget_border),
                    StrokeKind::Inside,
                );
            }
            let dot = pos2(rect.left() + padding.x + DOT_RADIUS, rect.center().y);
            painter.circle_filled(dot, DOT_RADIUS, bias.color());
            painter.galley(
                pos2(rect.left() + padding.x + dot_space, rect.top() + padding.y),
                galley,
                text_color,
            );
        }
        response
    }

    fn label_subdued(&mut self, text: impl Into<String>) {
        self.label(RichText::new(text).small().color(PLOT_CONFIG.color_text_subdued));
    }

    fn label_warning(&mut self, text: impl Into<String>) {
        self.label(RichText::new(text).small().color(PLOT_CONFIG.color_warning));
    }

    fn metric(&mut self, label: &str, value: &str, color: Color32) {
        self.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            ui.label_subdued(format!("{}:", label));
            ui.label(RichText::new(value).small().color(color));
        });
    }

    fn label_subheader(&mut self, text: impl Into<String>) {
        self.label(RichText::new(text).color(UI_CONFIG.colors.subsection_heading));
    }

    fn button_text_primary(&self, text: impl Into<String>) -> RichText {
        RichText::new(text).strong().color(PLOT_CONFIG.color_profit).small()
    }

    fn button_text_secondary(&self, text: impl Into<String>) -> RichText {
        RichText::new(text).strong().color(PLOT_CONFIG.color_text_neutral).small()
    }
}
