use eframe::egui::{Button, ComboBox, RichText, ScrollArea, TextEdit, Ui};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::config::PLOT_CONFIG;
use crate::domain::{BiasType, Formula, FormulaEdit, FormulaField, Indicator, Operator, Timeframe};
use crate::models::{
    DisplayState, FinishLabel, FormulaState, OverlayIssue, StatusMessage, TemplateLibrary,
    finish_label, param_errors, preview_rows, should_show_finish_control,
};
use crate::ui::styles::{BiasColor, UiStyleExt};
use crate::ui::ui_config::UI_CONFIG;
use crate::ui::ui_text::{ICON_CHECK, ICON_PENCIL, ICON_WARNING, UI_TEXT};

/// Everything the builder panel can ask the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaAction {
    SelectCategory(BiasType),
    Edit(FormulaEdit),
    Finish,
    ClearCategory(BiasType),
    SetIncludeNeutral(bool),
    ToggleDisplay(BiasType),
    SaveTemplate(String),
    LoadTemplate(Uuid),
    DeleteTemplate(Uuid),
    RunScan,
}

/// Read-only snapshot the panel renders from.
pub struct FormulaPanelView<'a> {
    pub formulas: &'a FormulaState,
    pub display: &'a DisplayState,
    pub include_neutral: bool,
    pub status: &'a StatusMessage,
    pub templates: &'a TemplateLibrary,
    pub issues: &'a [(BiasType, &'a OverlayIssue)],
    pub scan_running: bool,
    pub can_scan: bool,
}

/// Left-hand formula builder. Owns only transient text buffers; every state
/// change goes back to the app as a [`FormulaAction`].
#[derive(Default)]
pub struct FormulaPanel {
    template_name: String,
}

impl FormulaPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut Ui, view: &FormulaPanelView) -> Option<FormulaAction> {
        let mut action = None;

        ScrollArea::vertical().show(ui, |ui| {
            ui.heading(&UI_TEXT.fb_heading);
            ui.add_space(4.0);

            render_category_row(ui, view, &mut action);
            ui.add_space(6.0);

            let current = &view.formulas.current;
            if current.bias_type.is_some() {
                render_field_editors(ui, current, &mut action);
                ui.add_space(6.0);
                render_finish_row(ui, view, &mut action);
            }

            ui.separator();
            render_preview(ui, view, &mut action);

            ui.separator();
            render_status(ui, view, &mut action);

            ui.separator();
            self.render_templates(ui, view, &mut action);
        });

        action
    }

    fn render_templates(
        &mut self,
        ui: &mut Ui,
        view: &FormulaPanelView,
        action: &mut Option<FormulaAction>,
    ) {
        ui.label_subheader(&UI_TEXT.tp_heading);
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.template_name)
                    .hint_text(&UI_TEXT.tp_name_hint)
                    .desired_width(160.0),
            );
            let can_save =
                !self.template_name.trim().is_empty() && view.formulas.has_any_completed();
            if ui
                .add_enabled(can_save, Button::new(UI_TEXT.tp_save.as_str()))
                .clicked()
            {
                *action = Some(FormulaAction::SaveTemplate(self.template_name.trim().to_string()));
            }
        });

        if view.templates.is_empty() {
            ui.label_subdued(&UI_TEXT.tp_none);
            return;
        }
        for template in &view.templates.templates {
            ui.horizontal(|ui| {
                ui.label(&template.name);
                ui.label_subdued(format!("({})", template.formulas.len()));
                if ui.small_button(UI_TEXT.tp_load.as_str()).clicked() {
                    self.template_name = template.name.clone();
                    *action = Some(FormulaAction::LoadTemplate(template.id));
                }
                if ui.small_button(UI_TEXT.tp_delete.as_str()).clicked() {
                    *action = Some(FormulaAction::DeleteTemplate(template.id));
                }
            });
        }
    }
}

fn render_category_row(ui: &mut Ui, view: &FormulaPanelView, action: &mut Option<FormulaAction>) {
    let editing = view.formulas.editing();
    ui.horizontal(|ui| {
        ui.label(&UI_TEXT.fb_category);
        for bias in BiasType::required(view.include_neutral) {
            let saved = view.formulas.completed(bias).is_some();
            if ui
                .category_chip(bias, editing == Some(bias), saved)
                .clicked()
            {
                *action = Some(FormulaAction::SelectCategory(bias));
            }
        }
    });

    let mut include = view.include_neutral;
    if ui.checkbox(&mut include, UI_TEXT.fb_include_neutral.as_str()).changed() {
        *action = Some(FormulaAction::SetIncludeNeutral(include));
    }
}

fn combo<T: Copy + PartialEq>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: Option<T>,
    options: impl Iterator<Item = T>,
    text_of: impl Fn(T) -> String,
) -> Option<T> {
    let mut selected = current;
    ui.horizontal(|ui| {
        ui.label(label);
        ComboBox::from_id_salt(id)
            .selected_text(current.map_or_else(|| UI_TEXT.fb_select.clone(), &text_of))
            .show_ui(ui, |ui| {
                for option in options {
                    ui.selectable_value(&mut selected, Some(option), text_of(option));
                }
            });
    });
    if selected != current { selected } else { None }
}

fn param_input(
    ui: &mut Ui,
    indicator: Option<Indicator>,
    text: &str,
    error: Option<String>,
) -> Option<String> {
    let label = if indicator.is_some_and(Indicator::is_literal) {
        &UI_TEXT.fb_value
    } else {
        &UI_TEXT.fb_param
    };
    let mut buffer = text.to_string();
    let changed = ui
        .horizontal(|ui| {
            ui.label_subdued(label);
            let response = ui.add_enabled(
                indicator.is_some(),
                TextEdit::singleline(&mut buffer).desired_width(UI_CONFIG.param_input_width),
            );
            if let Some(err) = &error {
                ui.label_warning(format!("{} {}", ICON_WARNING, err));
            }
            response.changed()
        })
        .inner;
    changed.then_some(buffer)
}

fn render_field_editors(ui: &mut Ui, current: &Formula, action: &mut Option<FormulaAction>) {
    let errors = param_errors(current);
    let error_for = |field: FormulaField| {
        errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, e)| e.to_string())
    };

    if let Some(tf) = combo(
        ui,
        "fb_timeframe",
        &UI_TEXT.fb_timeframe,
        current.timeframe,
        Timeframe::iter(),
        |t| t.to_string(),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Timeframe(Some(tf))));
    }

    if let Some(ind) = combo(
        ui,
        "fb_indicator_1",
        &UI_TEXT.fb_indicator_1,
        current.indicator1,
        Indicator::iter().filter(|i| !i.is_literal()),
        |i| i.to_string(),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Indicator1(Some(ind))));
    }
    if let Some(text) = param_input(
        ui,
        current.indicator1,
        &current.indicator1_param,
        error_for(FormulaField::Indicator1Param),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Indicator1Param(text)));
    }

    if let Some(op) = combo(
        ui,
        "fb_operator",
        &UI_TEXT.fb_operator,
        current.operator,
        Operator::iter(),
        |o| o.symbol().to_string(),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Operator(Some(op))));
    }

    if let Some(ind) = combo(
        ui,
        "fb_indicator_2",
        &UI_TEXT.fb_indicator_2,
        current.indicator2,
        Indicator::iter(),
        |i| i.to_string(),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Indicator2(Some(ind))));
    }
    if let Some(text) = param_input(
        ui,
        current.indicator2,
        &current.indicator2_param,
        error_for(FormulaField::Indicator2Param),
    ) {
        *action = Some(FormulaAction::Edit(FormulaEdit::Indicator2Param(text)));
    }
}

fn render_finish_row(ui: &mut Ui, view: &FormulaPanelView, action: &mut Option<FormulaAction>) {
    let current = &view.formulas.current;
    let Some(bias) = current.bias_type else {
        return;
    };
    let completed = view.formulas.completed(bias);
    ui.horizontal(|ui| {
        if should_show_finish_control(current, completed) && param_errors(current).is_empty() {
            let text = match finish_label(current, completed) {
                FinishLabel::Finish => format!("{} {}", ICON_CHECK, FinishLabel::Finish.as_str()),
                FinishLabel::Update => format!("{} {}", ICON_PENCIL, FinishLabel::Update.as_str()),
            };
            if ui.button(ui.button_text_primary(text)).clicked() {
                *action = Some(FormulaAction::Finish);
            }
        }
        if completed.is_some()
            && ui
                .button(ui.button_text_secondary(&UI_TEXT.fb_clear))
                .clicked()
        {
            *action = Some(FormulaAction::ClearCategory(bias));
        }
    });
}

fn render_preview(ui: &mut Ui, view: &FormulaPanelView, action: &mut Option<FormulaAction>) {
    ui.label_subheader(&UI_TEXT.fb_preview_heading);
    for row in preview_rows(view.formulas, view.display) {
        let mut text = RichText::new(format!("{} {}", row.emoji, row.text)).color(row.bias.color());
        if !row.completed {
            text = text.italics();
        }
        ui.label(text);
    }

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label_subdued(&UI_TEXT.fb_display_heading);
        for bias in BiasType::required(view.include_neutral) {
            let mut shown = view.display.is_shown(bias);
            if ui
                .checkbox(&mut shown, RichText::new(bias.short_label()).color(bias.color()))
                .changed()
            {
                *action = Some(FormulaAction::ToggleDisplay(bias));
            }
        }
    });

    for (bias, issue) in view.issues {
        ui.label_warning(format!("{} {}: {}", ICON_WARNING, bias, issue));
    }
}

fn render_status(ui: &mut Ui, view: &FormulaPanelView, action: &mut Option<FormulaAction>) {
    let color = if view.status.is_ready() {
        PLOT_CONFIG.color_profit
    } else {
        PLOT_CONFIG.color_info
    };
    ui.label(RichText::new(view.status.to_string()).color(color));

    if !view.can_scan {
        ui.label_subdued(&UI_TEXT.sc_no_provider);
        return;
    }
    ui.horizontal(|ui| {
        let enabled = view.status.is_ready() && !view.scan_running;
        if ui
            .add_enabled(enabled, Button::new(UI_TEXT.sc_run.as_str()))
            .clicked()
        {
            *action = Some(FormulaAction::RunScan);
        }
        if view.scan_running {
            ui.spinner();
            ui.label_subdued(&UI_TEXT.sc_running);
        }
    });
}
