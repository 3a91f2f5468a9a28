use {
    eframe::{
        Frame,
        egui::{CentralPanel, ComboBox, Context, RichText, SidePanel, TopBottomPanel},
    },
    std::sync::mpsc::Receiver,
    strum::IntoEnumIterator,
};

use crate::{
    Cli,
    app::state::{ScanState, TemplateStore, Workspace, WorkspaceChange},
    config::{DF, PERSISTENCE, PLOT_CONFIG},
    engine::OverlayController,
    models::ScanResult,
    ui::{
        ChartMode, ChartView, EguiFrameHost, FormulaAction, FormulaPanel, FormulaPanelView,
        HoverReadout, Interpolation, UI_CONFIG, UI_TEXT, UiStyleExt, get_outcome_color,
    },
    utils::{AppInstant, now_timestamp_ms},
};

#[cfg(not(target_arch = "wasm32"))]
use {
    crate::data::{
        FileScanProvider, ProcessScanProvider, ScanProvider, ScanRequest, load_templates,
        save_templates,
    },
    std::{path::Path, sync::Arc, sync::mpsc, thread},
    tokio::runtime::Runtime,
};

type ScanOutcome = Result<ScanResult, String>;

pub struct App {
    workspace: Workspace,
    templates: TemplateStore,
    controller: OverlayController,
    panel: FormulaPanel,
    chart: ChartView,
    chart_mode: ChartMode,
    interpolation: Interpolation,
    result: Option<ScanResult>,
    scan_state: ScanState,
    scan_rx: Option<Receiver<ScanOutcome>>,
    hover: Option<HoverReadout>,
    notice: Option<String>,
    #[cfg(not(target_arch = "wasm32"))]
    provider: Option<Arc<dyn ScanProvider>>,
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut app = Self {
            workspace: Workspace::new(args.include_neutral),
            templates: TemplateStore {
                path: args
                    .templates
                    .clone()
                    .unwrap_or_else(|| PERSISTENCE.templates.path.to_string()),
                ..TemplateStore::default()
            },
            controller: OverlayController::new(),
            panel: FormulaPanel::new(),
            chart: ChartView::new(),
            chart_mode: ChartMode::default(),
            interpolation: Interpolation::default(),
            result: None,
            scan_state: ScanState::Idle,
            scan_rx: None,
            hover: None,
            notice: None,
            #[cfg(not(target_arch = "wasm32"))]
            provider: None,
        };

        app.controller
            .mount(&EguiFrameHost::new(&cc.egui_ctx), AppInstant::now());

        #[cfg(not(target_arch = "wasm32"))]
        {
            app.load_template_library();
            app.provider = Self::build_provider(&args, &mut app.notice);
            // A saved result can be shown without any formulas.
            if args.scanner.is_none() && args.results.is_some() {
                app.start_scan(&cc.egui_ctx);
            }
        }

        app
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn build_provider(args: &Cli, notice: &mut Option<String>) -> Option<Arc<dyn ScanProvider>> {
        if let Some(command) = &args.scanner {
            return match ProcessScanProvider::parse(command) {
                Ok(p) => Some(Arc::new(p)),
                Err(e) => {
                    log::error!("Invalid scanner command: {:#}", e);
                    *notice = Some(format!("{:#}", e));
                    None
                }
            };
        }
        args.results
            .as_ref()
            .map(|path| Arc::new(FileScanProvider::new(path)) as Arc<dyn ScanProvider>)
    }

    fn can_scan(&self) -> bool {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.provider.is_some()
        }
        #[cfg(target_arch = "wasm32")]
        {
            false
        }
    }

    // --- Scan plumbing ---

    #[cfg(not(target_arch = "wasm32"))]
    fn start_scan(&mut self, ctx: &Context) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        if self.scan_state.is_running() {
            return;
        }
        let formulas = self
            .workspace
            .formulas
            .formulas_for_scan(self.workspace.include_neutral);
        let include_neutral = self.workspace.include_neutral;
        if DF.log_scan {
            log::info!(
                "Starting scan via {} ({} formulas)",
                provider.describe(),
                formulas.len()
            );
        }

        let (tx, rx) = mpsc::channel();
        self.scan_rx = Some(rx);
        self.scan_state = ScanState::Running;

        let ctx = ctx.clone();
        thread::spawn(move || {
            let outcome = match Runtime::new() {
                Ok(rt) => rt
                    .block_on(provider.scan(&ScanRequest {
                        formulas: &formulas,
                        include_neutral,
                    }))
                    .map_err(|e| format!("{:#}", e)),
                Err(e) => Err(format!("Failed to create runtime: {}", e)),
            };
            let _ = tx.send(outcome);
            ctx.request_repaint();
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn start_scan(&mut self, _ctx: &Context) {
        log::warn!("{}", UI_TEXT.sc_no_provider);
    }

    fn poll_scan(&mut self) {
        let Some(rx) = &self.scan_rx else {
            return;
        };
        let Ok(outcome) = rx.try_recv() else {
            return;
        };
        self.scan_rx = None;
        match outcome {
            Ok(result) => {
                if DF.log_scan {
                    log::info!(
                        "Scan returned {} predictions, {} indicator series",
                        result.predictions().len(),
                        result.indicators().len()
                    );
                }
                self.scan_state = ScanState::Done(result.metrics());
                self.controller.replace_result(
                    result.indicators().clone(),
                    &self.workspace.formulas,
                    self.workspace.include_neutral,
                );
                self.hover = None;
                self.result = Some(result);
            }
            Err(message) => {
                log::error!("Scan failed: {}", message);
                // The previous result stays on screen.
                self.scan_state = ScanState::Failed(message);
            }
        }
    }

    // --- Builder actions ---

    fn handle_action(&mut self, action: FormulaAction, ctx: &Context) {
        let change = self.workspace.apply(&action);
        self.sync_controller(change);

        match action {
            FormulaAction::SaveTemplate(name) => {
                let template = self.workspace.snapshot(&name, now_timestamp_ms());
                let replaced = self.templates.library.upsert(template);
                if DF.log_templates {
                    log::info!(
                        "Template '{}' {}",
                        name,
                        if replaced { "replaced" } else { "saved" }
                    );
                }
                self.persist_templates();
            }
            FormulaAction::LoadTemplate(id) => {
                if let Some(template) = self.templates.library.get(id).cloned() {
                    self.workspace.load(&template);
                    self.sync_controller(WorkspaceChange {
                        formulas: true,
                        display: false,
                    });
                }
            }
            FormulaAction::DeleteTemplate(id) => {
                if self.templates.library.remove(id).is_some() {
                    self.persist_templates();
                }
            }
            FormulaAction::RunScan => self.start_scan(ctx),
            _ => {}
        }
    }

    fn sync_controller(&mut self, change: WorkspaceChange) {
        if change.formulas {
            self.controller
                .rebuild(&self.workspace.formulas, self.workspace.include_neutral);
        }
        if change.display {
            self.controller.set_display(self.workspace.display);
        }
    }

    // --- Templates ---

    #[cfg(not(target_arch = "wasm32"))]
    fn load_template_library(&mut self) {
        match load_templates(Path::new(&self.templates.path)) {
            Ok(library) => self.templates.library = library,
            Err(e) => {
                log::error!("Failed to load templates: {:#}", e);
                self.notice = Some(format!("{:#}", e));
            }
        }
    }

    fn persist_templates(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        if let Err(e) = save_templates(Path::new(&self.templates.path), &self.templates.library) {
            log::error!("Failed to save templates: {:#}", e);
            self.notice = Some(format!("{:#}", e));
        }
    }

    // --- Panels ---

    fn render_top_panel(&mut self, ctx: &Context) {
        TopBottomPanel::top("top_panel")
            .frame(UI_CONFIG.panel_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&UI_TEXT.app_title).strong().color(UI_CONFIG.colors.heading));
                    ui.separator();

                    for mode in ChartMode::iter() {
                        let text = match mode {
                            ChartMode::Explore => &UI_TEXT.mode_explore,
                            ChartMode::Actual => &UI_TEXT.mode_actual,
                        };
                        ui.selectable_value(&mut self.chart_mode, mode, text.as_str());
                    }
                    ui.separator();

                    ComboBox::from_id_salt("interpolation")
                        .selected_text(interpolation_text(self.interpolation))
                        .show_ui(ui, |ui| {
                            for mode in Interpolation::iter() {
                                ui.selectable_value(
                                    &mut self.interpolation,
                                    mode,
                                    interpolation_text(mode),
                                );
                            }
                        });
                });
            });
    }

    fn render_status_panel(&mut self, ctx: &Context) {
        TopBottomPanel::bottom("status_panel")
            .frame(UI_CONFIG.status_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.scan_state {
                        ScanState::Idle => {}
                        ScanState::Running => {
                            ui.spinner();
                            ui.label_subdued(&UI_TEXT.sc_running);
                        }
                        ScanState::Done(metrics) => {
                            ui.metric(
                                &UI_TEXT.sc_total,
                                &metrics.total_predictions.to_string(),
                                PLOT_CONFIG.color_text_neutral,
                            );
                            ui.metric(
                                &UI_TEXT.sc_correct,
                                &metrics.correct_count.to_string(),
                                PLOT_CONFIG.color_text_neutral,
                            );
                            ui.metric(
                                &UI_TEXT.sc_accuracy,
                                &format!("{:.1}%", metrics.accuracy_percentage),
                                get_outcome_color(metrics.accuracy_percentage >= 50.0),
                            );
                        }
                        ScanState::Failed(message) => {
                            ui.label(
                                RichText::new(format!("{} {}", UI_TEXT.label_warning, message))
                                    .small()
                                    .color(PLOT_CONFIG.color_loss),
                            );
                        }
                    }

                    if let Some(readout) = &self.hover {
                        ui.separator();
                        let color = readout
                            .prediction
                            .map_or(PLOT_CONFIG.color_text_neutral, |p| get_outcome_color(p.correct));
                        ui.label(RichText::new(readout.describe()).small().color(color));
                    }

                    if let Some(notice) = &self.notice {
                        ui.separator();
                        ui.label_warning(format!("{} {}", UI_TEXT.label_warning, notice));
                    }
                });
            });
    }

    fn render_left_panel(&mut self, ctx: &Context) {
        let status = self.workspace.status();
        let can_scan = self.can_scan();
        let action = SidePanel::left("formula_panel")
            .frame(UI_CONFIG.panel_frame())
            .resizable(false)
            .exact_width(UI_CONFIG.side_panel_width)
            .show(ctx, |ui| {
                let issues = self.controller.issues();
                let view = FormulaPanelView {
                    formulas: &self.workspace.formulas,
                    display: &self.workspace.display,
                    include_neutral: self.workspace.include_neutral,
                    status: &status,
                    templates: &self.templates.library,
                    issues: &issues,
                    scan_running: self.scan_state.is_running(),
                    can_scan,
                };
                self.panel.show(ui, &view)
            })
            .inner;

        if let Some(action) = action {
            self.handle_action(action, ctx);
        }
    }

    fn render_central_panel(&mut self, ctx: &Context) {
        CentralPanel::default()
            .frame(UI_CONFIG.chart_frame())
            .show(ctx, |ui| match &self.result {
                Some(result) => {
                    self.hover = self.chart.show(
                        ui,
                        result,
                        &mut self.controller,
                        self.chart_mode,
                        self.interpolation,
                    );
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label_subdued(&UI_TEXT.plot_no_result);
                    });
                }
            });
    }
}

fn interpolation_text(mode: Interpolation) -> &'static str {
    match mode {
        Interpolation::Linear => UI_TEXT.interp_linear.as_str(),
        Interpolation::Step => UI_TEXT.interp_step.as_str(),
        Interpolation::Smooth => UI_TEXT.interp_smooth.as_str(),
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        UI_CONFIG.apply_visuals(ctx);
        self.poll_scan();

        let start = AppInstant::now();
        self.controller
            .pump(&EguiFrameHost::new(ctx), AppInstant::now());

        self.render_top_panel(ctx);
        self.render_status_panel(ctx);
        self.render_left_panel(ctx);
        self.render_central_panel(ctx);

        let frame_time = start.elapsed().as_micros();
        if DF.log_performance && frame_time > 50_000 {
            log::warn!("🐢 SLOW FRAME: {}us", frame_time);
        }
    }
}
