mod chart_view;
mod formula_panel;
mod overlay_layers;
mod styles;
mod ui_config;
mod ui_text;

pub use chart_view::{ChartMode, ChartView, EguiFrameHost, HoverReadout};
pub use formula_panel::{FormulaAction, FormulaPanel, FormulaPanelView};
pub use overlay_layers::{
    ChartScale, DrawTarget, Interpolation, OverlayContext, OverlayLayer, PainterTarget,
    ShadeLayer, ZoneLayer, draw_shade, draw_zone, overlay_stack,
};

pub(crate) use styles::{UiStyleExt, get_outcome_color};
pub(crate) use ui_config::{UI_CONFIG, UI_TEXT};
