#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
use bias_scope::{Cli, run_app};

#[cfg(not(target_arch = "wasm32"))]
use {clap::Parser, eframe::NativeOptions};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, prelude::*};

/// (everything else, this crate)
fn log_levels() -> (log::LevelFilter, log::LevelFilter) {
    if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(target_arch = "wasm32")]
fn init_log() {
    let (others, ours) = log_levels();
    let _ = fern::Dispatch::new()
        .level(others)
        .level_for(env!("CARGO_CRATE_NAME"), ours)
        .chain(fern::Output::call(|record| {
            let line = format!("[{}] {}", record.target(), record.args());
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&line.into()),
                log::Level::Warn => web_sys::console::warn_1(&line.into()),
                log::Level::Info => web_sys::console::info_1(&line.into()),
                log::Level::Debug | log::Level::Trace => web_sys::console::log_1(&line.into()),
            }
        }))
        .apply();
}

/// Browser entry: builder and templates only, there is no scanner or file access.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();
    init_log();

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("bias_scope_canvas"))
        .ok_or("missing #bias_scope_canvas element")?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| "#bias_scope_canvas is not a canvas")?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| Ok(Box::new(run_app(cc, Cli::default())))),
        )
        .await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("Panic: {info}\n{backtrace}");
    }));

    let (others, ours) = log_levels();
    env_logger::Builder::new()
        .filter(None, others)
        .filter(Some(env!("CARGO_CRATE_NAME")), ours)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    eframe::run_native(
        "Bias Scope",
        NativeOptions {
            viewport: eframe::egui::ViewportBuilder::default()
                .with_maximized(true)
                .with_title("Bias Scope"),
            ..Default::default()
        },
        Box::new(move |cc| Ok(Box::new(run_app(cc, args)))),
    )
}
