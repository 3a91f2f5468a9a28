#[cfg(not(target_arch = "wasm32"))]
mod scan_provider;

#[cfg(not(target_arch = "wasm32"))]
mod templates_io;

#[cfg(not(target_arch = "wasm32"))]
pub use scan_provider::{FileScanProvider, ProcessScanProvider, ScanProvider, ScanRequest};

#[cfg(not(target_arch = "wasm32"))]
pub use templates_io::{load_templates, save_templates};
