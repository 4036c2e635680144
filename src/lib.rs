//! Floating table of contents for Zenn scrap pages.
//!
//! The engine lives in [`runtime_toc`] and the heading/panel model in [`toc`].
//! Built for `wasm32`, this crate is the content script: [`start`] runs on
//! module instantiation and attaches the engine to the page.

pub use runtime_toc::{Controller, ScopePattern, TocConfig};
pub use toc::{PanelPosition, PanelSettings};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    if platform::logger::init(log::LevelFilter::Info).is_err() {
        log::debug!(target: "toc.lifecycle", "logger already installed");
    }
    log::info!(target: "toc.lifecycle", "script loaded");
    platform::run(TocConfig::default())
}
