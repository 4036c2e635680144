//! Browser side of the scrap TOC.
//!
//! [`logger`] forwards `log` records to the console and builds on every
//! target. The host and runtime only exist on `wasm32`, where they connect
//! the engine to the live page through `web-sys`.

pub mod logger;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod panel_dom;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod snapshot;

#[cfg(target_arch = "wasm32")]
pub use crate::host::BrowserHost;
#[cfg(target_arch = "wasm32")]
pub use crate::runtime::run;
