//! Page-lifecycle engine for the scrap TOC panel.
//!
//! A [`Controller`] is fed `bus::PageEvent`s by a host and keeps at most one
//! panel with one set of observers alive, in step with SPA navigation and
//! asynchronously rendered content.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod nav;
pub mod panel_view;
pub mod readiness;
pub mod scope;
pub mod scroll_spy;
pub mod timers;
pub mod watcher;

pub use crate::config::TocConfig;
pub use crate::controller::Controller;
pub use crate::scope::ScopePattern;
