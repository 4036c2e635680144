//! Simulated page host.
//!
//! `SimPage` implements `app_api::PageHost` on a virtual clock so lifecycle
//! behavior (races between navigation channels, debounces, timeouts) can be
//! replayed exactly. Scenarios describe whole timelines in TOML.

pub mod arena;
mod clock;
pub mod page;
pub mod scenario;
pub mod script;

pub use crate::arena::{DomPatchError, PanelArena};
pub use crate::page::SimPage;
pub use crate::scenario::{Expectation, Scenario, ScenarioError};
pub use crate::script::{NodeSpec, ScriptAction};
