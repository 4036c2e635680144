//! DOM snapshot model and panel patch protocol.
//!
//! Hosts hand the engine immutable `Node` snapshots of the page and receive
//! `DomPatch` streams describing writes to the injected panel.

pub mod dom_utils;
pub mod selector;
pub mod traverse;

mod dom_patch;
mod types;

pub use crate::dom_patch::{CLICK_KEY_ATTR, DomPatch, PatchKey, PatchKeyAllocator};
pub use crate::selector::Selector;
pub use crate::types::Node;

#[cfg(feature = "internal-api")]
pub mod internal {
    pub use super::types::{Id, NodeId};
}
