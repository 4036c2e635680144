//! Host trait defining everything the engine may ask of a page.
//!
//! The engine is host-driven: it calls into a `PageHost` to read the page,
//! schedule timers, register observers and write the panel, and the host calls
//! back with `bus::PageEvent`s. Implementations exist for the browser
//! (`platform`, wasm only) and for deterministic tests (`page_sim`).
//!
//! # Design Principles
//!
//! - Absence is not an error: lookups return `Option`, writes to missing
//!   nodes are no-ops.
//! - Handles (`TimerId`, `ObserverId`, `ListenerId`) are opaque and owned by
//!   the engine once returned; releasing an already released handle is a no-op.
//! - After `disconnect`/`clear_timer`/`unlisten` returns, the host must not
//!   deliver further events for that handle.

use core_types::{ListenerId, NodeRef, ObserverId, Rect, RootMargin, ScrollBehavior, TimerId};
use html::internal::Id;
use html::{DomPatch, Node};
use std::time::Duration;

/// How much of each content mutation batch the host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDetail {
    /// One record per batch entry with no added subtrees; the batch itself
    /// is the signal.
    Signal,
    /// Added subtrees are snapshotted into each record.
    AddedNodes,
}

/// Failure to carry out a write the engine requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The patch stream referenced a key the host does not know.
    UnknownKey(u32),
    /// The host rejected the operation (script exception, detached node, ...).
    Rejected(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::UnknownKey(key) => write!(f, "unknown panel key {key}"),
            HostError::Rejected(msg) => write!(f, "host rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Process-external string store (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Fire-and-forget; failures are swallowed by the implementation.
    fn set(&mut self, key: &str, value: &str);
}

pub trait PageHost {
    // =========================================================================
    // Location & Document
    // =========================================================================

    /// Current effective URL (`location.href`).
    fn location(&self) -> String;

    /// True while the document is still parsing (`readyState == "loading"`).
    fn is_loading(&self) -> bool;

    /// Snapshot of the content region: `main` when present, else `body`.
    ///
    /// Node ids in the snapshot stay valid for `assign_anchor`, `rect` and
    /// `observe_intersections` until the next snapshot is taken.
    fn document(&mut self) -> Option<Node>;

    fn viewport_width(&self) -> f64;

    /// Vertical window scroll offset (`pageYOffset`).
    fn scroll_y(&self) -> f64;

    // =========================================================================
    // Timers
    // =========================================================================

    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    fn set_interval(&mut self, period: Duration) -> TimerId;

    fn clear_timer(&mut self, id: TimerId);

    // =========================================================================
    // Observers
    // =========================================================================

    /// `childList` + `subtree` mutation observer on the content region.
    /// Added subtrees are only carried with `MutationDetail::AddedNodes`.
    fn observe_content_mutations(&mut self, detail: MutationDetail) -> ObserverId;

    /// Mutation observer on the `<title>` element; `None` without one.
    fn observe_title(&mut self) -> Option<ObserverId>;

    fn observe_intersections(&mut self, targets: &[Id], margin: RootMargin) -> ObserverId;

    fn disconnect(&mut self, id: ObserverId);

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Wrap `history.pushState`/`replaceState`, listen for `popstate` and for
    /// capture-phase clicks on links. Called once per script lifetime.
    fn install_navigation_hooks(&mut self);

    fn listen_resize(&mut self) -> ListenerId;

    fn unlisten(&mut self, id: ListenerId);

    // =========================================================================
    // DOM writes
    // =========================================================================

    fn apply_panel_patches(&mut self, patches: &[DomPatch]) -> Result<(), HostError>;

    /// Remove the element with DOM id `dom_id` if present.
    fn remove_element_by_dom_id(&mut self, dom_id: &str) -> bool;

    /// Give a page element an `id` attribute so it can be linked to.
    fn assign_anchor(&mut self, node: Id, anchor: &str);

    /// Insert a `<style id=..>` once; returns true when newly inserted.
    fn ensure_stylesheet(&mut self, dom_id: &str, css: &str) -> bool;

    // =========================================================================
    // Geometry & Scrolling
    // =========================================================================

    fn rect(&self, node: NodeRef) -> Option<Rect>;

    fn scroll_window_to(&mut self, top: f64, behavior: ScrollBehavior);

    /// Scroll the nearest scrollable ancestor so `node` sits centred.
    fn scroll_into_view(&mut self, node: NodeRef);

    // =========================================================================
    // Storage
    // =========================================================================

    fn storage(&mut self) -> &mut dyn KeyValueStore;
}
