//! Panel patch protocol.
//!
//! The engine never holds real DOM nodes. It describes every write to the
//! injected panel as an ordered stream of `DomPatch` operations over keys it
//! allocates itself; each host applies the stream to its own node storage.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to live keys at the time they are used (except
//!   the `key` in create operations).
//! - Keys are never reused within one script lifetime, even after removal.
//! - `PatchKey::INVALID` is never valid in a patch stream.
//! - Element and attribute names are canonical ASCII-lowercase.
//! - A node may have at most one parent; `MountToBody` only accepts a
//!   parentless node.

use std::sync::Arc;

/// Attribute carrying an interactive panel node's own key, so a host can
/// report clicks back as keys.
pub const CLICK_KEY_ATTR: &str = "data-toc-key";

/// Opaque engine-side key for a panel node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: PatchKey = PatchKey(0);

    /// Parse the value of a [`CLICK_KEY_ATTR`] attribute.
    pub fn parse(raw: &str) -> Option<PatchKey> {
        match raw.trim().parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(v) => Some(PatchKey(v)),
        }
    }
}

impl std::fmt::Display for PatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic key source. Never hands out `INVALID` and never repeats.
#[derive(Debug)]
pub struct PatchKeyAllocator {
    next: u32,
}

impl PatchKeyAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn alloc(&mut self) -> PatchKey {
        let key = PatchKey(self.next);
        self.next = self.next.checked_add(1).unwrap_or(1);
        key
    }
}

impl Default for PatchKeyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element node with initial attributes.
    CreateElement {
        key: PatchKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, Option<String>)>,
    },
    /// Create a detached text node.
    CreateText { key: PatchKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Append a detached node as the last child of the document body.
    MountToBody { key: PatchKey },
    /// Remove a node and its subtree. Keys in the subtree become invalid.
    RemoveNode { key: PatchKey },
    /// Remove every child of an element, keeping the element itself.
    ClearChildren { key: PatchKey },
    /// Replace all attributes on an element node.
    SetAttributes {
        key: PatchKey,
        attributes: Vec<(Arc<str>, Option<String>)>,
    },
    /// Replace the text content of a text node.
    SetText { key: PatchKey, text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_returns_invalid() {
        let mut keys = PatchKeyAllocator::new();
        let a = keys.alloc();
        let b = keys.alloc();
        assert_ne!(a, PatchKey::INVALID);
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert_eq!(PatchKey::parse("12"), Some(PatchKey(12)));
        assert_eq!(PatchKey::parse("0"), None);
        assert_eq!(PatchKey::parse("x"), None);
    }
}
