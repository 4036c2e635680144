//! Keyed node arena that applies panel `DomPatch` streams.
//!
//! Mirrors what a browser host does with the stream: nodes are created
//! detached, wired up with `AppendChild` and become visible through
//! `MountToBody`. Violations of the patch protocol are reported instead of
//! silently repaired, so engine bugs surface in tests.

use html::internal::Id;
use html::{DomPatch, Node, PatchKey};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomPatchError {
    InvalidKey(PatchKey),
    DuplicateKey(PatchKey),
    MissingKey(PatchKey),
    WrongNodeKind(PatchKey),
    InvalidParent(PatchKey),
    AlreadyMounted(PatchKey),
    CycleDetected { parent: PatchKey, child: PatchKey },
}

impl std::fmt::Display for DomPatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomPatchError::InvalidKey(key) => write!(f, "invalid patch key {key}"),
            DomPatchError::DuplicateKey(key) => write!(f, "patch key {key} reused"),
            DomPatchError::MissingKey(key) => write!(f, "no live node for key {key}"),
            DomPatchError::WrongNodeKind(key) => write!(f, "node {key} has the wrong kind"),
            DomPatchError::InvalidParent(key) => write!(f, "node {key} cannot take this parent"),
            DomPatchError::AlreadyMounted(key) => write!(f, "node {key} is already attached"),
            DomPatchError::CycleDetected { parent, child } => {
                write!(f, "appending {child} under {parent} would create a cycle")
            }
        }
    }
}

impl std::error::Error for DomPatchError {}

type Attrs = Vec<(Arc<str>, Option<String>)>;

enum NodeKind {
    Element { name: Arc<str>, attributes: Attrs },
    Text { text: String },
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<PatchKey>,
    children: Vec<PatchKey>,
}

#[derive(Default)]
pub struct PanelArena {
    nodes: Vec<NodeRecord>,
    live: HashMap<PatchKey, usize>,
    allocated: HashSet<PatchKey>,
    /// Roots appended to the document body, in mount order.
    mounted: Vec<PatchKey>,
}

impl PanelArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError> {
        for patch in patches {
            self.apply_one(patch)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), DomPatchError> {
        match patch {
            DomPatch::CreateElement { key, name, attributes } => self.insert_node(
                *key,
                NodeKind::Element {
                    name: Arc::clone(name),
                    attributes: attributes.clone(),
                },
            ),
            DomPatch::CreateText { key, text } => self.insert_node(*key, NodeKind::Text { text: text.clone() }),
            DomPatch::AppendChild { parent, child } => self.append_child(*parent, *child),
            DomPatch::MountToBody { key } => {
                let index = self.index(*key)?;
                if self.nodes[index].parent.is_some() || self.mounted.contains(key) {
                    return Err(DomPatchError::AlreadyMounted(*key));
                }
                self.mounted.push(*key);
                Ok(())
            }
            DomPatch::RemoveNode { key } => self.remove_subtree(*key),
            DomPatch::ClearChildren { key } => {
                let index = self.index(*key)?;
                let children = std::mem::take(&mut self.nodes[index].children);
                for child in children {
                    if let Some(&child_index) = self.live.get(&child) {
                        self.nodes[child_index].parent = None;
                        self.remove_subtree(child)?;
                    }
                }
                Ok(())
            }
            DomPatch::SetAttributes { key, attributes } => {
                let index = self.index(*key)?;
                match &mut self.nodes[index].kind {
                    NodeKind::Element { attributes: attrs, .. } => {
                        attrs.clone_from(attributes);
                        Ok(())
                    }
                    NodeKind::Text { .. } => Err(DomPatchError::WrongNodeKind(*key)),
                }
            }
            DomPatch::SetText { key, text } => {
                let index = self.index(*key)?;
                match &mut self.nodes[index].kind {
                    NodeKind::Text { text: existing } => {
                        existing.clear();
                        existing.push_str(text);
                        Ok(())
                    }
                    NodeKind::Element { .. } => Err(DomPatchError::WrongNodeKind(*key)),
                }
            }
        }
    }

    fn index(&self, key: PatchKey) -> Result<usize, DomPatchError> {
        if key == PatchKey::INVALID {
            return Err(DomPatchError::InvalidKey(key));
        }
        self.live.get(&key).copied().ok_or(DomPatchError::MissingKey(key))
    }

    fn insert_node(&mut self, key: PatchKey, kind: NodeKind) -> Result<(), DomPatchError> {
        if key == PatchKey::INVALID {
            return Err(DomPatchError::InvalidKey(key));
        }
        if !self.allocated.insert(key) {
            return Err(DomPatchError::DuplicateKey(key));
        }
        self.live.insert(key, self.nodes.len());
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: PatchKey, child: PatchKey) -> Result<(), DomPatchError> {
        let parent_index = self.index(parent)?;
        let child_index = self.index(child)?;
        if parent == child || self.is_descendant(child, parent) {
            return Err(DomPatchError::CycleDetected { parent, child });
        }
        if !matches!(self.nodes[parent_index].kind, NodeKind::Element { .. }) {
            return Err(DomPatchError::InvalidParent(parent));
        }
        if self.nodes[child_index].parent.is_some() || self.mounted.contains(&child) {
            return Err(DomPatchError::AlreadyMounted(child));
        }
        self.nodes[parent_index].children.push(child);
        self.nodes[child_index].parent = Some(parent);
        Ok(())
    }

    fn remove_subtree(&mut self, key: PatchKey) -> Result<(), DomPatchError> {
        let index = self.index(key)?;
        if let Some(parent) = self.nodes[index].parent.take()
            && let Some(&parent_index) = self.live.get(&parent)
        {
            self.nodes[parent_index].children.retain(|k| *k != key);
        }
        self.mounted.retain(|k| *k != key);
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(i) = self.live.remove(&current) {
                stack.append(&mut self.nodes[i].children);
            }
        }
        Ok(())
    }

    fn is_descendant(&self, ancestor: PatchKey, maybe_descendant: PatchKey) -> bool {
        let Some(&index) = self.live.get(&ancestor) else {
            return false;
        };
        let mut stack = self.nodes[index].children.clone();
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            if let Some(&i) = self.live.get(&current) {
                stack.extend(self.nodes[i].children.iter().copied());
            }
        }
        false
    }

    pub fn mounted(&self) -> &[PatchKey] {
        &self.mounted
    }

    pub fn is_live(&self, key: PatchKey) -> bool {
        self.live.contains_key(&key)
    }

    pub fn is_attached(&self, key: PatchKey) -> bool {
        self.root_of(key).is_some_and(|root| self.mounted.contains(&root))
    }

    pub fn parent(&self, key: PatchKey) -> Option<PatchKey> {
        self.live.get(&key).and_then(|&i| self.nodes[i].parent)
    }

    fn root_of(&self, key: PatchKey) -> Option<PatchKey> {
        let mut current = key;
        if !self.live.contains_key(&current) {
            return None;
        }
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    pub fn attr(&self, key: PatchKey, name: &str) -> Option<&str> {
        let &index = self.live.get(&key)?;
        match &self.nodes[index].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn has_class(&self, key: PatchKey, class: &str) -> bool {
        self.attr(key, "class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Attached element keys in document order.
    pub fn attached_elements(&self) -> Vec<PatchKey> {
        let mut out = Vec::new();
        for root in &self.mounted {
            let mut stack = vec![*root];
            while let Some(key) = stack.pop() {
                let Some(&i) = self.live.get(&key) else {
                    continue;
                };
                if matches!(self.nodes[i].kind, NodeKind::Element { .. }) {
                    out.push(key);
                }
                stack.extend(self.nodes[i].children.iter().rev().copied());
            }
        }
        out
    }

    /// Element keys strictly inside `ancestor`, in document order.
    pub fn descendants(&self, ancestor: PatchKey) -> Vec<PatchKey> {
        let Some(&index) = self.live.get(&ancestor) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = self.nodes[index].children.iter().rev().copied().collect::<Vec<_>>();
        while let Some(key) = stack.pop() {
            let Some(&i) = self.live.get(&key) else {
                continue;
            };
            if matches!(self.nodes[i].kind, NodeKind::Element { .. }) {
                out.push(key);
            }
            stack.extend(self.nodes[i].children.iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, key: PatchKey) -> String {
        let Some(&index) = self.live.get(&key) else {
            return String::new();
        };
        match &self.nodes[index].kind {
            NodeKind::Text { text } => text.clone(),
            NodeKind::Element { .. } => self.nodes[index]
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    /// Snapshot of a subtree; node ids carry the patch key numbers.
    pub fn materialize(&self, key: PatchKey) -> Option<Node> {
        let &index = self.live.get(&key)?;
        let record = &self.nodes[index];
        let node = match &record.kind {
            NodeKind::Text { text } => Node::Text {
                id: Id(key.0),
                text: text.clone(),
            },
            NodeKind::Element { name, attributes } => Node::Element {
                id: Id(key.0),
                name: name.to_string(),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                children: record
                    .children
                    .iter()
                    .filter_map(|c| self.materialize(*c))
                    .collect(),
            },
        };
        Some(node)
    }
}
