//! Applies `DomPatch` streams to real DOM nodes.

use app_api::HostError;
use html::{DomPatch, PatchKey};
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

pub(crate) struct PanelDom {
    document: Document,
    nodes: HashMap<PatchKey, web_sys::Node>,
}

fn rejected(err: JsValue) -> HostError {
    HostError::Rejected(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl PanelDom {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            nodes: HashMap::new(),
        }
    }

    pub fn node(&self, key: PatchKey) -> Option<&web_sys::Node> {
        self.nodes.get(&key)
    }

    pub fn element(&self, key: PatchKey) -> Option<&Element> {
        self.node(key).and_then(|n| n.dyn_ref::<Element>())
    }

    fn live(&self, key: PatchKey) -> Result<&web_sys::Node, HostError> {
        self.nodes.get(&key).ok_or(HostError::UnknownKey(key.0))
    }

    fn live_element(&self, key: PatchKey) -> Result<&Element, HostError> {
        self.live(key)?
            .dyn_ref::<Element>()
            .ok_or_else(|| HostError::Rejected(format!("panel node {key} is not an element")))
    }

    /// Forget every key whose node sits inside `root` (and `root` itself
    /// when `inclusive`).
    fn forget_within(&mut self, root: &web_sys::Node, inclusive: bool) {
        self.nodes
            .retain(|_, node| !(root.contains(Some(node)) && (inclusive || node != root)));
    }

    pub fn apply(&mut self, patches: &[DomPatch]) -> Result<(), HostError> {
        for patch in patches {
            self.apply_one(patch)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), HostError> {
        match patch {
            DomPatch::CreateElement { key, name, attributes } => {
                let element = self.document.create_element(name).map_err(rejected)?;
                for (attr, value) in attributes {
                    element
                        .set_attribute(attr, value.as_deref().unwrap_or(""))
                        .map_err(rejected)?;
                }
                self.nodes.insert(*key, element.into());
            }
            DomPatch::CreateText { key, text } => {
                let node = self.document.create_text_node(text);
                self.nodes.insert(*key, node.into());
            }
            DomPatch::AppendChild { parent, child } => {
                let child = self.live(*child)?.clone();
                self.live(*parent)?.append_child(&child).map_err(rejected)?;
            }
            DomPatch::MountToBody { key } => {
                let body = self
                    .document
                    .body()
                    .ok_or_else(|| HostError::Rejected("document has no body".into()))?;
                body.append_child(self.live(*key)?).map_err(rejected)?;
            }
            DomPatch::RemoveNode { key } => {
                let node = self.live(*key)?.clone();
                if let Some(parent) = node.parent_node() {
                    parent.remove_child(&node).map_err(rejected)?;
                }
                self.forget_within(&node, true);
            }
            DomPatch::ClearChildren { key } => {
                let node = self.live(*key)?.clone();
                self.forget_within(&node, false);
                node.set_text_content(None);
            }
            DomPatch::SetAttributes { key, attributes } => {
                let element = self.live_element(*key)?;
                for old in element.get_attribute_names().iter() {
                    if let Some(old) = old.as_string() {
                        element.remove_attribute(&old).map_err(rejected)?;
                    }
                }
                for (attr, value) in attributes {
                    element
                        .set_attribute(attr, value.as_deref().unwrap_or(""))
                        .map_err(rejected)?;
                }
            }
            DomPatch::SetText { key, text } => {
                self.live(*key)?.set_text_content(Some(text));
            }
        }
        Ok(())
    }
}
