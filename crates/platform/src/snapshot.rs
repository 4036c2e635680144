//! Live DOM to `html::Node` snapshots.
//!
//! Element identity is kept in a `WeakMap` on the JS side, so an element
//! keeps the same `Id` across snapshots and mutation records for as long as
//! it is alive. The Rust-side lookup table only holds elements seen in the
//! latest full snapshot; subtrees from mutation records are converted
//! without touching it.

use html::Node;
use html::internal::Id;
use js_sys::{Object, WeakMap};
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

const ELEMENT_NODE: u16 = 1;
const TEXT_NODE: u16 = 3;

pub(crate) struct NodeRegistry {
    ids: WeakMap,
    elements: HashMap<Id, Element>,
    next: u32,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            ids: WeakMap::new(),
            elements: HashMap::new(),
            next: 1,
        }
    }

    pub fn element(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn register(&mut self, element: &Element) -> Id {
        let key = element.unchecked_ref::<Object>();
        let id = match self.ids.get(key).as_f64() {
            Some(raw) => Id(raw as u32),
            None => {
                let id = Id(self.next);
                self.next += 1;
                self.ids.set(key, &JsValue::from(id.0));
                id
            }
        };
        self.elements.insert(id, element.clone());
        id
    }

    /// Snapshot of `root`, replacing the lookup table.
    pub fn snapshot(&mut self, root: &web_sys::Node) -> Option<Node> {
        self.elements.clear();
        convert(root, &mut |element| self.register(element))
    }
}

/// Detached copy of a subtree reported by a mutation record. Only its shape
/// is used (does it hold a heading?), so nodes stay `Id::UNASSIGNED` and
/// nothing is retained.
pub(crate) fn snapshot_added(node: &web_sys::Node) -> Option<Node> {
    convert(node, &mut |_| Id::UNASSIGNED)
}

fn convert(node: &web_sys::Node, assign: &mut dyn FnMut(&Element) -> Id) -> Option<Node> {
    match node.node_type() {
        ELEMENT_NODE => {
            let element = node.unchecked_ref::<Element>();
            let mut out = Node::element(&element.local_name());
            for name in element.get_attribute_names().iter() {
                let Some(name) = name.as_string() else {
                    continue;
                };
                let value = element.get_attribute(&name).unwrap_or_default();
                out = out.with_attr(&name, &value);
            }
            out.set_id(assign(element));
            let children = node.child_nodes();
            let converted = (0..children.length())
                .filter_map(|i| children.item(i))
                .filter_map(|child| convert(&child, assign))
                .collect::<Vec<_>>();
            Some(out.with_children(converted))
        }
        TEXT_NODE => Some(Node::text(node.text_content().unwrap_or_default())),
        _ => None,
    }
}
