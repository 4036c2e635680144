pub type NodeId = u32;

/// Host-assigned node identity inside one document snapshot.
///
/// `Id(0)` means "unassigned"; hosts number real nodes from 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

impl Id {
    pub const UNASSIGNED: Id = Id(0);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        id: Id,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
    Comment {
        id: Id,
        text: String,
    },
}

impl Node {
    /// Element with the given tag name (canonicalised to ASCII lowercase).
    pub fn element(name: &str) -> Node {
        Node::Element {
            id: Id::UNASSIGNED,
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::Text {
            id: Id::UNASSIGNED,
            text: text.into(),
        }
    }

    pub fn document(children: Vec<Node>) -> Node {
        Node::Document {
            id: Id::UNASSIGNED,
            children,
        }
    }

    /// Builder: add an attribute. No-op on non-elements.
    pub fn with_attr(mut self, key: &str, value: &str) -> Node {
        if let Node::Element { attributes, .. } = &mut self {
            attributes.push((key.to_ascii_lowercase(), Some(value.to_string())));
        }
        self
    }

    /// Builder: add a bare attribute (`<details open>`).
    pub fn with_flag(mut self, key: &str) -> Node {
        if let Node::Element { attributes, .. } = &mut self {
            attributes.push((key.to_ascii_lowercase(), None));
        }
        self
    }

    /// Builder: append a child. No-op on leaf nodes.
    pub fn with_child(mut self, child: Node) -> Node {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, more: impl IntoIterator<Item = Node>) -> Node {
        if let Some(children) = self.children_mut() {
            children.extend(more);
        }
        self
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Document { id, .. } => *id,
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
            Node::Comment { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: Id) {
        match self {
            Node::Document { id, .. } => *id = new_id,
            Node::Element { id, .. } => *id = new_id,
            Node::Text { id, .. } => *id = new_id,
            Node::Comment { id, .. } => *id = new_id,
        }
    }

    /// Lowercase tag name for elements.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, want: &str) -> bool {
        self.name().is_some_and(|n| n.eq_ignore_ascii_case(want))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } => Some(children),
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[(String, Option<String>)] {
        match self {
            Node::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// First value of attribute `key`; bare attributes yield `Some("")`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes()
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Whitespace-separated token membership, as used by `class` and `rel`.
    pub fn attr_has_token(&self, key: &str, token: &str) -> bool {
        self.attr(key)
            .is_some_and(|v| v.split_whitespace().any(|t| t == token))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_has_token("class", class)
    }

    /// Replace (or insert) attribute `key`.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        if let Node::Element { attributes, .. } = self {
            if let Some(slot) = attributes
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
            {
                slot.1 = Some(value.to_string());
            } else {
                attributes.push((key.to_ascii_lowercase(), Some(value.to_string())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_canonicalises_names_and_collects_attributes() {
        let node = Node::element("H2")
            .with_attr("Class", "code-line intro")
            .with_child(Node::text("Hello"));
        assert_eq!(node.name(), Some("h2"));
        assert!(node.has_class("code-line"));
        assert!(node.has_class("intro"));
        assert!(!node.has_class("code"));
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn bare_attribute_reads_as_empty_value() {
        let node = Node::element("details").with_flag("open");
        assert_eq!(node.attr("open"), Some(""));
        assert!(node.has_attr("OPEN"));
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let mut node = Node::element("h1").with_attr("id", "old");
        node.set_attr("id", "new");
        assert_eq!(node.attr("id"), Some("new"));
        assert_eq!(node.attributes().len(), 1);
    }

    #[test]
    fn leaf_builders_ignore_children() {
        let node = Node::text("x").with_child(Node::text("y"));
        assert!(node.children().is_empty());
    }
}
