//! Page-side activity a test can perform or schedule: content arriving,
//! the app navigating, the user resizing or scrolling.

use html::Node;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ScriptAction {
    /// Append nodes to the content region (one mutation record).
    Append { nodes: Vec<NodeSpec> },
    /// Remove every child of the content region.
    ClearContent,
    /// The app calls `history.pushState`, optionally retitling the page.
    PushState {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    ReplaceState { url: String },
    /// Browser back button.
    Back,
    /// Location changes without any event (only polling can see it).
    SetLocation { url: String },
    /// The user activates a link; the app moves there `navigate_after` ms later.
    ClickLink {
        href: String,
        #[serde(default)]
        navigate_after: Option<u64>,
    },
    SetTitle { text: String },
    Resize { width: f64 },
    Scroll { y: f64 },
    FinishLoading,
}

/// Declarative description of a content subtree.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    pub text: Option<String>,
    pub class: Option<String>,
    pub id: Option<String>,
    /// Wrapper elements, outermost first (`details` stays collapsed).
    pub within: Vec<String>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// `h{level}` carrying the content-flow marker class.
    pub fn heading(level: u8, text: &str) -> Self {
        Self {
            tag: format!("h{level}"),
            text: Some(text.to_string()),
            class: Some("code-line".into()),
            ..Self::default()
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self {
            tag: "p".into(),
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn within(mut self, wrapper: &str) -> Self {
        self.within.push(wrapper.to_string());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::element(&self.tag);
        if let Some(class) = &self.class {
            node = node.with_attr("class", class);
        }
        if let Some(id) = &self.id {
            node = node.with_attr("id", id);
        }
        if let Some(text) = &self.text {
            node = node.with_child(Node::text(text.as_str()));
        }
        node = node.with_children(self.children.iter().map(NodeSpec::to_node));
        self.within
            .iter()
            .rev()
            .fold(node, |inner, wrapper| Node::element(wrapper).with_child(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_nest_outermost_first() {
        let node = NodeSpec::heading(2, "x").within("section").within("blockquote").to_node();
        assert_eq!(node.name(), Some("section"));
        let inner = &node.children()[0];
        assert_eq!(inner.name(), Some("blockquote"));
        assert!(inner.children()[0].has_class("code-line"));
    }
}
