//! Heading locator.
//!
//! Finds the headings that count toward the outline in a content snapshot.
//! Selection is tiered and stops at the first tier with any match:
//!
//! 1. headings carrying the content-flow marker class (`h2.code-line`);
//! 2. headings inside one of the content container selectors;
//! 3. every heading element.
//!
//! Tier 3 is a heuristic and may pick up headings from unrelated widgets.
//! Exclusion rules apply to every tier: headings nested in quotes, code,
//! collapsed `<details>`, navigation chrome, or the panel itself never count.

use crate::slug::anchor_from_text;
use html::Node;
use html::Selector;
use html::dom_utils::{collapse_whitespace, heading_level, text_content};
use html::internal::Id;
use html::selector::matches_any;
use html::traverse::{Walk, walk_with_ancestors};
use serde::Deserialize;

/// One heading as seen by the outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingRecord {
    pub level: u8,
    pub text: String,
    /// Anchor id; the element's own `id` or one derived from `text`.
    pub id: String,
    /// True when `id` was derived and still has to be written to the page.
    pub generated: bool,
    pub source: Id,
}

impl HeadingRecord {
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            level,
            id: anchor_from_text(&text),
            generated: true,
            text,
            source: Id::UNASSIGNED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Marker,
    Container,
    Unrestricted,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Class marking headings rendered from the document flow.
    pub marker_class: String,
    pub containers: Vec<String>,
    /// Ancestors that disqualify a heading.
    pub excluded: Vec<String>,
    /// Highest heading level that counts (`h1`..`hN`).
    pub max_level: u8,
    /// DOM id of the injected panel, never searched.
    pub panel_id: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            marker_class: "code-line".into(),
            containers: vec![".znc".into(), "article".into(), "main".into()],
            excluded: ["blockquote", "pre", "code", "nav", "header", "footer", "aside"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_level: 6,
            panel_id: "zenn-scrap-toc".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HeadingLocator {
    marker_class: String,
    containers: Vec<Selector>,
    excluded: Vec<Selector>,
    max_level: u8,
    panel_id: String,
}

impl HeadingLocator {
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            marker_class: config.marker_class.clone(),
            containers: compile(&config.containers),
            excluded: compile(&config.excluded),
            max_level: config.max_level.clamp(1, 6),
            panel_id: config.panel_id.clone(),
        }
    }

    /// Ordered headings of the first non-empty tier.
    pub fn locate(&self, doc: &Node) -> Vec<HeadingRecord> {
        for tier in [Tier::Marker, Tier::Container, Tier::Unrestricted] {
            let found = self.collect(doc, tier);
            if !found.is_empty() {
                log::debug!(target: "toc.locator", "{} headings via {tier:?} tier", found.len());
                return found;
            }
        }
        Vec::new()
    }

    /// Cheap presence test used by the readiness watcher.
    pub fn has_headings(&self, doc: &Node) -> bool {
        let mut found = false;
        self.walk_candidates(doc, |_, _, _| {
            found = true;
            false
        });
        found
    }

    /// Does an added subtree bring in a heading that would count?
    pub fn is_or_contains_heading(&self, added: &Node) -> bool {
        self.has_headings(added)
    }

    fn collect(&self, doc: &Node, tier: Tier) -> Vec<HeadingRecord> {
        let mut out = Vec::new();
        self.walk_candidates(doc, |node, level, ancestors| {
            let qualifies = match tier {
                Tier::Marker => node.has_class(&self.marker_class),
                Tier::Container => ancestors.iter().any(|a| matches_any(&self.containers, a)),
                Tier::Unrestricted => true,
            };
            if qualifies && let Some(record) = record_for(node, level) {
                out.push(record);
            }
            true
        });
        out
    }

    /// Visit every non-excluded heading element with its level; the visitor
    /// returns false to stop early.
    fn walk_candidates<'a>(
        &self,
        doc: &'a Node,
        mut visit: impl FnMut(&'a Node, u8, &[&'a Node]) -> bool,
    ) {
        let mut done = false;
        walk_with_ancestors(doc, |node, ancestors| {
            if done {
                return Walk::SkipChildren;
            }
            let Some(name) = node.name() else {
                return Walk::Continue;
            };
            if self.is_excluded(node) {
                return Walk::SkipChildren;
            }
            match heading_level(name) {
                Some(level) if level <= self.max_level => {
                    if !visit(node, level, ancestors) {
                        done = true;
                    }
                    Walk::SkipChildren
                }
                _ => Walk::Continue,
            }
        });
    }

    fn is_excluded(&self, node: &Node) -> bool {
        if node.attr("id") == Some(self.panel_id.as_str()) {
            return true;
        }
        if node.is_element_named("details") && !node.has_attr("open") {
            return true;
        }
        matches_any(&self.excluded, node)
    }
}

impl Default for HeadingLocator {
    fn default() -> Self {
        Self::new(&LocatorConfig::default())
    }
}

fn compile(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| {
            let parsed = Selector::parse(s);
            if parsed.is_none() {
                log::warn!(target: "toc.locator", "ignoring unsupported selector {s:?}");
            }
            parsed
        })
        .collect()
}

/// Visible heading text with a leading `#` permalink marker removed.
pub fn heading_text(node: &Node) -> String {
    let text = collapse_whitespace(&text_content(node));
    match text.strip_prefix('#') {
        Some(rest) => rest.trim_start().to_string(),
        None => text,
    }
}

fn record_for(node: &Node, level: u8) -> Option<HeadingRecord> {
    let text = heading_text(node);
    if text.is_empty() {
        return None;
    }
    let (id, generated) = match node.attr("id").filter(|v| !v.is_empty()) {
        Some(existing) => (existing.to_string(), false),
        None => (anchor_from_text(&text), true),
    };
    Some(HeadingRecord {
        level,
        text,
        id,
        generated,
        source: node.id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::traverse::assign_node_ids;

    fn h(level: u8, text: &str) -> Node {
        Node::element(&format!("h{level}")).with_child(Node::text(text))
    }

    fn marked(level: u8, text: &str) -> Node {
        h(level, text).with_attr("class", "code-line")
    }

    fn texts(records: &[HeadingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn marker_tier_wins_over_other_headings() {
        let doc = Node::element("main").with_children([
            h(1, "Site title"),
            Node::element("div")
                .with_attr("class", "znc")
                .with_children([marked(1, "A"), marked(2, "B")]),
        ]);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(texts(&found), vec!["A", "B"]);
    }

    #[test]
    fn container_tier_used_without_markers() {
        let doc = Node::element("body").with_children([
            h(2, "Sidebar"),
            Node::element("div")
                .with_attr("class", "znc")
                .with_children([h(1, "A"), h(3, "C")]),
        ]);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(texts(&found), vec!["A", "C"]);
    }

    #[test]
    fn unrestricted_tier_is_last_resort() {
        let doc = Node::element("body").with_children([h(2, "Only"), h(4, "Two")]);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(texts(&found), vec!["Only", "Two"]);
        assert_eq!(found[1].level, 4);
    }

    #[test]
    fn excluded_ancestors_hide_headings() {
        let doc = Node::element("main").with_children([
            Node::element("blockquote").with_child(marked(2, "Quoted")),
            Node::element("pre").with_child(marked(2, "Code")),
            Node::element("details").with_child(marked(2, "Collapsed")),
            Node::element("details").with_flag("open").with_child(marked(2, "Open")),
            Node::element("nav").with_child(marked(2, "Nav")),
            Node::element("div")
                .with_attr("id", "zenn-scrap-toc")
                .with_child(marked(3, "Panel")),
            marked(2, "Kept"),
        ]);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(texts(&found), vec!["Open", "Kept"]);
    }

    #[test]
    fn existing_ids_kept_and_missing_ids_generated() {
        let mut doc = Node::element("main").with_children([
            marked(1, "Hello World"),
            marked(2, "Custom").with_attr("id", "keep-me"),
        ]);
        assign_node_ids(&mut doc);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(found[0].id, "hello-world");
        assert!(found[0].generated);
        assert_ne!(found[0].source, Id::UNASSIGNED);
        assert_eq!(found[1].id, "keep-me");
        assert!(!found[1].generated);
    }

    #[test]
    fn permalink_marker_and_empty_headings() {
        let doc = Node::element("main").with_children([
            marked(2, "#  Intro\n"),
            marked(2, "   "),
        ]);
        let found = HeadingLocator::default().locate(&doc);
        assert_eq!(texts(&found), vec!["Intro"]);
    }

    #[test]
    fn max_level_limits_candidates() {
        let config = LocatorConfig {
            max_level: 2,
            ..LocatorConfig::default()
        };
        let doc = Node::element("main").with_children([marked(1, "A"), marked(3, "C")]);
        let found = HeadingLocator::new(&config).locate(&doc);
        assert_eq!(texts(&found), vec!["A"]);
    }

    #[test]
    fn added_subtree_classification() {
        let locator = HeadingLocator::default();
        let wrapper = Node::element("div").with_child(Node::element("section").with_child(h(2, "x")));
        assert!(locator.is_or_contains_heading(&wrapper));
        assert!(locator.is_or_contains_heading(&h(3, "y")));
        assert!(!locator.is_or_contains_heading(&Node::element("p").with_child(Node::text("h2"))));
        assert!(!locator.is_or_contains_heading(&Node::element("pre").with_child(h(2, "z"))));
    }

    #[test]
    fn bad_selectors_are_dropped() {
        let config = LocatorConfig {
            containers: vec!["div > p".into(), "article".into()],
            ..LocatorConfig::default()
        };
        let doc = Node::element("body").with_children([
            h(2, "Outside"),
            Node::element("article").with_child(h(2, "Inside")),
        ]);
        let found = HeadingLocator::new(&config).locate(&doc);
        assert_eq!(texts(&found), vec!["Inside"]);
    }
}
