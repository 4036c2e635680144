//! Panel renderer.
//!
//! Maps an outline onto the panel DOM as a `DomPatch` stream. The shell
//! (root, header, toggle, content container) is rendered once per
//! initialisation; the body (nested lists) is re-rendered from scratch
//! whenever the outline changes.
//!
//! Subtrees are built detached and attached with a single final patch, so a
//! host sees one insertion per render.

use crate::outline::OutlineNode;
use crate::settings::{PanelPosition, PanelSettings};
use html::internal::Id;
use html::{DomPatch, PatchKey, PatchKeyAllocator};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PanelLabels {
    pub title: String,
    pub empty: String,
    pub toggle_hint: String,
    pub expanded_glyph: String,
    pub collapsed_glyph: String,
}

impl Default for PanelLabels {
    fn default() -> Self {
        Self {
            title: "目次".into(),
            empty: "見出しが見つかりません".into(),
            toggle_hint: "目次の表示/非表示".into(),
            expanded_glyph: "▼".into(),
            collapsed_glyph: "▶".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Fixed DOM id; at most one element with it may exist.
    pub dom_id: String,
    pub style_id: String,
    pub labels: PanelLabels,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            dom_id: "zenn-scrap-toc".into(),
            style_id: "zenn-scrap-toc-style".into(),
            labels: PanelLabels::default(),
        }
    }
}

/// Everything that decides the root element's classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelLayout {
    pub expanded: bool,
    pub position: PanelPosition,
    pub compact: bool,
}

impl PanelLayout {
    pub fn new(settings: &PanelSettings, compact: bool) -> Self {
        Self {
            expanded: settings.is_expanded,
            position: settings.position,
            compact,
        }
    }

    pub fn class_list(&self) -> String {
        let mut classes = format!(
            "zenn-scrap-toc {} position-{}",
            if self.expanded { "expanded" } else { "collapsed" },
            self.position.as_str()
        );
        if self.compact {
            classes.push_str(" compact");
        }
        classes
    }
}

/// Keys of the shell nodes the engine updates later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelShell {
    pub root: PatchKey,
    pub toggle: PatchKey,
    pub toggle_label: PatchKey,
    pub content: PatchKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelLink {
    pub key: PatchKey,
    pub anchor: String,
    pub source: Id,
}

/// Result of one body render: the clickable entries in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PanelBody {
    pub links: Vec<PanelLink>,
}

impl PanelBody {
    pub fn link(&self, key: PatchKey) -> Option<&PanelLink> {
        self.links.iter().find(|l| l.key == key)
    }

    /// First entry for `anchor`; duplicate anchors resolve to the earliest.
    pub fn link_for_anchor(&self, anchor: &str) -> Option<&PanelLink> {
        self.links.iter().find(|l| l.anchor == anchor)
    }
}

pub const KEY_ATTR: &str = html::CLICK_KEY_ATTR;

type Attrs = Vec<(Arc<str>, Option<String>)>;

fn attrs<const N: usize>(pairs: [(&str, String); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(k, v)| (Arc::from(k), Some(v)))
        .collect()
}

pub struct PanelRenderer<'a> {
    config: &'a PanelConfig,
    keys: &'a mut PatchKeyAllocator,
    patches: Vec<DomPatch>,
}

impl<'a> PanelRenderer<'a> {
    pub fn new(config: &'a PanelConfig, keys: &'a mut PatchKeyAllocator) -> Self {
        Self {
            config,
            keys,
            patches: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<DomPatch> {
        self.patches
    }

    fn element(&mut self, name: &str, attributes: Attrs) -> PatchKey {
        let key = self.keys.alloc();
        self.patches.push(DomPatch::CreateElement {
            key,
            name: Arc::from(name),
            attributes,
        });
        key
    }

    fn text(&mut self, parent: PatchKey, text: &str) -> PatchKey {
        let key = self.keys.alloc();
        self.patches.push(DomPatch::CreateText {
            key,
            text: text.to_string(),
        });
        self.append(parent, key);
        key
    }

    fn append(&mut self, parent: PatchKey, child: PatchKey) {
        self.patches.push(DomPatch::AppendChild { parent, child });
    }

    /// Root, header and empty content container, mounted into the body.
    pub fn shell(&mut self, layout: &PanelLayout) -> PanelShell {
        let root = self.element("div", root_attributes(self.config, layout));

        let header = self.element("div", attrs([("class", "zenn-toc-header".into())]));
        let title = self.element("h3", attrs([("class", "zenn-toc-title".into())]));
        let title_text = self.config.labels.title.clone();
        self.text(title, &title_text);
        self.append(header, title);

        let toggle = self.keys.alloc();
        self.patches.push(DomPatch::CreateElement {
            key: toggle,
            name: Arc::from("button"),
            attributes: toggle_attributes(self.config, toggle),
        });
        let glyph = toggle_glyph(self.config, layout.expanded).to_string();
        let toggle_label = self.text(toggle, &glyph);
        self.append(header, toggle);
        self.append(root, header);

        let content = self.element("div", attrs([("class", "zenn-toc-content".into())]));
        self.append(root, content);

        self.patches.push(DomPatch::MountToBody { key: root });
        PanelShell {
            root,
            toggle,
            toggle_label,
            content,
        }
    }

    /// Replace the content container's children with the rendered outline.
    pub fn body(&mut self, content: PatchKey, outline: &[OutlineNode], active: Option<&str>) -> PanelBody {
        self.patches.push(DomPatch::ClearChildren { key: content });
        let mut body = PanelBody::default();
        if outline.is_empty() {
            let empty = self.element("div", attrs([("class", "zenn-toc-empty".into())]));
            let label = self.config.labels.empty.clone();
            self.text(empty, &label);
            self.append(content, empty);
            return body;
        }
        let list = self.list(outline, 0, active, &mut body);
        self.append(content, list);
        body
    }

    fn list(
        &mut self,
        items: &[OutlineNode],
        depth: usize,
        active: Option<&str>,
        body: &mut PanelBody,
    ) -> PatchKey {
        let ul = self.element(
            "ul",
            attrs([("class", format!("zenn-toc-list zenn-toc-level-{depth}"))]),
        );
        for item in items {
            let li = self.element("li", attrs([("class", "zenn-toc-item".into())]));
            let anchor = &item.heading.id;
            let link = self.keys.alloc();
            self.patches.push(DomPatch::CreateElement {
                key: link,
                name: Arc::from("a"),
                attributes: link_attributes(anchor, link, active == Some(anchor.as_str())),
            });
            self.text(link, &item.heading.text);
            self.append(li, link);
            body.links.push(PanelLink {
                key: link,
                anchor: anchor.clone(),
                source: item.heading.source,
            });

            if !item.children.is_empty() {
                let nested = self.list(&item.children, depth + 1, active, body);
                self.append(li, nested);
            }
            self.append(ul, li);
        }
        ul
    }
}

pub fn root_attributes(config: &PanelConfig, layout: &PanelLayout) -> Attrs {
    attrs([
        ("id", config.dom_id.clone()),
        ("class", layout.class_list()),
        ("data-version", env!("CARGO_PKG_VERSION").to_string()),
        ("data-position", layout.position.as_str().to_string()),
    ])
}

pub fn toggle_attributes(config: &PanelConfig, key: PatchKey) -> Attrs {
    attrs([
        ("class", "zenn-toc-toggle".into()),
        ("title", config.labels.toggle_hint.clone()),
        (KEY_ATTR, key.to_string()),
    ])
}

pub fn toggle_glyph(config: &PanelConfig, expanded: bool) -> &str {
    if expanded {
        &config.labels.expanded_glyph
    } else {
        &config.labels.collapsed_glyph
    }
}

pub fn link_attributes(anchor: &str, key: PatchKey, active: bool) -> Attrs {
    let class = if active {
        "zenn-toc-link active"
    } else {
        "zenn-toc-link"
    };
    attrs([
        ("href", format!("#{anchor}")),
        ("class", class.to_string()),
        ("data-id", anchor.to_string()),
        (KEY_ATTR, key.to_string()),
    ])
}
