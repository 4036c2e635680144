//! The mounted panel: keys of its live nodes plus the state needed to patch
//! them in place.

use app_api::{HostError, PageHost};
use core_types::NodeRef;
use html::{DomPatch, PatchKey, PatchKeyAllocator};
use toc::panel::{PanelLink, link_attributes, root_attributes, toggle_glyph};
use toc::{OutlineNode, PanelBody, PanelConfig, PanelLayout, PanelRenderer, PanelSettings, PanelShell};

#[derive(Debug)]
pub struct LivePanel {
    shell: PanelShell,
    body: PanelBody,
    layout: PanelLayout,
    active: Option<String>,
}

impl LivePanel {
    /// Render and mount an empty shell.
    pub fn mount(
        host: &mut dyn PageHost,
        keys: &mut PatchKeyAllocator,
        config: &PanelConfig,
        layout: PanelLayout,
    ) -> Result<Self, HostError> {
        let mut renderer = PanelRenderer::new(config, keys);
        let shell = renderer.shell(&layout);
        host.apply_panel_patches(&renderer.finish())?;
        log::debug!(target: "toc.panel", "panel mounted ({})", layout.class_list());
        Ok(Self {
            shell,
            body: PanelBody::default(),
            layout,
            active: None,
        })
    }

    /// Replace the body with `outline`. The active anchor survives when it is
    /// still part of the new outline.
    pub fn render(
        &mut self,
        host: &mut dyn PageHost,
        keys: &mut PatchKeyAllocator,
        config: &PanelConfig,
        outline: &[OutlineNode],
    ) -> Result<(), HostError> {
        let mut renderer = PanelRenderer::new(config, keys);
        let body = renderer.body(self.shell.content, outline, self.active.as_deref());
        host.apply_panel_patches(&renderer.finish())?;
        if let Some(anchor) = &self.active
            && body.link_for_anchor(anchor).is_none()
        {
            self.active = None;
        }
        log::debug!(target: "toc.panel", "rendered {} entries", body.links.len());
        self.body = body;
        Ok(())
    }

    pub fn link(&self, key: PatchKey) -> Option<&PanelLink> {
        self.body.link(key)
    }

    pub fn is_toggle(&self, key: PatchKey) -> bool {
        key == self.shell.toggle || key == self.shell.toggle_label
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    /// Move the highlight to `anchor` and keep its entry visible inside the
    /// panel's scroll area.
    pub fn set_active(&mut self, host: &mut dyn PageHost, anchor: &str) -> Result<(), HostError> {
        if self.active.as_deref() == Some(anchor) {
            return Ok(());
        }
        let Some(next) = self.body.link_for_anchor(anchor).map(|l| l.key) else {
            return Ok(());
        };
        let mut patches = Vec::with_capacity(2);
        if let Some(prev) = self.active.as_deref().and_then(|a| self.body.link_for_anchor(a)) {
            patches.push(DomPatch::SetAttributes {
                key: prev.key,
                attributes: link_attributes(&prev.anchor, prev.key, false),
            });
        }
        patches.push(DomPatch::SetAttributes {
            key: next,
            attributes: link_attributes(anchor, next, true),
        });
        host.apply_panel_patches(&patches)?;
        self.active = Some(anchor.to_string());

        let viewport = host.rect(NodeRef::Panel(self.shell.content));
        let entry = host.rect(NodeRef::Panel(next));
        if let (Some(viewport), Some(entry)) = (viewport, entry)
            && entry.escapes(&viewport)
        {
            host.scroll_into_view(NodeRef::Panel(next));
        }
        Ok(())
    }

    /// Flip expanded/collapsed and persist the new settings.
    pub fn toggle(
        &mut self,
        host: &mut dyn PageHost,
        config: &PanelConfig,
        settings_key: &str,
    ) -> Result<PanelSettings, HostError> {
        self.layout.expanded = !self.layout.expanded;
        host.apply_panel_patches(&[
            DomPatch::SetAttributes {
                key: self.shell.root,
                attributes: root_attributes(config, &self.layout),
            },
            DomPatch::SetText {
                key: self.shell.toggle_label,
                text: toggle_glyph(config, self.layout.expanded).to_string(),
            },
        ])?;
        let settings = self.settings();
        settings.save(host.storage(), settings_key);
        log::debug!(target: "toc.panel", "expanded = {}", self.layout.expanded);
        Ok(settings)
    }

    pub fn set_compact(&mut self, host: &mut dyn PageHost, config: &PanelConfig, compact: bool) -> Result<(), HostError> {
        if self.layout.compact == compact {
            return Ok(());
        }
        self.layout.compact = compact;
        host.apply_panel_patches(&[DomPatch::SetAttributes {
            key: self.shell.root,
            attributes: root_attributes(config, &self.layout),
        }])
    }

    pub fn settings(&self) -> PanelSettings {
        PanelSettings {
            is_expanded: self.layout.expanded,
            position: self.layout.position,
        }
    }

    pub fn remove(self, host: &mut dyn PageHost) {
        if let Err(err) = host.apply_panel_patches(&[DomPatch::RemoveNode { key: self.shell.root }]) {
            log::debug!(target: "toc.panel", "panel already gone: {err}");
        }
    }
}
