//! Scroll spy: which heading is currently at the top of the viewport.
//!
//! Intersection targets cannot be swapped in place, so a spy is created for
//! one heading set and disposed whenever that set changes.

use bus::IntersectionEntry;
use core_types::{ObserverId, RootMargin};
use app_api::PageHost;
use html::internal::Id;
use toc::HeadingRecord;

#[derive(Debug)]
pub struct ScrollSpy {
    observer: ObserverId,
    targets: Vec<(Id, String)>,
}

impl ScrollSpy {
    /// `None` when there is nothing to observe.
    pub fn start(host: &mut dyn PageHost, headings: &[HeadingRecord], margin: RootMargin) -> Option<Self> {
        let targets = headings
            .iter()
            .filter(|h| h.source != Id::UNASSIGNED)
            .map(|h| (h.source, h.id.clone()))
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return None;
        }
        let ids = targets.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        let observer = host.observe_intersections(&ids, margin);
        log::debug!(target: "toc.spy", "observing {} headings", targets.len());
        Some(Self { observer, targets })
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    /// Anchor to highlight for a batch; the last intersecting entry wins.
    pub fn active_anchor(&self, entries: &[IntersectionEntry]) -> Option<&str> {
        entries
            .iter()
            .filter(|e| e.is_intersecting)
            .filter_map(|e| self.anchor_for(e.target))
            .last()
    }

    pub fn anchor_for(&self, target: Id) -> Option<&str> {
        self.targets
            .iter()
            .find(|(id, _)| *id == target)
            .map(|(_, anchor)| anchor.as_str())
    }

    pub fn dispose(self, host: &mut dyn PageHost) {
        host.disconnect(self.observer);
    }
}
