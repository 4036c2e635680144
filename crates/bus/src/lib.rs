//! Everything a host can report back to the engine.
//!
//! The engine is single-threaded and cooperative: hosts queue `PageEvent`s
//! as timers fire and observers trigger, then drain them into the controller
//! one at a time. Events from independent channels are unordered relative to
//! each other; within one channel they keep arrival order.

use core_types::{ObserverId, TimerId};
use html::PatchKey;
use html::internal::Id;
use html::Node;
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    // Document lifecycle
    DomContentLoaded,

    // Navigation channels
    HistoryPushed,
    HistoryReplaced,
    PopState,
    LinkActivated {
        href: String,
    },

    // Scheduler
    TimerFired(TimerId),

    // Observers
    Mutations {
        observer: ObserverId,
        records: Vec<MutationRecord>,
    },
    Intersections {
        observer: ObserverId,
        entries: Vec<IntersectionEntry>,
    },

    // Window + panel UI
    Resized {
        width: f64,
    },
    PanelClicked {
        key: PatchKey,
    },
}

impl PageEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PageEvent::DomContentLoaded => "dom-content-loaded",
            PageEvent::HistoryPushed => "history-push",
            PageEvent::HistoryReplaced => "history-replace",
            PageEvent::PopState => "popstate",
            PageEvent::LinkActivated { .. } => "link",
            PageEvent::TimerFired(_) => "timer",
            PageEvent::Mutations { .. } => "mutations",
            PageEvent::Intersections { .. } => "intersections",
            PageEvent::Resized { .. } => "resize",
            PageEvent::PanelClicked { .. } => "panel-click",
        }
    }
}

/// One `childList` mutation. Added subtrees are snapshots taken when the
/// mutation was recorded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationRecord {
    pub target: Id,
    pub added: Vec<Node>,
    pub removed: Vec<Id>,
}

impl MutationRecord {
    pub fn added(target: Id, nodes: Vec<Node>) -> Self {
        Self {
            target,
            added: nodes,
            removed: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: Id,
    pub is_intersecting: bool,
}

/// FIFO of pending events for hosts that buffer before dispatching.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<PageEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PageEvent) {
        self.pending.push_back(event);
    }

    pub fn pop(&mut self) -> Option<PageEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop queued events matching `pred`; used when an observer is
    /// disconnected while its callbacks are still queued.
    pub fn purge(&mut self, mut pred: impl FnMut(&PageEvent) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| !pred(e));
        before - self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut q = EventQueue::new();
        q.push(PageEvent::HistoryPushed);
        q.push(PageEvent::PopState);
        assert_eq!(q.pop(), Some(PageEvent::HistoryPushed));
        assert_eq!(q.pop(), Some(PageEvent::PopState));
        assert!(q.pop().is_none());
    }

    #[test]
    fn purge_drops_only_matching_events() {
        let stale = ObserverId::from_raw(1);
        let mut q = EventQueue::new();
        q.push(PageEvent::Mutations {
            observer: stale,
            records: Vec::new(),
        });
        q.push(PageEvent::PopState);
        let dropped = q.purge(|e| matches!(e, PageEvent::Mutations { observer, .. } if *observer == stale));
        assert_eq!(dropped, 1);
        assert_eq!(q.len(), 1);
    }
}
