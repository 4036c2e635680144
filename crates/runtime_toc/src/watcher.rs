//! Standing mutation watcher for content that arrives after initialisation.

use crate::debounce::DebouncedTrigger;
use crate::timers::{TimerPurpose, TimerRegistry};
use app_api::{MutationDetail, PageHost};
use core_types::{ObserverId, TimerId};
use std::time::Duration;

#[derive(Debug)]
pub struct StandingWatcher {
    observer: ObserverId,
    /// OR of "a batch added a heading" across the current debounce window.
    debounce: DebouncedTrigger<bool>,
}

impl StandingWatcher {
    pub fn start(host: &mut dyn PageHost, debounce: Duration) -> Self {
        Self {
            observer: host.observe_content_mutations(MutationDetail::AddedNodes),
            debounce: DebouncedTrigger::new(debounce, TimerPurpose::StandingDebounce),
        }
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn on_batch(&mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry, added_heading: bool) {
        self.debounce.signal(host, timers, |acc| *acc |= added_heading);
    }

    /// `Some(true)` when the settled window saw new headings.
    pub fn settled(&mut self, id: TimerId) -> Option<bool> {
        self.debounce.fire(id)
    }

    pub fn stop(mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        host.disconnect(self.observer);
        self.debounce.cancel(host, timers);
    }
}
