//! Content-readiness watcher.
//!
//! After an in-scope navigation the page renders its content asynchronously.
//! This watch observes the content region, waits for each mutation burst to
//! settle, and reports once a heading exists. It is bounded by a timeout so a
//! page that never grows headings does not keep an observer alive.

use crate::debounce::DebouncedTrigger;
use crate::timers::{TimerPurpose, TimerRegistry};
use app_api::{MutationDetail, PageHost};
use core_types::{ObserverId, TimerId};
use std::time::Duration;

#[derive(Debug)]
pub struct ReadinessWatch {
    observer: ObserverId,
    debounce: DebouncedTrigger<()>,
    timeout: Option<TimerId>,
}

impl ReadinessWatch {
    pub fn start(
        host: &mut dyn PageHost,
        timers: &mut TimerRegistry,
        debounce: Duration,
        timeout: Duration,
    ) -> Self {
        let observer = host.observe_content_mutations(MutationDetail::Signal);
        let timeout = timers.schedule(host, timeout, TimerPurpose::ReadinessTimeout);
        Self {
            observer,
            debounce: DebouncedTrigger::new(debounce, TimerPurpose::ReadinessDebounce),
            timeout: Some(timeout),
        }
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn on_mutations(&mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        self.debounce.signal(host, timers, |_| {});
    }

    /// True when `id` is this watch's settled debounce.
    pub fn settled(&mut self, id: TimerId) -> bool {
        self.debounce.fire(id).is_some()
    }

    pub fn is_timeout(&self, id: TimerId) -> bool {
        self.timeout == Some(id)
    }

    /// Release the observer and every pending timer.
    pub fn cancel(mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        host.disconnect(self.observer);
        self.debounce.cancel(host, timers);
        if let Some(id) = self.timeout.take() {
            timers.cancel(host, id);
        }
    }
}
