//! Debounced trigger: coalesce a burst of signals into one action.
//!
//! Every `signal` folds into an accumulator and restarts a single pending
//! timer (last write wins). When the timer fires, `fire` hands back the
//! accumulated value exactly once and resets. Fired ids that are not the
//! current pending timer are stale and yield nothing.

use crate::timers::{TimerPurpose, TimerRegistry};
use app_api::PageHost;
use core_types::TimerId;
use std::time::Duration;

#[derive(Debug)]
pub struct DebouncedTrigger<S> {
    delay: Duration,
    purpose: TimerPurpose,
    pending: Option<TimerId>,
    acc: S,
}

impl<S: Default> DebouncedTrigger<S> {
    pub fn new(delay: Duration, purpose: TimerPurpose) -> Self {
        Self {
            delay,
            purpose,
            pending: None,
            acc: S::default(),
        }
    }

    pub fn signal(
        &mut self,
        host: &mut dyn PageHost,
        timers: &mut TimerRegistry,
        fold: impl FnOnce(&mut S),
    ) {
        fold(&mut self.acc);
        if let Some(old) = self.pending.take() {
            timers.cancel(host, old);
        }
        self.pending = Some(timers.schedule(host, self.delay, self.purpose));
    }

    pub fn fire(&mut self, id: TimerId) -> Option<S> {
        if self.pending != Some(id) {
            return None;
        }
        self.pending = None;
        Some(std::mem::take(&mut self.acc))
    }

    pub fn cancel(&mut self, host: &mut dyn PageHost, timers: &mut TimerRegistry) {
        if let Some(id) = self.pending.take() {
            timers.cancel(host, id);
        }
        self.acc = S::default();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
