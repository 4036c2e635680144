//! Engine-side bookkeeping for host timers.
//!
//! The host only knows timer ids; this registry remembers what each id is
//! for, so a `TimerFired` event can be routed. Ids that were cancelled or
//! already fired resolve to nothing and are dropped as stale.

use app_api::PageHost;
use core_types::TimerId;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Deferred URL comparison after a history, popstate or link signal.
    UrlRecheck,
    Poll,
    Startup,
    Fallback,
    ReadinessDebounce,
    ReadinessTimeout,
    StandingDebounce,
    ResizeDebounce,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    purpose: TimerPurpose,
    repeating: bool,
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    live: HashMap<TimerId, Entry>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, host: &mut dyn PageHost, delay: Duration, purpose: TimerPurpose) -> TimerId {
        let id = host.set_timeout(delay);
        self.live.insert(id, Entry { purpose, repeating: false });
        id
    }

    pub fn repeat(&mut self, host: &mut dyn PageHost, period: Duration, purpose: TimerPurpose) -> TimerId {
        let id = host.set_interval(period);
        self.live.insert(id, Entry { purpose, repeating: true });
        id
    }

    pub fn cancel(&mut self, host: &mut dyn PageHost, id: TimerId) {
        if self.live.remove(&id).is_some() {
            host.clear_timer(id);
        }
    }

    /// Route a fired timer. One-shot entries are consumed.
    pub fn resolve(&mut self, id: TimerId) -> Option<TimerPurpose> {
        let entry = *self.live.get(&id)?;
        if !entry.repeating {
            self.live.remove(&id);
        }
        Some(entry.purpose)
    }

    pub fn pending(&self, purpose: TimerPurpose) -> usize {
        self.live.values().filter(|e| e.purpose == purpose).count()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_sim::SimPage;

    #[test]
    fn one_shots_resolve_once_and_intervals_persist() {
        let mut page = SimPage::new("https://zenn.dev/alice/scraps/abc");
        let mut timers = TimerRegistry::new();
        let once = timers.schedule(&mut page, Duration::from_millis(10), TimerPurpose::UrlRecheck);
        let poll = timers.repeat(&mut page, Duration::from_millis(500), TimerPurpose::Poll);

        assert_eq!(timers.resolve(once), Some(TimerPurpose::UrlRecheck));
        assert_eq!(timers.resolve(once), None);
        assert_eq!(timers.resolve(poll), Some(TimerPurpose::Poll));
        assert_eq!(timers.resolve(poll), Some(TimerPurpose::Poll));
        assert_eq!(timers.pending(TimerPurpose::Poll), 1);
    }

    #[test]
    fn cancel_clears_host_timer() {
        let mut page = SimPage::new("https://zenn.dev/alice/scraps/abc");
        let mut timers = TimerRegistry::new();
        let id = timers.schedule(&mut page, Duration::from_millis(10), TimerPurpose::Fallback);
        assert_eq!(page.pending_timers(), 1);
        timers.cancel(&mut page, id);
        timers.cancel(&mut page, id);
        assert_eq!(page.pending_timers(), 0);
        assert_eq!(timers.resolve(id), None);
        assert_eq!(timers.len(), 0);
    }
}
