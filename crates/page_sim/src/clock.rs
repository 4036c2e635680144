//! Virtual clock and timer queue.
//!
//! Time only moves when the harness advances it. Entries due at the same
//! millisecond fire in scheduling order.

use crate::script::ScriptAction;
use core_types::TimerId;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
pub(crate) enum Scheduled {
    /// Timer requested by the engine.
    Engine { id: TimerId, period: Option<u64> },
    /// Page-side activity queued by the test (content arriving, app navigation).
    Script(ScriptAction),
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: u64,
    seq: u64,
    next_timer: u64,
    queue: BTreeMap<(u64, u64), Scheduled>,
    engine: HashMap<TimerId, (u64, u64)>,
}

impl Scheduler {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    pub fn timeout(&mut self, delay_ms: u64, period: Option<u64>) -> TimerId {
        self.next_timer += 1;
        let id = TimerId::from_raw(self.next_timer);
        let slot = self.push(self.now + delay_ms, Scheduled::Engine { id, period });
        self.engine.insert(id, slot);
        id
    }

    pub fn script(&mut self, delay_ms: u64, action: ScriptAction) {
        self.push(self.now + delay_ms, Scheduled::Script(action));
    }

    fn push(&mut self, due: u64, entry: Scheduled) -> (u64, u64) {
        self.seq += 1;
        let slot = (due, self.seq);
        self.queue.insert(slot, entry);
        slot
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.engine.remove(&id) {
            Some(slot) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest entry due at or before `limit`, re-arming intervals.
    pub fn pop_due(&mut self, limit: u64) -> Option<Scheduled> {
        let (&slot, _) = self.queue.iter().next().filter(|((due, _), _)| *due <= limit)?;
        let entry = self.queue.remove(&slot)?;
        self.now = self.now.max(slot.0);
        if let Scheduled::Engine { id, period } = &entry {
            match period {
                Some(period) => {
                    let next = self.push(slot.0 + (*period).max(1), entry.clone());
                    self.engine.insert(*id, next);
                }
                None => {
                    self.engine.remove(id);
                }
            }
        }
        Some(entry)
    }

    pub fn engine_timers(&self) -> usize {
        self.engine.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.engine.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_rearm_and_timeouts_do_not() {
        let mut s = Scheduler::default();
        let once = s.timeout(100, None);
        let every = s.timeout(50, Some(50));
        let mut fired = Vec::new();
        while let Some(Scheduled::Engine { id, .. }) = s.pop_due(200) {
            fired.push((s.now(), id));
        }
        assert_eq!(
            fired,
            vec![(50, every), (100, once), (100, every), (150, every), (200, every)]
        );
        assert!(!s.is_pending(once));
        assert!(s.is_pending(every));
    }

    #[test]
    fn cancel_removes_pending_entry() {
        let mut s = Scheduler::default();
        let id = s.timeout(10, None);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(s.pop_due(100).is_none());
    }
}
