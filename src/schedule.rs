//! Cooperative timer queue.
//!
//! Stands in for the host's `setTimeout` / `clearTimeout`. Time is virtual:
//! a [`Duration`] since page ready that only moves when the driver calls
//! [`Scheduler::pop_due`] or [`Scheduler::advance_to`]. Timers due at the same
//! instant fire in the order they were scheduled.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// The work a timer performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Fallback visibility sweep over the tracked images.
    LazySweep,
    /// Gallery position indicator refresh.
    GalleryIndex,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((self.now + delay, id), task);
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&mut self, timer: TimerId) -> bool {
        let key = self.queue.keys().find(|(_, id)| *id == timer.0).copied();
        key.is_some_and(|k| self.queue.remove(&k).is_some())
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// When the earliest pending timer fires.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Remove the earliest timer due at or before `until`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let task = self.queue.remove(&(due, id))?;
        self.now = self.now.max(due);
        Some((TimerId(id), task))
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }
}
