//! Deterministic timer queue.
//!
//! The queue keeps its own virtual clock, measured as a [`Duration`] since
//! the queue was created. It never sleeps and owns no threads: the driver
//! moves the clock forward with [`TimerQueue::pop_due`] and dispatches
//! whatever comes out. The CLI maps the virtual clock onto a tokio
//! `Instant`; tests advance it by hand.
//!
//! Cancelled timers are removed immediately, so a cancelled handle can
//! never be returned by `pop_due`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a scheduled timer. Ids are never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    deadline: Duration,
    /// `Some` for repeating timers.
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.insert(delay, None)
    }

    /// Fire every `period`, first one `period` from now.
    ///
    /// A zero period is clamped to one millisecond.
    pub fn schedule_repeating(&mut self, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(period, Some(period))
    }

    /// Remove a timer. Returns false if it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Earliest pending deadline, in virtual time.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline, so callbacks that schedule
    /// new timers measure from the moment the timer was due, not from
    /// `until`. Repeating timers are re-armed before they are returned.
    /// Ties are broken by scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;

        let deadline = self.entries[pos].deadline;
        self.now = self.now.max(deadline);
        let id = self.entries[pos].id;
        match self.entries[pos].period {
            Some(period) => self.entries[pos].deadline = deadline + period,
            None => {
                self.entries.swap_remove(pos);
            }
        }
        Some(id)
    }

    /// Move the clock to `until` once nothing more is due. The clock never
    /// goes backwards.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: self.now + delay,
            period,
        });
        id
    }
}
