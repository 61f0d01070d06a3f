//! `PendingQueue` — future emergencies keyed by call time.
//!
//! Scenarios can hold thousands of calls spread over days while only a
//! handful are due on any tick.  A `BTreeMap<NaiveDateTime, Vec<EmergencyId>>`
//! lets each clock advance drain just the elapsed prefix in O(log W), where
//! W is the number of distinct future timestamps.  Calls sharing a timestamp
//! keep their insertion order.

use std::collections::BTreeMap;

use ems_core::{EmergencyId, NaiveDateTime};

/// Emergencies that exist in the scenario but whose call time has not come.
#[derive(Default, Debug, Clone)]
pub struct PendingQueue {
    inner: BTreeMap<NaiveDateTime, Vec<EmergencyId>>,
    /// Cached total count for O(1) `len()`.
    total: usize,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `emergency` to be activated at `at`.
    pub fn push(&mut self, at: NaiveDateTime, emergency: EmergencyId) {
        self.inner.entry(at).or_default().push(emergency);
        self.total += 1;
    }

    /// Remove and return every emergency whose time is `<= now`, oldest first.
    pub fn drain_due(&mut self, now: NaiveDateTime) -> Vec<EmergencyId> {
        let mut due = Vec::new();
        while let Some(entry) = self.inner.first_entry() {
            if *entry.key() > now {
                break;
            }
            due.extend(entry.remove());
        }
        self.total -= due.len();
        due
    }

    /// The earliest queued call time, or `None` if empty.
    pub fn next_time(&self) -> Option<NaiveDateTime> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
