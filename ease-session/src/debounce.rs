//! Deadline-based debouncing of deferred work.
//!
//! The session never sleeps or spawns; it records deadlines here and the
//! host drives [`Debouncer::take_due`] from its own clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    pending: Vec<(K, Instant)>,
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: PartialEq + Clone> Debouncer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `kind` at `now + delay`, replacing any pending run of the same kind.
    pub fn schedule(&mut self, kind: K, delay: Duration, now: Instant) {
        self.cancel(&kind);
        self.pending.push((kind, now + delay));
    }

    pub fn cancel(&mut self, kind: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| pending != kind);
        self.pending.len() != before
    }

    pub fn is_pending(&self, kind: &K) -> bool {
        self.pending.iter().any(|(pending, _)| pending == kind)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, deadline)| *deadline).min()
    }

    /// Remove and return every kind due at `now`, earliest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = Vec::new();
        self.pending.retain(|(kind, deadline)| {
            if *deadline <= now {
                due.push((kind.clone(), *deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(_, deadline)| *deadline);
        due.into_iter().map(|(kind, _)| kind).collect()
    }
}
