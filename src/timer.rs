//! A pausable registry of deferred actions.
//!
//! Timers are plain data: an action tag plus the time left before it fires. The registry owns every
//! pending entry so that a global pause can freeze all of them at once, and it is advanced explicitly
//! by the logic tick rather than by wall-clock time.

use std::time::Duration;

use tracing::trace;

/// Handle to a scheduled entry. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// An entry that expired during [`TimerRegistry::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<A> {
    pub id: TimerId,
    pub action: A,
    /// How far past its deadline the entry was when the advance ended.
    pub overdue: Duration,
}

#[derive(Debug)]
struct Entry<A> {
    id: TimerId,
    action: A,
    remaining: Duration,
    /// Paused through [`TimerRegistry::pause`].
    paused: bool,
    /// Held by [`TimerRegistry::pause_all`].
    held: bool,
}

impl<A> Entry<A> {
    fn is_running(&self) -> bool {
        !self.paused && !self.held
    }
}

/// Registry of pending timers, kept in insertion order.
#[derive(Debug)]
pub struct TimerRegistry<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
    elapsed: Duration,
}

impl<A> Default for TimerRegistry<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl<A> TimerRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire once `delay` of unpaused time has been advanced.
    pub fn schedule(&mut self, delay: Duration, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            action,
            remaining: delay,
            paused: false,
            held: false,
        });
        trace!(id = id.0, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        id
    }

    fn entry_mut(&mut self, id: TimerId) -> Option<&mut Entry<A>> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Stops the countdown, keeping the time left. Returns false if the handle is no longer pending.
    pub fn pause(&mut self, id: TimerId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.paused = true;
                true
            }
            None => false,
        }
    }

    /// Restarts a paused countdown with exactly the time that was left.
    ///
    /// Resuming a running, fired or cancelled handle does nothing.
    pub fn resume(&mut self, id: TimerId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.paused = false;
                true
            }
            None => false,
        }
    }

    /// Removes a pending entry for good, returning its action.
    pub fn cancel(&mut self, id: TimerId) -> Option<A> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        trace!(id = id.0, "Timer cancelled");
        Some(self.entries.remove(index).action)
    }

    /// Holds every pending entry. Entries paused individually stay paused after [`Self::resume_all`].
    pub fn pause_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.held = true;
        }
    }

    /// Releases the hold placed by [`Self::pause_all`].
    pub fn resume_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.held = false;
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn is_paused(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id && !entry.is_running())
    }

    /// Time left before the entry fires, if it is still pending.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.entries.iter().find(|entry| entry.id == id).map(|entry| entry.remaining)
    }

    /// Total time advanced since the registry was created, paused or not.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Advances every running entry by `dt`, returning the ones that expired.
    ///
    /// Expired entries are ordered by deadline; entries sharing a deadline keep insertion order.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired<A>> {
        self.elapsed += dt;

        let mut fired = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &mut self.entries[index];
            if entry.is_running() {
                if entry.remaining <= dt {
                    let entry = self.entries.remove(index);
                    fired.push(Fired {
                        id: entry.id,
                        overdue: dt - entry.remaining,
                        action: entry.action,
                    });
                    continue;
                }
                entry.remaining -= dt;
            }
            index += 1;
        }

        // Earlier deadlines are further overdue; the sort is stable so ties keep insertion order.
        fired.sort_by(|a, b| b.overdue.cmp(&a.overdue));
        fired
    }
}
