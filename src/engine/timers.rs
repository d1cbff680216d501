//! Timer Queue - Virtual clock for delayed self-dispatch.
//!
//! Components schedule actions to themselves after a delay (the transition
//! primitive's enter and exit timeouts). Time is virtual: the embedding
//! environment advances the clock through the runtime, which pops due timers
//! in deadline order and delivers their actions.
//!
//! # Pattern
//!
//! - Each timer has one owner instance
//! - Removing an instance cancels every timer it owns
//! - Timers with equal deadlines fire in scheduling order

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::registry::InstanceId;

// =============================================================================
// Timer Handles
// =============================================================================

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A timer that came due.
pub(crate) struct FiredTimer {
    pub id: TimerId,
    pub owner: InstanceId,
    pub action: Box<dyn Any>,
}

struct PendingTimer {
    owner: InstanceId,
    action: Box<dyn Any>,
}

// =============================================================================
// Timer Queue
// =============================================================================

/// Deadline-ordered timer queue on a virtual clock.
#[derive(Default)]
pub struct Timers {
    now: u64,
    next_id: u64,
    queue: BTreeMap<(u64, TimerId), PendingTimer>,
    deadlines: HashMap<TimerId, u64>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of timers still waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of pending timers owned by `owner`.
    pub fn pending_for(&self, owner: InstanceId) -> usize {
        self.queue.values().filter(|t| t.owner == owner).count()
    }

    /// Schedule `action` for `owner` after `delay` time units.
    pub(crate) fn schedule(&mut self, owner: InstanceId, delay: u64, action: Box<dyn Any>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, id), PendingTimer { owner, action });
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every timer owned by `owner`. Returns how many were cancelled.
    pub(crate) fn cancel_owner(&mut self, owner: InstanceId) -> usize {
        let ids: Vec<TimerId> = self
            .queue
            .iter()
            .filter(|(_, timer)| timer.owner == owner)
            .map(|((_, id), _)| *id)
            .collect();

        for id in &ids {
            self.cancel(*id);
        }
        ids.len()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its deadline.
    pub(crate) fn pop_due(&mut self, until: u64) -> Option<FiredTimer> {
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > until {
            return None;
        }
        self.take(id)
    }

    /// Ids of all pending timers in firing order.
    pub(crate) fn pending_ids(&self) -> Vec<TimerId> {
        self.queue.keys().map(|(_, id)| *id).collect()
    }

    /// Remove a specific timer and move the clock forward to its deadline.
    pub(crate) fn take(&mut self, id: TimerId) -> Option<FiredTimer> {
        let deadline = self.deadlines.remove(&id)?;
        let timer = self.queue.remove(&(deadline, id))?;
        self.advance_to(deadline);
        Some(FiredTimer {
            id,
            owner: timer.owner,
            action: timer.action,
        })
    }

    /// Move the clock forward. The clock never runs backwards.
    pub(crate) fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("now", &self.now)
            .field("pending", &self.queue.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
