use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::process::ProcessId;

/// Simulation time. Real-valued so durations can be fractional (minutes in the bike-share model).
///
/// Construction goes through the clock, which rejects NaN, so the total order below is sound.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VirtualTime(f64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl PartialEq for VirtualTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VirtualTime {}

impl PartialOrd for VirtualTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VirtualTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Insertion-order id; breaks ties between events due at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub due: VirtualTime,
    pub target: ProcessId,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (due, id).
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual clock plus the queue of pending wakeups.
///
/// Time only moves when an event is popped.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: VirtualTime,
    next_id: u64,
    events: BinaryHeap<Event>,
    cancelled: HashSet<EventId>,
}

impl SimulationClock {
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// Schedule `target` to resume `delay` time units from now.
    pub fn schedule(&mut self, delay: f64, target: ProcessId) -> KernelResult<EventId> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(KernelError::InvalidDelay { delay });
        }
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            id,
            due: VirtualTime(self.now.0 + delay),
            target,
        });
        Ok(id)
    }

    /// Remove the earliest pending event and advance `now` to its due time.
    pub fn pop_next(&mut self) -> KernelResult<Event> {
        loop {
            let event = self.events.pop().ok_or(KernelError::QueueEmpty)?;
            if self.cancelled.remove(&event.id) {
                continue;
            }
            debug_assert!(event.due >= self.now, "event due before current time");
            self.now = event.due;
            return Ok(event);
        }
    }

    /// Due time of the earliest live event, discarding cancelled ones at the head.
    pub fn next_event_time(&mut self) -> Option<VirtualTime> {
        while let Some(head) = self.events.peek() {
            if self.cancelled.contains(&head.id) {
                let id = head.id;
                self.events.pop();
                self.cancelled.remove(&id);
                continue;
            }
            return Some(head.due);
        }
        None
    }

    /// Number of live (not cancelled) pending events.
    pub fn len(&self) -> usize {
        self.events.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark a pending event as cancelled. Only valid for events that have not been popped.
    pub(crate) fn cancel(&mut self, id: EventId) {
        self.cancelled.insert(id);
    }
}
