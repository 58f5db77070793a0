//! Bounded resource containers with blocking get/put and FIFO waiter release.
//!
//! A container is a counter in `[0, capacity]` (bikes docked at a station, free
//! slots in a pool). Requests that cannot be served immediately are queued in
//! arrival order; whenever the level changes the queue is scanned from the
//! front and every satisfiable waiter is released until the first one that is
//! not. A satisfiable waiter behind an unsatisfiable one keeps waiting.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::process::ProcessId;

/// Handle to a container entity inside a [`crate::runner::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(Entity);

impl ContainerId {
    pub fn entity(self) -> Entity {
        self.0
    }
}

impl From<Entity> for ContainerId {
    fn from(entity: Entity) -> Self {
        Self(entity)
    }
}

/// Direction of a resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Take units out (level decreases).
    Get,
    /// Return units (level increases).
    Put,
}

/// A process queued on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub process: ProcessId,
    pub amount: u32,
    pub kind: RequestKind,
}

/// Result of a get/put call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Served immediately. `released` are earlier waiters the level change unblocked,
    /// in release order; their amounts have already been applied.
    Granted { released: Vec<Waiter> },
    /// Not satisfiable now; the requester was appended to the waiter queue.
    Queued,
}

#[derive(Debug, Clone, Component)]
pub struct ResourceContainer {
    name: String,
    capacity: u32,
    level: u32,
    waiters: VecDeque<Waiter>,
}

impl ResourceContainer {
    pub fn new(name: impl Into<String>, capacity: u32, level: u32) -> KernelResult<Self> {
        let name = name.into();
        if capacity == 0 || level > capacity {
            return Err(KernelError::InvalidContainer {
                name,
                level,
                capacity,
            });
        }
        Ok(Self {
            name,
            capacity,
            level,
            waiters: VecDeque::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Units that can still be put before the container is full.
    pub fn free(&self) -> u32 {
        self.capacity - self.level
    }

    /// Queued waiters, front first.
    pub fn waiters(&self) -> impl Iterator<Item = &Waiter> + '_ {
        self.waiters.iter()
    }

    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    pub fn get(&mut self, requester: ProcessId, amount: u32) -> KernelResult<RequestOutcome> {
        self.request(requester, RequestKind::Get, amount)
    }

    pub fn put(&mut self, requester: ProcessId, amount: u32) -> KernelResult<RequestOutcome> {
        self.request(requester, RequestKind::Put, amount)
    }

    pub fn request(
        &mut self,
        requester: ProcessId,
        kind: RequestKind,
        amount: u32,
    ) -> KernelResult<RequestOutcome> {
        if amount == 0 || amount > self.capacity {
            return Err(KernelError::InvalidAmount {
                amount,
                capacity: self.capacity,
            });
        }
        if !self.is_satisfiable(kind, amount) {
            self.waiters.push_back(Waiter {
                process: requester,
                amount,
                kind,
            });
            return Ok(RequestOutcome::Queued);
        }
        self.apply(kind, amount);
        Ok(RequestOutcome::Granted {
            released: self.release_waiters(),
        })
    }

    /// Drop `process` from the waiter queue. Returns `None` if it was not queued,
    /// otherwise any waiters that became releasable because it left the front.
    pub fn remove_waiter(&mut self, process: ProcessId) -> Option<Vec<Waiter>> {
        let index = self.waiters.iter().position(|w| w.process == process)?;
        self.waiters.remove(index);
        Some(self.release_waiters())
    }

    /// Undo a grant whose holder will never resume, then release whoever that
    /// unblocks. The returned units are clamped to `0..=capacity`.
    pub fn revoke(&mut self, kind: RequestKind, amount: u32) -> Vec<Waiter> {
        match kind {
            RequestKind::Get => self.level += amount.min(self.free()),
            RequestKind::Put => self.level -= amount.min(self.level),
        }
        self.release_waiters()
    }

    fn is_satisfiable(&self, kind: RequestKind, amount: u32) -> bool {
        match kind {
            RequestKind::Get => self.level >= amount,
            RequestKind::Put => amount <= self.free(),
        }
    }

    fn apply(&mut self, kind: RequestKind, amount: u32) {
        match kind {
            RequestKind::Get => self.level -= amount,
            RequestKind::Put => self.level += amount,
        }
        debug_assert!(self.level <= self.capacity);
    }

    fn release_waiters(&mut self) -> Vec<Waiter> {
        let mut released = Vec::new();
        while let Some(front) = self.waiters.front().copied() {
            if !self.is_satisfiable(front.kind, front.amount) {
                break;
            }
            self.waiters.pop_front();
            self.apply(front.kind, front.amount);
            released.push(front);
        }
        released
    }
}
