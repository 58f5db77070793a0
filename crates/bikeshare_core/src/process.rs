//! Processes: cooperatively scheduled state machines that suspend by returning a [`Step`].
//!
//! A process never blocks inside [`Process::resume`]. Each call runs one atomic
//! step and names the condition under which it wants to run next: a timeout,
//! a resource request, or termination. Spawning another process does not
//! suspend the caller.

use bevy_ecs::prelude::{Component, Entity, Mut, Resource, World};
use tracing::debug;

use crate::clock::{EventId, SimulationClock, VirtualTime};
use crate::container::{ContainerId, RequestKind, ResourceContainer};
use crate::error::{KernelError, KernelResult};
use crate::random::RandomSourceResource;
use crate::telemetry::{ReportSinks, TimeSeries};

/// Handle to a live process. Stale once the process terminates or is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(Entity);

impl ProcessId {
    pub fn entity(self) -> Entity {
        self.0
    }
}

impl From<Entity> for ProcessId {
    fn from(entity: Entity) -> Self {
        Self(entity)
    }
}

/// A request for `amount` units of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    pub container: ContainerId,
    pub amount: u32,
    pub kind: RequestKind,
}

/// How a step ends. These are the only suspension points a process has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// No more work; the process is removed.
    Terminate,
    /// Resume after `delay` time units.
    Timeout(f64),
    /// Resume once the request has been served. An immediately satisfiable
    /// request continues the process without suspending it.
    Request(ResourceRequest),
}

impl Step {
    pub fn get(container: ContainerId, amount: u32) -> Self {
        Step::Request(ResourceRequest {
            container,
            amount,
            kind: RequestKind::Get,
        })
    }

    pub fn put(container: ContainerId, amount: u32) -> Self {
        Step::Request(ResourceRequest {
            container,
            amount,
            kind: RequestKind::Put,
        })
    }
}

/// A unit of sequential logic driven by the scheduler.
///
/// Implementors keep their own position (an enum state is the usual shape) and
/// advance it on every call. `resume` is called once when the process starts,
/// again after each timeout elapses, and again after each request is served.
pub trait Process: Send + Sync + 'static {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step>;
}

impl Process for Box<dyn Process> {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        self.as_mut().resume(ctx)
    }
}

/// What a process is currently suspended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    /// Inside a step (or between being popped and resumed).
    Running,
    Scheduled(EventId),
    Waiting(ContainerId),
    /// Request served by a level change; resumes at `event` holding the grant.
    Released {
        event: EventId,
        container: ContainerId,
        amount: u32,
        kind: RequestKind,
    },
}

/// Process entity storage. The body is taken out while its step runs.
#[derive(Component)]
pub(crate) struct ProcessSlot {
    pub(crate) name: String,
    pub(crate) body: Option<Box<dyn Process>>,
    pub(crate) wake: Wake,
}

/// Register a process and schedule its first step at the current time.
pub(crate) fn spawn_process(
    world: &mut World,
    name: String,
    body: Box<dyn Process>,
) -> KernelResult<ProcessId> {
    let entity = world
        .spawn(ProcessSlot {
            name,
            body: Some(body),
            wake: Wake::Running,
        })
        .id();
    let id = ProcessId(entity);
    let (event, now) = {
        let mut clock = world.resource_mut::<SimulationClock>();
        (clock.schedule(0.0, id)?, clock.now())
    };
    if let Some(mut slot) = world.get_mut::<ProcessSlot>(entity) {
        slot.wake = Wake::Scheduled(event);
        debug!(process = %slot.name, ?id, %now, "spawned");
    }
    Ok(id)
}

/// The view of the simulation a process gets while its step runs.
///
/// Simulation-wide application state lives in ECS resources (counters,
/// configuration) and components on container entities; processes reach it
/// through [`ProcessContext::resource_mut`] and [`ProcessContext::component_mut`].
pub struct ProcessContext<'w> {
    world: &'w mut World,
    id: ProcessId,
}

impl<'w> ProcessContext<'w> {
    pub(crate) fn new(world: &'w mut World, id: ProcessId) -> Self {
        Self { world, id }
    }

    /// The process whose step is running.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn now(&self) -> VirtualTime {
        self.world.resource::<SimulationClock>().now()
    }

    /// Draw from the simulation's random source.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.world
            .resource_mut::<RandomSourceResource>()
            .0
            .uniform(low, high)
    }

    pub fn container(&self, id: ContainerId) -> KernelResult<&ResourceContainer> {
        self.world
            .get::<ResourceContainer>(id.entity())
            .ok_or(KernelError::UnknownContainer(id))
    }

    pub fn level(&self, id: ContainerId) -> KernelResult<u32> {
        self.container(id).map(ResourceContainer::level)
    }

    pub fn capacity(&self, id: ContainerId) -> KernelResult<u32> {
        self.container(id).map(ResourceContainer::capacity)
    }

    /// Start another process at the current time. The caller keeps running.
    pub fn spawn<P: Process>(
        &mut self,
        name: impl Into<String>,
        process: P,
    ) -> KernelResult<ProcessId> {
        spawn_process(self.world, name.into(), Box::new(process))
    }

    /// Forward a `(label, now, value)` sample to the reporting sinks.
    pub fn record(&mut self, label: &str, value: f64) {
        let now = self.now();
        self.world
            .resource_mut::<TimeSeries>()
            .push(label, now, value);
        if let Some(mut sinks) = self.world.get_resource_mut::<ReportSinks>() {
            for sink in sinks.0.iter_mut() {
                sink.record(label, now, value);
            }
        }
    }

    pub fn resource<R: Resource>(&self) -> Option<&R> {
        self.world.get_resource::<R>()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Option<Mut<'_, R>> {
        self.world.get_resource_mut::<R>()
    }

    pub fn component<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.world.get::<C>(entity)
    }

    pub fn component_mut<C: Component>(&mut self, entity: Entity) -> Option<Mut<'_, C>> {
        self.world.get_mut::<C>(entity)
    }
}
