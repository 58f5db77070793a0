//! Simulation runner: owns the world, advances the clock and dispatches processes.
//!
//! Each step pops the earliest pending event and resumes its target process.
//! The step a process returns is installed before the next event is popped:
//! a timeout schedules a wakeup, a queued request parks the process on its
//! container, and an immediately granted request resumes the same process
//! again within the same dispatch. Waiters released by a level change are
//! scheduled at the current time in release order.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::clock::{Event, SimulationClock, VirtualTime};
use crate::config::RunConfig;
use crate::container::{ContainerId, RequestKind, RequestOutcome, ResourceContainer, Waiter};
use crate::error::{KernelError, KernelResult};
use crate::process::{spawn_process, Process, ProcessContext, ProcessId, ProcessSlot, Step, Wake};
use crate::random::{RandomSource, RandomSourceResource, SeededRandom};
use crate::telemetry::{ReportSink, ReportSinks, TimeSeries};

/// Scheduler lifecycle. A run never goes back to `Idle`; work added after a
/// drain (a spawn, or a waiter released by a cancellation) makes it run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    /// Currently drained: the queue is empty or the next event is at or after
    /// the horizon. Not terminal; stepping resumes once new work is due.
    Drained,
}

/// A process still parked on a container when the run stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedWaiter {
    pub process: ProcessId,
    pub process_name: String,
    pub container: ContainerId,
    pub container_name: String,
    pub amount: u32,
    pub kind: RequestKind,
}

/// Summary returned by [`Simulation::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Events dispatched over the lifetime of the simulation.
    pub steps: u64,
    pub final_time: VirtualTime,
    pub state: RunState,
    pub live_processes: usize,
    pub blocked: Vec<BlockedWaiter>,
}

/// What the scheduler does with a process after installing its step.
enum Installed {
    /// Request granted on the spot; resume the same process again.
    Continue,
    Suspended(Wake),
    Finished,
}

pub struct Simulation {
    world: World,
    config: RunConfig,
    horizon: VirtualTime,
    state: RunState,
    containers: Vec<ContainerId>,
    steps: u64,
}

impl Simulation {
    pub fn new(config: RunConfig) -> KernelResult<Self> {
        if config.horizon.is_nan() {
            return Err(KernelError::InvalidHorizon {
                horizon: config.horizon,
            });
        }
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(RandomSourceResource(Box::new(SeededRandom::new(
            config.seed,
        ))));
        world.insert_resource(TimeSeries::default());
        world.insert_resource(ReportSinks::default());
        Ok(Self {
            world,
            config,
            horizon: VirtualTime::new(config.horizon),
            state: RunState::Idle,
            containers: Vec::new(),
            steps: 0,
        })
    }

    /// Replace the random source (builder form of [`Simulation::set_random_source`]).
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.set_random_source(source);
        self
    }

    pub fn set_random_source(&mut self, source: impl RandomSource + 'static) {
        self.world
            .insert_resource(RandomSourceResource(Box::new(source)));
    }

    /// Register a sink that receives every sample recorded from now on.
    pub fn add_report_sink(&mut self, sink: impl ReportSink + 'static) {
        self.world
            .resource_mut::<ReportSinks>()
            .0
            .push(Box::new(sink));
    }

    pub fn add_container(&mut self, container: ResourceContainer) -> ContainerId {
        let id = ContainerId::from(self.world.spawn(container).id());
        self.containers.push(id);
        id
    }

    /// Register a process whose first step runs at the current time.
    pub fn spawn<P: Process>(
        &mut self,
        name: impl Into<String>,
        process: P,
    ) -> KernelResult<ProcessId> {
        spawn_process(&mut self.world, name.into(), Box::new(process))
    }

    /// Stop a process. A pending timeout is cancelled; a queued request is
    /// withdrawn from its container and never served. A request that was
    /// already served but not yet resumed is handed back to the container,
    /// so the next waiter in line can take the units.
    pub fn cancel(&mut self, process: ProcessId) -> KernelResult<()> {
        let entity = process.entity();
        let (wake, name) = match self.world.get::<ProcessSlot>(entity) {
            Some(slot) => (slot.wake, slot.name.clone()),
            None => return Err(KernelError::UnknownProcess(process)),
        };
        match wake {
            Wake::Scheduled(event) => self.world.resource_mut::<SimulationClock>().cancel(event),
            Wake::Waiting(container) => {
                let released = self
                    .world
                    .get_mut::<ResourceContainer>(container.entity())
                    .and_then(|mut c| c.remove_waiter(process))
                    .unwrap_or_default();
                self.schedule_released(container, released)?;
            }
            Wake::Released {
                event,
                container,
                amount,
                kind,
            } => {
                self.world.resource_mut::<SimulationClock>().cancel(event);
                let released = self
                    .world
                    .get_mut::<ResourceContainer>(container.entity())
                    .map(|mut c| c.revoke(kind, amount))
                    .unwrap_or_default();
                self.schedule_released(container, released)?;
            }
            Wake::Running => {}
        }
        self.world.despawn(entity);
        debug!(process = %name, now = %self.now(), "cancelled");
        Ok(())
    }

    pub fn now(&self) -> VirtualTime {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn container(&self, id: ContainerId) -> KernelResult<&ResourceContainer> {
        self.world
            .get::<ResourceContainer>(id.entity())
            .ok_or(KernelError::UnknownContainer(id))
    }

    /// Containers in registration order.
    pub fn containers(&self) -> &[ContainerId] {
        &self.containers
    }

    pub fn is_alive(&self, process: ProcessId) -> bool {
        self.world.get::<ProcessSlot>(process.entity()).is_some()
    }

    pub fn live_processes(&self) -> usize {
        self.world
            .iter_entities()
            .filter(|entity| entity.contains::<ProcessSlot>())
            .count()
    }

    /// Every queued waiter, container by container in registration order, front first.
    pub fn blocked_waiters(&self) -> Vec<BlockedWaiter> {
        let mut blocked = Vec::new();
        for &id in &self.containers {
            let Some(container) = self.world.get::<ResourceContainer>(id.entity()) else {
                continue;
            };
            for waiter in container.waiters() {
                let process_name = self
                    .world
                    .get::<ProcessSlot>(waiter.process.entity())
                    .map(|slot| slot.name.clone())
                    .unwrap_or_default();
                blocked.push(BlockedWaiter {
                    process: waiter.process,
                    process_name,
                    container: id,
                    container_name: container.name().to_string(),
                    amount: waiter.amount,
                    kind: waiter.kind,
                });
            }
        }
        blocked
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Dispatch one event. Returns `false` once the run is drained.
    pub fn step(&mut self) -> KernelResult<bool> {
        self.step_with_hook(&mut |_: &World, _: &Event| {})
    }

    /// Step until drained.
    pub fn run(&mut self) -> KernelResult<RunReport> {
        self.run_with_hook(|_, _| {})
    }

    /// Step until drained, invoking `hook` after every dispatched event.
    pub fn run_with_hook<F>(&mut self, mut hook: F) -> KernelResult<RunReport>
    where
        F: FnMut(&World, &Event),
    {
        while self.step_with_hook(&mut hook)? {}
        let report = self.report();
        info!(
            steps = report.steps,
            final_time = %report.final_time,
            live_processes = report.live_processes,
            blocked = report.blocked.len(),
            "simulation drained"
        );
        Ok(report)
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            steps: self.steps,
            final_time: self.now(),
            state: self.state,
            live_processes: self.live_processes(),
            blocked: self.blocked_waiters(),
        }
    }

    fn step_with_hook<F>(&mut self, hook: &mut F) -> KernelResult<bool>
    where
        F: FnMut(&World, &Event),
    {
        let Some(event) = self.pop_due()? else {
            if self.state != RunState::Drained {
                self.state = RunState::Drained;
                debug!(now = %self.now(), "drained");
            }
            return Ok(false);
        };
        self.state = RunState::Running;
        self.dispatch(event)?;
        self.steps += 1;
        hook(&self.world, &event);
        Ok(true)
    }

    /// Pop the next event if it is due before the horizon. Later events stay queued.
    fn pop_due(&mut self) -> KernelResult<Option<Event>> {
        let horizon = self.horizon;
        let mut clock = self.world.resource_mut::<SimulationClock>();
        match clock.next_event_time() {
            Some(due) if due < horizon => clock.pop_next().map(Some),
            _ => Ok(None),
        }
    }

    fn dispatch(&mut self, event: Event) -> KernelResult<()> {
        let target = event.target;
        let entity = target.entity();
        let Some(mut slot) = self.world.get_mut::<ProcessSlot>(entity) else {
            trace!(?target, "event for finished process ignored");
            return Ok(());
        };
        let Some(mut body) = slot.body.take() else {
            return Ok(());
        };
        slot.wake = Wake::Running;
        let name = slot.name.clone();
        trace!(process = %name, time = %event.due, "resume");

        loop {
            let outcome = {
                let mut ctx = ProcessContext::new(&mut self.world, target);
                body.resume(&mut ctx)
            }
            .and_then(|step| self.install(target, step));

            match outcome {
                Ok(Installed::Continue) => continue,
                Ok(Installed::Suspended(wake)) => {
                    if let Some(mut slot) = self.world.get_mut::<ProcessSlot>(entity) {
                        slot.body = Some(body);
                        slot.wake = wake;
                    }
                    return Ok(());
                }
                Ok(Installed::Finished) => {
                    self.world.despawn(entity);
                    trace!(process = %name, "terminated");
                    return Ok(());
                }
                Err(source) => {
                    self.world.despawn(entity);
                    error!(process = %name, error = %source, "process step failed");
                    return Err(KernelError::ProcessFailed {
                        process: name,
                        source: Box::new(source),
                    });
                }
            }
        }
    }

    fn install(&mut self, process: ProcessId, step: Step) -> KernelResult<Installed> {
        match step {
            Step::Terminate => Ok(Installed::Finished),
            Step::Timeout(delay) => {
                let event = self
                    .world
                    .resource_mut::<SimulationClock>()
                    .schedule(delay, process)?;
                Ok(Installed::Suspended(Wake::Scheduled(event)))
            }
            Step::Request(request) => {
                let outcome = self
                    .world
                    .get_mut::<ResourceContainer>(request.container.entity())
                    .ok_or(KernelError::UnknownContainer(request.container))?
                    .request(process, request.kind, request.amount)?;
                match outcome {
                    RequestOutcome::Granted { released } => {
                        self.schedule_released(request.container, released)?;
                        Ok(Installed::Continue)
                    }
                    RequestOutcome::Queued => {
                        trace!(?process, kind = ?request.kind, amount = request.amount, "queued");
                        Ok(Installed::Suspended(Wake::Waiting(request.container)))
                    }
                }
            }
        }
    }

    fn schedule_released(
        &mut self,
        container: ContainerId,
        released: Vec<Waiter>,
    ) -> KernelResult<()> {
        for waiter in released {
            let event = self
                .world
                .resource_mut::<SimulationClock>()
                .schedule(0.0, waiter.process)?;
            if let Some(mut slot) = self.world.get_mut::<ProcessSlot>(waiter.process.entity()) {
                slot.wake = Wake::Released {
                    event,
                    container,
                    amount: waiter.amount,
                    kind: waiter.kind,
                };
            }
            trace!(process = ?waiter.process, "released");
        }
        Ok(())
    }
}
