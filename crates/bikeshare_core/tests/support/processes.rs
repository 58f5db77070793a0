use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use bikeshare_core::config::RunConfig;
use bikeshare_core::container::ContainerId;
use bikeshare_core::error::KernelResult;
use bikeshare_core::process::{Process, ProcessContext, Step};
use bikeshare_core::runner::Simulation;

/// `(label, time)` for every resumption of a traced process, in dispatch order.
#[derive(Debug, Default, Resource)]
pub struct Trace(pub Vec<(String, f64)>);

impl Trace {
    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn times_of(&self, label: &str) -> Vec<f64> {
        self.0
            .iter()
            .filter(|(l, _)| l == label)
            .map(|(_, t)| *t)
            .collect()
    }
}

/// Simulation with an empty [`Trace`] resource.
pub fn traced_simulation(horizon: f64) -> Simulation {
    let mut sim = Simulation::new(RunConfig::default().with_horizon(horizon)).expect("simulation");
    sim.world_mut().insert_resource(Trace::default());
    sim
}

pub fn trace(sim: &Simulation) -> &Trace {
    sim.world().resource::<Trace>()
}

fn log(ctx: &mut ProcessContext<'_>, label: &str) {
    let now = ctx.now().as_f64();
    if let Some(mut trace) = ctx.resource_mut::<Trace>() {
        trace.0.push((label.to_string(), now));
    }
}

/// Returns a fixed list of steps, logging each resumption, then terminates.
pub struct Scripted {
    label: String,
    steps: VecDeque<Step>,
}

impl Scripted {
    pub fn new(label: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            label: label.into(),
            steps: steps.into(),
        }
    }
}

impl Process for Scripted {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        log(ctx, &self.label);
        Ok(self.steps.pop_front().unwrap_or(Step::Terminate))
    }
}

/// Spawns a child on its first step and keeps running without suspending.
pub struct Parent {
    child_steps: Option<Vec<Step>>,
}

impl Parent {
    pub fn new(child_steps: Vec<Step>) -> Self {
        Self {
            child_steps: Some(child_steps),
        }
    }
}

impl Process for Parent {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        log(ctx, "parent");
        match self.child_steps.take() {
            Some(steps) => {
                ctx.spawn("child", Scripted::new("child", steps))?;
                log(ctx, "parent after spawn");
                Ok(Step::Timeout(1.0))
            }
            None => Ok(Step::Terminate),
        }
    }
}

/// Logs the level of `container` every time it resumes.
pub struct LevelProbe {
    label: String,
    container: ContainerId,
    steps: VecDeque<Step>,
}

impl LevelProbe {
    pub fn new(label: impl Into<String>, container: ContainerId, steps: Vec<Step>) -> Self {
        Self {
            label: label.into(),
            container,
            steps: steps.into(),
        }
    }
}

impl Process for LevelProbe {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        let level = ctx.level(self.container)?;
        log(ctx, &format!("{}={}", self.label, level));
        Ok(self.steps.pop_front().unwrap_or(Step::Terminate))
    }
}
