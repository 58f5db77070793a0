//! Periodic sampling of station levels into the reporting sinks.

use crate::container::ContainerId;
use crate::error::KernelResult;
use crate::process::{Process, ProcessContext, Step};

/// Records every station's bike count, labelled with the station name, each interval.
pub struct Monitor {
    stations: Vec<ContainerId>,
    interval: f64,
}

impl Monitor {
    pub fn new(stations: Vec<ContainerId>, interval: f64) -> Self {
        Self { stations, interval }
    }
}

impl Process for Monitor {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        for &station in &self.stations {
            let container = ctx.container(station)?;
            let name = container.name().to_string();
            let level = container.level();
            ctx.record(&name, f64::from(level));
        }
        Ok(Step::Timeout(self.interval))
    }
}
