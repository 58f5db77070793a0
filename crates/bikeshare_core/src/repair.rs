//! Bike repair: marks a bike as under maintenance at a station for a fixed time.

use tracing::debug;

use crate::container::ContainerId;
use crate::error::KernelResult;
use crate::process::{Process, ProcessContext, Step};
use crate::station::{station_name, Station};
use crate::stats::update_stats;

pub struct RepairProcess {
    station: ContainerId,
    duration: f64,
    started: bool,
}

impl RepairProcess {
    pub fn new(station: ContainerId, duration: f64) -> Self {
        Self {
            station,
            duration,
            started: false,
        }
    }
}

impl Process for RepairProcess {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        if !self.started {
            self.started = true;
            if let Some(mut station) = ctx.component_mut::<Station>(self.station.entity()) {
                station.bikes_under_maintenance += 1;
            }
            debug!(time = %ctx.now(), station = station_name(ctx, self.station), "bike under maintenance");
            return Ok(Step::Timeout(self.duration));
        }

        if let Some(mut station) = ctx.component_mut::<Station>(self.station.entity()) {
            station.bikes_under_maintenance = station.bikes_under_maintenance.saturating_sub(1);
        }
        update_stats(ctx, |stats| stats.repairs_completed += 1);
        debug!(time = %ctx.now(), station = station_name(ctx, self.station), "bike repaired");
        Ok(Step::Terminate)
    }
}
