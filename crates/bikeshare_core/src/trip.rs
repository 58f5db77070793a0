//! A single customer trip between two stations.
//!
//! The customer takes a bike at the origin (or leaves unhappy if none is
//! docked), rides for a uniform duration and docks at the destination. A bike
//! may break down on the way; it is then repaired at the origin and the trip
//! only continues if the origin still has a bike. If the destination is full
//! the customer rides back and docks at the origin instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UniformRange;
use crate::container::ContainerId;
use crate::error::KernelResult;
use crate::process::{Process, ProcessContext, Step};
use crate::repair::RepairProcess;
use crate::station::station_name;
use crate::stats::update_stats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    /// Chance that the bike breaks down during a ride.
    pub failure_prob: f64,
    pub ride_time: UniformRange,
    pub repair_time: UniformRange,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            failure_prob: 0.1,
            ride_time: UniformRange::new(2.0, 5.0),
            repair_time: UniformRange::new(3.0, 7.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TripState {
    Requested,
    Unlocking,
    Riding,
    RepairStarting,
    AwaitingRepair,
    Docking,
    RidingBack,
    DockingAtOrigin,
}

pub struct TripProcess {
    from: ContainerId,
    to: ContainerId,
    config: TripConfig,
    ride_time: f64,
    repair_time: f64,
    state: TripState,
}

impl TripProcess {
    pub fn new(from: ContainerId, to: ContainerId, config: TripConfig) -> Self {
        Self {
            from,
            to,
            config,
            ride_time: 0.0,
            repair_time: 0.0,
            state: TripState::Requested,
        }
    }

    fn unhappy(&self, ctx: &mut ProcessContext<'_>, reason: &'static str) -> KernelResult<Step> {
        update_stats(ctx, |stats| stats.unhappy_customers += 1);
        debug!(
            time = %ctx.now(),
            from = station_name(ctx, self.from),
            to = station_name(ctx, self.to),
            reason,
            "unhappy customer"
        );
        Ok(Step::Terminate)
    }

    fn dock(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        if ctx.level(self.to)? < ctx.capacity(self.to)? {
            self.state = TripState::Docking;
            return Ok(Step::put(self.to, 1));
        }
        debug!(
            time = %ctx.now(),
            station = station_name(ctx, self.to),
            origin = station_name(ctx, self.from),
            "no docks available, riding back"
        );
        self.state = TripState::RidingBack;
        Ok(Step::Timeout(self.ride_time))
    }
}

impl Process for TripProcess {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        match self.state {
            TripState::Requested => {
                if ctx.level(self.from)? == 0 {
                    return self.unhappy(ctx, "no bikes available");
                }
                self.state = TripState::Unlocking;
                Ok(Step::get(self.from, 1))
            }
            TripState::Unlocking => {
                update_stats(ctx, |stats| stats.trips_started += 1);
                debug!(time = %ctx.now(), station = station_name(ctx, self.from), "bike taken");
                self.ride_time = self.config.ride_time.sample(ctx);
                self.state = TripState::Riding;
                Ok(Step::Timeout(self.ride_time))
            }
            TripState::Riding => {
                if ctx.uniform(0.0, 1.0) >= self.config.failure_prob {
                    return self.dock(ctx);
                }
                update_stats(ctx, |stats| stats.bike_failures += 1);
                debug!(time = %ctx.now(), to = station_name(ctx, self.to), "bike failed during the trip");
                let repair_time = self.config.repair_time.sample(ctx);
                ctx.spawn("repair", RepairProcess::new(self.from, repair_time))?;
                self.state = TripState::RepairStarting;
                self.repair_time = repair_time;
                // Let the repair take its first step so it also finishes before we wake up.
                Ok(Step::Timeout(0.0))
            }
            TripState::RepairStarting => {
                self.state = TripState::AwaitingRepair;
                Ok(Step::Timeout(self.repair_time))
            }
            TripState::AwaitingRepair => {
                if ctx.level(self.from)? == 0 {
                    return self.unhappy(ctx, "no bikes available after failure");
                }
                self.dock(ctx)
            }
            TripState::Docking => {
                update_stats(ctx, |stats| stats.trips_completed += 1);
                debug!(time = %ctx.now(), station = station_name(ctx, self.to), "bike returned");
                Ok(Step::Terminate)
            }
            TripState::RidingBack => {
                if ctx.level(self.from)? < ctx.capacity(self.from)? {
                    self.state = TripState::DockingAtOrigin;
                    return Ok(Step::put(self.from, 1));
                }
                self.unhappy(ctx, "no space to return the bike")
            }
            TripState::DockingAtOrigin => {
                update_stats(ctx, |stats| stats.trips_returned_to_origin += 1);
                debug!(time = %ctx.now(), station = station_name(ctx, self.from), "bike returned to origin");
                Ok(Step::Terminate)
            }
        }
    }
}
