//! Trip generation: once per interval, one Bernoulli draw per route of the active matrix.

use tracing::trace;

use crate::demand::DemandProfile;
use crate::error::KernelResult;
use crate::process::{Process, ProcessContext, Step};
use crate::stats::update_stats;
use crate::trip::{TripConfig, TripProcess};

/// Minutes between generation rounds.
pub const DEFAULT_GENERATION_INTERVAL: f64 = 1.0;

pub struct TripGenerator {
    demand: Box<dyn DemandProfile>,
    trip: TripConfig,
    interval: f64,
}

impl TripGenerator {
    pub fn new(demand: impl DemandProfile + 'static, trip: TripConfig) -> Self {
        Self {
            demand: Box::new(demand),
            trip,
            interval: DEFAULT_GENERATION_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }
}

impl Process for TripGenerator {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        let now = ctx.now();
        let mut spawned = 0u64;
        for route in self.demand.active_matrix(now).routes() {
            if ctx.uniform(0.0, 1.0) < route.probability {
                ctx.spawn("trip", TripProcess::new(route.from, route.to, self.trip))?;
                spawned += 1;
            }
        }
        update_stats(ctx, |stats| stats.trips_requested += spawned);
        trace!(time = %now, spawned, "generated trips");
        Ok(Step::Timeout(self.interval))
    }
}
