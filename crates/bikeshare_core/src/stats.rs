//! Run-wide counters for the bike-share model.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::process::ProcessContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Resource, Serialize, Deserialize)]
pub struct BikeShareStats {
    /// Trips spawned by the generator.
    pub trips_requested: u64,
    /// Trips that got a bike at their origin.
    pub trips_started: u64,
    /// Trips that docked at their destination.
    pub trips_completed: u64,
    /// Trips that found the destination full and docked back at the origin.
    pub trips_returned_to_origin: u64,
    /// No bike at the origin, no bike after a breakdown, or nowhere to dock.
    pub unhappy_customers: u64,
    pub bike_failures: u64,
    pub repairs_completed: u64,
    pub bikes_rebalanced: u64,
}

impl BikeShareStats {
    /// Share of requested trips that did not leave an unhappy customer.
    pub fn service_level(&self) -> f64 {
        if self.trips_requested == 0 {
            return 1.0;
        }
        1.0 - self.unhappy_customers as f64 / self.trips_requested as f64
    }
}

/// Apply `update` to the stats resource if the simulation carries one.
pub(crate) fn update_stats(ctx: &mut ProcessContext<'_>, update: impl FnOnce(&mut BikeShareStats)) {
    if let Some(mut stats) = ctx.resource_mut::<BikeShareStats>() {
        update(&mut *stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_level_without_trips_is_full() {
        assert_eq!(BikeShareStats::default().service_level(), 1.0);
    }

    #[test]
    fn service_level_counts_unhappy_customers() {
        let stats = BikeShareStats {
            trips_requested: 10,
            unhappy_customers: 3,
            ..Default::default()
        };
        assert!((stats.service_level() - 0.7).abs() < 1e-12);
    }
}
