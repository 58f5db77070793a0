//! Shared setup for tests and benchmarks.

use crate::config::RunConfig;
use crate::random::ReplayRandom;
use crate::rebalance::RebalanceConfig;
use crate::runner::Simulation;
use crate::scenario::{RouteSpec, ScenarioParams, StationSpec};
use crate::trip::TripConfig;

/// Empty simulation with the given horizon and the default seed.
///
/// # Panics
///
/// Panics if `horizon` is NaN.
pub fn simulation_with_horizon(horizon: f64) -> Simulation {
    Simulation::new(RunConfig::default().with_horizon(horizon))
        .expect("horizon is not NaN")
}

/// Empty simulation whose random source replays `draws`.
pub fn replay_simulation(horizon: f64, draws: Vec<f64>) -> Simulation {
    simulation_with_horizon(horizon).with_random_source(ReplayRandom::new(draws))
}

/// Two stations `A` and `B` with a single `A -> B` route at all times.
/// Rebalancing and monitoring are off and bikes never fail.
pub fn two_station_params(a: (u32, u32), b: (u32, u32), probability: f64) -> ScenarioParams {
    ScenarioParams::default()
        .with_stations(vec![
            StationSpec::new("A", a.0, a.1),
            StationSpec::new("B", b.0, b.1),
        ])
        .with_time_slots(Vec::new())
        .with_default_routes(vec![RouteSpec::new("A", "B", probability)])
        .with_trip(TripConfig {
            failure_prob: 0.0,
            ..TripConfig::default()
        })
        .with_rebalance(None)
        .with_monitor_interval(None)
}

/// The default four-station day with a different seed and rebalancing setting.
pub fn default_day(seed: u64, rebalance: Option<RebalanceConfig>) -> ScenarioParams {
    ScenarioParams::default()
        .with_seed(seed)
        .with_rebalance(rebalance)
}
