//! Scenario setup: stations, demand, and the generator/rebalancer/monitor processes.
//!
//! Parameters are plain serde data that refer to stations by name; building a
//! scenario resolves the names to containers and registers every process.

mod build;
mod params;

pub use build::{build_scenario, Scenario};
pub use params::{
    RouteSpec, ScenarioParams, StationSpec, TimeSlotSpec, DEFAULT_MONITOR_INTERVAL,
};
