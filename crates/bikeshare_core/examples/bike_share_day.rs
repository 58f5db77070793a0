//! Run one simulated day of the four-station network and print the outcome.
//!
//! Run with: cargo run -p bikeshare_core --example bike_share_day
//! Set RUST_LOG=bikeshare_core=debug to see every trip.

use bikeshare_core::scenario::{build_scenario, ScenarioParams};
use bikeshare_core::telemetry::TracingSink;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let params = ScenarioParams::default().with_seed(123);
    let mut scenario = match build_scenario(&params) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("failed to build scenario: {err}");
            std::process::exit(1);
        }
    };
    scenario.simulation.add_report_sink(TracingSink);

    let report = match scenario.run() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            std::process::exit(1);
        }
    };
    let stats = scenario.stats();

    println!("--- Bike share day (seed {}) ---", params.run.seed);
    println!("Events dispatched: {}", report.steps);
    println!("Simulation time: {} min", report.final_time);
    println!("Trips requested: {}", stats.trips_requested);
    println!("Trips completed: {}", stats.trips_completed);
    println!("Returned to origin: {}", stats.trips_returned_to_origin);
    println!("Unhappy customers: {}", stats.unhappy_customers);
    println!("Bike failures: {} ({} repaired)", stats.bike_failures, stats.repairs_completed);
    println!("Bikes rebalanced: {}", stats.bikes_rebalanced);
    println!("Service level: {:.1}%", stats.service_level() * 100.0);
    println!("Blocked waiters at end: {}", report.blocked.len());

    println!("\nFinal station levels:");
    for (name, level) in scenario.levels() {
        let samples = scenario.time_series().get(&name).unwrap_or_default();
        let mean = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64
        };
        println!("  {name:<8} {level:>3} bikes (daily mean {mean:.1})");
    }
}
