//! Example: sweep failure probability and rebalancing over many seeds.
//!
//! Runs the failure sensitivity space in parallel, prints the best
//! configuration and writes `sweep_results.csv`, `sweep_results.json` and the
//! sampled station levels of the best run to `best_run_levels.csv`.
//!
//! Set `RUST_LOG=info` to see the sweep summary.

use bikeshare_experiments::{
    export_time_series_csv, export_to_csv, export_to_json, find_best_parameters,
    find_best_result_index, run_parallel_experiments, run_single_simulation_with_series,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Other spaces: rebalancing_space(), minimal_space().
    let space = bikeshare_experiments::parameter_spaces::failure_sensitivity_space();
    let parameter_sets = space.generate();
    println!("Generated {} parameter combinations", parameter_sets.len());

    let results = run_parallel_experiments(parameter_sets.clone(), None)?;
    println!("Completed {} simulations", results.len());

    let Some(best_idx) = find_best_result_index(&results) else {
        println!("No results to analyze");
        return Ok(());
    };
    let best = &results[best_idx];
    println!("\n=== Best Configuration ===");
    println!("Service level: {:.2}%", best.service_level * 100.0);
    println!("Trips requested: {}", best.trips_requested);
    println!("Unhappy customers: {}", best.unhappy_customers);
    println!("Bike failures: {}", best.bike_failures);
    println!("Bikes rebalanced: {}", best.bikes_rebalanced);
    println!("Avg fill ratio: {:.2}", best.avg_fill_ratio);

    if let Some(best_params) = find_best_parameters(&results, &parameter_sets) {
        println!("\n=== Best Parameters ===");
        println!("Failure probability: {}", best_params.failure_prob());
        match best_params.rebalance_interval() {
            Some(interval) => println!("Rebalancing every {interval} min"),
            None => println!("Rebalancing disabled"),
        }
        println!("Seed: {}", best_params.seed);

        let (_, series) = run_single_simulation_with_series(best_params)?;
        export_time_series_csv(&series, "best_run_levels.csv")?;
    }

    export_to_csv(&results, "sweep_results.csv")?;
    export_to_json(&results, "sweep_results.json")?;
    println!("\nResults written to sweep_results.csv and sweep_results.json");
    Ok(())
}
