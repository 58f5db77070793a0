//! Single and parallel simulation execution.
//!
//! Every run builds its own [`bikeshare_core::scenario::Scenario`], so runs
//! share no state and can be spread over a rayon thread pool.

use bikeshare_core::scenario::build_scenario;
use bikeshare_core::telemetry::TimeSeries;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

/// Run one parameter set to its horizon and keep the sampled station levels.
pub fn run_single_simulation_with_series(
    param_set: &ParameterSet,
) -> Result<(SimulationResult, TimeSeries), ExperimentError> {
    let failed = |source| ExperimentError::Simulation {
        experiment_id: param_set.experiment_id.clone(),
        run_id: param_set.run_id,
        source,
    };
    let mut scenario = build_scenario(&param_set.scenario_params()).map_err(failed)?;
    let report = scenario.run().map_err(failed)?;
    let result = SimulationResult::from_run(param_set, &scenario, &report);
    debug!(
        run_id = param_set.run_id,
        seed = param_set.seed,
        service_level = result.service_level,
        "run finished"
    );
    Ok((result, scenario.time_series().clone()))
}

pub fn run_single_simulation(param_set: &ParameterSet) -> Result<SimulationResult, ExperimentError> {
    run_single_simulation_with_series(param_set).map(|(result, _)| result)
}

/// Run every set in parallel with a progress bar. Results keep the input order.
///
/// `num_threads` of `None` uses rayon's default pool size.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Like [`run_parallel_experiments`], with the progress bar optional. The
/// first failing run aborts the sweep.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    info!(runs = total, threads = pool.current_num_threads(), "starting sweep");
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }
    results
}
