//! Parallel parameter sweeps for the bike-share simulation.
//!
//! Each run is an independent simulation built from a [`ParameterSet`]; runs
//! share nothing, so a sweep fans out over a rayon thread pool and collects
//! one [`SimulationResult`] per set, in input order.
//!
//! # Quick Start
//!
//! ```no_run
//! use bikeshare_experiments::{
//!     export_to_csv, find_best_result_index, run_parallel_experiments, ParameterSpace,
//! };
//!
//! let space = ParameterSpace::grid()
//!     .failure_prob(vec![0.0, 0.1, 0.2])
//!     .rebalance_interval(vec![None, Some(10.0), Some(30.0)])
//!     .seeds(vec![1, 2, 3]);
//!
//! let results = run_parallel_experiments(space.generate(), None)?;
//! export_to_csv(&results, "sweep.csv")?;
//! let best = find_best_result_index(&results);
//! # Ok::<(), bikeshare_experiments::ExperimentError>(())
//! ```
//!
//! # Modules
//!
//! - [`parameters`]: grid search and random sampling over scenario parameters
//! - [`parameter_spaces`]: ready-made spaces
//! - [`runner`]: single and parallel execution
//! - [`metrics`]: per-run result extraction
//! - [`export`]: CSV / JSON output and ranking

pub mod error;
pub mod export;
pub mod metrics;
pub mod parameter_spaces;
pub mod parameters;
pub mod runner;

pub use error::ExperimentError;
pub use export::{
    export_time_series_csv, export_to_csv, export_to_json, find_best_parameters,
    find_best_result_index,
};
pub use metrics::SimulationResult;
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{
    run_parallel_experiments, run_parallel_experiments_with_progress, run_single_simulation,
    run_single_simulation_with_series,
};
