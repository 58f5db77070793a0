//! Metrics extracted from a finished run.

use bikeshare_core::runner::{RunReport, RunState};
use bikeshare_core::scenario::Scenario;
use serde::{Deserialize, Serialize};

use crate::parameters::ParameterSet;

/// Flat summary of one run, one row in CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub failure_prob: f64,
    pub demand_scale: f64,
    /// `None` when rebalancing was disabled.
    pub rebalance_interval: Option<f64>,

    pub state: RunState,
    pub steps: u64,
    pub final_time: f64,
    pub live_processes: usize,
    /// Processes still queued on a station when the run stopped.
    pub blocked_waiters: usize,

    pub trips_requested: u64,
    pub trips_started: u64,
    pub trips_completed: u64,
    pub trips_returned_to_origin: u64,
    pub unhappy_customers: u64,
    pub bike_failures: u64,
    pub repairs_completed: u64,
    pub bikes_rebalanced: u64,
    /// One minus unhappy customers over requested trips.
    pub service_level: f64,

    /// Bikes over docks across every sampled station level.
    pub avg_fill_ratio: f64,
    pub median_fill_ratio: f64,
    pub p90_fill_ratio: f64,
    /// Samples where a station had no bike.
    pub empty_station_samples: usize,
    /// Samples where a station had no free dock.
    pub full_station_samples: usize,
    pub bikes_docked_at_end: u32,
}

impl SimulationResult {
    pub fn from_run(param_set: &ParameterSet, scenario: &Scenario, report: &RunReport) -> Self {
        let stats = scenario.stats();
        let series = scenario.time_series();

        let mut ratios = Vec::new();
        let mut empty_station_samples = 0;
        let mut full_station_samples = 0;
        let mut bikes_docked_at_end = 0;
        for &id in &scenario.stations {
            let Ok(station) = scenario.simulation.container(id) else {
                continue;
            };
            bikes_docked_at_end += station.level();
            let capacity = f64::from(station.capacity());
            for sample in series.get(station.name()).unwrap_or_default() {
                if sample.value <= 0.0 {
                    empty_station_samples += 1;
                }
                if sample.value >= capacity {
                    full_station_samples += 1;
                }
                if capacity > 0.0 {
                    ratios.push(sample.value / capacity);
                }
            }
        }
        let (avg_fill_ratio, median_fill_ratio, p90_fill_ratio) = calculate_stats(&ratios);

        Self {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            seed: param_set.seed,
            failure_prob: param_set.failure_prob(),
            demand_scale: param_set.demand_scale(),
            rebalance_interval: param_set.rebalance_interval(),
            state: report.state,
            steps: report.steps,
            final_time: report.final_time.as_f64(),
            live_processes: report.live_processes,
            blocked_waiters: report.blocked.len(),
            trips_requested: stats.trips_requested,
            trips_started: stats.trips_started,
            trips_completed: stats.trips_completed,
            trips_returned_to_origin: stats.trips_returned_to_origin,
            unhappy_customers: stats.unhappy_customers,
            bike_failures: stats.bike_failures,
            repairs_completed: stats.repairs_completed,
            bikes_rebalanced: stats.bikes_rebalanced,
            service_level: stats.service_level(),
            avg_fill_ratio,
            median_fill_ratio,
            p90_fill_ratio,
            empty_station_samples,
            full_station_samples,
            bikes_docked_at_end,
        }
    }
}

/// Average, median and 90th percentile (nearest rank below). Zeros when empty.
fn calculate_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let avg = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p90_idx = ((n - 1) as f64 * 0.9).floor() as usize;
    (avg, median, sorted[p90_idx])
}
