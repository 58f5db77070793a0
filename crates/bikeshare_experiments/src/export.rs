//! Result export and ranking.
//!
//! Results go to CSV (one row per run) or JSON (an array of objects). Sampled
//! station levels from a single run can be written as long-format CSV.

use std::path::Path;

use bikeshare_core::telemetry::TimeSeries;

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Write one CSV row per result, with a header taken from the field names.
///
/// # Errors
///
/// [`ExperimentError::NoResults`] for an empty slice, otherwise I/O and CSV errors.
pub fn export_to_csv(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Write results as a pretty-printed JSON array. An empty slice writes `[]`.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Write every sample as a `label,time,value` row, labels in sorted order.
pub fn export_time_series_csv(
    series: &TimeSeries,
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_time_series_impl(series, file)
}

/// Index of the run with the highest service level; ties go to the run that
/// needed fewer rebalancing moves, then to the earliest run.
pub fn find_best_result_index(results: &[SimulationResult]) -> Option<usize> {
    ranking::find_best_index(results)
}

/// Parameter set of the best run. `None` when the slices are empty or differ in length.
pub fn find_best_parameters<'a>(
    results: &[SimulationResult],
    parameter_sets: &'a [ParameterSet],
) -> Option<&'a ParameterSet> {
    if results.len() != parameter_sets.len() {
        return None;
    }
    find_best_result_index(results).map(|idx| &parameter_sets[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::clock::VirtualTime;
    use bikeshare_core::runner::RunState;
    use bikeshare_core::scenario::ScenarioParams;
    use tempfile::NamedTempFile;

    pub(super) fn result(run_id: usize, service_level: f64, bikes_rebalanced: u64) -> SimulationResult {
        SimulationResult {
            experiment_id: "test".into(),
            run_id,
            seed: run_id as u64,
            failure_prob: 0.1,
            demand_scale: 1.0,
            rebalance_interval: Some(10.0),
            state: RunState::Drained,
            steps: 1000,
            final_time: 1439.0,
            live_processes: 12,
            blocked_waiters: 0,
            trips_requested: 100,
            trips_started: 90,
            trips_completed: 85,
            trips_returned_to_origin: 2,
            unhappy_customers: 12,
            bike_failures: 9,
            repairs_completed: 9,
            bikes_rebalanced,
            service_level,
            avg_fill_ratio: 0.5,
            median_fill_ratio: 0.5,
            p90_fill_ratio: 0.8,
            empty_station_samples: 30,
            full_station_samples: 4,
            bikes_docked_at_end: 30,
        }
    }

    #[test]
    fn json_round_trips_results() {
        let results = vec![result(0, 0.9, 3), result(1, 0.8, 0)];
        let file = NamedTempFile::new().unwrap();
        export_to_json(&results, file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let parsed: Vec<SimulationResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn csv_has_a_header_and_one_row_per_result() {
        let mut disabled = result(1, 0.8, 0);
        disabled.rebalance_interval = None;
        let file = NamedTempFile::new().unwrap();
        export_to_csv(&[result(0, 0.9, 3), disabled], file.path()).unwrap();

        let mut reader = ::csv::Reader::from_path(file.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "experiment_id");
        assert!(headers.iter().any(|h| h == "service_level"));

        let interval_col = headers.iter().position(|h| h == "rebalance_interval").unwrap();
        let rows: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][interval_col], "10.0");
        assert_eq!(&rows[1][interval_col], "");
    }

    #[test]
    fn csv_refuses_empty_results() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            export_to_csv(&[], file.path()),
            Err(ExperimentError::NoResults)
        ));
    }

    #[test]
    fn time_series_is_written_in_long_format() {
        let mut series = TimeSeries::default();
        series.push("UPT", VirtualTime::new(0.0), 10.0);
        series.push("UPT", VirtualTime::new(1.0), 9.0);
        series.push("Center", VirtualTime::new(0.0), 8.0);
        let file = NamedTempFile::new().unwrap();
        export_time_series_csv(&series, file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["label,time,value", "Center,0,8", "UPT,0,10", "UPT,1,9"]
        );
    }

    #[test]
    fn best_parameters_follow_the_best_result() {
        let results = vec![result(0, 0.7, 0), result(1, 0.9, 5)];
        let sets: Vec<_> = (0..2)
            .map(|i| ParameterSet::new(ScenarioParams::default(), "test".into(), i, i as u64))
            .collect();
        assert_eq!(find_best_parameters(&results, &sets).map(|s| s.run_id), Some(1));
        assert!(find_best_parameters(&results, &sets[..1]).is_none());
    }
}
