use bikeshare_core::scenario::ScenarioParams;
use bikeshare_experiments::{
    export_to_csv, export_to_json, run_parallel_experiments_with_progress, ParameterSpace,
    SimulationResult,
};
use tempfile::tempdir;

fn short_space() -> ParameterSpace {
    ParameterSpace::grid()
        .experiment_id("it")
        .with_base(ScenarioParams::default().with_horizon(180.0))
        .failure_prob(vec![0.0, 0.3])
        .rebalance_interval(vec![None, Some(10.0)])
        .seeds(vec![5, 6])
}

#[test]
fn sweep_runs_every_combination_in_order() {
    let sets = short_space().generate();
    let results = run_parallel_experiments_with_progress(sets.clone(), Some(4), false).unwrap();

    assert_eq!(results.len(), 8);
    for (set, result) in sets.iter().zip(&results) {
        assert_eq!(result.run_id, set.run_id);
        assert_eq!(result.seed, set.seed);
        assert_eq!(result.failure_prob, set.failure_prob());
        assert_eq!(result.rebalance_interval, set.rebalance_interval());
    }

    for result in &results {
        assert!(result.trips_started + result.unhappy_customers >= result.trips_completed);
        assert!((0.0..=1.0).contains(&result.avg_fill_ratio));
        assert!(result.median_fill_ratio <= result.p90_fill_ratio);
        if result.failure_prob == 0.0 {
            assert_eq!(result.bike_failures, 0);
        }
        if result.rebalance_interval.is_none() {
            assert_eq!(result.bikes_rebalanced, 0);
        }
    }
}

#[test]
fn same_seed_gives_the_same_result() {
    let sets = short_space().seeds(vec![9]).generate();
    let first = run_parallel_experiments_with_progress(sets.clone(), Some(1), false).unwrap();
    let second = run_parallel_experiments_with_progress(sets, Some(3), false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn results_export_to_csv_and_json() {
    let sets = short_space().sample_random(3, 1);
    let results = run_parallel_experiments_with_progress(sets, None, false).unwrap();
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("results.csv");
    export_to_csv(&results, &csv_path).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 3);

    let json_path = dir.path().join("results.json");
    export_to_json(&results, &json_path).unwrap();
    let parsed: Vec<SimulationResult> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.len(), results.len());
    for (read, written) in parsed.iter().zip(&results) {
        assert_eq!(read.run_id, written.run_id);
        assert_eq!(read.trips_requested, written.trips_requested);
        assert!((read.service_level - written.service_level).abs() < 1e-9);
    }
}
