//! Parameter variation for sweeps.
//!
//! A [`ParameterSpace`] holds one list of values per varied knob on top of a
//! base [`ScenarioParams`]. An empty list means "keep the base value".
//! [`ParameterSpace::generate`] walks the full Cartesian product;
//! [`ParameterSpace::sample_random`] draws distinct combinations from it.

use std::collections::HashSet;

use bikeshare_core::scenario::ScenarioParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// One configuration to run.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    pub experiment_id: String,
    /// Position of this set within its sweep.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Scenario parameters with this set's seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        self.params.clone().with_seed(self.seed)
    }

    pub fn failure_prob(&self) -> f64 {
        self.params.trip.failure_prob
    }

    pub fn demand_scale(&self) -> f64 {
        self.params.demand_scale
    }

    /// `None` when rebalancing is disabled.
    pub fn rebalance_interval(&self) -> Option<f64> {
        self.params.rebalance.map(|r| r.interval)
    }
}

#[derive(Debug, Clone, Copy)]
struct Combination {
    failure_prob: f64,
    demand_scale: f64,
    rebalance_interval: Option<f64>,
    seed: u64,
}

impl Combination {
    fn key(&self) -> (u64, u64, Option<u64>, u64) {
        (
            self.failure_prob.to_bits(),
            self.demand_scale.to_bits(),
            self.rebalance_interval.map(f64::to_bits),
            self.seed,
        )
    }
}

/// Grid of scenario parameters to explore.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base: ScenarioParams,
    experiment_id: String,
    failure_probs: Vec<f64>,
    demand_scales: Vec<f64>,
    /// `None` entries disable rebalancing.
    rebalance_intervals: Vec<Option<f64>>,
    seeds: Vec<u64>,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            experiment_id: "sweep".to_string(),
            failure_probs: vec![],
            demand_scales: vec![],
            rebalance_intervals: vec![],
            seeds: vec![],
        }
    }

    pub fn grid() -> Self {
        Self::new()
    }

    /// Parameters used for every knob the space does not vary.
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    pub fn experiment_id(mut self, id: impl Into<String>) -> Self {
        self.experiment_id = id.into();
        self
    }

    pub fn failure_prob(mut self, values: Vec<f64>) -> Self {
        self.failure_probs = values;
        self
    }

    pub fn demand_scale(mut self, values: Vec<f64>) -> Self {
        self.demand_scales = values;
        self
    }

    pub fn rebalance_interval(mut self, values: Vec<Option<f64>>) -> Self {
        self.rebalance_intervals = values;
        self
    }

    pub fn seeds(mut self, values: Vec<u64>) -> Self {
        self.seeds = values;
        self
    }

    fn failure_probs(&self) -> Vec<f64> {
        or_base(&self.failure_probs, self.base.trip.failure_prob)
    }

    fn demand_scales(&self) -> Vec<f64> {
        or_base(&self.demand_scales, self.base.demand_scale)
    }

    fn rebalance_intervals(&self) -> Vec<Option<f64>> {
        or_base(
            &self.rebalance_intervals,
            self.base.rebalance.map(|r| r.interval),
        )
    }

    fn seed_values(&self) -> Vec<u64> {
        or_base(&self.seeds, self.base.run.seed)
    }

    /// Number of sets [`Self::generate`] returns.
    pub fn len(&self) -> usize {
        self.failure_probs().len()
            * self.demand_scales().len()
            * self.rebalance_intervals().len()
            * self.seed_values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, seeds varying fastest.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let seeds = self.seed_values();
        let intervals = self.rebalance_intervals();
        let scales = self.demand_scales();
        let mut combinations = Vec::with_capacity(self.len());
        for &failure_prob in &self.failure_probs() {
            for &demand_scale in &scales {
                for &rebalance_interval in &intervals {
                    for &seed in &seeds {
                        combinations.push(Combination {
                            failure_prob,
                            demand_scale,
                            rebalance_interval,
                            seed,
                        });
                    }
                }
            }
        }
        self.to_sets(combinations)
    }

    /// Up to `count` distinct combinations drawn uniformly from the grid.
    /// Returns fewer when the grid is smaller than `count`.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        const MAX_ATTEMPTS: usize = 10_000;

        let failure_probs = self.failure_probs();
        let scales = self.demand_scales();
        let intervals = self.rebalance_intervals();
        let seeds = self.seed_values();
        let target = count.min(self.len());

        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut combinations = Vec::with_capacity(target);
        let mut attempts = 0;
        while combinations.len() < target && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let combination = Combination {
                failure_prob: failure_probs[rng.gen_range(0..failure_probs.len())],
                demand_scale: scales[rng.gen_range(0..scales.len())],
                rebalance_interval: intervals[rng.gen_range(0..intervals.len())],
                seed: seeds[rng.gen_range(0..seeds.len())],
            };
            if seen.insert(combination.key()) {
                combinations.push(combination);
            }
        }
        self.to_sets(combinations)
    }

    fn to_sets(&self, combinations: Vec<Combination>) -> Vec<ParameterSet> {
        combinations
            .into_iter()
            .enumerate()
            .map(|(run_id, c)| {
                let rebalance = c
                    .rebalance_interval
                    .map(|interval| self.base.rebalance.unwrap_or_default().with_interval(interval));
                let params = self
                    .base
                    .clone()
                    .with_failure_prob(c.failure_prob)
                    .with_demand_scale(c.demand_scale)
                    .with_rebalance(rebalance);
                ParameterSet::new(params, self.experiment_id.clone(), run_id, c.seed)
            })
            .collect()
    }
}

fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}
