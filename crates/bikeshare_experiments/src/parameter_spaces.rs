//! Ready-made parameter spaces.

use crate::ParameterSpace;

/// How service degrades as bikes break down more often, with and without
/// rebalancing.
pub fn failure_sensitivity_space() -> ParameterSpace {
    ParameterSpace::grid()
        .experiment_id("failure_sensitivity")
        .failure_prob(vec![0.0, 0.05, 0.1, 0.2, 0.3])
        .rebalance_interval(vec![None, Some(10.0)])
        .seeds((1..=5).collect())
}

/// Rebalancing frequency against demand level.
pub fn rebalancing_space() -> ParameterSpace {
    ParameterSpace::grid()
        .experiment_id("rebalancing")
        .demand_scale(vec![0.5, 1.0, 1.5, 2.0])
        .rebalance_interval(vec![None, Some(5.0), Some(10.0), Some(30.0), Some(60.0)])
        .seeds((1..=5).collect())
}

/// A handful of runs for smoke tests.
pub fn minimal_space() -> ParameterSpace {
    ParameterSpace::grid()
        .experiment_id("minimal")
        .rebalance_interval(vec![None, Some(10.0)])
        .seeds(vec![1, 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_have_the_expected_sizes() {
        assert_eq!(failure_sensitivity_space().len(), 50);
        assert_eq!(rebalancing_space().len(), 100);
        assert_eq!(minimal_space().generate().len(), 4);
    }
}
