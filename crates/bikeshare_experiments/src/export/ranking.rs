use std::cmp::Ordering;

use crate::metrics::SimulationResult;

fn rank(a: &SimulationResult, b: &SimulationResult) -> Ordering {
    a.service_level
        .total_cmp(&b.service_level)
        .then_with(|| b.bikes_rebalanced.cmp(&a.bikes_rebalanced))
}

pub(crate) fn find_best_index(results: &[SimulationResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, result) in results.iter().enumerate() {
        match best {
            Some(current) if rank(result, &results[current]) != Ordering::Greater => {}
            _ => best = Some(idx),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::result;

    #[test]
    fn nothing_to_rank() {
        assert_eq!(find_best_index(&[]), None);
    }

    #[test]
    fn highest_service_level_wins() {
        let results = [result(0, 0.8, 0), result(1, 0.95, 9), result(2, 0.9, 0)];
        assert_eq!(find_best_index(&results), Some(1));
    }

    #[test]
    fn ties_prefer_fewer_moves_then_the_earliest_run() {
        let results = [result(0, 0.9, 4), result(1, 0.9, 2), result(2, 0.9, 2)];
        assert_eq!(find_best_index(&results), Some(1));
    }
}
