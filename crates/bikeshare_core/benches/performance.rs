//! Performance benchmarks for bikeshare_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use bikeshare_core::container::{ContainerId, ResourceContainer};
use bikeshare_core::error::KernelResult;
use bikeshare_core::process::{Process, ProcessContext, Step};
use bikeshare_core::rebalance::RebalanceConfig;
use bikeshare_core::scenario::build_scenario;
use bikeshare_core::test_helpers::{default_day, simulation_with_horizon};

fn bench_full_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_day");
    for (name, rebalance) in [
        ("rebalancing", Some(RebalanceConfig::default())),
        ("no_rebalancing", None),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &rebalance, |b, rebalance| {
            b.iter(|| {
                let mut scenario = build_scenario(&default_day(42, *rebalance)).expect("scenario");
                black_box(scenario.run().expect("run"));
            });
        });
    }
    group.finish();
}

fn bench_demand_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("demand_scale");
    for scale in [0.5, 1.0, 2.0, 4.0] {
        group.bench_with_input(BenchmarkId::from_parameter(scale), &scale, |b, &scale| {
            b.iter(|| {
                let params = default_day(42, Some(RebalanceConfig::default())).with_demand_scale(scale);
                let mut scenario = build_scenario(&params).expect("scenario");
                black_box(scenario.run().expect("run"));
            });
        });
    }
    group.finish();
}

/// Takes a bike, holds it briefly, returns it, repeats.
struct Borrower {
    dock: ContainerId,
    phase: u8,
}

impl Process for Borrower {
    fn resume(&mut self, _ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        self.phase = (self.phase + 1) % 4;
        Ok(match self.phase {
            1 => Step::get(self.dock, 1),
            2 | 0 => Step::Timeout(0.1),
            _ => Step::put(self.dock, 1),
        })
    }
}

/// Sleeps one time unit per step.
struct Ticker;

impl Process for Ticker {
    fn resume(&mut self, _ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        Ok(Step::Timeout(1.0))
    }
}

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");
    for processes in [10usize, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("tickers", processes),
            &processes,
            |b, &processes| {
                b.iter(|| {
                    let mut sim = simulation_with_horizon(100.0);
                    for _ in 0..processes {
                        sim.spawn("ticker", Ticker).expect("spawn");
                    }
                    black_box(sim.run().expect("run"));
                });
            },
        );
    }
    group.bench_function("contended_container", |b| {
        b.iter(|| {
            let mut sim = simulation_with_horizon(10.0);
            let dock = sim.add_container(ResourceContainer::new("dock", 4, 2).expect("dock"));
            for _ in 0..200 {
                sim.spawn("borrower", Borrower { dock, phase: 0 }).expect("spawn");
            }
            black_box(sim.run().expect("run"));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_full_day, bench_demand_scale, bench_scheduler);
criterion_main!(benches);
