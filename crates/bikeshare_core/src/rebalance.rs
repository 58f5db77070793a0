//! Periodic rebalancing: move bikes one at a time from full stations to empty ones.
//!
//! At the start of each round stations are classified once: below
//! `low_fraction` of capacity is low, above `high_fraction` is high. Every
//! (low, high) pair is then visited in order. A pair is served only if the
//! high station still has a bike and the low station still has a free dock
//! at the moment it is visited, since earlier transfers and trips in the
//! meantime change levels. A transfer takes one bike from the high station,
//! spends `transfer_time` on the road and docks it at the low station.
//!
//! Levels are read without reserving anything. The checks and the following
//! request happen in the same step, so no other process can run in between.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::container::ContainerId;
use crate::error::KernelResult;
use crate::process::{Process, ProcessContext, Step};
use crate::station::station_name;
use crate::stats::update_stats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Minutes between rounds.
    pub interval: f64,
    pub low_fraction: f64,
    pub high_fraction: f64,
    /// Minutes a bike spends between pickup and drop-off.
    pub transfer_time: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            interval: 10.0,
            low_fraction: 0.4,
            high_fraction: 0.6,
            transfer_time: 1.0,
        }
    }
}

impl RebalanceConfig {
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Classify,
    NextPair,
    PickedUp,
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, Copy)]
struct Transfer {
    low: ContainerId,
    high: ContainerId,
}

pub struct Rebalancer {
    stations: Vec<ContainerId>,
    config: RebalanceConfig,
    pairs: Vec<Transfer>,
    cursor: usize,
    phase: Phase,
}

impl Rebalancer {
    pub fn new(stations: Vec<ContainerId>, config: RebalanceConfig) -> Self {
        Self {
            stations,
            config,
            pairs: Vec::new(),
            cursor: 0,
            phase: Phase::Classify,
        }
    }

    fn classify(&mut self, ctx: &ProcessContext<'_>) -> KernelResult<()> {
        let mut low = Vec::new();
        let mut high = Vec::new();
        for &station in &self.stations {
            let container = ctx.container(station)?;
            let level = f64::from(container.level());
            let capacity = f64::from(container.capacity());
            if level < capacity * self.config.low_fraction {
                low.push(station);
            }
            if level > capacity * self.config.high_fraction {
                high.push(station);
            }
        }
        self.pairs = low
            .iter()
            .flat_map(|&l| high.iter().map(move |&h| Transfer { low: l, high: h }))
            .collect();
        self.cursor = 0;
        Ok(())
    }

    fn current(&self) -> Option<Transfer> {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.pairs.get(index).copied())
    }
}

impl Process for Rebalancer {
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> KernelResult<Step> {
        loop {
            match self.phase {
                Phase::Classify => {
                    self.classify(ctx)?;
                    self.phase = Phase::NextPair;
                }
                Phase::NextPair => {
                    while let Some(pair) = self.pairs.get(self.cursor).copied() {
                        self.cursor += 1;
                        let low = ctx.container(pair.low)?;
                        let has_dock = low.level() < low.capacity();
                        if has_dock && ctx.level(pair.high)? > 0 {
                            self.phase = Phase::PickedUp;
                            return Ok(Step::get(pair.high, 1));
                        }
                    }
                    self.phase = Phase::Classify;
                    return Ok(Step::Timeout(self.config.interval));
                }
                Phase::PickedUp => {
                    self.phase = Phase::InTransit;
                    return Ok(Step::Timeout(self.config.transfer_time));
                }
                Phase::InTransit => {
                    let Some(pair) = self.current() else {
                        self.phase = Phase::NextPair;
                        continue;
                    };
                    self.phase = Phase::Delivered;
                    return Ok(Step::put(pair.low, 1));
                }
                Phase::Delivered => {
                    update_stats(ctx, |stats| stats.bikes_rebalanced += 1);
                    if let Some(pair) = self.current() {
                        debug!(
                            time = %ctx.now(),
                            from = station_name(ctx, pair.high),
                            to = station_name(ctx, pair.low),
                            "rebalanced a bike"
                        );
                    }
                    self.phase = Phase::NextPair;
                }
            }
        }
    }
}
