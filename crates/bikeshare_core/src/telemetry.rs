//! Reporting sinks: consumers of `(label, time, value)` samples.
//!
//! Every simulation keeps a [`TimeSeries`] resource that collects all samples in
//! memory. Additional sinks (logs, files, plots) are registered through
//! [`ReportSinks`] and receive the same samples as they are recorded.

use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::VirtualTime;

pub trait ReportSink: Send + Sync {
    fn record(&mut self, label: &str, time: VirtualTime, value: f64);
}

/// Extra sinks registered on a simulation.
#[derive(Default, Resource)]
pub struct ReportSinks(pub Vec<Box<dyn ReportSink>>);

/// One sampled value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: VirtualTime,
    pub value: f64,
}

/// In-memory samples grouped by label. Labels iterate in sorted order.
#[derive(Debug, Clone, Default, Resource, Serialize, Deserialize)]
pub struct TimeSeries {
    series: BTreeMap<String, Vec<Sample>>,
}

impl TimeSeries {
    pub fn push(&mut self, label: &str, time: VirtualTime, value: f64) {
        self.series
            .entry(label.to_string())
            .or_default()
            .push(Sample { time, value });
    }

    pub fn get(&self, label: &str) -> Option<&[Sample]> {
        self.series.get(label).map(Vec::as_slice)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sample])> + '_ {
        self.series
            .iter()
            .map(|(label, samples)| (label.as_str(), samples.as_slice()))
    }

    /// Total number of samples across all labels.
    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for TimeSeries {
    fn record(&mut self, label: &str, time: VirtualTime, value: f64) {
        self.push(label, time, value);
    }
}

/// Emits every sample as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&mut self, label: &str, time: VirtualTime, value: f64) {
        debug!(target: "bikeshare::samples", %label, %time, value, "sample");
    }
}
