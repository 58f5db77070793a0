use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::{KernelError, KernelResult};
use crate::rebalance::RebalanceConfig;
use crate::trip::TripConfig;

/// Minutes between station level samples.
pub const DEFAULT_MONITOR_INTERVAL: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSpec {
    pub name: String,
    pub capacity: u32,
    pub bikes: u32,
}

impl StationSpec {
    pub fn new(name: impl Into<String>, capacity: u32, bikes: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            bikes,
        }
    }
}

/// A route between two stations named in [`ScenarioParams::stations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub from: String,
    pub to: String,
    pub probability: f64,
}

impl RouteSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>, probability: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            probability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotSpec {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub routes: Vec<RouteSpec>,
}

/// Everything needed to build a bike-share run. Deserializes from partial JSON;
/// missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub run: RunConfig,
    pub stations: Vec<StationSpec>,
    /// Checked in order; the first slot containing the time of day applies.
    pub time_slots: Vec<TimeSlotSpec>,
    /// Routes used outside every time slot.
    pub default_routes: Vec<RouteSpec>,
    /// Multiplier applied to every route probability (results clamped to 1).
    pub demand_scale: f64,
    /// Minutes between trip generation rounds.
    pub generation_interval: f64,
    pub trip: TripConfig,
    /// `None` disables rebalancing.
    pub rebalance: Option<RebalanceConfig>,
    /// `None` disables level sampling.
    pub monitor_interval: Option<f64>,
}

fn routes(entries: &[(&str, &str, f64)]) -> Vec<RouteSpec> {
    entries
        .iter()
        .map(|&(from, to, probability)| RouteSpec::new(from, to, probability))
        .collect()
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            stations: vec![
                StationSpec::new("UPT", 18, 10),
                StationSpec::new("Center", 10, 8),
                StationSpec::new("P700", 9, 6),
                StationSpec::new("Private", 12, 9),
            ],
            time_slots: vec![
                TimeSlotSpec {
                    name: "morning_start".into(),
                    start: 0.0,
                    end: 120.0,
                    routes: routes(&[
                        ("UPT", "Center", 0.3),
                        ("Center", "UPT", 0.5),
                        ("UPT", "P700", 0.2),
                        ("P700", "UPT", 0.4),
                        ("Center", "P700", 0.2),
                        ("P700", "Center", 0.3),
                        ("UPT", "Private", 0.2),
                        ("Private", "UPT", 0.3),
                    ]),
                },
                TimeSlotSpec {
                    name: "midday".into(),
                    start: 120.0,
                    end: 720.0,
                    routes: routes(&[
                        ("UPT", "Center", 0.15),
                        ("Center", "UPT", 0.2),
                        ("UPT", "P700", 0.1),
                        ("P700", "UPT", 0.15),
                        ("Center", "P700", 0.15),
                        ("P700", "Center", 0.2),
                        ("UPT", "Private", 0.1),
                        ("Private", "UPT", 0.15),
                    ]),
                },
            ],
            default_routes: routes(&[
                ("UPT", "Center", 0.05),
                ("Center", "UPT", 0.05),
                ("UPT", "P700", 0.05),
                ("P700", "UPT", 0.05),
                ("Center", "P700", 0.05),
                ("P700", "Center", 0.05),
                ("UPT", "Private", 0.05),
                ("Private", "UPT", 0.05),
            ]),
            demand_scale: 1.0,
            generation_interval: 1.0,
            trip: TripConfig::default(),
            rebalance: Some(RebalanceConfig::default()),
            monitor_interval: Some(DEFAULT_MONITOR_INTERVAL),
        }
    }
}

impl ScenarioParams {
    /// Parse parameters from JSON. Unknown station names are only caught by
    /// [`crate::scenario::build_scenario`].
    pub fn from_json_str(json: &str) -> KernelResult<Self> {
        serde_json::from_str(json).map_err(|e| KernelError::InvalidScenario(e.to_string()))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.run.seed = seed;
        self
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.run.horizon = horizon;
        self
    }

    pub fn with_stations(mut self, stations: Vec<StationSpec>) -> Self {
        self.stations = stations;
        self
    }

    pub fn with_time_slots(mut self, time_slots: Vec<TimeSlotSpec>) -> Self {
        self.time_slots = time_slots;
        self
    }

    pub fn with_default_routes(mut self, routes: Vec<RouteSpec>) -> Self {
        self.default_routes = routes;
        self
    }

    pub fn with_demand_scale(mut self, scale: f64) -> Self {
        self.demand_scale = scale;
        self
    }

    pub fn with_failure_prob(mut self, failure_prob: f64) -> Self {
        self.trip.failure_prob = failure_prob;
        self
    }

    pub fn with_trip(mut self, trip: TripConfig) -> Self {
        self.trip = trip;
        self
    }

    pub fn with_rebalance(mut self, rebalance: Option<RebalanceConfig>) -> Self {
        self.rebalance = rebalance;
        self
    }

    pub fn with_monitor_interval(mut self, interval: Option<f64>) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Range and consistency checks that do not need a simulation.
    pub fn validate(&self) -> KernelResult<()> {
        let invalid = |msg: String| Err(KernelError::InvalidScenario(msg));
        if !(0.0..=1.0).contains(&self.trip.failure_prob) {
            return invalid(format!(
                "failure probability {} outside [0, 1]",
                self.trip.failure_prob
            ));
        }
        for (label, range) in [
            ("ride time", &self.trip.ride_time),
            ("repair time", &self.trip.repair_time),
        ] {
            if !(range.min.is_finite() && range.max.is_finite())
                || range.min < 0.0
                || range.min > range.max
            {
                return invalid(format!(
                    "{label} range [{}, {}] must satisfy 0 <= min <= max",
                    range.min, range.max
                ));
            }
        }
        if !(self.demand_scale.is_finite() && self.demand_scale >= 0.0) {
            return invalid(format!("demand scale {} must be >= 0", self.demand_scale));
        }
        if !(self.generation_interval > 0.0) {
            return invalid(format!(
                "generation interval {} must be > 0",
                self.generation_interval
            ));
        }
        if let Some(interval) = self.monitor_interval {
            if !(interval > 0.0) {
                return invalid(format!("monitor interval {interval} must be > 0"));
            }
        }
        if let Some(rebalance) = &self.rebalance {
            if !(rebalance.interval > 0.0) {
                return invalid(format!(
                    "rebalance interval {} must be > 0",
                    rebalance.interval
                ));
            }
            if !(rebalance.transfer_time.is_finite() && rebalance.transfer_time >= 0.0) {
                return invalid(format!(
                    "rebalance transfer time {} must be >= 0",
                    rebalance.transfer_time
                ));
            }
            let (low, high) = (rebalance.low_fraction, rebalance.high_fraction);
            if !((0.0..=1.0).contains(&low) && (0.0..=1.0).contains(&high) && low <= high) {
                return invalid(format!(
                    "rebalance fractions {low}..{high} must lie in [0, 1] with low <= high"
                ));
            }
        }
        for (i, station) in self.stations.iter().enumerate() {
            if self.stations[..i].iter().any(|s| s.name == station.name) {
                return invalid(format!("duplicate station '{}'", station.name));
            }
        }
        Ok(())
    }
}
