use std::collections::HashMap;

use tracing::info;

use crate::container::ContainerId;
use crate::demand::{Route, TimeSlot, TimeSlotDemand, TripMatrix};
use crate::error::{KernelError, KernelResult};
use crate::generator::TripGenerator;
use crate::monitor::Monitor;
use crate::rebalance::Rebalancer;
use crate::runner::{RunReport, Simulation};
use crate::scenario::params::{RouteSpec, ScenarioParams};
use crate::station::add_station;
use crate::stats::BikeShareStats;
use crate::telemetry::TimeSeries;

/// A built, not yet run, bike-share simulation.
pub struct Scenario {
    pub simulation: Simulation,
    /// Station containers in the order they were declared.
    pub stations: Vec<ContainerId>,
    names: HashMap<String, ContainerId>,
}

impl Scenario {
    pub fn station(&self, name: &str) -> Option<ContainerId> {
        self.names.get(name).copied()
    }

    pub fn run(&mut self) -> KernelResult<RunReport> {
        self.simulation.run()
    }

    pub fn stats(&self) -> BikeShareStats {
        self.simulation
            .world()
            .get_resource::<BikeShareStats>()
            .cloned()
            .unwrap_or_default()
    }

    pub fn time_series(&self) -> &TimeSeries {
        self.simulation.world().resource::<TimeSeries>()
    }

    /// Current bike count per station, in declaration order.
    pub fn levels(&self) -> Vec<(String, u32)> {
        self.stations
            .iter()
            .filter_map(|&id| self.simulation.container(id).ok())
            .map(|c| (c.name().to_string(), c.level()))
            .collect()
    }
}

fn resolve(names: &HashMap<String, ContainerId>, specs: &[RouteSpec]) -> KernelResult<TripMatrix> {
    let lookup = |name: &str| {
        names
            .get(name)
            .copied()
            .ok_or_else(|| KernelError::InvalidScenario(format!("unknown station '{name}'")))
    };
    let mut routes = Vec::with_capacity(specs.len());
    for spec in specs {
        if !(0.0..=1.0).contains(&spec.probability) {
            return Err(KernelError::InvalidScenario(format!(
                "route {} -> {} has probability {} outside [0, 1]",
                spec.from, spec.to, spec.probability
            )));
        }
        routes.push(Route {
            from: lookup(spec.from.as_str())?,
            to: lookup(spec.to.as_str())?,
            probability: spec.probability,
        });
    }
    Ok(TripMatrix::new(routes))
}

/// Build stations and processes from `params`. Processes are registered in the
/// order generator, rebalancer, monitor, so at equal times they run in that order.
pub fn build_scenario(params: &ScenarioParams) -> KernelResult<Scenario> {
    params.validate()?;
    let mut simulation = Simulation::new(params.run)?;
    simulation
        .world_mut()
        .insert_resource(BikeShareStats::default());

    let mut stations = Vec::with_capacity(params.stations.len());
    let mut names = HashMap::with_capacity(params.stations.len());
    for spec in &params.stations {
        let id = add_station(&mut simulation, spec.name.clone(), spec.capacity, spec.bikes)?;
        stations.push(id);
        names.insert(spec.name.clone(), id);
    }

    let slots = params
        .time_slots
        .iter()
        .map(|slot| {
            Ok(TimeSlot {
                name: slot.name.clone(),
                start: slot.start,
                end: slot.end,
                matrix: resolve(&names, &slot.routes)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    let demand = TimeSlotDemand::new(slots, resolve(&names, &params.default_routes)?)
        .scaled(params.demand_scale);

    simulation.spawn(
        "trip generator",
        TripGenerator::new(demand, params.trip).with_interval(params.generation_interval),
    )?;
    if let Some(rebalance) = params.rebalance {
        simulation.spawn("rebalancer", Rebalancer::new(stations.clone(), rebalance))?;
    }
    if let Some(interval) = params.monitor_interval {
        simulation.spawn("monitor", Monitor::new(stations.clone(), interval))?;
    }

    info!(
        stations = stations.len(),
        seed = params.run.seed,
        horizon = params.run.horizon,
        rebalancing = params.rebalance.is_some(),
        "scenario built"
    );
    Ok(Scenario {
        simulation,
        stations,
        names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::params::StationSpec;

    #[test]
    fn unknown_station_in_a_route_is_rejected() {
        let params = ScenarioParams::default()
            .with_default_routes(vec![RouteSpec::new("UPT", "Nowhere", 0.1)]);
        let err = build_scenario(&params).err().expect("should fail");
        assert!(matches!(err, KernelError::InvalidScenario(msg) if msg.contains("Nowhere")));
    }

    #[test]
    fn default_scenario_registers_stations_and_processes() {
        let scenario = build_scenario(&ScenarioParams::default()).unwrap();
        assert_eq!(scenario.stations.len(), 4);
        assert_eq!(scenario.simulation.live_processes(), 3);
        let upt = scenario.station("UPT").expect("UPT");
        assert_eq!(scenario.simulation.container(upt).unwrap().capacity(), 18);
        assert_eq!(
            scenario.levels(),
            vec![
                ("UPT".to_string(), 10),
                ("Center".to_string(), 8),
                ("P700".to_string(), 6),
                ("Private".to_string(), 9),
            ]
        );
    }

    #[test]
    fn disabled_processes_are_not_spawned() {
        let params = ScenarioParams::default()
            .with_stations(vec![StationSpec::new("A", 2, 1), StationSpec::new("B", 2, 1)])
            .with_time_slots(Vec::new())
            .with_default_routes(vec![RouteSpec::new("A", "B", 0.5)])
            .with_rebalance(None)
            .with_monitor_interval(None);
        let scenario = build_scenario(&params).unwrap();
        assert_eq!(scenario.simulation.live_processes(), 1);
    }
}
