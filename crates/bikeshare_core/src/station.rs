//! Stations: bike containers plus the per-station bookkeeping the model needs.

use bevy_ecs::prelude::Component;

use crate::container::{ContainerId, ResourceContainer};
use crate::error::KernelResult;
use crate::process::ProcessContext;
use crate::runner::Simulation;

/// Attached to every container entity that represents a docking station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Component)]
pub struct Station {
    /// Broken bikes from trips that started here and are being repaired.
    pub bikes_under_maintenance: u32,
}

/// Register a station with `capacity` docks and `bikes` docked bikes.
pub fn add_station(
    sim: &mut Simulation,
    name: impl Into<String>,
    capacity: u32,
    bikes: u32,
) -> KernelResult<ContainerId> {
    let id = sim.add_container(ResourceContainer::new(name, capacity, bikes)?);
    sim.world_mut().entity_mut(id.entity()).insert(Station::default());
    Ok(id)
}

/// Bikes under maintenance at `station`, or zero if it is not a station.
pub fn bikes_under_maintenance(sim: &Simulation, station: ContainerId) -> u32 {
    sim.world()
        .get::<Station>(station.entity())
        .map_or(0, |s| s.bikes_under_maintenance)
}

/// Container name for log messages.
pub(crate) fn station_name<'a>(ctx: &'a ProcessContext<'_>, station: ContainerId) -> &'a str {
    ctx.container(station).map_or("?", |c| c.name())
}
