//! Trip demand: which routes get a trip each minute, by time of day.
//!
//! A [`TripMatrix`] lists routes with the probability that a trip is requested
//! on that route in a given minute. A [`DemandProfile`] picks the matrix that
//! applies at a point in simulated time; [`TimeSlotDemand`] does this with
//! half-open `[start, end)` windows over a repeating day and a default matrix
//! for everything else.

use std::fmt::Debug;

use crate::clock::VirtualTime;
use crate::config::DAY_MINUTES;
use crate::container::ContainerId;

// ---------------------------------------------------------------------------
// Trip matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub from: ContainerId,
    pub to: ContainerId,
    /// Chance per minute that a trip is requested on this route.
    pub probability: f64,
}

/// Routes in a fixed order. The order is part of the model: it decides the
/// order of random draws, so it must not depend on hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripMatrix {
    routes: Vec<Route>,
}

impl TripMatrix {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every probability multiplied by `factor`, clamped to `[0, 1]`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            routes: self
                .routes
                .iter()
                .map(|route| Route {
                    probability: (route.probability * factor).clamp(0.0, 1.0),
                    ..*route
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Demand profiles
// ---------------------------------------------------------------------------

/// Chooses the trip matrix in effect at a given time.
pub trait DemandProfile: Send + Sync + Debug {
    fn active_matrix(&self, now: VirtualTime) -> &TripMatrix;
}

/// The same matrix all day.
#[derive(Debug, Clone, Default)]
pub struct ConstantDemand(pub TripMatrix);

impl DemandProfile for ConstantDemand {
    fn active_matrix(&self, _now: VirtualTime) -> &TripMatrix {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub name: String,
    /// Minute of the day the slot starts (inclusive).
    pub start: f64,
    /// Minute of the day the slot ends (exclusive).
    pub end: f64,
    pub matrix: TripMatrix,
}

/// Time-of-day slots over a repeating day. The first slot containing the time
/// of day wins; times outside every slot use the default matrix.
#[derive(Debug, Clone)]
pub struct TimeSlotDemand {
    slots: Vec<TimeSlot>,
    default: TripMatrix,
    day_length: f64,
}

impl TimeSlotDemand {
    pub fn new(slots: Vec<TimeSlot>, default: TripMatrix) -> Self {
        Self {
            slots,
            default,
            day_length: DAY_MINUTES,
        }
    }

    pub fn with_day_length(mut self, day_length: f64) -> Self {
        self.day_length = day_length;
        self
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Slot active at `now`, or `None` when the default matrix applies.
    pub fn active_slot(&self, now: VirtualTime) -> Option<&TimeSlot> {
        let minute = now.as_f64().rem_euclid(self.day_length);
        self.slots
            .iter()
            .find(|slot| slot.start <= minute && minute < slot.end)
    }

    /// Every matrix scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .map(|slot| TimeSlot {
                    matrix: slot.matrix.scaled(factor),
                    ..slot.clone()
                })
                .collect(),
            default: self.default.scaled(factor),
            day_length: self.day_length,
        }
    }
}

impl DemandProfile for TimeSlotDemand {
    fn active_matrix(&self, now: VirtualTime) -> &TripMatrix {
        self.active_slot(now)
            .map_or(&self.default, |slot| &slot.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Entity;

    fn station(raw: u32) -> ContainerId {
        ContainerId::from(Entity::from_raw(raw))
    }

    fn matrix(probability: f64) -> TripMatrix {
        TripMatrix::new(vec![Route {
            from: station(0),
            to: station(1),
            probability,
        }])
    }

    fn profile() -> TimeSlotDemand {
        TimeSlotDemand::new(
            vec![
                TimeSlot {
                    name: "morning_start".into(),
                    start: 0.0,
                    end: 120.0,
                    matrix: matrix(0.3),
                },
                TimeSlot {
                    name: "midday".into(),
                    start: 120.0,
                    end: 720.0,
                    matrix: matrix(0.15),
                },
            ],
            matrix(0.05),
        )
    }

    #[test]
    fn slots_are_half_open() {
        let demand = profile();
        let at = |t: f64| demand.active_matrix(VirtualTime::new(t)).routes()[0].probability;
        assert_eq!(at(0.0), 0.3);
        assert_eq!(at(119.5), 0.3);
        assert_eq!(at(120.0), 0.15);
        assert_eq!(at(719.0), 0.15);
        assert_eq!(at(720.0), 0.05);
        assert_eq!(at(1439.0), 0.05);
    }

    #[test]
    fn slots_repeat_every_day() {
        let demand = profile();
        let slot = demand.active_slot(VirtualTime::new(1440.0 + 30.0));
        assert_eq!(slot.map(|s| s.name.as_str()), Some("morning_start"));
    }

    #[test]
    fn scaling_clamps_probabilities() {
        let scaled = profile().scaled(4.0);
        let morning = scaled.active_matrix(VirtualTime::new(10.0));
        assert_eq!(morning.routes()[0].probability, 1.0);
        let evening = scaled.active_matrix(VirtualTime::new(800.0));
        assert!((evening.routes()[0].probability - 0.2).abs() < 1e-12);
    }
}
