pub mod assignment;
pub mod clustering;
pub mod movement;

use crate::geo::Coordinate;
use crate::models::{RescueBoat, Target};

/// Per-tick movement tunables, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    pub boat_speed: f64,
    pub arrival_threshold: f64,
}

impl MotionSettings {
    /// Alerts drift toward their safe point at half the boat speed.
    pub fn alert_speed(&self) -> f64 {
        self.boat_speed / 2.0
    }

    pub fn has_arrived(&self, position: Coordinate, destination: Coordinate) -> bool {
        position.planar_distance(destination) < self.arrival_threshold
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            boat_speed: 0.002,
            arrival_threshold: 0.003,
        }
    }
}

/// Which leg of a boat's trip a route was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leg {
    Target(Target),
    Home,
}

/// A street route the engine wants fetched. Results are applied only if the
/// boat is still on the same `leg` and `generation` when they arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub boat_id: String,
    pub leg: Leg,
    pub generation: u64,
    pub from: Coordinate,
    pub to: Coordinate,
}

impl RouteRequest {
    /// Route from the boat's current position for the leg it is on now.
    pub fn for_boat(boat: &RescueBoat, leg: Leg, to: Coordinate) -> Self {
        Self {
            boat_id: boat.id.clone(),
            leg,
            generation: boat.leg_generation(),
            from: boat.position,
            to,
        }
    }
}
