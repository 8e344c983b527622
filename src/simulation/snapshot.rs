use super::state::{SimulationState, TickCounters};
use crate::geo::{distance_km, estimate_arrival, format_distance, Coordinate, DEFAULT_SPEED_KMH};
use crate::models::{BoatStatus, FloodZone, RescueBoat, SafePoint, SosAlert};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct BoatView {
    #[serde(flatten)]
    pub boat: RescueBoat,
    pub distance_remaining: Option<String>,
    pub eta: Option<String>,
}

/// Read-only copy of the simulation for consumers.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub running: bool,
    pub ticks: TickCounters,
    pub alerts: Vec<SosAlert>,
    pub boats: Vec<BoatView>,
    pub safe_points: Vec<SafePoint>,
    pub flood_zones: Vec<FloodZone>,
    pub routes: HashMap<String, Vec<Coordinate>>,
    pub selected_alert_id: Option<String>,
    pub nearest_boat_id: Option<String>,
}

impl SimulationState {
    pub fn snapshot(&self) -> SimulationSnapshot {
        let boats = self
            .boats
            .iter()
            .map(|boat| {
                let destination = match &boat.status {
                    BoatStatus::Available => None,
                    BoatStatus::Responding(target) => self.target_position(target),
                    BoatStatus::Returning => Some(boat.home_base()),
                };
                let remaining = destination.map(|d| distance_km(boat.position, d));
                BoatView {
                    boat: boat.clone(),
                    distance_remaining: remaining.map(format_distance),
                    eta: remaining.map(|km| estimate_arrival(km, DEFAULT_SPEED_KMH)),
                }
            })
            .collect();

        SimulationSnapshot {
            running: self.running,
            ticks: self.ticks,
            alerts: self.alerts.clone(),
            boats,
            safe_points: self.safe_points.clone(),
            flood_zones: self.flood_zones.clone(),
            routes: self.routes.clone(),
            selected_alert_id: self.selected_alert_id.clone(),
            nearest_boat_id: self
                .selected_alert_id
                .as_deref()
                .and_then(|id| self.nearest_available_boat(id))
                .map(|b| b.id.clone()),
        }
    }
}
