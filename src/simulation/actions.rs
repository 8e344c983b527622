//! Operator-triggered actions: alert creation, flood simulation, manual
//! dispatch, removal, selection and pause/resume.

use super::state::SimulationState;
use super::ActionError;
use crate::engine::{Leg, RouteRequest};
use crate::generator;
use crate::geo::distance_km;
use crate::models::{RescueBoat, Severity, Target};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl SimulationState {
    /// New alert inside the most recently created flood zone.
    pub fn add_alert<R: Rng>(&mut self, rng: &mut R) -> Result<String, ActionError> {
        let zone = self.flood_zones.last().ok_or(ActionError::NoFloodZone)?;
        let alert = generator::random_alert_in_zone(zone, &self.settings.region, rng);
        let id = alert.id.clone();
        if alert.severity >= Severity::CRITICAL {
            warn!(
                "[NEW SOS] {} critical {} at {} ({} people)",
                id,
                alert.category.label(),
                alert.village_name,
                alert.people_affected
            );
        } else {
            info!(
                "[NEW SOS] {} {} (severity {}) at {}",
                id,
                alert.category.label(),
                alert.severity.level(),
                alert.village_name
            );
        }
        self.alerts.insert(0, alert);
        self.cluster_open_alerts();
        Ok(id)
    }

    pub fn create_regional_flood<R: Rng>(&mut self, rng: &mut R) -> String {
        let zone = generator::random_regional_zone(&self.settings.region, rng);
        info!(
            "[FLOOD] Zone {} ({:.1} km radius) at {:.4},{:.4}",
            zone.id, zone.radius_km, zone.center.lat, zone.center.lon
        );
        let id = zone.id.clone();
        self.flood_zones.push(zone);
        id
    }

    /// Replaces every zone with one region-wide flood and its first wave of
    /// alerts. Returns the zone id, alert count and safe points created.
    pub fn create_giant_flood<R: Rng>(&mut self, rng: &mut R) -> (String, usize, usize) {
        let (zone, alerts) = generator::giant_flood(&self.settings.region, rng);
        let zone_id = zone.id.clone();
        let count = alerts.len();
        self.flood_zones = vec![zone];
        for alert in alerts.into_iter().rev() {
            self.alerts.insert(0, alert);
        }
        let safe_points = self.cluster_open_alerts();
        info!(
            "[GIANT FLOOD] {} alerts, {} safe points",
            count, safe_points
        );
        (zone_id, count, safe_points)
    }

    /// Sends `boat_id` to `alert_id`. Unknown ids are ignored. A boat already
    /// holding the alert is released and sent home.
    pub fn assign_boat(&mut self, alert_id: &str, boat_id: &str) -> Vec<RouteRequest> {
        let Some(destination) = self
            .alerts
            .iter()
            .find(|a| a.id == alert_id)
            .map(|a| a.live_position())
        else {
            debug!("Ignoring manual dispatch to unknown alert {}", alert_id);
            return Vec::new();
        };
        if !self.boats.iter().any(|b| b.id == boat_id) {
            debug!("Ignoring manual dispatch of unknown boat {}", boat_id);
            return Vec::new();
        }

        let mut requests = Vec::new();
        for other in self
            .boats
            .iter_mut()
            .filter(|b| b.id != boat_id && b.target_alert_id() == Some(alert_id))
        {
            info!("{} released from {}", other.name, alert_id);
            self.routes.remove(&other.id);
            other.return_home();
            let home = other.home_base();
            requests.push(RouteRequest::for_boat(other, Leg::Home, home));
        }

        let Some(boat) = self.boats.iter_mut().find(|b| b.id == boat_id) else {
            return requests;
        };
        if let Some(previous) = boat.target_safe_point_id() {
            if let Some(sp) = self.safe_points.iter_mut().find(|sp| sp.id == previous) {
                sp.assigned_boat_id = None;
            }
        }
        boat.respond_to(Target::Alert(alert_id.to_string()));
        self.routes.remove(&boat.id);
        self.pending.remove(alert_id);
        info!("[MANUAL DISPATCH] {} assigned to {}", boat.name, alert_id);

        requests.push(RouteRequest::for_boat(
            boat,
            Leg::Target(Target::Alert(alert_id.to_string())),
            destination,
        ));
        requests
    }

    /// Drops an alert. Boats heading for it turn back on their next tick.
    pub fn remove_alert(&mut self, alert_id: &str) -> bool {
        let before = self.alerts.len();
        self.forget_alerts(&HashSet::from([alert_id.to_string()]));
        self.alerts.len() != before
    }

    pub fn select_alert(&mut self, alert_id: Option<&str>) -> Result<(), ActionError> {
        match alert_id {
            Some(id) if !self.alerts.iter().any(|a| a.id == id) => {
                Err(ActionError::UnknownAlert(id.to_string()))
            }
            _ => {
                self.selected_alert_id = alert_id.map(str::to_string);
                Ok(())
            }
        }
    }

    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        info!(
            "Simulation {}",
            if self.running { "resumed" } else { "paused" }
        );
        self.running
    }

    /// Closest available boat to an alert, for operator display.
    pub fn nearest_available_boat(&self, alert_id: &str) -> Option<&RescueBoat> {
        let at = self.alerts.iter().find(|a| a.id == alert_id)?.live_position();
        self.boats
            .iter()
            .filter(|b| b.is_available())
            .min_by(|x, y| distance_km(x.position, at).total_cmp(&distance_km(y.position, at)))
    }
}
