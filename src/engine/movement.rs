//! Per-tick movement state machine for boats, and the alert migration loop.

use super::{Leg, MotionSettings, RouteRequest};
use crate::geo::Coordinate;
use crate::models::{BoatStatus, RescueBoat, SafePoint, SosAlert, Target};
use crate::routing::advance_along_route;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// What a boat tick decided. Removals are applied by the caller after every
/// boat has been advanced.
#[derive(Debug, Default)]
pub struct MovementOutcome {
    pub removed_alerts: HashSet<String>,
    pub removed_safe_points: HashSet<String>,
    pub route_requests: Vec<RouteRequest>,
}

/// A safe point is complete once every member alert has reached it. Members
/// that no longer exist count as reached.
pub fn safe_point_complete(safe_point: &SafePoint, alerts: &[SosAlert]) -> bool {
    safe_point.assigned_alert_ids.iter().all(|id| {
        alerts
            .iter()
            .find(|a| &a.id == id)
            .map_or(true, |a| a.reached_safe_point)
    })
}

pub fn advance_boats(
    boats: &mut [RescueBoat],
    alerts: &[SosAlert],
    safe_points: &[SafePoint],
    routes: &mut HashMap<String, Vec<Coordinate>>,
    motion: &MotionSettings,
) -> MovementOutcome {
    let mut outcome = MovementOutcome::default();

    for boat in boats.iter_mut() {
        match boat.status.clone() {
            BoatStatus::Available => {}
            BoatStatus::Responding(Target::Alert(alert_id)) => {
                let Some(alert) = alerts.iter().find(|a| a.id == alert_id) else {
                    info!("{} lost target {}, returning to base", boat.name, alert_id);
                    head_home(boat, routes, &mut outcome);
                    continue;
                };
                let destination = alert.live_position();
                if step(boat, destination, routes, motion) {
                    boat.move_to(destination);
                    outcome.removed_alerts.insert(alert_id.clone());
                    info!(
                        "{} rescued {} ({} people) at {}",
                        boat.name, alert_id, alert.people_affected, alert.village_name
                    );
                    head_home(boat, routes, &mut outcome);
                }
            }
            BoatStatus::Responding(Target::SafePoint(safe_point_id)) => {
                let Some(safe_point) = safe_points.iter().find(|sp| sp.id == safe_point_id) else {
                    info!("{} lost safe point {}, returning to base", boat.name, safe_point_id);
                    head_home(boat, routes, &mut outcome);
                    continue;
                };
                if !step(boat, safe_point.position, routes, motion) {
                    continue;
                }
                if boat.position != safe_point.position {
                    boat.move_to(safe_point.position);
                    routes.remove(&boat.id);
                }
                if safe_point_complete(safe_point, alerts) {
                    info!(
                        "{} evacuated safe point {} ({} alerts)",
                        boat.name,
                        safe_point_id,
                        safe_point.assigned_alert_ids.len()
                    );
                    outcome
                        .removed_alerts
                        .extend(safe_point.assigned_alert_ids.iter().cloned());
                    outcome.removed_safe_points.insert(safe_point_id);
                    head_home(boat, routes, &mut outcome);
                } else {
                    debug!("{} waiting at safe point {}", boat.name, safe_point_id);
                }
            }
            BoatStatus::Returning => {
                let home = boat.home_base();
                if step(boat, home, routes, motion) {
                    routes.remove(&boat.id);
                    boat.dock();
                    info!("{} returned to base", boat.name);
                }
            }
        }
    }

    outcome
}

/// Moves alerts toward their safe point at half boat speed, straight-line.
/// Returns the ids that arrived this tick.
pub fn advance_alerts(
    alerts: &mut [SosAlert],
    safe_points: &[SafePoint],
    motion: &MotionSettings,
) -> Vec<String> {
    let mut arrived = Vec::new();

    for alert in alerts.iter_mut().filter(|a| !a.reached_safe_point) {
        let Some(safe_point_id) = alert.safe_point_id.as_deref() else {
            continue;
        };
        let Some(safe_point) = safe_points.iter().find(|sp| sp.id == safe_point_id) else {
            continue;
        };

        let mut position = alert.live_position();
        if !motion.has_arrived(position, safe_point.position) {
            position = position.step_toward(safe_point.position, motion.alert_speed());
        }
        if motion.has_arrived(position, safe_point.position) {
            position = safe_point.position;
            alert.reached_safe_point = true;
            arrived.push(alert.id.clone());
        }
        alert.current_position = Some(position);
    }

    arrived
}

/// Advances `boat` one tick toward `destination`, following its route while one
/// remains, and reports whether it is now within the arrival threshold.
fn step(
    boat: &mut RescueBoat,
    destination: Coordinate,
    routes: &mut HashMap<String, Vec<Coordinate>>,
    motion: &MotionSettings,
) -> bool {
    if motion.has_arrived(boat.position, destination) {
        return true;
    }

    let walked = routes
        .get(&boat.id)
        .filter(|route| !route.is_empty())
        .map(|route| advance_along_route(boat.position, route, motion.boat_speed));
    let next = match walked {
        Some((next, remaining)) if remaining.is_empty() => {
            routes.remove(&boat.id);
            next
        }
        Some((next, remaining)) => {
            routes.insert(boat.id.clone(), remaining);
            next
        }
        None => boat.position.step_toward(destination, motion.boat_speed),
    };
    boat.move_to(next);

    motion.has_arrived(next, destination)
}

fn head_home(
    boat: &mut RescueBoat,
    routes: &mut HashMap<String, Vec<Coordinate>>,
    outcome: &mut MovementOutcome,
) {
    routes.remove(&boat.id);
    boat.return_home();
    let home = boat.home_base();
    outcome.route_requests.push(RouteRequest::for_boat(boat, Leg::Home, home));
}
