use super::clock::TickKind;
use crate::engine::assignment::{self, Assignment};
use crate::engine::clustering::{self, DEFAULT_CLUSTER_RADIUS_KM};
use crate::engine::movement;
use crate::engine::{Leg, MotionSettings, RouteRequest};
use crate::geo::{format_distance, Coordinate};
use crate::models::{BoatStatus, FloodZone, Region, RescueBoat, SafePoint, SosAlert, Target};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub motion: MotionSettings,
    pub cluster_radius_km: f64,
    pub region: Region,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            motion: MotionSettings::default(),
            cluster_radius_km: DEFAULT_CLUSTER_RADIUS_KM,
            region: Region {
                center: Coordinate::new(24.8607, 67.0011),
                lat_span: 0.1,
                lon_span: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickCounters {
    pub assignment: u64,
    pub alert_movement: u64,
    pub boat_movement: u64,
}

/// Everything the simulation knows. Only tick handlers and actions mutate it.
pub struct SimulationState {
    pub(super) settings: SimulationSettings,
    pub(super) alerts: Vec<SosAlert>,
    pub(super) boats: Vec<RescueBoat>,
    pub(super) safe_points: Vec<SafePoint>,
    pub(super) flood_zones: Vec<FloodZone>,
    pub(super) routes: HashMap<String, Vec<Coordinate>>,
    pub(super) selected_alert_id: Option<String>,
    /// Alerts claimed by an assignment cycle whose boat is not committed yet.
    pub(super) pending: HashSet<String>,
    pub(super) running: bool,
    pub(super) ticks: TickCounters,
}

fn current_leg(boat: &RescueBoat) -> Option<Leg> {
    match &boat.status {
        BoatStatus::Available => None,
        BoatStatus::Responding(target) => Some(Leg::Target(target.clone())),
        BoatStatus::Returning => Some(Leg::Home),
    }
}

impl SimulationState {
    pub fn new(settings: SimulationSettings, fleet: Vec<RescueBoat>) -> Self {
        Self {
            settings,
            alerts: Vec::new(),
            boats: fleet,
            safe_points: Vec::new(),
            flood_zones: Vec::new(),
            routes: HashMap::new(),
            selected_alert_id: None,
            pending: HashSet::new(),
            running: true,
            ticks: TickCounters::default(),
        }
    }

    pub fn alerts(&self) -> &[SosAlert] {
        &self.alerts
    }

    pub fn boats(&self) -> &[RescueBoat] {
        &self.boats
    }

    pub fn safe_points(&self) -> &[SafePoint] {
        &self.safe_points
    }

    pub fn flood_zones(&self) -> &[FloodZone] {
        &self.flood_zones
    }

    pub fn route(&self, boat_id: &str) -> Option<&[Coordinate]> {
        self.routes.get(boat_id).map(Vec::as_slice)
    }

    pub fn selected_alert_id(&self) -> Option<&str> {
        self.selected_alert_id.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Runs one periodic task. Paused simulations ignore ticks entirely.
    pub fn on_tick(&mut self, kind: TickKind) -> Vec<RouteRequest> {
        if !self.running {
            return Vec::new();
        }
        match kind {
            TickKind::Assignment => {
                self.ticks.assignment += 1;
                self.assignment_tick()
            }
            TickKind::AlertMovement => {
                self.ticks.alert_movement += 1;
                self.alert_tick();
                Vec::new()
            }
            TickKind::BoatMovement => {
                self.ticks.boat_movement += 1;
                self.boat_tick()
            }
        }
    }

    fn assignment_tick(&mut self) -> Vec<RouteRequest> {
        let plan = assignment::compute_assignments(
            &self.boats,
            &self.alerts,
            &self.safe_points,
            &mut self.pending,
        );
        if !plan.is_empty() {
            debug!(
                "Assignment cycle: {} alerts, {} safe points matched",
                plan.alert_assignments.len(),
                plan.safe_point_assignments.len()
            );
        }
        let mut requests: Vec<RouteRequest> = plan
            .into_assignments()
            .filter_map(|a| self.commit_assignment(a, "DISPATCH"))
            .collect();

        if let Some(reroute) = assignment::reroute_returning_boats(
            &self.boats,
            &self.alerts,
            &self.safe_points,
            &self.pending,
        ) {
            requests.extend(self.commit_assignment(reroute, "REROUTE"));
        }

        requests
    }

    fn alert_tick(&mut self) {
        let arrived = movement::advance_alerts(
            &mut self.alerts,
            &self.safe_points,
            &self.settings.motion,
        );
        for id in arrived {
            debug!("Alert {} reached its safe point", id);
        }
    }

    fn boat_tick(&mut self) -> Vec<RouteRequest> {
        let outcome = movement::advance_boats(
            &mut self.boats,
            &self.alerts,
            &self.safe_points,
            &mut self.routes,
            &self.settings.motion,
        );
        self.apply_removals(&outcome.removed_alerts, &outcome.removed_safe_points);
        outcome.route_requests
    }

    fn commit_assignment(&mut self, assignment: Assignment, reason: &str) -> Option<RouteRequest> {
        if let Target::Alert(id) = &assignment.target {
            self.pending.remove(id);
        }
        let to = self.target_position(&assignment.target)?;
        let boat = self.boats.iter_mut().find(|b| b.id == assignment.boat_id)?;

        boat.respond_to(assignment.target.clone());
        self.routes.remove(&boat.id);
        if let Target::SafePoint(id) = &assignment.target {
            if let Some(sp) = self.safe_points.iter_mut().find(|sp| &sp.id == id) {
                sp.assigned_boat_id = Some(boat.id.clone());
            }
        }
        info!(
            "[{}] {} responding to {:?} ({})",
            reason,
            boat.name,
            assignment.target,
            format_distance(assignment.distance_km)
        );

        Some(RouteRequest::for_boat(boat, Leg::Target(assignment.target), to))
    }

    pub(super) fn target_position(&self, target: &Target) -> Option<Coordinate> {
        match target {
            Target::Alert(id) => self
                .alerts
                .iter()
                .find(|a| &a.id == id)
                .map(|a| a.live_position()),
            Target::SafePoint(id) => self
                .safe_points
                .iter()
                .find(|sp| &sp.id == id)
                .map(|sp| sp.position),
        }
    }

    /// Applied after every boat has moved, so one tick's removals land together
    /// on the alert list, the safe points and the selection.
    fn apply_removals(&mut self, alerts: &HashSet<String>, safe_points: &HashSet<String>) {
        if alerts.is_empty() && safe_points.is_empty() {
            return;
        }
        self.safe_points.retain(|sp| !safe_points.contains(&sp.id));
        self.forget_alerts(alerts);
        for id in alerts {
            info!("[RESOLVED] Alert {} resolved", id);
        }
    }

    /// Drops alerts everywhere they are referenced. Safe points whose members
    /// are all gone are dropped too; a boat heading for one turns back next tick.
    pub(super) fn forget_alerts(&mut self, ids: &HashSet<String>) {
        self.alerts.retain(|a| !ids.contains(&a.id));
        self.pending.retain(|id| !ids.contains(id));
        if self
            .selected_alert_id
            .as_ref()
            .is_some_and(|id| ids.contains(id))
        {
            self.selected_alert_id = None;
        }
        let alive: HashSet<&str> = self.alerts.iter().map(|a| a.id.as_str()).collect();
        self.safe_points.retain(|sp| {
            let occupied = sp.assigned_alert_ids.iter().any(|id| alive.contains(id.as_str()));
            if !occupied {
                info!("[SAFE POINT] {} has no alerts left, dropped", sp.id);
            }
            occupied
        });
    }

    /// Stores a fetched route if the boat is still on the leg, and the same
    /// generation of it, that the route was fetched for.
    pub fn apply_route(
        &mut self,
        boat_id: &str,
        leg: &Leg,
        generation: u64,
        waypoints: Vec<Coordinate>,
    ) -> bool {
        let Some(boat) = self.boats.iter().find(|b| b.id == boat_id) else {
            return false;
        };
        if boat.leg_generation() != generation || current_leg(boat).as_ref() != Some(leg) {
            debug!("Discarding stale route for {}", boat_id);
            return false;
        }
        self.routes.insert(boat_id.to_string(), waypoints);
        true
    }

    /// Groups alerts that have no safe point and no boat yet. Returns how many
    /// safe points were created.
    pub(super) fn cluster_open_alerts(&mut self) -> usize {
        let claimed: HashSet<&str> = self.boats.iter().filter_map(|b| b.target_alert_id()).collect();
        let open: Vec<SosAlert> = self
            .alerts
            .iter()
            .filter(|a| !a.is_grouped() && !claimed.contains(a.id.as_str()) && !self.pending.contains(&a.id))
            .cloned()
            .collect();

        let created = clustering::group_nearby_alerts(&open, self.settings.cluster_radius_km);
        for sp in &created {
            for alert in self.alerts.iter_mut().filter(|a| sp.assigned_alert_ids.contains(&a.id)) {
                alert.safe_point_id = Some(sp.id.clone());
            }
            info!(
                "[SAFE POINT] {} gathers {} alerts",
                sp.id,
                sp.assigned_alert_ids.len()
            );
        }
        let count = created.len();
        self.safe_points.extend(created);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::default_fleet;
    use crate::geo::distance_km;
    use crate::models::{AlertCategory, Severity};
    use chrono::Utc;

    fn alert_at(id: &str, position: Coordinate) -> SosAlert {
        SosAlert {
            id: id.to_string(),
            village_id: "V-08".to_string(),
            village_name: "Saddar".to_string(),
            position,
            category: AlertCategory::Flood,
            severity: Severity::CRITICAL,
            people_affected: 30,
            created_at: Utc::now(),
            safe_point_id: None,
            current_position: None,
            reached_safe_point: false,
        }
    }

    fn state_with_fleet() -> SimulationState {
        SimulationState::new(SimulationSettings::default(), default_fleet())
    }

    fn run_ticks(state: &mut SimulationState, n: usize) {
        for _ in 0..n {
            state.on_tick(TickKind::Assignment);
            state.on_tick(TickKind::AlertMovement);
            state.on_tick(TickKind::BoatMovement);
            assert_invariants(state);
        }
    }

    fn assert_invariants(state: &SimulationState) {
        let mut seen = HashSet::new();
        for boat in &state.boats {
            if let Some(id) = boat.target_alert_id() {
                assert!(seen.insert(id.to_string()), "alert {} targeted twice", id);
            }
        }
        for sp in &state.safe_points {
            if let Some(boat_id) = &sp.assigned_boat_id {
                let boat = state.boats.iter().find(|b| &b.id == boat_id).unwrap();
                assert_eq!(boat.target_safe_point_id(), Some(sp.id.as_str()));
            }
        }
    }

    #[test]
    fn nearest_boat_rescues_alert_and_alert_disappears() {
        let mut state = state_with_fleet();
        let alpha = state.boats[0].home_base();
        // ~2 km north of Rescue Alpha, farther from everyone else.
        let position = Coordinate::new(alpha.lat + 0.018, alpha.lon);
        for boat in &state.boats[1..] {
            assert!(distance_km(boat.position, position) > distance_km(alpha, position));
        }
        state.alerts.push(alert_at("SOS-1", position));

        let requests = state.on_tick(TickKind::Assignment);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].boat_id, "B-01");
        assert_eq!(state.boats[0].target_alert_id(), Some("SOS-1"));
        assert!(state.pending.is_empty());

        let mut ticks = 0;
        while state.alerts.iter().any(|a| a.id == "SOS-1") {
            state.on_tick(TickKind::BoatMovement);
            ticks += 1;
            assert!(ticks < 50);
        }
        assert!(state.boats[0].is_returning());
        // Snapped onto the alert before heading back.
        assert!(state.boats[0].position.planar_distance(position) < 1e-12);

        run_ticks(&mut state, 40);
        assert!(state.boats[0].is_available());
        assert_eq!(state.boats[0].position, alpha);
    }

    #[test]
    fn removed_target_sends_boat_home_on_next_tick() {
        let mut state = state_with_fleet();
        state.alerts.push(alert_at("SOS-1", Coordinate::new(24.90, 67.05)));
        state.on_tick(TickKind::Assignment);
        state.on_tick(TickKind::BoatMovement);
        let responder = state.boats.iter().position(|b| b.target().is_some()).unwrap();

        state.alerts.clear();
        let requests = state.on_tick(TickKind::BoatMovement);
        assert!(state.boats[responder].is_returning());
        assert!(state.boats[responder].target().is_none());
        assert_eq!(requests[0].leg, Leg::Home);
    }

    #[test]
    fn paused_simulation_freezes_positions() {
        let mut state = state_with_fleet();
        state.alerts.push(alert_at("SOS-1", Coordinate::new(24.95, 67.05)));
        state.on_tick(TickKind::Assignment);
        state.on_tick(TickKind::BoatMovement);
        let before: Vec<Coordinate> = state.boats.iter().map(|b| b.position).collect();

        state.set_running(false);
        for _ in 0..25 {
            assert!(state.on_tick(TickKind::BoatMovement).is_empty());
            state.on_tick(TickKind::Assignment);
        }
        let after: Vec<Coordinate> = state.boats.iter().map(|b| b.position).collect();
        assert_eq!(before, after);

        state.set_running(true);
        state.on_tick(TickKind::BoatMovement);
        assert_ne!(state.boats.iter().map(|b| b.position).collect::<Vec<_>>(), after);
    }

    #[test]
    fn clustered_alerts_are_served_through_their_safe_point() {
        let mut state = state_with_fleet();
        let base = Coordinate::new(24.900, 67.000);
        for (i, offset) in [0.0, 0.0008, 0.0016].iter().enumerate() {
            state
                .alerts
                .push(alert_at(&format!("SOS-{}", i), Coordinate::new(base.lat + offset, base.lon)));
        }
        assert_eq!(state.cluster_open_alerts(), 1);
        assert_eq!(state.cluster_open_alerts(), 0);
        let sp_id = state.safe_points[0].id.clone();
        assert!(state.alerts.iter().all(|a| a.safe_point_id.as_deref() == Some(sp_id.as_str())));

        state.on_tick(TickKind::Assignment);
        let served_by = state.safe_points[0].assigned_boat_id.clone().unwrap();
        assert!(state.boats.iter().all(|b| b.target_alert_id().is_none()));

        run_ticks(&mut state, 200);
        assert!(state.safe_points.is_empty());
        assert!(state.alerts.is_empty());
        let boat = state.boats.iter().find(|b| b.id == served_by).unwrap();
        assert!(boat.target().is_none());
    }

    #[test]
    fn returning_boat_is_rerouted_to_new_alert() {
        let mut state = state_with_fleet();
        for boat in state.boats.iter_mut() {
            boat.respond_to(Target::Alert("elsewhere".to_string()));
        }
        state.boats[2].move_to(Coordinate::new(24.95, 67.10));
        state.boats[2].return_home();
        state.boats[3].move_to(Coordinate::new(24.80, 67.00));
        state.boats[3].return_home();
        state.alerts.push(alert_at("SOS-9", Coordinate::new(24.951, 67.10)));

        let requests = state.on_tick(TickKind::Assignment);
        assert_eq!(requests.len(), 1);
        assert_eq!(state.boats[2].target_alert_id(), Some("SOS-9"));
        assert!(state.boats[3].is_returning());
    }

    #[test]
    fn stale_routes_are_discarded() {
        let mut state = state_with_fleet();
        let leg = Leg::Target(Target::Alert("SOS-1".to_string()));
        let generation = state.boats[0].leg_generation();
        assert!(!state.apply_route("B-01", &leg, generation, vec![Coordinate::new(0.0, 0.0)]));

        state.boats[0].respond_to(Target::Alert("SOS-1".to_string()));
        let generation = state.boats[0].leg_generation();
        assert!(state.apply_route("B-01", &leg, generation, vec![Coordinate::new(0.0, 0.0)]));
        assert!(state.route("B-01").is_some());
        assert!(!state.apply_route("B-01", &Leg::Home, generation, vec![Coordinate::new(0.0, 0.0)]));
        assert!(!state.apply_route("B-99", &leg, generation, vec![]));
    }

    #[test]
    fn home_route_from_an_earlier_return_is_discarded() {
        let mut state = state_with_fleet();
        let home = state.boats[0].home_base();
        let far = Coordinate::new(24.95, home.lon);
        state.boats[0].respond_to(Target::Alert("elsewhere".to_string()));
        state.boats[0].move_to(far);
        state.boats[0].return_home();
        let first_trip_home = RouteRequest::for_boat(&state.boats[0], Leg::Home, home);

        // Redirected to an alert a few meters away, rescues it and turns home again.
        state.alerts.push(alert_at("SOS-1", Coordinate::new(far.lat - 0.0001, far.lon)));
        assert!(!state.assign_boat("SOS-1", "B-01").is_empty());
        let requests = state.on_tick(TickKind::BoatMovement);
        assert!(state.alerts.is_empty());
        assert!(state.boats[0].is_returning());
        let second_trip_home = requests
            .into_iter()
            .find(|r| r.boat_id == "B-01")
            .unwrap();
        assert_eq!(second_trip_home.leg, Leg::Home);
        assert_ne!(second_trip_home.generation, first_trip_home.generation);

        let late = vec![first_trip_home.from, home];
        assert!(!state.apply_route("B-01", &Leg::Home, first_trip_home.generation, late));
        assert!(state.route("B-01").is_none());

        let before = state.boats[0].position.planar_distance(home);
        state.on_tick(TickKind::BoatMovement);
        assert!(state.boats[0].position.planar_distance(home) < before);

        let fresh = vec![home];
        assert!(state.apply_route("B-01", &Leg::Home, second_trip_home.generation, fresh));
    }

    #[test]
    fn safe_point_without_members_is_dropped() {
        let mut state = state_with_fleet();
        for (id, lat) in [("SOS-A", 24.900), ("SOS-B", 24.904)] {
            state.alerts.push(alert_at(id, Coordinate::new(lat, 67.0)));
        }
        assert_eq!(state.cluster_open_alerts(), 1);

        assert!(state.remove_alert("SOS-A"));
        assert_eq!(state.safe_points.len(), 1);
        assert_eq!(state.safe_points[0].assigned_alert_ids, vec!["SOS-A", "SOS-B"]);
        assert!(state.remove_alert("SOS-B"));
        assert!(state.safe_points.is_empty());

        state.on_tick(TickKind::Assignment);
        assert!(state.boats.iter().all(|b| b.is_available()));
    }
}
