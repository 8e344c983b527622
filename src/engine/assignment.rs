//! Greedy nearest-pair dispatch of idle boats to open targets.
//!
//! Matching sorts every (boat, target) pair by great-circle distance and takes
//! pairs whose boat and target are both still free. This is not a minimum-cost
//! bipartite matching; a globally better pairing can exist.

use crate::geo::{distance_km, Coordinate};
use crate::models::{RescueBoat, SafePoint, SosAlert, Target};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub boat_id: String,
    pub target: Target,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPlan {
    pub alert_assignments: Vec<Assignment>,
    pub safe_point_assignments: Vec<Assignment>,
}

impl AssignmentPlan {
    pub fn is_empty(&self) -> bool {
        self.alert_assignments.is_empty() && self.safe_point_assignments.is_empty()
    }

    pub fn into_assignments(self) -> impl Iterator<Item = Assignment> {
        self.safe_point_assignments
            .into_iter()
            .chain(self.alert_assignments)
    }
}

/// Targets nobody serves yet: safe points without a boat, and individual alerts
/// that are ungrouped, not targeted by any boat and not pending.
pub fn open_targets(
    boats: &[RescueBoat],
    alerts: &[SosAlert],
    safe_points: &[SafePoint],
    pending: &HashSet<String>,
) -> Vec<(Target, Coordinate)> {
    let claimed: HashSet<&str> = boats.iter().filter_map(|b| b.target_alert_id()).collect();

    let safe_point_targets = safe_points
        .iter()
        .filter(|sp| sp.assigned_boat_id.is_none())
        .map(|sp| (Target::SafePoint(sp.id.clone()), sp.position));

    let alert_targets = alerts
        .iter()
        .filter(|a| !a.is_grouped() && !claimed.contains(a.id.as_str()) && !pending.contains(&a.id))
        .map(|a| (Target::Alert(a.id.clone()), a.live_position()));

    safe_point_targets.chain(alert_targets).collect()
}

/// Matches available boats to open targets. Accepted alert ids are added to
/// `pending`; the caller removes them once the boat state is committed.
pub fn compute_assignments(
    boats: &[RescueBoat],
    alerts: &[SosAlert],
    safe_points: &[SafePoint],
    pending: &mut HashSet<String>,
) -> AssignmentPlan {
    let idle: Vec<&RescueBoat> = boats.iter().filter(|b| b.is_available()).collect();
    let targets = open_targets(boats, alerts, safe_points, pending);
    let mut plan = AssignmentPlan::default();
    if idle.is_empty() || targets.is_empty() {
        return plan;
    }

    let mut pairs: Vec<(usize, usize, f64)> = Vec::with_capacity(idle.len() * targets.len());
    for (b, boat) in idle.iter().enumerate() {
        for (t, (_, position)) in targets.iter().enumerate() {
            pairs.push((b, t, distance_km(boat.position, *position)));
        }
    }
    pairs.sort_by(|x, y| x.2.total_cmp(&y.2));

    let mut boat_taken = vec![false; idle.len()];
    let mut target_taken = vec![false; targets.len()];

    for (b, t, distance) in pairs {
        if boat_taken[b] || target_taken[t] {
            continue;
        }
        boat_taken[b] = true;
        target_taken[t] = true;

        let target = targets[t].0.clone();
        let assignment = Assignment {
            boat_id: idle[b].id.clone(),
            target: target.clone(),
            distance_km: distance,
        };
        match target {
            Target::Alert(id) => {
                pending.insert(id);
                plan.alert_assignments.push(assignment);
            }
            Target::SafePoint(_) => plan.safe_point_assignments.push(assignment),
        }
    }

    plan
}

/// Picks the single closest (returning boat, open target) pair, if any.
/// At most one boat is redirected per call.
pub fn reroute_returning_boats(
    boats: &[RescueBoat],
    alerts: &[SosAlert],
    safe_points: &[SafePoint],
    pending: &HashSet<String>,
) -> Option<Assignment> {
    let targets = open_targets(boats, alerts, safe_points, pending);
    if targets.is_empty() {
        return None;
    }

    boats
        .iter()
        .filter(|b| b.is_returning())
        .flat_map(|boat| {
            targets.iter().map(move |(target, position)| Assignment {
                boat_id: boat.id.clone(),
                target: target.clone(),
                distance_km: distance_km(boat.position, *position),
            })
        })
        .min_by(|x, y| x.distance_km.total_cmp(&y.distance_km))
}
