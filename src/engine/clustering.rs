use crate::geo::{centroid, distance_km};
use crate::models::{new_id, SafePoint, SosAlert};

/// Proximity under which alerts share a rendezvous.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 1.0;

/// Single greedy pass over ungrouped alerts. Each unprocessed alert claims every
/// other unprocessed alert within `radius_km` of it; a claimed alert is never
/// reconsidered. Alerts without neighbours stay individual.
pub fn group_nearby_alerts(alerts: &[SosAlert], radius_km: f64) -> Vec<SafePoint> {
    let candidates: Vec<&SosAlert> = alerts.iter().filter(|a| !a.is_grouped()).collect();
    let mut processed = vec![false; candidates.len()];
    let mut safe_points = Vec::new();

    for (i, seed) in candidates.iter().enumerate() {
        if processed[i] {
            continue;
        }

        let neighbours: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(j, other)| {
                *j != i && !processed[*j] && distance_km(seed.position, other.position) <= radius_km
            })
            .map(|(j, _)| j)
            .collect();

        if neighbours.is_empty() {
            continue;
        }

        let members: Vec<usize> = std::iter::once(i).chain(neighbours).collect();
        let positions: Vec<_> = members.iter().map(|&m| candidates[m].position).collect();
        let Some(center) = centroid(&positions) else {
            continue;
        };
        for &m in &members {
            processed[m] = true;
        }

        safe_points.push(SafePoint {
            id: new_id("SP"),
            position: center,
            assigned_alert_ids: members.iter().map(|&m| candidates[m].id.clone()).collect(),
            assigned_boat_id: None,
        });
    }

    safe_points
}
