//! Random alerts and flood zones for the simulation triggers.

use crate::geo::Coordinate;
use crate::models::{new_id, AlertCategory, FloodZone, Region, Severity, SosAlert};
use chrono::Utc;
use rand::Rng;

pub const VILLAGE_NAMES: [&str; 10] = [
    "Gadap Town",
    "Bin Qasim",
    "Shah Faisal",
    "Gulshan-e-Iqbal",
    "Liaquatabad",
    "Nazimabad",
    "New Karachi",
    "Orangi Town",
    "Saddar",
    "Jamshed Town",
];

const KM_PER_DEGREE: f64 = 111.32;
const HOTSPOT_JITTER_KM: f64 = 0.6;

fn offset_km(origin: Coordinate, north_km: f64, east_km: f64) -> Coordinate {
    Coordinate::new(
        origin.lat + north_km / KM_PER_DEGREE,
        origin.lon + east_km / (KM_PER_DEGREE * origin.lat.to_radians().cos()),
    )
}

/// Uniform point in the disk of `radius_km` around `center`.
fn point_in_disk<R: Rng>(center: Coordinate, radius_km: f64, rng: &mut R) -> Coordinate {
    let r = radius_km * rng.gen::<f64>().sqrt();
    let theta = rng.gen_range(0.0..std::f64::consts::TAU);
    offset_km(center, r * theta.cos(), r * theta.sin())
}

fn point_in_region<R: Rng>(region: &Region, rng: &mut R) -> Coordinate {
    Coordinate::new(
        region.center.lat + (rng.gen::<f64>() - 0.5) * region.lat_span,
        region.center.lon + (rng.gen::<f64>() - 0.5) * region.lon_span,
    )
}

pub fn random_alert_at<R: Rng>(position: Coordinate, rng: &mut R) -> SosAlert {
    let village = rng.gen_range(0..VILLAGE_NAMES.len());
    SosAlert {
        id: new_id("SOS"),
        village_id: format!("V-{:02}", village),
        village_name: VILLAGE_NAMES[village].to_string(),
        position,
        category: AlertCategory::ALL[rng.gen_range(0..AlertCategory::ALL.len())],
        severity: Severity::new(rng.gen_range(1..=3)).unwrap_or(Severity::LOW),
        people_affected: rng.gen_range(5..55),
        created_at: Utc::now(),
        safe_point_id: None,
        current_position: None,
        reached_safe_point: false,
    }
}

/// New alert somewhere the zone covers.
pub fn random_alert_in_zone<R: Rng>(zone: &FloodZone, region: &Region, rng: &mut R) -> SosAlert {
    let position = if zone.is_giant_flood {
        point_in_region(region, rng)
    } else {
        point_in_disk(zone.center, zone.radius_km, rng)
    };
    random_alert_at(position, rng)
}

pub fn random_regional_zone<R: Rng>(region: &Region, rng: &mut R) -> FloodZone {
    FloodZone {
        id: new_id("FZ"),
        center: point_in_region(region, rng),
        radius_km: rng.gen_range(2.0..=5.0),
        is_giant_flood: false,
    }
}

/// A region-wide flood and its first wave of 25-40 alerts, bunched around a
/// handful of hotspots so that many of them can share safe points.
pub fn giant_flood<R: Rng>(region: &Region, rng: &mut R) -> (FloodZone, Vec<SosAlert>) {
    let half_diagonal_km = (region.lat_span.hypot(region.lon_span) / 2.0) * KM_PER_DEGREE;
    let zone = FloodZone {
        id: new_id("FZ"),
        center: region.center,
        radius_km: half_diagonal_km,
        is_giant_flood: true,
    };

    let hotspots: Vec<Coordinate> = (0..rng.gen_range(4..=8))
        .map(|_| point_in_region(region, rng))
        .collect();
    let count = rng.gen_range(25..=40);
    let alerts = (0..count)
        .map(|_| {
            let hotspot = hotspots[rng.gen_range(0..hotspots.len())];
            let jittered = point_in_disk(hotspot, HOTSPOT_JITTER_KM, rng);
            // Hotspots near the edge must not spill alerts outside the region.
            let position = if zone.covers(jittered, region) { jittered } else { hotspot };
            random_alert_at(position, rng)
        })
        .collect();

    (zone, alerts)
}
