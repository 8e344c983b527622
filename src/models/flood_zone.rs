use crate::geo::{distance_km, Coordinate};
use serde::{Deserialize, Serialize};

/// Rectangular operating area the simulation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub lat_span: f64,
    pub lon_span: f64,
}

impl Region {
    pub fn contains(&self, point: Coordinate) -> bool {
        (point.lat - self.center.lat).abs() <= self.lat_span / 2.0
            && (point.lon - self.center.lon).abs() <= self.lon_span / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodZone {
    pub id: String,
    #[serde(flatten)]
    pub center: Coordinate,
    pub radius_km: f64,
    pub is_giant_flood: bool,
}

impl FloodZone {
    /// A giant flood covers the whole region whatever its radius says.
    pub fn covers(&self, point: Coordinate, region: &Region) -> bool {
        if self.is_giant_flood {
            region.contains(point)
        } else {
            distance_km(self.center, point) <= self.radius_km
        }
    }
}
