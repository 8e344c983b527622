use crate::geo::Coordinate;
use crate::models::RescueBoat;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FleetEntry {
    id: String,
    name: String,
    lat: f64,
    lon: f64,
    capacity: u32,
}

/// Five boats stationed around Karachi harbour.
pub fn default_fleet() -> Vec<RescueBoat> {
    vec![
        RescueBoat::new("B-01", "Rescue Alpha", Coordinate::new(24.8712, 67.0456), 15),
        RescueBoat::new("B-02", "Rescue Bravo", Coordinate::new(24.8523, 67.0987), 20),
        RescueBoat::new("B-03", "Rescue Charlie", Coordinate::new(24.8845, 67.1123), 12),
        RescueBoat::new("B-04", "Rescue Delta", Coordinate::new(24.8321, 67.0678), 18),
        RescueBoat::new("B-05", "Rescue Echo", Coordinate::new(24.8654, 67.1345), 15),
    ]
}

pub fn parse_fleet(json: &str) -> Result<Vec<RescueBoat>> {
    let entries: Vec<FleetEntry> = serde_json::from_str(json)?;
    if entries.is_empty() {
        anyhow::bail!("fleet definition has no boats");
    }
    Ok(entries
        .into_iter()
        .map(|e| RescueBoat::new(e.id, e.name, Coordinate::new(e.lat, e.lon), e.capacity))
        .collect())
}

pub fn load_fleet(path: &Path) -> Result<Vec<RescueBoat>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading fleet file {}", path.display()))?;
    parse_fleet(&json).with_context(|| format!("parsing fleet file {}", path.display()))
}
