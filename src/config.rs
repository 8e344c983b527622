use crate::engine::MotionSettings;
use crate::geo::Coordinate;
use crate::models::Region;
use crate::simulation::{SimulationClock, SimulationSettings};
use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub routing_enabled: bool,
    pub osrm_base_url: String,
    pub routing_timeout_secs: u64,
    pub route_cache_capacity: usize,
    pub route_cache_ttl_secs: u64,
    pub assignment_interval_ms: u64,
    pub alert_move_interval_ms: u64,
    pub boat_move_interval_ms: u64,
    pub boat_speed_deg: f64,
    pub arrival_threshold_deg: f64,
    pub cluster_radius_km: f64,
    pub region_center_lat: f64,
    pub region_center_lon: f64,
    pub region_lat_span: f64,
    pub region_lon_span: f64,
    pub fleet_file: Option<PathBuf>,
    pub start_paused: bool,
    pub log_level: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let routing_enabled = env_or("ROUTING_ENABLED", true);
        let osrm_base_url = env::var("OSRM_BASE_URL")
            .unwrap_or_else(|_| "https://router.project-osrm.org".to_string());
        let routing_timeout_secs = env_or("ROUTING_TIMEOUT_SECS", 10);
        let route_cache_capacity = env_or("ROUTE_CACHE_CAPACITY", 512);
        let route_cache_ttl_secs = env_or("ROUTE_CACHE_TTL_SECS", 0);

        let assignment_interval_ms = env_or("ASSIGNMENT_INTERVAL_MS", 1000);
        let alert_move_interval_ms = env_or("ALERT_MOVE_INTERVAL_MS", 300);
        let boat_move_interval_ms = env_or("BOAT_MOVE_INTERVAL_MS", 300);

        let boat_speed_deg = env_or("BOAT_SPEED_DEG", 0.002);
        let arrival_threshold_deg = env_or("ARRIVAL_THRESHOLD_DEG", 0.003);
        let cluster_radius_km = env_or("CLUSTER_RADIUS_KM", 1.0);

        let region_center_lat = env_or("REGION_CENTER_LAT", 24.8607);
        let region_center_lon = env_or("REGION_CENTER_LON", 67.0011);
        let region_lat_span = env_or("REGION_LAT_SPAN", 0.1);
        let region_lon_span = env_or("REGION_LON_SPAN", 0.2);

        let fleet_file = env::var("FLEET_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let start_paused = env_or("START_PAUSED", false);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            routing_enabled,
            osrm_base_url,
            routing_timeout_secs,
            route_cache_capacity,
            route_cache_ttl_secs,
            assignment_interval_ms,
            alert_move_interval_ms,
            boat_move_interval_ms,
            boat_speed_deg,
            arrival_threshold_deg,
            cluster_radius_km,
            region_center_lat,
            region_center_lon,
            region_lat_span,
            region_lon_span,
            fleet_file,
            start_paused,
            log_level,
        })
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            motion: MotionSettings {
                boat_speed: self.boat_speed_deg,
                arrival_threshold: self.arrival_threshold_deg,
            },
            cluster_radius_km: self.cluster_radius_km,
            region: Region {
                center: Coordinate::new(self.region_center_lat, self.region_center_lon),
                lat_span: self.region_lat_span,
                lon_span: self.region_lon_span,
            },
        }
    }

    pub fn clock(&self) -> SimulationClock {
        SimulationClock {
            assignment: Duration::from_millis(self.assignment_interval_ms.max(1)),
            alert_movement: Duration::from_millis(self.alert_move_interval_ms.max(1)),
            boat_movement: Duration::from_millis(self.boat_move_interval_ms.max(1)),
        }
    }

    pub fn routing_timeout(&self) -> Duration {
        Duration::from_secs(self.routing_timeout_secs)
    }

    /// `None` keeps cached routes for the life of the process.
    pub fn route_cache_ttl(&self) -> Option<Duration> {
        (self.route_cache_ttl_secs > 0).then(|| Duration::from_secs(self.route_cache_ttl_secs))
    }
}
