use super::RouteLookup;
use crate::geo::Coordinate;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lon, lat].
    coordinates: Vec<[f64; 2]>,
}

impl OsrmResponse {
    fn into_waypoints(self) -> Option<Vec<Coordinate>> {
        if self.code != "Ok" {
            return None;
        }
        let route = self.routes.into_iter().next()?;
        debug!(
            "OSRM route: {:.0}m, {:.0}s, {} points",
            route.distance,
            route.duration,
            route.geometry.coordinates.len()
        );
        Some(
            route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate::new(lat, lon))
                .collect(),
        )
    }
}

/// OSRM HTTP client (`/route/v1/driving`).
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        )
    }

    async fn fetch(&self, from: Coordinate, to: Coordinate) -> anyhow::Result<Option<Vec<Coordinate>>> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .await?
            .error_for_status()?;
        let body: OsrmResponse = response.json().await?;
        Ok(body.into_waypoints())
    }
}

impl RouteLookup for OsrmClient {
    fn lookup(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<Coordinate>>>> {
        Box::pin(self.fetch(from, to))
    }
}
