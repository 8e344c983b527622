//! Street routing: an opaque lookup collaborator behind a directional cache,
//! plus the constant-step polyline walk the movement engine uses.

mod cache;
mod osrm;

pub use cache::RouteCache;
pub use osrm::OsrmClient;

use crate::geo::Coordinate;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// External routing service. `Ok(None)` means the service answered without a route.
pub trait RouteLookup: Send + Sync {
    fn lookup(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<Coordinate>>>>;
}

#[derive(Clone)]
pub struct RouteProvider {
    lookup: Option<Arc<dyn RouteLookup>>,
    cache: Arc<Mutex<RouteCache>>,
}

impl RouteProvider {
    pub fn new(lookup: Arc<dyn RouteLookup>, cache: RouteCache) -> Self {
        Self {
            lookup: Some(lookup),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Provider that never yields a route; every leg is flown straight.
    pub fn disabled() -> Self {
        Self {
            lookup: None,
            cache: Arc::new(Mutex::new(RouteCache::new(0, None))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Never fails: any routing problem yields `None` and nothing is cached.
    pub async fn get_route(&self, from: Coordinate, to: Coordinate) -> Option<Vec<Coordinate>> {
        let lookup = self.lookup.as_ref()?;

        let cached = self.lock_cache().get(from, to);
        if let Some(hit) = cached {
            debug!("Route cache hit {}", RouteCache::key(from, to));
            return Some(hit);
        }

        match lookup.lookup(from, to).await {
            Ok(Some(waypoints)) if !waypoints.is_empty() => {
                self.lock_cache().insert(from, to, waypoints.clone());
                Some(waypoints)
            }
            Ok(_) => {
                warn!("No route found for {}", RouteCache::key(from, to));
                None
            }
            Err(e) => {
                warn!("Routing error for {}: {}", RouteCache::key(from, to), e);
                None
            }
        }
    }

    pub fn cached_routes(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, RouteCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Walks `step` degrees along `route` starting from `current`. Waypoints that
/// are fully reached are consumed; the returned route is the untraversed suffix.
pub fn advance_along_route(
    current: Coordinate,
    route: &[Coordinate],
    step: f64,
) -> (Coordinate, Vec<Coordinate>) {
    let mut remaining = step;
    let mut pos = current;
    let mut index = 0;

    while remaining > 0.0 && index < route.len() {
        let waypoint = route[index];
        let dist = pos.planar_distance(waypoint);
        if dist <= remaining {
            pos = waypoint;
            remaining -= dist;
            index += 1;
        } else {
            pos = pos.step_toward(waypoint, remaining);
            remaining = 0.0;
        }
    }

    (pos, route[index..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        calls: AtomicUsize,
        answer: Option<Vec<Coordinate>>,
        fail: bool,
    }

    impl RouteLookup for CountingLookup {
        fn lookup(
            &self,
            _from: Coordinate,
            _to: Coordinate,
        ) -> BoxFuture<'_, anyhow::Result<Option<Vec<Coordinate>>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let answer = self.answer.clone();
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    anyhow::bail!("connection refused");
                }
                Ok(answer)
            })
        }
    }

    fn provider(answer: Option<Vec<Coordinate>>, fail: bool) -> (RouteProvider, Arc<CountingLookup>) {
        let lookup = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            answer,
            fail,
        });
        (RouteProvider::new(lookup.clone(), RouteCache::new(16, None)), lookup)
    }

    #[tokio::test]
    async fn successful_routes_are_cached_per_direction() {
        let a = Coordinate::new(24.87, 67.04);
        let b = Coordinate::new(24.85, 67.09);
        let (provider, lookup) = provider(Some(vec![a, b]), false);

        assert_eq!(provider.get_route(a, b).await, Some(vec![a, b]));
        assert_eq!(provider.get_route(a, b).await, Some(vec![a, b]));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        // Reverse direction is a different key.
        provider.get_route(b, a).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cached_routes(), 2);
    }

    #[tokio::test]
    async fn failures_and_empty_routes_are_not_cached() {
        let a = Coordinate::new(24.87, 67.04);
        let b = Coordinate::new(24.85, 67.09);

        let (failing, lookup) = provider(None, true);
        assert!(failing.get_route(a, b).await.is_none());
        assert!(failing.get_route(a, b).await.is_none());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
        assert_eq!(failing.cached_routes(), 0);

        let (empty, _) = provider(Some(Vec::new()), false);
        assert!(empty.get_route(a, b).await.is_none());
        assert_eq!(empty.cached_routes(), 0);
    }

    #[tokio::test]
    async fn disabled_provider_yields_nothing() {
        let provider = RouteProvider::disabled();
        let a = Coordinate::new(0.0, 0.0);
        assert!(provider.get_route(a, Coordinate::new(1.0, 1.0)).await.is_none());
    }

    #[test]
    fn empty_route_leaves_position_unchanged() {
        let pos = Coordinate::new(1.0, 1.0);
        let (next, rest) = advance_along_route(pos, &[], 0.5);
        assert_eq!(next, pos);
        assert!(rest.is_empty());
    }

    #[test]
    fn consumes_reached_waypoints_and_stops_partway() {
        let start = Coordinate::new(0.0, 0.0);
        let route = vec![
            Coordinate::new(0.0, 0.001),
            Coordinate::new(0.0, 0.002),
            Coordinate::new(0.0, 0.010),
        ];
        let (pos, rest) = advance_along_route(start, &route, 0.0025);
        assert!((pos.lon - 0.0025).abs() < 1e-12);
        assert_eq!(rest, vec![Coordinate::new(0.0, 0.010)]);

        let (pos, rest) = advance_along_route(pos, &rest, 1.0);
        assert_eq!(pos, Coordinate::new(0.0, 0.010));
        assert!(rest.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn coordinate() -> impl Strategy<Value = Coordinate> {
            (-0.05f64..0.05, -0.05f64..0.05).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
        }

        proptest! {
            #[test]
            fn remaining_route_is_a_suffix(
                start in coordinate(),
                route in vec(coordinate(), 0..8),
                step in 0.0f64..0.05,
            ) {
                let (_, rest) = advance_along_route(start, &route, step);
                prop_assert!(route.ends_with(&rest));
            }

            #[test]
            fn walk_never_exceeds_step(
                start in coordinate(),
                route in vec(coordinate(), 0..8),
                step in 0.0f64..0.05,
            ) {
                let (pos, _) = advance_along_route(start, &route, step);
                prop_assert!(start.planar_distance(pos) <= step + 1e-9);
            }

            #[test]
            fn empty_route_means_position_is_last_waypoint(
                start in coordinate(),
                route in vec(coordinate(), 1..8),
                step in 0.0f64..0.05,
            ) {
                let (pos, rest) = advance_along_route(start, &route, step);
                if rest.is_empty() {
                    prop_assert_eq!(Some(&pos), route.last());
                }
            }
        }
    }
}
