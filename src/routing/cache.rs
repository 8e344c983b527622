use crate::geo::Coordinate;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

struct CachedRoute {
    waypoints: Vec<Coordinate>,
    stored_at: Instant,
}

/// Directional route cache keyed by endpoints rounded to 5 decimals.
/// Bounded by `capacity` (0 = unbounded) with oldest-inserted eviction, and
/// optionally expiring entries after `ttl`.
pub struct RouteCache {
    entries: HashMap<String, CachedRoute>,
    order: VecDeque<String>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl RouteCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            ttl,
        }
    }

    pub fn key(from: Coordinate, to: Coordinate) -> String {
        format!(
            "{:.5},{:.5}-{:.5},{:.5}",
            from.lat, from.lon, to.lat, to.lon
        )
    }

    pub fn get(&mut self, from: Coordinate, to: Coordinate) -> Option<Vec<Coordinate>> {
        let key = Self::key(from, to);
        let expired = match (self.entries.get(&key), self.ttl) {
            (None, _) => return None,
            (Some(entry), Some(ttl)) => entry.stored_at.elapsed() >= ttl,
            (Some(_), None) => false,
        };
        if expired {
            self.entries.remove(&key);
            self.order.retain(|k| k != &key);
            return None;
        }
        self.entries.get(&key).map(|entry| entry.waypoints.clone())
    }

    pub fn insert(&mut self, from: Coordinate, to: Coordinate, waypoints: Vec<Coordinate>) {
        let key = Self::key(from, to);
        let entry = CachedRoute {
            waypoints,
            stored_at: Instant::now(),
        };
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
        }
        if self.capacity > 0 {
            while self.entries.len() > self.capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
