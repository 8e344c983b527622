use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Cruising speed used for human-facing arrival estimates.
pub const DEFAULT_SPEED_KMH: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Straight-line offset in degree space. Per-tick movement and the arrival
    /// threshold are both expressed in these units.
    pub fn planar_distance(&self, other: Coordinate) -> f64 {
        let dx = other.lon - self.lon;
        let dy = other.lat - self.lat;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves `step` degrees toward `target`, landing exactly on it when the
    /// remaining gap is smaller than the step.
    pub fn step_toward(self, target: Coordinate, step: f64) -> Coordinate {
        let dist = self.planar_distance(target);
        if dist <= step || dist == 0.0 {
            return target;
        }
        let ratio = step / dist;
        Coordinate {
            lat: self.lat + (target.lat - self.lat) * ratio,
            lon: self.lon + (target.lon - self.lon) * ratio,
        }
    }
}

/// Great-circle distance in kilometers (Haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1}km", km)
    }
}

pub fn estimate_arrival(distance_km: f64, speed_kmh: f64) -> String {
    let minutes = (distance_km / speed_kmh * 60.0).round() as i64;
    if minutes < 1 {
        "<1 min".to_string()
    } else if minutes < 60 {
        format!("~{} min", minutes)
    } else {
        format!("~{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Arithmetic mean of the given points, `None` for an empty slice.
pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    Some(Coordinate::new(lat / n, lon / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KARACHI: Coordinate = Coordinate {
        lat: 24.8607,
        lon: 67.0011,
    };

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let pairs = [
            (KARACHI, Coordinate::new(24.8712, 67.0456)),
            (Coordinate::new(-33.86, 151.2), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
            assert_eq!(distance_km(a, a), 0.0);
            assert!(distance_km(a, b) > 0.0);
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn formats_distance_in_meters_below_one_km() {
        assert_eq!(format_distance(0.4567), "457m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(12.345), "12.3km");
    }

    #[test]
    fn arrival_estimate_buckets() {
        assert_eq!(estimate_arrival(0.1, DEFAULT_SPEED_KMH), "<1 min");
        assert_eq!(estimate_arrival(5.0, DEFAULT_SPEED_KMH), "~20 min");
        assert_eq!(estimate_arrival(30.0, DEFAULT_SPEED_KMH), "~2h 0m");
        assert_eq!(estimate_arrival(20.0, DEFAULT_SPEED_KMH), "~1h 20m");
    }

    #[test]
    fn step_toward_never_overshoots() {
        let start = Coordinate::new(0.0, 0.0);
        let target = Coordinate::new(0.0, 0.005);
        let mid = start.step_toward(target, 0.002);
        assert!((mid.lon - 0.002).abs() < 1e-12);
        assert_eq!(mid.step_toward(target, 0.01), target);
    }

    #[test]
    fn centroid_of_points() {
        assert!(centroid(&[]).is_none());
        let c = centroid(&[Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)]).unwrap();
        assert_eq!(c, Coordinate::new(2.0, 3.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coordinate() -> impl Strategy<Value = Coordinate> {
            (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
        }

        proptest! {
            #[test]
            fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
                prop_assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
            }

            #[test]
            fn distance_to_self_is_zero(a in coordinate()) {
                prop_assert_eq!(distance_km(a, a), 0.0);
            }

            #[test]
            fn distance_is_bounded_by_half_the_globe(a in coordinate(), b in coordinate()) {
                let d = distance_km(a, b);
                prop_assert!(d >= 0.0);
                prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
            }

            #[test]
            fn step_toward_never_passes_target(
                a in coordinate(),
                b in coordinate(),
                step in 0.0f64..5.0,
            ) {
                let next = a.step_toward(b, step);
                prop_assert!(a.planar_distance(next) <= step + 1e-9 || next == b);
                prop_assert!(next.planar_distance(b) <= a.planar_distance(b) + 1e-9);
            }
        }
    }
}
