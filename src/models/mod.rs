pub mod alert;
pub mod boat;
pub mod flood_zone;
pub mod safe_point;

pub use alert::{AlertCategory, Severity, SosAlert};
pub use boat::{BoatStatus, RescueBoat, Target};
pub use flood_zone::{FloodZone, Region};
pub use safe_point::SafePoint;

use uuid::Uuid;

/// Short unique id such as `SOS-1A2B3C4D`.
pub fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &raw[..8])
}
