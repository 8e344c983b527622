use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Flood,
    Stranded,
    Medical,
    Supplies,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 4] = [
        AlertCategory::Flood,
        AlertCategory::Stranded,
        AlertCategory::Medical,
        AlertCategory::Supplies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AlertCategory::Flood => "Flooding Emergency",
            AlertCategory::Stranded => "People Stranded",
            AlertCategory::Medical => "Medical Emergency",
            AlertCategory::Supplies => "Supplies Needed",
        }
    }
}

/// 1 = low, 3 = critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const LOW: Severity = Severity(1);
    pub const CRITICAL: Severity = Severity(3);

    pub fn new(level: u8) -> Option<Self> {
        (1..=3).contains(&level).then_some(Severity(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Severity::new(level).ok_or_else(|| format!("severity must be 1-3, got {}", level))
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosAlert {
    pub id: String,
    pub village_id: String,
    pub village_name: String,
    #[serde(flatten)]
    pub position: Coordinate,
    pub category: AlertCategory,
    pub severity: Severity,
    pub people_affected: u32,
    pub created_at: DateTime<Utc>,
    /// Rendezvous this alert migrates toward. Grouped alerts are never
    /// assigned a boat individually.
    pub safe_point_id: Option<String>,
    /// Live position while migrating; unset until migration starts.
    pub current_position: Option<Coordinate>,
    #[serde(default)]
    pub reached_safe_point: bool,
}

impl SosAlert {
    pub fn is_grouped(&self) -> bool {
        self.safe_point_id.is_some()
    }

    pub fn live_position(&self) -> Coordinate {
        self.current_position.unwrap_or(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_rejects_out_of_range_levels() {
        assert!(Severity::new(0).is_none());
        assert!(Severity::new(4).is_none());
        assert_eq!(Severity::new(2).map(|s| s.level()), Some(2));
        assert!(serde_json::from_str::<Severity>("5").is_err());
    }

    #[test]
    fn alert_serializes_flat_coordinates() {
        let alert = SosAlert {
            id: "SOS-000001".to_string(),
            village_id: "V-03".to_string(),
            village_name: "Gulshan-e-Iqbal".to_string(),
            position: Coordinate::new(24.86, 67.0),
            category: AlertCategory::Medical,
            severity: Severity::CRITICAL,
            people_affected: 12,
            created_at: Utc::now(),
            safe_point_id: None,
            current_position: None,
            reached_safe_point: false,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["lat"], 24.86);
        assert_eq!(json["category"], "medical");
        assert_eq!(json["severity"], 3);
        assert_eq!(alert.live_position(), alert.position);
    }
}
