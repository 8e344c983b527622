use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    Alert(String),
    SafePoint(String),
}

/// A responding boat always carries exactly one target; the other states carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "target", rename_all = "lowercase")]
pub enum BoatStatus {
    Available,
    Responding(Target),
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescueBoat {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub position: Coordinate,
    #[serde(flatten)]
    pub status: BoatStatus,
    pub capacity: u32,
    pub last_update: DateTime<Utc>,
    home_base: Coordinate,
    /// Bumped on every status change; route results carry the value they were
    /// requested under.
    #[serde(skip)]
    leg_generation: u64,
}

impl RescueBoat {
    /// New boats start docked at their home base.
    pub fn new(id: impl Into<String>, name: impl Into<String>, home_base: Coordinate, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: home_base,
            status: BoatStatus::Available,
            capacity,
            last_update: Utc::now(),
            home_base,
            leg_generation: 0,
        }
    }

    pub fn home_base(&self) -> Coordinate {
        self.home_base
    }

    pub fn leg_generation(&self) -> u64 {
        self.leg_generation
    }

    pub fn target(&self) -> Option<&Target> {
        match &self.status {
            BoatStatus::Responding(target) => Some(target),
            _ => None,
        }
    }

    pub fn target_alert_id(&self) -> Option<&str> {
        match self.target() {
            Some(Target::Alert(id)) => Some(id),
            _ => None,
        }
    }

    pub fn target_safe_point_id(&self) -> Option<&str> {
        match self.target() {
            Some(Target::SafePoint(id)) => Some(id),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == BoatStatus::Available
    }

    pub fn is_returning(&self) -> bool {
        self.status == BoatStatus::Returning
    }

    pub fn respond_to(&mut self, target: Target) {
        self.status = BoatStatus::Responding(target);
        self.next_leg();
    }

    pub fn return_home(&mut self) {
        self.status = BoatStatus::Returning;
        self.next_leg();
    }

    pub fn dock(&mut self) {
        self.position = self.home_base;
        self.status = BoatStatus::Available;
        self.next_leg();
    }

    pub fn move_to(&mut self, position: Coordinate) {
        self.position = position;
        self.touch();
    }

    fn next_leg(&mut self) {
        self.leg_generation += 1;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_update = Utc::now();
    }
}
