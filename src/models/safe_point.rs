use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePoint {
    pub id: String,
    #[serde(flatten)]
    pub position: Coordinate,
    /// Fixed when the safe point is created.
    pub assigned_alert_ids: Vec<String>,
    pub assigned_boat_id: Option<String>,
}
