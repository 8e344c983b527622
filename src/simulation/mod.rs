//! Owned simulation state and the single task that mutates it.

mod actions;
pub mod clock;
pub mod runtime;
pub mod snapshot;
pub mod state;

pub use clock::{SimulationClock, TickKind};
pub use runtime::{spawn_simulation, Action, ActionOutcome, SimulationHandle};
pub use snapshot::SimulationSnapshot;
pub use state::{SimulationSettings, SimulationState};

use thiserror::Error;

/// Refusals reported back to whoever triggered an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no active flood zone, simulate a flood first")]
    NoFloodZone,
    #[error("unknown alert {0}")]
    UnknownAlert(String),
}
