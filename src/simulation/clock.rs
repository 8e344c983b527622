use super::runtime::SimulationHandle;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Assignment,
    AlertMovement,
    BoatMovement,
}

/// Drives the three periodic tasks at independent rates. Pausing is handled by
/// the simulation itself, which ignores ticks while stopped, so positions and
/// routes survive a pause untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    pub assignment: Duration,
    pub alert_movement: Duration,
    pub boat_movement: Duration,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            assignment: Duration::from_millis(1000),
            alert_movement: Duration::from_millis(300),
            boat_movement: Duration::from_millis(300),
        }
    }
}

impl SimulationClock {
    pub fn start(self, handle: SimulationHandle) -> JoinHandle<()> {
        info!(
            "Clock started: assignment every {:?}, alerts every {:?}, boats every {:?}",
            self.assignment, self.alert_movement, self.boat_movement
        );
        tokio::spawn(async move {
            let mut assignment = interval(self.assignment);
            let mut alerts = interval(self.alert_movement);
            let mut boats = interval(self.boat_movement);
            for timer in [&mut assignment, &mut alerts, &mut boats] {
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            }

            loop {
                let kind = tokio::select! {
                    _ = assignment.tick() => TickKind::Assignment,
                    _ = alerts.tick() => TickKind::AlertMovement,
                    _ = boats.tick() => TickKind::BoatMovement,
                };
                if handle.tick(kind).await.is_err() {
                    debug!("Simulation gone, clock stopping");
                    break;
                }
            }
        })
    }
}
