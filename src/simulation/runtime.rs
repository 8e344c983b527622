//! Actor owning `SimulationState`. Clock ticks, route results and operator
//! actions all arrive as messages, so state is only ever touched by this task.

use super::clock::TickKind;
use super::snapshot::SimulationSnapshot;
use super::state::SimulationState;
use super::ActionError;
use crate::engine::{Leg, RouteRequest};
use crate::geo::Coordinate;
use crate::routing::RouteProvider;
use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMMAND_QUEUE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddAlert,
    SimulateFlood,
    SimulateGiantFlood,
    Assign { alert_id: String, boat_id: String },
    RemoveAlert { alert_id: String },
    Select { alert_id: Option<String> },
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    AlertAdded { alert_id: String },
    FloodZoneCreated { zone_id: String },
    GiantFlood { zone_id: String, alerts: usize, safe_points: usize },
    Dispatched { boat_id: String, alert_id: String },
    Ignored,
    AlertRemoved { alert_id: String, existed: bool },
    Selected { alert_id: Option<String> },
    Running { running: bool },
}

enum Command {
    Tick(TickKind),
    Perform(Action, oneshot::Sender<Result<ActionOutcome, ActionError>>),
    Snapshot(oneshot::Sender<SimulationSnapshot>),
}

struct RouteResolved {
    boat_id: String,
    leg: Leg,
    generation: u64,
    waypoints: Vec<Coordinate>,
}

#[derive(Clone)]
pub struct SimulationHandle {
    tx: mpsc::Sender<Command>,
}

impl SimulationHandle {
    pub async fn tick(&self, kind: TickKind) -> anyhow::Result<()> {
        self.tx
            .send(Command::Tick(kind))
            .await
            .map_err(|_| anyhow!("simulation stopped"))
    }

    pub async fn perform(&self, action: Action) -> anyhow::Result<Result<ActionOutcome, ActionError>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Perform(action, reply))
            .await
            .map_err(|_| anyhow!("simulation stopped"))?;
        Ok(rx.await?)
    }

    pub async fn snapshot(&self) -> anyhow::Result<SimulationSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| anyhow!("simulation stopped"))?;
        Ok(rx.await?)
    }
}

struct SimulationActor {
    state: SimulationState,
    provider: RouteProvider,
    rng: StdRng,
    route_tx: mpsc::UnboundedSender<RouteResolved>,
}

/// Starts the simulation task. It runs until every handle is dropped.
pub fn spawn_simulation(state: SimulationState, provider: RouteProvider) -> (SimulationHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let (route_tx, route_rx) = mpsc::unbounded_channel();
    let actor = SimulationActor {
        state,
        provider,
        rng: StdRng::from_entropy(),
        route_tx,
    };
    let task = tokio::spawn(actor.run(rx, route_rx));
    (SimulationHandle { tx }, task)
}

impl SimulationActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut routes: mpsc::UnboundedReceiver<RouteResolved>,
    ) {
        info!(
            "Simulation started with {} boats ({})",
            self.state.boats().len(),
            if self.state.is_running() { "running" } else { "paused" }
        );
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(resolved) = routes.recv() => {
                    if self.state.apply_route(
                        &resolved.boat_id,
                        &resolved.leg,
                        resolved.generation,
                        resolved.waypoints,
                    ) {
                        debug!(
                            "Route ready for {} ({} cached)",
                            resolved.boat_id,
                            self.provider.cached_routes()
                        );
                    }
                }
            }
        }
        info!("Simulation stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Tick(kind) => {
                let requests = self.state.on_tick(kind);
                self.request_routes(requests);
            }
            Command::Perform(action, reply) => {
                let outcome = self.perform(action);
                if let Err(e) = &outcome {
                    warn!("Action refused: {}", e);
                }
                let _ = reply.send(outcome);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot());
            }
        }
    }

    fn perform(&mut self, action: Action) -> Result<ActionOutcome, ActionError> {
        match action {
            Action::AddAlert => {
                let alert_id = self.state.add_alert(&mut self.rng)?;
                Ok(ActionOutcome::AlertAdded { alert_id })
            }
            Action::SimulateFlood => {
                let zone_id = self.state.create_regional_flood(&mut self.rng);
                Ok(ActionOutcome::FloodZoneCreated { zone_id })
            }
            Action::SimulateGiantFlood => {
                let (zone_id, alerts, safe_points) = self.state.create_giant_flood(&mut self.rng);
                Ok(ActionOutcome::GiantFlood {
                    zone_id,
                    alerts,
                    safe_points,
                })
            }
            Action::Assign { alert_id, boat_id } => {
                let requests = self.state.assign_boat(&alert_id, &boat_id);
                if requests.is_empty() {
                    return Ok(ActionOutcome::Ignored);
                }
                self.request_routes(requests);
                Ok(ActionOutcome::Dispatched { boat_id, alert_id })
            }
            Action::RemoveAlert { alert_id } => {
                let existed = self.state.remove_alert(&alert_id);
                Ok(ActionOutcome::AlertRemoved { alert_id, existed })
            }
            Action::Select { alert_id } => {
                self.state.select_alert(alert_id.as_deref())?;
                Ok(ActionOutcome::Selected { alert_id })
            }
            Action::Toggle => Ok(ActionOutcome::Running {
                running: self.state.toggle_running(),
            }),
        }
    }

    /// Fire-and-forget: the tick never waits, and boats fly straight until a
    /// route lands.
    fn request_routes(&self, requests: Vec<RouteRequest>) {
        if !self.provider.is_enabled() {
            return;
        }
        for request in requests {
            let provider = self.provider.clone();
            let route_tx = self.route_tx.clone();
            tokio::spawn(async move {
                if let Some(waypoints) = provider.get_route(request.from, request.to).await {
                    let _ = route_tx.send(RouteResolved {
                        boat_id: request.boat_id,
                        leg: request.leg,
                        generation: request.generation,
                        waypoints,
                    });
                }
            });
        }
    }
}
