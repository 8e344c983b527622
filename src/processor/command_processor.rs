use crate::simulation::{Action, ActionOutcome, SimulationHandle};
use serde::Deserialize;
use tracing::{info, warn};

/// One line of operator input, e.g. `{"action": "assign", "alert_id": "SOS-1A2B", "boat_id": "B-03"}`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConsoleCommand {
    AddAlert,
    SimulateFlood,
    SimulateGiantFlood,
    Assign { alert_id: String, boat_id: String },
    RemoveAlert { alert_id: String },
    Select {
        #[serde(default)]
        alert_id: Option<String>,
    },
    Toggle,
    Status,
}

impl ConsoleCommand {
    fn into_action(self) -> Option<Action> {
        Some(match self {
            ConsoleCommand::AddAlert => Action::AddAlert,
            ConsoleCommand::SimulateFlood => Action::SimulateFlood,
            ConsoleCommand::SimulateGiantFlood => Action::SimulateGiantFlood,
            ConsoleCommand::Assign { alert_id, boat_id } => Action::Assign { alert_id, boat_id },
            ConsoleCommand::RemoveAlert { alert_id } => Action::RemoveAlert { alert_id },
            ConsoleCommand::Select { alert_id } => Action::Select { alert_id },
            ConsoleCommand::Toggle => Action::Toggle,
            ConsoleCommand::Status => return None,
        })
    }
}

/// Handles one command line. Unparsable input and refused actions are logged
/// and skipped; only a dead simulation is an error.
pub async fn process_command(handle: &SimulationHandle, line: &str) -> anyhow::Result<()> {
    let command: ConsoleCommand = match serde_json::from_str(line) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse command: {}", e);
            return Ok(());
        }
    };

    let Some(action) = command.into_action() else {
        let snapshot = handle.snapshot().await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    };

    match handle.perform(action).await? {
        Ok(ActionOutcome::Ignored) => info!("Command ignored: target no longer exists"),
        Ok(outcome) => {
            info!("Command applied: {:?}", outcome);
            println!("{}", serde_json::to_string(&outcome)?);
        }
        Err(refusal) => {
            warn!("Command refused: {}", refusal);
            println!("{}", serde_json::json!({ "refused": refusal.to_string() }));
        }
    }

    Ok(())
}
