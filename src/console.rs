use crate::processor::command_processor;
use crate::simulation::SimulationHandle;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Reads JSON commands from stdin, one per line, until EOF.
pub async fn run_console(handle: SimulationHandle) -> anyhow::Result<()> {
    info!("Reading commands from stdin (one JSON object per line)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = command_processor::process_command(&handle, line).await {
            error!("Error processing command: {}", e);
            return Err(e);
        }
    }

    info!("Command stream closed");
    Ok(())
}
