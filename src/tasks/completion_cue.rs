//! Completion cue background task

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use crate::{services::sound_completion_cue, state::CounterEvent};

/// Background task that plays the completion cue whenever a countdown finishes.
///
/// Takes the receiver rather than the state so it is subscribed from the
/// moment it is spawned; it stops once the state and its sender are gone.
pub async fn completion_cue_task(
    mut events: broadcast::Receiver<CounterEvent>,
    alert_command: Option<String>,
) {
    info!("Starting completion cue task");

    loop {
        match events.recv().await {
            Ok(CounterEvent::CountdownCompleted) => {
                if let Err(e) = sound_completion_cue(alert_command.as_deref()).await {
                    error!("Failed to play completion cue: {}", e);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion cue task lagged, {} event(s) skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Completion cue task stopped");
}
