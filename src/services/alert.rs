//! Audible completion cue

use std::io::Write;
use tokio::process::Command;
use tracing::{debug, info};

/// Ring the terminal bell, then run the configured alert command if any
pub async fn sound_completion_cue(alert_command: Option<&str>) -> Result<(), String> {
    info!("Countdown complete, sounding cue");
    ring_terminal_bell();

    match alert_command {
        Some(command) => run_alert_command(command).await,
        None => Ok(()),
    }
}

/// Write BEL to stderr; terminals without a bell ignore it
pub fn ring_terminal_bell() {
    let mut stderr = std::io::stderr();
    if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
        debug!("Failed to ring terminal bell: {}", e);
    }
}

/// Run `command` through `sh -c` and wait for it
pub async fn run_alert_command(command: &str) -> Result<(), String> {
    debug!("Running alert command: {}", command);

    let output = Command::new("sh")
        .args(["-c", command])
        .output()
        .await
        .map_err(|e| format!("Failed to execute alert command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Alert command failed ({}): {}", output.status, stderr.trim()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_alert_command_success() {
        assert!(run_alert_command("true").await.is_ok());
    }

    #[tokio::test]
    async fn test_alert_command_failure_reports_stderr() {
        let err = run_alert_command("echo broken speaker >&2; exit 3")
            .await
            .unwrap_err();
        assert!(err.contains("broken speaker"), "{}", err);
    }

    #[tokio::test]
    async fn test_cue_without_command_succeeds() {
        assert!(sound_completion_cue(None).await.is_ok());
    }
}
