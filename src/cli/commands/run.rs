//! `run`: handle the GitHub Actions event of the current workflow.

use super::helpers::{build_reconciler, print_report};
use crate::cli::{Args, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::event::TriggerEvent;
use std::path::Path;

pub(super) async fn execute_run(
    args: &Args,
    event_name: &str,
    event_path: &Path,
    config: &RuntimeConfig,
) -> Result<i32> {
    let payload = tokio::fs::read_to_string(event_path)
        .await
        .map_err(|e| CliError::InvalidEvent {
            event: event_name.to_string(),
            reason: format!("cannot read {}: {}", event_path.display(), e),
        })?;

    let Some(event) = TriggerEvent::from_payload(event_name, &payload)? else {
        config.println(&format!("Nothing to do for this '{}' event", event_name));
        return Ok(0);
    };

    let reconciler = build_reconciler(args)?;
    let report = match &event {
        TriggerEvent::Push(push) => reconciler.handle_push(push, chrono::Utc::now()).await?,
        TriggerEvent::Comment(comment) => reconciler.handle_comment(comment).await?,
    };
    Ok(print_report(config, &report))
}
