//! `push`: reconcile a push described on the command line.

use super::helpers::{build_reconciler, print_report};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::event::PushEvent;

pub(super) async fn execute_push(
    args: &Args,
    branch: &str,
    sha: &str,
    paths: &[String],
    config: &RuntimeConfig,
) -> Result<i32> {
    let event = PushEvent {
        branch: branch.to_string(),
        head_sha: sha.to_string(),
        changed_paths: (!paths.is_empty()).then(|| paths.to_vec()),
    };

    let reconciler = build_reconciler(args)?;
    let report = reconciler.handle_push(&event, chrono::Utc::now()).await?;
    Ok(print_report(config, &report))
}
