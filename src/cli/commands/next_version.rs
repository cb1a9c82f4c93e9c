//! `next-version`: preview a project's next release version.

use super::helpers::build_reconciler;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::version::VersionBump;

pub(super) async fn execute_next_version(
    args: &Args,
    project: &str,
    bump: Option<VersionBump>,
    config: &RuntimeConfig,
) -> Result<i32> {
    let reconciler = build_reconciler(args)?;
    let bump = bump.unwrap_or(reconciler.config().default_bump);
    let version = reconciler.preview_version(project, bump).await?;

    config.println(&version.to_string());
    Ok(0)
}
