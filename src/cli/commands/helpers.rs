//! Shared helpers for command execution.

use crate::cli::{Args, RuntimeConfig};
use crate::config::{BotConfig, EnvConfig};
use crate::error::{BotError, Result};
use crate::git::GitCli;
use crate::github::{GitHubClient, GitHubConfig};
use crate::release::{Reconciler, RunReport};

/// Reconciler over the GitHub API and the local clone
pub(super) type GitHubReconciler = Reconciler<GitHubClient, GitCli>;

/// Load the configuration and connect to GitHub
pub(super) fn build_reconciler(args: &Args) -> Result<GitHubReconciler> {
    let bot_config = BotConfig::load(&args.config)?;
    let env = EnvConfig::from_env();
    let client = GitHubClient::new(GitHubConfig::from_env(&env)?)?;
    let git = GitCli::new(
        bot_config.git_workdir.clone(),
        bot_config.git_remote.clone(),
        &bot_config.bot_name,
    );
    log::debug!(
        "Loaded {} project(s) from {}",
        bot_config.projects.len(),
        args.config.display()
    );
    Reconciler::new(bot_config, client, git)
}

/// Print every project outcome and return the exit code
pub(super) fn print_report(config: &RuntimeConfig, report: &RunReport) -> i32 {
    if report.is_empty() {
        config.println("Nothing to do");
        return 0;
    }

    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(action) => config.success_println(&format!("{}: {}", outcome.project, action)),
            Err(e) => {
                config.error_println(&format!("{}: {}", outcome.project, e));
                print_suggestions(config, e);
            }
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        config.warning_println(&format!(
            "{} of {} project(s) failed",
            failed,
            report.outcomes().len()
        ));
    }
    report.exit_code()
}

/// Print recovery suggestions for an error
pub(super) fn print_suggestions(config: &RuntimeConfig, error: &BotError) {
    let suggestions = error.recovery_suggestions();
    if suggestions.is_empty() {
        return;
    }
    config.println("Recovery suggestions:");
    for suggestion in suggestions {
        config.indent(&format!("• {}", suggestion));
    }
}
