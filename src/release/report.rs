//! Per-project outcomes of a reconciliation pass.

use crate::error::BotError;
use semver::Version;
use std::fmt;

/// What a pass did to one project's draft release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Pull request opened (the branch may have been created on the way)
    Opened {
        /// Pull request number
        pull_number: u64,
        /// Release version
        version: Version,
    },
    /// Open pull request refreshed
    Updated {
        /// Pull request number
        pull_number: u64,
        /// Release version
        version: Version,
    },
    /// Stale notice posted or refreshed
    StaleNotice {
        /// Pull request number
        pull_number: u64,
        /// Whether an existing notice was updated instead of posting a new one
        updated: bool,
    },
    /// Version override applied
    VersionSet {
        /// Pull request number
        pull_number: u64,
        /// Release version
        version: Version,
    },
    /// Release branch rebased
    Rebased {
        /// Pull request number
        pull_number: u64,
        /// New head of the release branch
        head: String,
    },
    /// Release branch rebuilt from the default branch
    Recreated {
        /// Pull request number
        pull_number: u64,
        /// Release version
        version: Version,
    },
}

impl fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseAction::Opened {
                pull_number,
                version,
            } => write!(f, "opened #{} for v{}", pull_number, version),
            ReleaseAction::Updated {
                pull_number,
                version,
            } => write!(f, "updated #{} to v{}", pull_number, version),
            ReleaseAction::StaleNotice {
                pull_number,
                updated: true,
            } => write!(f, "refreshed stale notice on #{}", pull_number),
            ReleaseAction::StaleNotice { pull_number, .. } => {
                write!(f, "posted stale notice on #{}", pull_number)
            }
            ReleaseAction::VersionSet {
                pull_number,
                version,
            } => write!(f, "set #{} to v{}", pull_number, version),
            ReleaseAction::Rebased { pull_number, head } => {
                write!(f, "rebased #{} (head {})", pull_number, head)
            }
            ReleaseAction::Recreated {
                pull_number,
                version,
            } => write!(f, "recreated #{} at v{}", pull_number, version),
        }
    }
}

/// Result of processing one project
#[derive(Debug)]
pub struct ProjectOutcome {
    /// Project id
    pub project: String,
    /// Action taken, or the error that stopped this project
    pub result: Result<ReleaseAction, BotError>,
}

/// Outcomes of every project in scope of one trigger
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<ProjectOutcome>,
}

impl RunReport {
    /// Record a project's outcome
    pub fn record(&mut self, project: impl Into<String>, result: Result<ReleaseAction, BotError>) {
        let project = project.into();
        match &result {
            Ok(action) => log::info!("[{}] {}", project, action),
            Err(e) => log::error!("[{}] {}", project, e),
        }
        self.outcomes.push(ProjectOutcome { project, result });
    }

    /// Outcomes in processing order
    pub fn outcomes(&self) -> &[ProjectOutcome] {
        &self.outcomes
    }

    /// Whether no project was in scope
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every project succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Projects that failed
    pub fn failures(&self) -> impl Iterator<Item = (&str, &BotError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.project.as_str(), e)))
    }

    /// Process exit code: 0 when every project succeeded, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;

    #[test]
    fn test_one_failure_fails_the_run() {
        let mut report = RunReport::default();
        assert!(report.is_success());
        assert!(report.is_empty());

        report.record(
            "core",
            Ok(ReleaseAction::Updated {
                pull_number: 4,
                version: Version::new(1, 0, 1),
            }),
        );
        assert_eq!(report.exit_code(), 0);

        report.record("grid", Err(PlatformError::MissingToken.into()));
        assert_eq!(report.exit_code(), 1);
        let failures: Vec<_> = report.failures().map(|(p, _)| p).collect();
        assert_eq!(failures, vec!["grid"]);
        assert_eq!(report.outcomes().len(), 2);
    }
}
