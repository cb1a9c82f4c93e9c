//! Command line argument parsing.

use crate::config::DEFAULT_CONFIG_PATH;
use crate::version::VersionBump;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release bot keeping one draft release pull request per project
#[derive(Parser, Debug)]
#[command(
    name = "relbot",
    version,
    about = "Keep per-project draft release pull requests up to date",
    long_about = "Keep per-project draft release pull requests up to date.

Runs inside GitHub Actions on `push` and `issue_comment` events:
  relbot run
  relbot push --branch main --sha <sha> --path core/src/lib.ts
  relbot next-version --project core --bump minor"
)]
pub struct Args {
    /// Configuration file
    #[arg(long, global = true, env = "RELBOT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handle the GitHub Actions event that triggered this run
    Run {
        /// Event name (`push` or `issue_comment`)
        #[arg(long, env = "GITHUB_EVENT_NAME")]
        event_name: String,

        /// Path to the event payload JSON
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        event_path: PathBuf,
    },

    /// Reconcile as if `sha` had just been pushed to `branch`
    Push {
        /// Pushed branch
        #[arg(long)]
        branch: String,

        /// Head commit of the push
        #[arg(long)]
        sha: String,

        /// Changed path; repeat for several. Defaults to the files of `sha`.
        #[arg(long = "path", value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Print the version the next release of a project would get
    NextVersion {
        /// Project id
        #[arg(long)]
        project: String,

        /// Bump type; defaults to the configured one
        #[arg(long)]
        bump: Option<VersionBump>,
    },
}

impl Command {
    /// Subcommand name as typed
    pub fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::Push { .. } => "push",
            Command::NextVersion { .. } => "next-version",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Push { branch, sha, .. } if branch.is_empty() || sha.is_empty() => {
                Err("--branch and --sha must not be empty".to_string())
            }
            Command::NextVersion { project, .. } if project.is_empty() => {
                Err("--project must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_with_repeated_paths() {
        let args = Args::try_parse_from([
            "relbot",
            "push",
            "--branch",
            "main",
            "--sha",
            "abc",
            "--path",
            "core/a.ts",
            "--path",
            "grid/b.ts",
        ])
        .unwrap();
        match &args.command {
            Command::Push { branch, paths, .. } => {
                assert_eq!(branch, "main");
                assert_eq!(paths, &["core/a.ts", "grid/b.ts"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.command.name(), "push");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_next_version_bump_is_parsed() {
        let args = Args::try_parse_from([
            "relbot",
            "--config",
            "relbot.toml",
            "next-version",
            "--project",
            "core",
            "--bump",
            "minor",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("relbot.toml"));
        assert!(matches!(
            args.command,
            Command::NextVersion {
                bump: Some(VersionBump::Minor),
                ..
            }
        ));

        assert!(
            Args::try_parse_from(["relbot", "next-version", "--project", "core", "--bump", "huge"])
                .is_err()
        );
    }
}
