//! Error types for relbot operations.
//!
//! Every failure is fatal for the project being processed and is never
//! retried. The CLI catches errors per project and reports them together with
//! recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relbot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for all relbot operations
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version computation errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Chat command errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Hosting platform errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Git command line errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// CLI argument and event payload errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {reason}")]
    Unreadable {
        /// Path of the configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// No project configured
    #[error("No projects configured. Add at least one [[projects]] entry.")]
    NoProjects,

    /// Two projects share an id
    #[error("Project '{id}' is configured more than once")]
    DuplicateProject {
        /// Project id
        id: String,
    },

    /// A path glob does not compile
    #[error("Invalid path pattern '{pattern}' for project '{project}': {reason}")]
    InvalidPattern {
        /// Project id
        project: String,
        /// Offending glob
        pattern: String,
        /// Reason for the error
        reason: String,
    },

    /// A required setting is missing or empty
    #[error("Missing setting: {setting}")]
    MissingSetting {
        /// Setting name
        setting: String,
    },

    /// A numeric setting is outside its accepted range
    #[error("Setting {setting} = {value} is out of range (expected {expected})")]
    OutOfRange {
        /// Setting name
        setting: String,
        /// Configured value
        value: String,
        /// Accepted range
        expected: String,
    },

    /// Project id is not configured
    #[error("Unknown project '{id}'")]
    UnknownProject {
        /// Project id
        id: String,
    },
}

/// Version computation errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Tag does not carry a parseable semver suffix
    #[error("Tag '{tag}' does not encode a valid version: {reason}")]
    MalformedTag {
        /// Tag name
        tag: String,
        /// Reason for the error
        reason: String,
    },

    /// Override comment names an unknown bump type
    #[error("Comment '{comment}' does not name a valid version type")]
    InvalidOverride {
        /// Comment body
        comment: String,
    },

    /// Bumped component would exceed `u64::MAX`
    #[error("Cannot apply a {bump} bump to {version}: version component overflows")]
    BumpOverflow {
        /// Version being bumped
        version: String,
        /// Bump type
        bump: String,
    },

    /// Bump type string not recognized
    #[error("Unknown version type '{value}' (expected major, minor or patch)")]
    UnknownBump {
        /// Offending value
        value: String,
    },
}

/// Chat command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Recognized command with a missing or unrecognized argument
    #[error("{} for '{command}'", describe_argument(.argument))]
    InvalidArgument {
        /// Command name
        command: String,
        /// Argument as written, if any
        argument: Option<String>,
    },
}

fn describe_argument(argument: &Option<String>) -> String {
    match argument {
        Some(argument) => format!("Invalid version type '{}'", argument),
        None => "Missing version type".to_string(),
    }
}

/// Hosting platform errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Request could not be sent or its body could not be read
    #[error("Request '{operation}' failed: {reason}")]
    Request {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// Platform answered with an error status
    #[error("Request '{operation}' returned HTTP {status}: {message}")]
    Status {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response message
        message: String,
    },

    /// GraphQL errors in an otherwise successful response
    #[error("GraphQL '{operation}' failed: {message}")]
    GraphQl {
        /// Operation that failed
        operation: String,
        /// Joined error messages
        message: String,
    },

    /// Expected resource does not exist
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing resource
        what: String,
    },

    /// Branch moved since it was observed
    #[error("Branch '{branch}' no longer points to {expected_head}; it was updated concurrently")]
    PreconditionConflict {
        /// Branch name
        branch: String,
        /// Head SHA the operation expected
        expected_head: String,
    },

    /// Response could not be decoded into the data model
    #[error("Unexpected response for '{operation}': {reason}")]
    Decode {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// No token available
    #[error("GitHub token not provided. Set GH_TOKEN or GITHUB_TOKEN.")]
    MissingToken,
}

/// Git command line errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Rebase stopped on conflicts it could not resolve
    #[error("Rebase of '{branch}' onto '{onto}' failed: {reason}")]
    RebaseConflict {
        /// Branch being rebased
        branch: String,
        /// Upstream branch
        onto: String,
        /// Git output
        reason: String,
    },

    /// Git command exited unsuccessfully
    #[error("git {command} failed: {reason}")]
    CommandFailed {
        /// Command arguments
        command: String,
        /// Git output
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Event payload could not be interpreted
    #[error("Invalid '{event}' event payload: {reason}")]
    InvalidEvent {
        /// Event name
        event: String,
        /// Reason for the error
        reason: String,
    },
}

impl BotError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BotError::Platform(PlatformError::PreconditionConflict { branch, .. }) => vec![
                format!("Branch '{}' moved while relbot was updating it", branch),
                "Push again or repeat the command to reconcile from the new head".to_string(),
            ],
            BotError::Git(GitError::RebaseConflict { .. }) => vec![
                "Rebase the release branch manually and force-push it".to_string(),
                "Or comment `recreate` to rebuild the branch from the default branch"
                    .to_string(),
            ],
            BotError::Platform(PlatformError::MissingToken) => vec![
                "Expose the workflow token: env: GH_TOKEN: ${{ secrets.GITHUB_TOKEN }}"
                    .to_string(),
            ],
            BotError::Command(CommandError::InvalidArgument { .. }) => vec![
                "Use one of: setversion major, setversion minor, setversion patch".to_string(),
            ],
            BotError::Version(VersionError::MalformedTag { tag, .. }) => vec![format!(
                "Tag '{}' must look like <project>@v<major>.<minor>.<patch>",
                tag
            )],
            BotError::Config(_) => {
                vec!["Check the [[projects]] entries in the configuration file".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether this error reports a concurrent modification of a release branch
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BotError::Platform(PlatformError::PreconditionConflict { .. })
                | BotError::Git(GitError::RebaseConflict { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_are_classified() {
        let precondition: BotError = PlatformError::PreconditionConflict {
            branch: "relbot-core".to_string(),
            expected_head: "abc".to_string(),
        }
        .into();
        assert!(precondition.is_conflict());

        let rebase: BotError = GitError::RebaseConflict {
            branch: "relbot-core".to_string(),
            onto: "main".to_string(),
            reason: "CONFLICT".to_string(),
        }
        .into();
        assert!(rebase.is_conflict());

        let missing: BotError = PlatformError::MissingToken.into();
        assert!(!missing.is_conflict());
    }

    #[test]
    fn test_invalid_argument_message() {
        let err: BotError = CommandError::InvalidArgument {
            command: "setversion".to_string(),
            argument: Some("bogus".to_string()),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Command error: Invalid version type 'bogus' for 'setversion'"
        );
        assert!(!err.recovery_suggestions().is_empty());

        let missing = CommandError::InvalidArgument {
            command: "setversion".to_string(),
            argument: None,
        };
        assert_eq!(missing.to_string(), "Missing version type for 'setversion'");
    }
}
