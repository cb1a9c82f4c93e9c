//! Chat commands posted as pull request comments.
//!
//! A comment is a command only when its body starts with the literal
//! `@<bot> <keyword>` prefix: case-sensitive, no leading whitespace.

use crate::error::CommandError;
use crate::version::VersionBump;
use std::fmt;

const SET_VERSION: &str = "setversion";
const REBASE: &str = "rebase";
const RECREATE: &str = "recreate";

/// A recognized chat command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Override the bump type of the draft release
    SetVersion(VersionBump),
    /// Rebase the release branch onto its base branch
    Rebase,
    /// Rebuild the release branch from the default branch
    Recreate,
}

impl Command {
    /// Command keyword as typed after the bot mention
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetVersion(_) => SET_VERSION,
            Command::Rebase => REBASE,
            Command::Recreate => RECREATE,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetVersion(bump) => write!(f, "{} {}", SET_VERSION, bump),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Parses comment bodies into commands for one bot name
#[derive(Debug, Clone)]
pub struct CommandParser {
    bot_name: String,
}

impl CommandParser {
    /// Create a parser answering to `@<bot_name>`
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    /// Bot name this parser answers to
    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Literal prefix of a command keyword, e.g. `@relbot rebase`
    pub fn prefix(&self, keyword: &str) -> String {
        format!("@{} {}", self.bot_name, keyword)
    }

    /// Whether the body starts with the set-version prefix
    pub fn is_set_version(&self, body: &str) -> bool {
        body.starts_with(&self.prefix(SET_VERSION))
    }

    /// Parse a comment body
    ///
    /// Returns `Ok(None)` when the body is not a command at all and
    /// `Err(CommandError::InvalidArgument)` when it is a set-version command
    /// whose bump type is missing or unknown.
    pub fn parse(&self, body: &str) -> Result<Option<Command>, CommandError> {
        if self.is_set_version(body) {
            let argument = body.split_whitespace().nth(2);
            return match argument.map(str::parse::<VersionBump>) {
                Some(Ok(bump)) => Ok(Some(Command::SetVersion(bump))),
                _ => Err(CommandError::InvalidArgument {
                    command: SET_VERSION.to_string(),
                    argument: argument.map(str::to_string),
                }),
            };
        }
        if body.starts_with(&self.prefix(REBASE)) {
            return Ok(Some(Command::Rebase));
        }
        if body.starts_with(&self.prefix(RECREATE)) {
            return Ok(Some(Command::Recreate));
        }
        Ok(None)
    }
}
