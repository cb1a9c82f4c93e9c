//! # relbot
//!
//! Release bot keeping one draft release pull request per project of a
//! repository.
//!
//! On every push to a tracked branch the bot works out which projects the
//! push touched and, for each of them, creates or refreshes a release branch
//! `relbot-<project>` and its pull request, with the next semantic version
//! written into the project manifest. Comments on a release pull request
//! steer it:
//!
//! ```text
//! @relbot setversion <major|minor|patch>
//! @relbot rebase
//! @relbot recreate
//! ```
//!
//! No state is kept between runs; tags, branches, pull requests and comments
//! on GitHub are read back on every trigger.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod git;
pub mod github;
pub mod project;
pub mod release;
pub mod state;
pub mod version;

pub use cli::Args;
pub use command::{Command, CommandParser};
pub use config::{BotConfig, EnvConfig, ProjectConfig};
pub use error::{BotError, Result};
pub use event::{CommentEvent, PushEvent, TriggerEvent};
pub use git::{GitCli, GitOperations, RebaseRequest};
pub use github::{GitHubClient, MockPlatform, ReleasePlatform};
pub use project::ChangeRelevanceFilter;
pub use release::{Reconciler, ReleaseAction, RunReport};
pub use state::{DraftRelease, ReleaseState};
pub use version::{VersionBump, VersionResolver, patch_version};
