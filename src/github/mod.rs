//! Hosting platform boundary.
//!
//! [`ReleasePlatform`] lists every query and mutation the reconciler needs.
//! [`GitHubClient`] implements it over the GitHub REST and GraphQL APIs and
//! [`MockPlatform`] keeps everything in memory for tests.

mod client;
mod mock;

pub use client::{GitHubClient, GitHubConfig};
pub use mock::{MockPlatform, Mutation};

use crate::error::Result;
use crate::state::{Comment, PullRequest, Tag};
use std::fmt;
use std::future::Future;

/// A file written by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAddition {
    /// Repository-relative path
    pub path: String,
    /// Full new content
    pub contents: String,
}

/// Commit onto an existing branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    /// Target branch
    pub branch: String,
    /// Head the branch must still point to
    pub expected_head: String,
    /// Commit headline
    pub message: String,
    /// Files to write
    pub files: Vec<FileAddition>,
}

/// Pull request to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// Title
    pub title: String,
    /// Markdown body
    pub body: String,
    /// Labels to attach
    pub labels: Vec<String>,
}

/// Fields of a pull request to overwrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestUpdate {
    /// New title
    pub title: Option<String>,
    /// New body
    pub body: Option<String>,
}

/// A branch and the commit it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name
    pub name: String,
    /// Head commit SHA
    pub sha: String,
}

/// Reaction put on a command comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Command accepted
    Acknowledge,
    /// Command not understood
    Confused,
}

impl Reaction {
    /// GitHub reaction content
    pub fn content(self) -> &'static str {
        match self {
            Reaction::Acknowledge => "+1",
            Reaction::Confused => "confused",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content())
    }
}

/// Operations on the hosting platform used by the reconciler
///
/// Every method is a single blocking-in-spirit network request (or a short
/// fixed sequence of them). Implementations never retry.
pub trait ReleasePlatform {
    /// Tags named `<project>@v*`, oldest first
    fn list_project_tags(&self, project: &str) -> impl Future<Output = Result<Vec<Tag>>>;

    /// Head SHA of a branch, `None` if the branch does not exist
    fn branch_head(&self, branch: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Default branch of the repository and its head
    fn default_branch_head(&self) -> impl Future<Output = Result<BranchRef>>;

    /// Open pull request from `head_branch` carrying `label`, with comments
    ///
    /// When several match, the last one returned by the platform is used.
    fn find_release_pull_request(
        &self,
        head_branch: &str,
        label: &str,
    ) -> impl Future<Output = Result<Option<PullRequest>>>;

    /// Text content of a file at a ref, `None` if absent
    fn file_content(&self, path: &str, git_ref: &str)
    -> impl Future<Output = Result<Option<String>>>;

    /// Paths touched by a commit
    fn changed_files(&self, sha: &str) -> impl Future<Output = Result<Vec<String>>>;

    /// Create a branch at a commit
    fn create_branch(&self, branch: &str, sha: &str) -> impl Future<Output = Result<()>>;

    /// Move a branch to a commit, discarding what it pointed to
    ///
    /// Fails with `PlatformError::PreconditionConflict` when the branch no
    /// longer points to `expected_head`.
    fn force_update_branch(
        &self,
        branch: &str,
        sha: &str,
        expected_head: &str,
    ) -> impl Future<Output = Result<()>>;

    /// Commit file additions onto a branch; returns the new head SHA
    ///
    /// Fails with `PlatformError::PreconditionConflict` when the branch no
    /// longer points to `expected_head`.
    fn create_commit(&self, request: CommitRequest) -> impl Future<Output = Result<String>>;

    /// Open a pull request and attach its labels
    fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> impl Future<Output = Result<PullRequest>>;

    /// Overwrite title and/or body of a pull request
    fn update_pull_request(
        &self,
        number: u64,
        update: PullRequestUpdate,
    ) -> impl Future<Output = Result<()>>;

    /// React to a comment
    fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> impl Future<Output = Result<()>>;

    /// Post a comment on a pull request
    fn create_comment(&self, number: u64, body: &str) -> impl Future<Output = Result<Comment>>;

    /// Replace the body of an existing comment
    fn update_comment(&self, comment_id: u64, body: &str) -> impl Future<Output = Result<()>>;
}
