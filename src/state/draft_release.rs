//! Draft release observation and state classification.

use crate::error::VersionError;
use chrono::{DateTime, Utc};
use semver::Version;
use std::fmt;

/// A repository tag named `<project>@v<semver>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Full tag name
    pub name: String,
}

impl Tag {
    /// Create a tag from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Tag name for a project release
    pub fn for_release(project: &str, version: &Version) -> Self {
        Self::new(format!("{}@v{}", project, version))
    }

    /// Prefix shared by every tag of a project
    pub fn project_prefix(project: &str) -> String {
        format!("{}@v", project)
    }

    /// Version embedded after the last `@v`
    pub fn version(&self) -> Result<Version, VersionError> {
        let (_, suffix) = self
            .name
            .rsplit_once("@v")
            .ok_or_else(|| VersionError::MalformedTag {
                tag: self.name.clone(),
                reason: "missing '@v' separator".to_string(),
            })?;
        Version::parse(suffix).map_err(|e| VersionError::MalformedTag {
            tag: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// A pull request comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Platform id, used for reactions and edits
    pub id: u64,
    /// Markdown body
    pub body: String,
    /// Login of the author
    pub author_login: String,
}

/// The open draft release pull request of a project
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    /// Platform node id
    pub id: String,
    /// Pull request number
    pub number: u64,
    /// Title
    pub title: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Head branch (the release branch)
    pub head_branch: String,
    /// Branch the release merges into
    pub base_branch: String,
    /// Markdown body
    pub body: String,
    /// Creation time, used for staleness
    pub created_at: DateTime<Utc>,
    /// Comments in creation order
    pub comments: Vec<Comment>,
}

impl PullRequest {
    /// Age of the pull request at `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    /// Last comment, if any
    pub fn last_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }
}

/// Observed draft release of one project
///
/// Rebuilt from platform queries at the start of every pass and dropped at
/// the end of it.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRelease {
    /// Project id
    pub project: String,
    /// Release branch name, the handle all mutations go through
    pub id: String,
    /// Project tags in platform order; the last one is current
    pub tags: Vec<Tag>,
    /// Observed head of the release branch, `None` if the branch is absent
    pub branch_head: Option<String>,
    /// Open release-labeled pull request from the release branch
    pub pull_request: Option<PullRequest>,
}

impl DraftRelease {
    /// Whether the release branch exists
    pub fn branch_exists(&self) -> bool {
        self.branch_head.is_some()
    }

    /// Comments of the pull request, empty when there is none
    pub fn comments(&self) -> &[Comment] {
        self.pull_request
            .as_ref()
            .map(|pr| pr.comments.as_slice())
            .unwrap_or(&[])
    }

    /// Classify into the branch x pull request state space
    ///
    /// A pull request without a branch cannot be acted upon, so a missing
    /// branch always classifies as [`ReleaseState::NoBranchNoPr`].
    pub fn state(&self, now: DateTime<Utc>, stale_after: chrono::Duration) -> ReleaseState {
        match (&self.branch_head, &self.pull_request) {
            (None, _) => ReleaseState::NoBranchNoPr,
            (Some(_), None) => ReleaseState::BranchNoPr,
            (Some(_), Some(pr)) if pr.age(now) > stale_after => ReleaseState::BranchPrStale,
            (Some(_), Some(_)) => ReleaseState::BranchPrFresh,
        }
    }
}

/// Lifecycle state of a draft release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    /// Never released, or branch removed after a merge
    NoBranchNoPr,
    /// Branch exists, pull request not opened yet
    BranchNoPr,
    /// Pull request open and younger than the staleness threshold
    BranchPrFresh,
    /// Pull request open for longer than the staleness threshold
    BranchPrStale,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseState::NoBranchNoPr => write!(f, "no branch, no pull request"),
            ReleaseState::BranchNoPr => write!(f, "branch without pull request"),
            ReleaseState::BranchPrFresh => write!(f, "open pull request"),
            ReleaseState::BranchPrStale => write!(f, "stale pull request"),
        }
    }
}
