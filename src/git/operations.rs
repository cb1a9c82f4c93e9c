//! Git operations trait used by the reconciler.

use crate::error::Result;
use std::future::Future;

/// Rebase of a release branch onto the default branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseRequest {
    /// Release branch to rewrite
    pub branch: String,
    /// Branch to rebase onto
    pub onto: String,
    /// Head the release branch was observed at; the push is leased on it
    pub expected_head: String,
}

/// Git operations that have no hosting API equivalent
pub trait GitOperations {
    /// Rebase `branch` onto `onto` and force-push it
    ///
    /// Conflicting hunks resolve in favour of the release branch. When the
    /// rebase still stops, it is aborted and `GitError::RebaseConflict` is
    /// returned with the remote branch untouched. Returns the new head SHA.
    fn rebase_branch(&self, request: &RebaseRequest) -> impl Future<Output = Result<String>>;
}
