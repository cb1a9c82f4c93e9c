//! Git command line operations.
//!
//! The hosting API cannot rebase, so `rebase` is carried out with a local
//! checkout and the `git` binary.

mod git_adapter;
mod operations;

pub use git_adapter::GitCli;
pub use operations::{GitOperations, RebaseRequest};
