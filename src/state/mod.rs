//! Draft release state.
//!
//! Nothing here is persisted: a draft release is rebuilt from tags, branch
//! refs, pull requests and comments on every pass.

mod draft_release;

pub use draft_release::{Comment, DraftRelease, PullRequest, ReleaseState, Tag};
