//! Version management for draft releases.
//!
//! Bump types, next-version resolution from tags and override comments, and
//! textual manifest patching.

mod bumper;
mod resolver;
mod updater;

pub use bumper::VersionBump;
pub use resolver::{DEFAULT_VERSION, VersionResolver};
pub use updater::{current_version, patch_version};
