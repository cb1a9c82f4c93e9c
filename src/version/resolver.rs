//! Next-version resolution from tag history and override comments.

use crate::command::{Command, CommandParser};
use crate::error::VersionError;
use crate::state::{Comment, Tag};
use crate::version::VersionBump;
use semver::Version;

/// Version used when a project has never been tagged
pub const DEFAULT_VERSION: Version = Version::new(0, 0, 1);

/// Computes the next release version of a project
///
/// The result depends only on the tags, the comments and the requested bump;
/// nothing here touches the platform or the clock.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    parser: CommandParser,
}

impl VersionResolver {
    /// Create a resolver recognizing override comments of `parser`'s bot
    pub fn new(parser: CommandParser) -> Self {
        Self { parser }
    }

    /// Next version for a project
    ///
    /// 1. No tag: [`DEFAULT_VERSION`], nothing else is looked at.
    /// 2. The last tag holds the current version.
    /// 3. The most recent `setversion` comment, if any, replaces `requested`.
    pub fn next_version(
        &self,
        tags: &[Tag],
        comments: &[Comment],
        requested: VersionBump,
    ) -> Result<Version, VersionError> {
        let Some(last) = tags.last() else {
            return Ok(DEFAULT_VERSION);
        };
        let current = last.version()?;
        let bump = self.override_bump(comments)?.unwrap_or(requested);

        let next = bump.apply(&current)?;
        log::debug!("{} bumped by {} -> {}", last.name, bump, next);
        Ok(next)
    }

    /// Bump type of the most recent `setversion` comment
    pub fn override_bump(&self, comments: &[Comment]) -> Result<Option<VersionBump>, VersionError> {
        let Some(comment) = comments
            .iter()
            .rev()
            .find(|c| self.parser.is_set_version(&c.body))
        else {
            return Ok(None);
        };

        match self.parser.parse(&comment.body) {
            Ok(Some(Command::SetVersion(bump))) => Ok(Some(bump)),
            _ => Err(VersionError::InvalidOverride {
                comment: comment.body.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VersionResolver {
        VersionResolver::new(CommandParser::new("bot"))
    }

    fn comment(id: u64, body: &str) -> Comment {
        Comment {
            id,
            body: body.to_string(),
            author_login: "octocat".to_string(),
        }
    }

    #[test]
    fn test_default_version_without_tags() {
        let next = resolver()
            .next_version(&[], &[], VersionBump::Patch)
            .unwrap();
        assert_eq!(next.to_string(), "0.0.1");
    }

    #[test]
    fn test_default_version_ignores_overrides() {
        let comments = [comment(1, "@bot setversion major")];
        let next = resolver()
            .next_version(&[], &comments, VersionBump::Minor)
            .unwrap();
        assert_eq!(next, DEFAULT_VERSION);
    }

    #[test]
    fn test_plain_bump_from_last_tag() {
        let tags = [Tag::new("proj@v1.0.0"), Tag::new("proj@v1.2.3")];
        let next = resolver()
            .next_version(&tags, &[], VersionBump::Minor)
            .unwrap();
        assert_eq!(next.to_string(), "1.3.0");
    }

    #[test]
    fn test_most_recent_override_wins() {
        let tags = [Tag::new("proj@v1.2.3")];
        let comments = [
            comment(1, "@bot setversion patch"),
            comment(2, "nice"),
            comment(3, "@bot setversion major"),
            comment(4, "@bot rebase"),
        ];
        for requested in [VersionBump::Patch, VersionBump::Minor, VersionBump::Major] {
            let next = resolver()
                .next_version(&tags, &comments, requested)
                .unwrap();
            assert_eq!(next.to_string(), "2.0.0");
        }
    }

    #[test]
    fn test_invalid_override_is_reported() {
        let tags = [Tag::new("proj@v1.2.3")];
        let comments = [
            comment(1, "@bot setversion minor"),
            comment(2, "@bot setversion huge"),
        ];
        let err = resolver()
            .next_version(&tags, &comments, VersionBump::Patch)
            .unwrap_err();
        assert!(err.to_string().contains("@bot setversion huge"));
    }

    #[test]
    fn test_malformed_last_tag_is_reported() {
        let tags = [Tag::new("proj@v1.2.3"), Tag::new("proj@vlatest")];
        let err = resolver()
            .next_version(&tags, &[], VersionBump::Patch)
            .unwrap_err();
        assert!(matches!(err, VersionError::MalformedTag { ref tag, .. } if tag == "proj@vlatest"));
    }

    #[test]
    fn test_bump_overflow_is_reported() {
        let tags = [Tag::new("proj@v18446744073709551615.0.0")];
        let err = resolver()
            .next_version(&tags, &[], VersionBump::Major)
            .unwrap_err();
        assert!(matches!(err, VersionError::BumpOverflow { .. }));
    }

    #[test]
    fn test_deterministic() {
        let tags = [Tag::new("proj@v0.9.9")];
        let comments = [comment(1, "@bot setversion minor")];
        let first = resolver().next_version(&tags, &comments, VersionBump::Patch);
        let second = resolver().next_version(&tags, &comments, VersionBump::Patch);
        assert_eq!(first.unwrap(), second.unwrap());
    }
}
