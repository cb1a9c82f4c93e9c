//! Semantic version bump types.

use crate::error::VersionError;
use semver::Version;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Semantic versioning increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    /// Incompatible API change: `X+1.0.0`
    Major,
    /// Backwards compatible feature: `X.Y+1.0`
    Minor,
    /// Backwards compatible fix: `X.Y.Z+1`
    Patch,
}

impl VersionBump {
    /// Apply this bump to a version
    ///
    /// Pre-release and build metadata are dropped; the result is always a
    /// plain `X.Y.Z` release version. Fails when the bumped component is
    /// already at `u64::MAX`.
    pub fn apply(self, version: &Version) -> Result<Version, VersionError> {
        let overflow = || VersionError::BumpOverflow {
            version: version.to_string(),
            bump: self.to_string(),
        };
        let next = match self {
            VersionBump::Major => {
                Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
            }
            VersionBump::Minor => Version::new(
                version.major,
                version.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            VersionBump::Patch => Version::new(
                version.major,
                version.minor,
                version.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        };
        Ok(next)
    }
}

impl FromStr for VersionBump {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(VersionError::UnknownBump {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_resets_lower_components() {
        let v = Version::new(1, 2, 3);
        assert_eq!(VersionBump::Major.apply(&v).unwrap(), Version::new(2, 0, 0));
        assert_eq!(VersionBump::Minor.apply(&v).unwrap(), Version::new(1, 3, 0));
        assert_eq!(VersionBump::Patch.apply(&v).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_drops_prerelease() {
        let v = Version::parse("1.2.3-beta.1").unwrap();
        assert_eq!(VersionBump::Patch.apply(&v).unwrap().to_string(), "1.2.4");
    }

    #[test]
    fn test_bump_past_max_component_fails() {
        let v = Version::new(u64::MAX, 0, 0);
        assert!(matches!(
            VersionBump::Major.apply(&v),
            Err(VersionError::BumpOverflow { .. })
        ));
        assert_eq!(
            VersionBump::Minor.apply(&v).unwrap(),
            Version::new(u64::MAX, 1, 0)
        );

        let v = Version::new(1, 2, u64::MAX);
        assert!(VersionBump::Patch.apply(&v).is_err());
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("minor".parse::<VersionBump>().unwrap(), VersionBump::Minor);
        assert!("Minor".parse::<VersionBump>().is_err());
        assert!("bogus".parse::<VersionBump>().is_err());
    }
}
