//! Bot configuration.
//!
//! The configuration is an immutable value loaded once per run from a TOML
//! file and handed to every component at construction. Nothing reads ambient
//! global state, so several configurations can coexist (tests do this).

use crate::error::{ConfigError, Result};
use crate::version::VersionBump;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the repository root
pub const DEFAULT_CONFIG_PATH: &str = ".github/relbot.toml";

/// A releasable unit of the repository
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Project identifier, used in tags, branch names and labels
    pub id: String,
    /// Path globs whose changes concern this project
    pub paths: Vec<String>,
    /// Path of the manifest holding the `"version"` field
    pub manifest: String,
}

/// Complete bot configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name the bot answers to in comments (`@<bot_name> rebase`)
    pub bot_name: String,
    /// Release branch prefix; branches are named `<prefix>-<project>`
    pub branch_prefix: Option<String>,
    /// Label put on every draft release pull request
    pub release_label: String,
    /// Days after which an open draft release is considered stale
    pub stale_after_days: i64,
    /// Bump applied on push when no override comment exists
    pub default_bump: VersionBump,
    /// Branches whose pushes are reconciled (empty: any non-release branch)
    pub tracked_branches: Vec<String>,
    /// Local checkout used by the rebase command
    pub git_workdir: PathBuf,
    /// Remote of the local checkout
    pub git_remote: String,
    /// Configured projects
    pub projects: Vec<ProjectConfig>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: "relbot".to_string(),
            branch_prefix: None,
            release_label: "release".to_string(),
            stale_after_days: 7,
            default_bump: VersionBump::Patch,
            tracked_branches: Vec::new(),
            git_workdir: PathBuf::from("."),
            git_remote: "origin".to_string(),
            projects: Vec::new(),
        }
    }
}

impl BotConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.bot_name.trim().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "bot_name".to_string(),
            });
        }
        if self.release_label.trim().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "release_label".to_string(),
            });
        }
        if self.stale_after_days < 1 {
            return Err(ConfigError::OutOfRange {
                setting: "stale_after_days".to_string(),
                value: self.stale_after_days.to_string(),
                expected: "at least 1".to_string(),
            });
        }
        if self.projects.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.id.as_str()) {
                return Err(ConfigError::DuplicateProject {
                    id: project.id.clone(),
                });
            }
            if project.manifest.trim().is_empty() {
                return Err(ConfigError::MissingSetting {
                    setting: format!("projects.{}.manifest", project.id),
                });
            }
            for pattern in &project.paths {
                glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    project: project.id.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Release branch prefix (defaults to the bot name)
    pub fn branch_prefix(&self) -> &str {
        self.branch_prefix.as_deref().unwrap_or(&self.bot_name)
    }

    /// Release branch for a project
    pub fn release_branch(&self, project: &str) -> String {
        format!("{}-{}", self.branch_prefix(), project)
    }

    /// Whether a branch name is one of this bot's release branches
    pub fn is_release_branch(&self, branch: &str) -> bool {
        self.projects
            .iter()
            .any(|project| self.release_branch(&project.id) == branch)
    }

    /// Whether a push to this branch should be reconciled
    pub fn tracks_branch(&self, branch: &str) -> bool {
        if self.is_release_branch(branch) {
            return false;
        }
        self.tracked_branches.is_empty() || self.tracked_branches.iter().any(|b| b == branch)
    }

    /// Look up a project by id
    pub fn project(&self, id: &str) -> std::result::Result<&ProjectConfig, ConfigError> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .ok_or_else(|| ConfigError::UnknownProject { id: id.to_string() })
    }

    /// Staleness threshold as a duration
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::days(self.stale_after_days)
    }
}

/// Snapshot of the process environment
///
/// Taken once at startup so the rest of the program never calls
/// `std::env::var` directly.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build an environment from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a non-empty variable
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    /// GitHub token, preferring `GH_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.get("GH_TOKEN").or_else(|| self.get("GITHUB_TOKEN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
bot_name = "relbot"
stale_after_days = 10
default_bump = "minor"

[[projects]]
id = "core"
paths = ["core/*"]
manifest = "core/package.json"

[[projects]]
id = "grid"
paths = ["grid/*", "shared/grid/*"]
manifest = "grid/package.json"
"#;

    #[test]
    fn test_parse_sample() {
        let config = BotConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.projects.len(), 2);
        assert_eq!(config.default_bump, VersionBump::Minor);
        assert_eq!(config.stale_after(), chrono::Duration::days(10));
        assert_eq!(config.release_label, "release");
        assert_eq!(config.release_branch("core"), "relbot-core");
    }

    #[test]
    fn test_branch_prefix_override() {
        let content = format!("branch_prefix = \"draft\"\n{}", SAMPLE);
        let config = BotConfig::from_toml(&content).unwrap();
        assert_eq!(config.release_branch("grid"), "draft-grid");
        assert!(config.is_release_branch("draft-grid"));
        assert!(!config.is_release_branch("relbot-grid"));
    }

    #[test]
    fn test_release_branches_are_not_tracked() {
        let config = BotConfig::from_toml(SAMPLE).unwrap();
        assert!(config.tracks_branch("main"));
        assert!(config.tracks_branch("develop"));
        assert!(!config.tracks_branch("relbot-core"));

        let content = format!("tracked_branches = [\"main\"]\n{}", SAMPLE);
        let config = BotConfig::from_toml(&content).unwrap();
        assert!(config.tracks_branch("main"));
        assert!(!config.tracks_branch("develop"));
    }

    #[test]
    fn test_rejects_duplicate_projects() {
        let content = r#"
[[projects]]
id = "core"
paths = ["core/*"]
manifest = "core/package.json"

[[projects]]
id = "core"
paths = ["other/*"]
manifest = "other/package.json"
"#;
        let err = BotConfig::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_bad_glob() {
        let content = r#"
[[projects]]
id = "core"
paths = ["core/[*"]
manifest = "core/package.json"
"#;
        let err = BotConfig::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("Invalid path pattern"));
    }

    #[test]
    fn test_rejects_empty_project_list() {
        let err = BotConfig::from_toml("bot_name = \"relbot\"").unwrap_err();
        assert!(err.to_string().contains("No projects configured"));
    }

    #[test]
    fn test_rejects_non_positive_staleness() {
        for days in ["0", "-3"] {
            let content = SAMPLE.replace("stale_after_days = 10", &format!("stale_after_days = {days}"));
            let err = BotConfig::from_toml(&content).unwrap_err();
            assert!(err.to_string().contains("stale_after_days"), "{err}");
        }

        let content = SAMPLE.replace("stale_after_days = 10", "stale_after_days = 1");
        assert!(BotConfig::from_toml(&content).is_ok());
    }

    #[test]
    fn test_env_token_preference() {
        let env = EnvConfig::from_pairs([("GITHUB_TOKEN", "b"), ("GH_TOKEN", "a")]);
        assert_eq!(env.github_token().as_deref(), Some("a"));

        let env = EnvConfig::from_pairs([("GITHUB_TOKEN", "b"), ("GH_TOKEN", "")]);
        assert_eq!(env.github_token().as_deref(), Some("b"));

        assert_eq!(EnvConfig::default().github_token(), None);
    }
}
