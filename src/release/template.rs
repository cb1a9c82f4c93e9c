//! Markdown rendered into release pull requests and their comments.
//!
//! Every text here is deterministic so that a later pass can recognise what
//! an earlier pass wrote.

use semver::Version;

/// Renders titles, bodies and notices for one bot
#[derive(Debug, Clone)]
pub struct Templates {
    bot_name: String,
    stale_after_days: i64,
}

impl Templates {
    /// Templates signed by `bot_name`
    pub fn new(bot_name: impl Into<String>, stale_after_days: i64) -> Self {
        Self {
            bot_name: bot_name.into(),
            stale_after_days,
        }
    }

    /// Pull request title
    pub fn title(&self, project: &str, version: &Version) -> String {
        format!("Release '{}' v{}", project, version)
    }

    /// Headline of the version bump commit
    pub fn commit_message(&self, project: &str, version: &Version) -> String {
        format!("chore(release): {} v{}", project, version)
    }

    /// Hidden Markdown line tying a pull request to its project
    pub fn marker(&self, project: &str) -> String {
        format!("[//]: # ({}-project:{})", self.bot_name, project)
    }

    /// Project named by the marker in a pull request body
    pub fn project_from_marker(&self, body: &str) -> Option<String> {
        let open = format!("[//]: # ({}-project:", self.bot_name);
        body.lines().find_map(|line| {
            line.trim()
                .strip_prefix(&open)?
                .strip_suffix(')')
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
    }

    /// Body of the release pull request
    pub fn pull_request_body(&self, project: &str, version: &Version, base: &str) -> String {
        let bot = &self.bot_name;
        format!(
            "This pull request prepares the release of **{project}** v{version}.\n\
             \n\
             Merging it publishes the release. Until then it is kept up to date \
             with every push to `{base}` that touches `{project}`.\n\
             \n\
             <details>\n\
             <summary>Commands</summary>\n\
             \n\
             Comment on this pull request with:\n\
             \n\
             - `@{bot} setversion <major|minor|patch>` to choose the version bump\n\
             - `@{bot} rebase` to rebase this branch onto `{base}`\n\
             - `@{bot} recreate` to rebuild this branch from the default branch\n\
             \n\
             </details>\n\
             \n\
             {marker}\n",
            marker = self.marker(project),
        )
    }

    /// Banner shown while a rebase is in progress
    pub fn rebasing_banner(&self) -> String {
        format!(
            "> [!NOTE]\n> {} is rebasing this branch. Do not push to it until this note disappears.\n\n",
            self.bot_name
        )
    }

    /// `body` with the rebasing banner on top
    pub fn with_rebasing_banner(&self, body: &str) -> String {
        format!("{}{}", self.rebasing_banner(), self.without_rebasing_banner(body))
    }

    /// `body` with the rebasing banner removed
    pub fn without_rebasing_banner(&self, body: &str) -> String {
        body.replace(&self.rebasing_banner(), "")
    }

    /// Comment posted when a rebase could not complete
    pub fn rebase_failed(&self, base: &str, reason: &str) -> String {
        format!(
            "> [!CAUTION]\n\
             > Rebasing onto `{base}` failed and the branch was left unchanged.\n\
             > Rebase it manually, or comment `@{bot} recreate` to rebuild it.\n\
             \n\
             ```\n{reason}\n```\n",
            bot = self.bot_name,
        )
    }

    /// Notice posted on a release pull request older than the threshold
    pub fn stale_notice(&self) -> String {
        format!(
            "> [!WARNING]\n\
             > This release branch is more than {days} days old and is no longer \
             updated automatically.\n\
             > Comment `@{bot} recreate` to rebuild it from the default branch.\n",
            days = self.stale_after_days,
            bot = self.bot_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Templates {
        Templates::new("relbot", 7)
    }

    #[test]
    fn test_title_and_commit_message() {
        let version = Version::new(0, 0, 1);
        assert_eq!(templates().title("core", &version), "Release 'core' v0.0.1");
        assert_eq!(
            templates().commit_message("core", &version),
            "chore(release): core v0.0.1"
        );
    }

    #[test]
    fn test_marker_round_trips_through_body() {
        let t = templates();
        let body = t.pull_request_body("core", &Version::new(1, 2, 0), "main");
        assert!(body.contains("[//]: # (relbot-project:core)"));
        assert_eq!(t.project_from_marker(&body), Some("core".to_string()));
    }

    #[test]
    fn test_marker_of_another_bot_is_ignored() {
        let t = templates();
        assert_eq!(t.project_from_marker("[//]: # (otherbot-project:core)"), None);
        assert_eq!(t.project_from_marker("[//]: # (relbot-project:)"), None);
        assert_eq!(t.project_from_marker("no marker"), None);
    }

    #[test]
    fn test_banner_is_removable() {
        let t = templates();
        let body = "release body";
        let bannered = t.with_rebasing_banner(body);
        assert!(bannered.starts_with("> [!NOTE]"));
        assert_eq!(t.with_rebasing_banner(&bannered), bannered);
        assert_eq!(t.without_rebasing_banner(&bannered), body);
    }

    #[test]
    fn test_notices_mention_recreate() {
        let t = templates();
        assert!(t.stale_notice().contains("`@relbot recreate`"));
        assert!(t.stale_notice().contains("7 days"));
        assert!(t.rebase_failed("main", "CONFLICT").starts_with("> [!CAUTION]"));
    }
}
