//! Release-state reconciliation.
//!
//! Every trigger rebuilds each affected project's [`DraftRelease`] from the
//! platform, classifies it and applies the transitions that bring it to a
//! resting state. Nothing is remembered between passes: the branches, pull
//! requests, comments and tags on the platform are the whole state.

mod comment;
mod push;
mod report;
mod template;

pub use report::{ProjectOutcome, ReleaseAction, RunReport};
pub use template::Templates;

use crate::command::CommandParser;
use crate::config::{BotConfig, ProjectConfig};
use crate::error::{PlatformError, Result};
use crate::git::GitOperations;
use crate::github::{CommitRequest, FileAddition, PullRequestUpdate, ReleasePlatform};
use crate::project::ChangeRelevanceFilter;
use crate::state::{DraftRelease, PullRequest};
use crate::version::{VersionBump, VersionResolver, current_version, patch_version};
use semver::Version;

/// Drives draft releases of every configured project
#[derive(Debug)]
pub struct Reconciler<P, G> {
    config: BotConfig,
    parser: CommandParser,
    resolver: VersionResolver,
    filter: ChangeRelevanceFilter,
    templates: Templates,
    platform: P,
    git: G,
}

impl<P: ReleasePlatform, G: GitOperations> Reconciler<P, G> {
    /// Build a reconciler from a validated configuration
    pub fn new(config: BotConfig, platform: P, git: G) -> Result<Self> {
        config.validate()?;
        let parser = CommandParser::new(config.bot_name.clone());
        let resolver = VersionResolver::new(parser.clone());
        let filter = ChangeRelevanceFilter::new(&config.projects)?;
        let templates = Templates::new(config.bot_name.clone(), config.stale_after_days);

        Ok(Self {
            config,
            parser,
            resolver,
            filter,
            templates,
            platform,
            git,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Text templates in use
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Platform adapter
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Observe a project's draft release
    pub async fn load_draft_release(&self, project: &str) -> Result<DraftRelease> {
        let id = self.config.release_branch(project);
        let tags = self.platform.list_project_tags(project).await?;
        let branch_head = self.platform.branch_head(&id).await?;
        let pull_request = self
            .platform
            .find_release_pull_request(&id, &self.config.release_label)
            .await?;

        log::debug!(
            "[{}] {} tag(s), branch {}, pull request {}",
            project,
            tags.len(),
            branch_head.as_deref().unwrap_or("absent"),
            pull_request
                .as_ref()
                .map(|pr| format!("#{}", pr.number))
                .unwrap_or_else(|| "absent".to_string())
        );

        Ok(DraftRelease {
            project: project.to_string(),
            id,
            tags,
            branch_head,
            pull_request,
        })
    }

    /// Next version of a draft release
    pub fn next_version(&self, draft: &DraftRelease, requested: VersionBump) -> Result<Version> {
        Ok(self
            .resolver
            .next_version(&draft.tags, draft.comments(), requested)?)
    }

    /// Read-only preview of a project's next version
    pub async fn preview_version(&self, project: &str, requested: VersionBump) -> Result<Version> {
        self.config.project(project)?;
        let draft = self.load_draft_release(project).await?;
        self.next_version(&draft, requested)
    }

    /// Write `version` into the project manifest on `branch`
    ///
    /// Commits only when the manifest changes. Returns the branch head after
    /// the call.
    async fn sync_manifest(
        &self,
        project: &ProjectConfig,
        branch: &str,
        head: &str,
        version: &Version,
    ) -> Result<String> {
        let manifest = self
            .platform
            .file_content(&project.manifest, head)
            .await?
            .ok_or_else(|| PlatformError::NotFound {
                what: format!("manifest {} at {}", project.manifest, head),
            })?;

        let patched = patch_version(&manifest, version);
        if patched == manifest {
            if current_version(&manifest).is_none() {
                log::warn!(
                    "[{}] {} has no \"version\" field; nothing to commit",
                    project.id,
                    project.manifest
                );
            } else {
                log::debug!("[{}] manifest already at v{}", project.id, version);
            }
            return Ok(head.to_string());
        }

        let new_head = self
            .platform
            .create_commit(CommitRequest {
                branch: branch.to_string(),
                expected_head: head.to_string(),
                message: self.templates.commit_message(&project.id, version),
                files: vec![FileAddition {
                    path: project.manifest.clone(),
                    contents: patched,
                }],
            })
            .await?;
        log::info!("[{}] committed v{} to {} ({})", project.id, version, branch, new_head);
        Ok(new_head)
    }

    /// Refresh title and body of the release pull request
    async fn refresh_pull_request(
        &self,
        project: &str,
        pull: &PullRequest,
        version: &Version,
    ) -> Result<()> {
        self.platform
            .update_pull_request(
                pull.number,
                PullRequestUpdate {
                    title: Some(self.templates.title(project, version)),
                    body: Some(self.templates.pull_request_body(
                        project,
                        version,
                        &pull.base_branch,
                    )),
                },
            )
            .await
    }
}
