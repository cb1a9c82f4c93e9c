//! Comment-triggered commands.

use super::push::missing_pull_request;
use super::{ReleaseAction, Reconciler, RunReport};
use crate::command::Command;
use crate::error::{PlatformError, Result};
use crate::event::CommentEvent;
use crate::git::{GitOperations, RebaseRequest};
use crate::github::{PullRequestUpdate, Reaction, ReleasePlatform};
use crate::state::{Comment, DraftRelease, PullRequest};
use crate::version::VersionBump;

impl<P: ReleasePlatform, G: GitOperations> Reconciler<P, G> {
    /// Handle a comment on a pull request
    ///
    /// Only pull requests carrying this bot's project marker are considered,
    /// and only comments that start with a command prefix. Commands are
    /// honoured whatever the age of the pull request.
    pub async fn handle_comment(&self, event: &CommentEvent) -> Result<RunReport> {
        let mut report = RunReport::default();
        let Some(project) = self.templates.project_from_marker(&event.pull_body) else {
            log::info!("Pull request #{} is not a release pull request", event.pull_number);
            return Ok(report);
        };

        let command = match self.parser.parse(&event.body) {
            Ok(None) => {
                log::debug!("Comment {} is not a command", event.comment_id);
                return Ok(report);
            }
            Ok(Some(command)) => command,
            Err(e) => {
                let result = match self
                    .platform
                    .add_reaction(event.comment_id, Reaction::Confused)
                    .await
                {
                    Ok(()) => Err(e.into()),
                    Err(reaction_error) => Err(reaction_error),
                };
                report.record(project, result);
                return Ok(report);
            }
        };

        let result = self.apply_command(&project, command, event).await;
        report.record(project, result);
        Ok(report)
    }

    async fn apply_command(
        &self,
        project: &str,
        command: Command,
        event: &CommentEvent,
    ) -> Result<ReleaseAction> {
        self.config.project(project)?;
        log::info!(
            "[{}] '{}' requested by {} on #{}",
            project,
            command,
            event.author_login,
            event.pull_number
        );
        self.platform
            .add_reaction(event.comment_id, Reaction::Acknowledge)
            .await?;

        let draft = self.load_commented_draft(project, event).await?;
        match command {
            Command::SetVersion(bump) => self.set_version(&draft, bump).await,
            Command::Rebase => self.rebase(&draft).await,
            Command::Recreate => self.recreate(&draft).await,
        }
    }

    /// Draft release of the commented pull request
    ///
    /// The triggering comment is appended when the comment listing does not
    /// include it yet.
    async fn load_commented_draft(
        &self,
        project: &str,
        event: &CommentEvent,
    ) -> Result<DraftRelease> {
        let mut draft = self.load_draft_release(project).await?;
        if draft.branch_head.is_none() {
            return Err(PlatformError::NotFound {
                what: format!("release branch {}", draft.id),
            }
            .into());
        }

        let pull = draft
            .pull_request
            .as_mut()
            .filter(|pull| pull.number == event.pull_number)
            .ok_or_else(|| PlatformError::NotFound {
                what: format!(
                    "open release pull request #{} from {}",
                    event.pull_number, draft.id
                ),
            })?;
        if !pull.comments.iter().any(|c| c.id == event.comment_id) {
            pull.comments.push(Comment {
                id: event.comment_id,
                body: event.body.clone(),
                author_login: event.author_login.clone(),
            });
        }
        Ok(draft)
    }

    /// Apply a version override and commit it onto the release branch head
    async fn set_version(&self, draft: &DraftRelease, bump: VersionBump) -> Result<ReleaseAction> {
        let (pull, head) = checked_out(draft)?;
        let project = self.config.project(&draft.project)?;

        let version = self.next_version(draft, self.config.default_bump)?;
        log::info!("[{}] {} bump -> v{}", draft.project, bump, version);
        self.sync_manifest(project, &draft.id, head, &version)
            .await?;
        self.refresh_pull_request(&draft.project, pull, &version)
            .await?;

        Ok(ReleaseAction::VersionSet {
            pull_number: pull.number,
            version,
        })
    }

    /// Rebase the release branch onto the pull request's base branch
    async fn rebase(&self, draft: &DraftRelease) -> Result<ReleaseAction> {
        let (pull, head) = checked_out(draft)?;
        let original_body = self.templates.without_rebasing_banner(&pull.body);

        self.set_body(pull.number, self.templates.with_rebasing_banner(&original_body))
            .await?;
        let rebased = self
            .git
            .rebase_branch(&RebaseRequest {
                branch: draft.id.clone(),
                onto: pull.base_branch.clone(),
                expected_head: head.to_string(),
            })
            .await;
        let cleared = self.set_body(pull.number, original_body).await;

        match rebased {
            Ok(new_head) => {
                cleared?;
                Ok(ReleaseAction::Rebased {
                    pull_number: pull.number,
                    head: new_head,
                })
            }
            Err(e) => {
                if let Err(banner_error) = cleared {
                    log::error!(
                        "[{}] could not clear the rebasing banner on #{}: {}",
                        draft.project,
                        pull.number,
                        banner_error
                    );
                }
                let caution = self
                    .templates
                    .rebase_failed(&pull.base_branch, &e.to_string());
                if let Err(comment_error) = self.platform.create_comment(pull.number, &caution).await
                {
                    log::error!(
                        "[{}] could not report the failed rebase on #{}: {}",
                        draft.project,
                        pull.number,
                        comment_error
                    );
                }
                Err(e)
            }
        }
    }

    /// Rebuild the release branch from the default branch tip
    async fn recreate(&self, draft: &DraftRelease) -> Result<ReleaseAction> {
        let (pull, head) = checked_out(draft)?;
        let project = self.config.project(&draft.project)?;

        let default = self.platform.default_branch_head().await?;
        self.platform
            .force_update_branch(&draft.id, &default.sha, head)
            .await?;
        log::info!(
            "[{}] reset {} to {} ({})",
            draft.project,
            draft.id,
            default.name,
            default.sha
        );

        let version = self.next_version(draft, self.config.default_bump)?;
        self.sync_manifest(project, &draft.id, &default.sha, &version)
            .await?;
        self.refresh_pull_request(&draft.project, pull, &version)
            .await?;

        Ok(ReleaseAction::Recreated {
            pull_number: pull.number,
            version,
        })
    }

    async fn set_body(&self, number: u64, body: String) -> Result<()> {
        self.platform
            .update_pull_request(
                number,
                PullRequestUpdate {
                    title: None,
                    body: Some(body),
                },
            )
            .await
    }
}

/// Pull request and branch head of a draft release that has both
fn checked_out(draft: &DraftRelease) -> Result<(&PullRequest, &str)> {
    let pull = draft
        .pull_request
        .as_ref()
        .ok_or_else(|| missing_pull_request(draft))?;
    let head = draft.branch_head.as_deref().ok_or_else(|| PlatformError::NotFound {
        what: format!("release branch {}", draft.id),
    })?;
    Ok((pull, head))
}
