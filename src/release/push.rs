//! Push-triggered transitions.

use super::{ReleaseAction, Reconciler, RunReport};
use crate::error::{BotError, PlatformError, Result};
use crate::event::PushEvent;
use crate::git::GitOperations;
use crate::github::{NewPullRequest, ReleasePlatform};
use crate::state::{DraftRelease, ReleaseState};
use chrono::{DateTime, Utc};

impl<P: ReleasePlatform, G: GitOperations> Reconciler<P, G> {
    /// Reconcile every project touched by a push
    ///
    /// Each project is processed on its own; a failure is recorded in the
    /// report and the remaining projects still run.
    pub async fn handle_push(&self, event: &PushEvent, now: DateTime<Utc>) -> Result<RunReport> {
        let mut report = RunReport::default();
        if !self.config.tracks_branch(&event.branch) {
            log::info!("Ignoring push to untracked branch '{}'", event.branch);
            return Ok(report);
        }

        let changed = match &event.changed_paths {
            Some(paths) => paths.clone(),
            None => self.platform.changed_files(&event.head_sha).await?,
        };
        let projects = self
            .filter
            .relevant_projects(changed.iter().map(String::as_str));
        if projects.is_empty() {
            log::info!(
                "No project touched by {} changed path(s) on '{}'",
                changed.len(),
                event.branch
            );
        }

        for project in projects {
            let result = self.reconcile_push(&project, event, now).await;
            report.record(project, result);
        }
        Ok(report)
    }

    /// Bring one project's draft release up to date with a push
    pub async fn reconcile_push(
        &self,
        project: &str,
        event: &PushEvent,
        now: DateTime<Utc>,
    ) -> Result<ReleaseAction> {
        let draft = self.load_draft_release(project).await?;
        let state = draft.state(now, self.config.stale_after());
        log::info!("[{}] draft release state: {}", project, state);

        if state == ReleaseState::BranchPrStale {
            return self.post_stale_notice(&draft).await;
        }

        let project_config = self.config.project(project)?;
        let version = self.next_version(&draft, self.config.default_bump)?;

        // NoBranchNoPr -> BranchNoPr
        let head = match &draft.branch_head {
            Some(head) => head.clone(),
            None => {
                self.platform
                    .create_branch(&draft.id, &event.head_sha)
                    .await?;
                log::info!("[{}] created {} at {}", project, draft.id, event.head_sha);
                event.head_sha.clone()
            }
        };
        self.sync_manifest(project_config, &draft.id, &head, &version)
            .await?;

        match &draft.pull_request {
            // BranchNoPr -> BranchPrFresh
            None => {
                let pull = self
                    .platform
                    .create_pull_request(NewPullRequest {
                        head: draft.id.clone(),
                        base: event.branch.clone(),
                        title: self.templates.title(project, &version),
                        body: self
                            .templates
                            .pull_request_body(project, &version, &event.branch),
                        labels: vec![self.config.release_label.clone(), project.to_string()],
                    })
                    .await?;
                Ok(ReleaseAction::Opened {
                    pull_number: pull.number,
                    version,
                })
            }
            Some(pull) => {
                self.refresh_pull_request(project, pull, &version).await?;
                Ok(ReleaseAction::Updated {
                    pull_number: pull.number,
                    version,
                })
            }
        }
    }

    /// Post the stale notice, or refresh it when it is already the last comment
    async fn post_stale_notice(&self, draft: &DraftRelease) -> Result<ReleaseAction> {
        let Some(pull) = &draft.pull_request else {
            return Err(missing_pull_request(draft));
        };
        let notice = self.templates.stale_notice();

        match pull.last_comment() {
            Some(last) if last.body == notice => {
                self.platform.update_comment(last.id, &notice).await?;
                Ok(ReleaseAction::StaleNotice {
                    pull_number: pull.number,
                    updated: true,
                })
            }
            _ => {
                self.platform.create_comment(pull.number, &notice).await?;
                Ok(ReleaseAction::StaleNotice {
                    pull_number: pull.number,
                    updated: false,
                })
            }
        }
    }
}

pub(super) fn missing_pull_request(draft: &DraftRelease) -> BotError {
    PlatformError::NotFound {
        what: format!("open release pull request from {}", draft.id),
    }
    .into()
}
