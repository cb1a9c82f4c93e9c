//! Trigger events from GitHub Actions payloads.
//!
//! Only the fields the reconciler acts on are modelled. Anything that is not
//! a branch push or a newly created comment on a pull request is ignored.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;

/// A push to a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// Pushed branch, without `refs/heads/`
    pub branch: String,
    /// Head commit after the push
    pub head_sha: String,
    /// Paths touched by the pushed commits, if the payload lists them
    ///
    /// `None` means the platform has to be asked for the head commit's files.
    pub changed_paths: Option<Vec<String>>,
}

/// A comment created on a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEvent {
    /// Comment id
    pub comment_id: u64,
    /// Comment body
    pub body: String,
    /// Comment author
    pub author_login: String,
    /// Pull request number
    pub pull_number: u64,
    /// Pull request body, where the project marker lives
    pub pull_body: String,
}

/// Event that starts a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Branch push
    Push(PushEvent),
    /// Pull request comment
    Comment(CommentEvent),
}

impl TriggerEvent {
    /// Interpret a webhook payload
    ///
    /// Returns `Ok(None)` for events relbot does not act on.
    pub fn from_payload(event_name: &str, payload: &str) -> Result<Option<Self>> {
        let invalid = |e: serde_json::Error| CliError::InvalidEvent {
            event: event_name.to_string(),
            reason: e.to_string(),
        };
        match event_name {
            "push" => {
                let push: PushPayload = serde_json::from_str(payload).map_err(invalid)?;
                Ok(push.into_event().map(TriggerEvent::Push))
            }
            "issue_comment" => {
                let comment: CommentPayload = serde_json::from_str(payload).map_err(invalid)?;
                Ok(comment.into_event().map(TriggerEvent::Comment))
            }
            other => {
                log::info!("Ignoring '{}' event", other);
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    after: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    commits: Vec<PushCommit>,
}

#[derive(Debug, Deserialize)]
struct PushCommit {
    #[serde(default)]
    added: Vec<String>,
    #[serde(default)]
    modified: Vec<String>,
    #[serde(default)]
    removed: Vec<String>,
}

impl PushPayload {
    fn into_event(self) -> Option<PushEvent> {
        let Some(branch) = self.git_ref.strip_prefix("refs/heads/") else {
            log::info!("Ignoring push to non-branch ref {}", self.git_ref);
            return None;
        };
        if self.deleted {
            log::info!("Ignoring deletion of branch {}", branch);
            return None;
        }

        let paths: BTreeSet<String> = self
            .commits
            .into_iter()
            .flat_map(|c| c.added.into_iter().chain(c.modified).chain(c.removed))
            .collect();

        Some(PushEvent {
            branch: branch.to_string(),
            head_sha: self.after,
            changed_paths: (!paths.is_empty()).then(|| paths.into_iter().collect()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    action: String,
    issue: IssueWire,
    comment: CommentWire,
}

#[derive(Debug, Deserialize)]
struct IssueWire {
    number: u64,
    body: Option<String>,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CommentWire {
    id: u64,
    body: Option<String>,
    user: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    login: String,
}

impl CommentPayload {
    fn into_event(self) -> Option<CommentEvent> {
        if self.action != "created" {
            log::info!("Ignoring '{}' comment action", self.action);
            return None;
        }
        if self.issue.pull_request.is_none() {
            log::info!("Ignoring comment on issue #{}", self.issue.number);
            return None;
        }
        Some(CommentEvent {
            comment_id: self.comment.id,
            body: self.comment.body.unwrap_or_default(),
            author_login: self.comment.user.map(|u| u.login).unwrap_or_default(),
            pull_number: self.issue.number,
            pull_body: self.issue.body.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_collects_paths_from_commits() {
        let payload = r#"{
            "ref": "refs/heads/main",
            "after": "abc123",
            "commits": [
                {"added": ["core/a.ts"], "modified": ["docs/readme.md"], "removed": []},
                {"added": [], "modified": ["core/a.ts"], "removed": ["grid/old.ts"]}
            ]
        }"#;
        let Some(TriggerEvent::Push(push)) = TriggerEvent::from_payload("push", payload).unwrap()
        else {
            panic!("expected a push event");
        };
        assert_eq!(push.branch, "main");
        assert_eq!(push.head_sha, "abc123");
        assert_eq!(
            push.changed_paths.unwrap(),
            vec!["core/a.ts", "docs/readme.md", "grid/old.ts"]
        );
    }

    #[test]
    fn test_push_without_file_lists() {
        let payload = r#"{"ref": "refs/heads/main", "after": "abc123", "commits": []}"#;
        let event = TriggerEvent::from_payload("push", payload).unwrap();
        assert!(matches!(
            event,
            Some(TriggerEvent::Push(PushEvent { changed_paths: None, .. }))
        ));
    }

    #[test]
    fn test_tag_push_and_deletion_are_ignored() {
        let tag = r#"{"ref": "refs/tags/core@v1.0.0", "after": "abc"}"#;
        assert!(TriggerEvent::from_payload("push", tag).unwrap().is_none());

        let deleted = r#"{"ref": "refs/heads/feature", "after": "000", "deleted": true}"#;
        assert!(TriggerEvent::from_payload("push", deleted).unwrap().is_none());
    }

    #[test]
    fn test_comment_on_pull_request() {
        let payload = r#"{
            "action": "created",
            "issue": {"number": 12, "body": "body", "pull_request": {"url": "x"}},
            "comment": {"id": 99, "body": "@relbot rebase", "user": {"login": "octocat"}}
        }"#;
        let event = TriggerEvent::from_payload("issue_comment", payload).unwrap();
        assert_eq!(
            event,
            Some(TriggerEvent::Comment(CommentEvent {
                comment_id: 99,
                body: "@relbot rebase".to_string(),
                author_login: "octocat".to_string(),
                pull_number: 12,
                pull_body: "body".to_string(),
            }))
        );
    }

    #[test]
    fn test_edited_and_issue_comments_are_ignored() {
        let edited = r#"{
            "action": "edited",
            "issue": {"number": 12, "body": "", "pull_request": {}},
            "comment": {"id": 1, "body": "@relbot rebase"}
        }"#;
        assert!(
            TriggerEvent::from_payload("issue_comment", edited)
                .unwrap()
                .is_none()
        );

        let on_issue = r#"{
            "action": "created",
            "issue": {"number": 3, "body": null},
            "comment": {"id": 1, "body": "@relbot rebase"}
        }"#;
        assert!(
            TriggerEvent::from_payload("issue_comment", on_issue)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_malformed_payload_names_event() {
        let err = TriggerEvent::from_payload("push", "{}").unwrap_err();
        assert!(err.to_string().contains("'push'"));
        assert!(TriggerEvent::from_payload("workflow_dispatch", "{}").unwrap().is_none());
    }
}
