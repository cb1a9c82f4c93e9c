//! In-memory platform for tests and dry runs.
//!
//! Commits are full file snapshots keyed by a synthetic SHA; branches point
//! at those SHAs. Every mutation is recorded so tests can assert on the exact
//! sequence the reconciler issued.

use crate::error::{PlatformError, Result};
use crate::github::{
    BranchRef, CommitRequest, NewPullRequest, PullRequestUpdate, Reaction, ReleasePlatform,
};
use crate::state::{Comment, PullRequest, Tag};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// A mutation issued against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Branch created
    CreateBranch {
        /// Branch name
        branch: String,
        /// Commit it points to
        sha: String,
    },
    /// Branch force-moved
    ForceUpdateBranch {
        /// Branch name
        branch: String,
        /// Commit it now points to
        sha: String,
    },
    /// Commit created
    CreateCommit(CommitRequest),
    /// Pull request opened
    CreatePullRequest(NewPullRequest),
    /// Pull request edited
    UpdatePullRequest {
        /// Pull request number
        number: u64,
        /// Applied update
        update: PullRequestUpdate,
    },
    /// Reaction added
    AddReaction {
        /// Comment id
        comment_id: u64,
        /// Reaction
        reaction: Reaction,
    },
    /// Comment posted
    CreateComment {
        /// Pull request number
        number: u64,
        /// Body
        body: String,
    },
    /// Comment edited
    UpdateComment {
        /// Comment id
        comment_id: u64,
        /// New body
        body: String,
    },
}

#[derive(Debug)]
struct MockPull {
    pull: PullRequest,
    labels: Vec<String>,
}

#[derive(Debug)]
struct MockState {
    now: DateTime<Utc>,
    default_branch: String,
    branches: BTreeMap<String, String>,
    commits: HashMap<String, BTreeMap<String, String>>,
    changed_files: HashMap<String, Vec<String>>,
    tags: Vec<Tag>,
    pulls: Vec<MockPull>,
    comments: HashMap<u64, Vec<Comment>>,
    mutations: Vec<Mutation>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tree(&self, git_ref: &str) -> Option<&BTreeMap<String, String>> {
        let sha = self
            .branches
            .get(git_ref)
            .map(String::as_str)
            .unwrap_or(git_ref);
        self.commits.get(sha)
    }

    fn pull_with_comments(&self, pull: &PullRequest) -> PullRequest {
        let mut pull = pull.clone();
        pull.head_sha = self
            .branches
            .get(&pull.head_branch)
            .cloned()
            .unwrap_or(pull.head_sha);
        pull.comments = self.comments.get(&pull.number).cloned().unwrap_or_default();
        pull
    }
}

/// In-memory [`ReleasePlatform`]
#[derive(Debug)]
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    /// Repository whose default branch points to `head_sha` with `files`
    pub fn new(default_branch: &str, head_sha: &str, files: &[(&str, &str)]) -> Self {
        let mut commits = HashMap::new();
        commits.insert(head_sha.to_string(), snapshot(files));
        let mut branches = BTreeMap::new();
        branches.insert(default_branch.to_string(), head_sha.to_string());

        Self {
            state: Mutex::new(MockState {
                now: Utc::now(),
                default_branch: default_branch.to_string(),
                branches,
                commits,
                changed_files: HashMap::new(),
                tags: Vec::new(),
                pulls: Vec::new(),
                comments: HashMap::new(),
                mutations: Vec::new(),
                next_id: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Time stamped on pull requests opened through the mock
    pub fn set_now(&self, now: DateTime<Utc>) {
        self.state().now = now;
    }

    /// Add a commit snapshot
    pub fn add_commit(&self, sha: &str, files: &[(&str, &str)]) {
        self.state()
            .commits
            .insert(sha.to_string(), snapshot(files));
    }

    /// Point a branch at a commit without recording a mutation
    pub fn set_branch(&self, branch: &str, sha: &str) {
        self.state()
            .branches
            .insert(branch.to_string(), sha.to_string());
    }

    /// Register the files a commit touched
    pub fn set_changed_files(&self, sha: &str, paths: &[&str]) {
        self.state().changed_files.insert(
            sha.to_string(),
            paths.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Append a tag (newest last)
    pub fn add_tag(&self, name: &str) {
        self.state().tags.push(Tag::new(name));
    }

    /// Register an open pull request
    pub fn add_pull_request(&self, pull: PullRequest, labels: &[&str]) {
        let mut state = self.state();
        state.next_id = state.next_id.max(pull.number);
        state.comments.insert(pull.number, pull.comments.clone());
        state.pulls.push(MockPull {
            pull,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
    }

    /// Append a comment to a pull request without recording a mutation
    pub fn add_comment(&self, number: u64, body: &str, author: &str) -> Comment {
        let mut state = self.state();
        let comment = Comment {
            id: state.next_id(),
            body: body.to_string(),
            author_login: author.to_string(),
        };
        state
            .comments
            .entry(number)
            .or_default()
            .push(comment.clone());
        comment
    }

    /// Mutations issued so far, in order
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().mutations.clone()
    }

    /// Current head of a branch
    pub fn branch(&self, branch: &str) -> Option<String> {
        self.state().branches.get(branch).cloned()
    }

    /// File content at a branch or commit
    pub fn file(&self, git_ref: &str, path: &str) -> Option<String> {
        self.state().tree(git_ref)?.get(path).cloned()
    }

    /// Pull request by number, with comments
    pub fn pull_request(&self, number: u64) -> Option<PullRequest> {
        let state = self.state();
        state
            .pulls
            .iter()
            .find(|p| p.pull.number == number)
            .map(|p| state.pull_with_comments(&p.pull))
    }

    /// Labels of a pull request
    pub fn labels(&self, number: u64) -> Vec<String> {
        self.state()
            .pulls
            .iter()
            .find(|p| p.pull.number == number)
            .map(|p| p.labels.clone())
            .unwrap_or_default()
    }
}

fn snapshot(files: &[(&str, &str)]) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(path, contents)| (path.to_string(), contents.to_string()))
        .collect()
}

fn not_found(what: String) -> crate::error::BotError {
    PlatformError::NotFound { what }.into()
}

impl ReleasePlatform for MockPlatform {
    async fn list_project_tags(&self, project: &str) -> Result<Vec<Tag>> {
        let prefix = Tag::project_prefix(project);
        Ok(self
            .state()
            .tags
            .iter()
            .filter(|tag| tag.name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.state().branches.get(branch).cloned())
    }

    async fn default_branch_head(&self) -> Result<BranchRef> {
        let state = self.state();
        let sha = state
            .branches
            .get(&state.default_branch)
            .cloned()
            .ok_or_else(|| not_found(format!("branch {}", state.default_branch)))?;
        Ok(BranchRef {
            name: state.default_branch.clone(),
            sha,
        })
    }

    async fn find_release_pull_request(
        &self,
        head_branch: &str,
        label: &str,
    ) -> Result<Option<PullRequest>> {
        let state = self.state();
        Ok(state
            .pulls
            .iter()
            .filter(|p| p.pull.head_branch == head_branch && p.labels.iter().any(|l| l == label))
            .last()
            .map(|p| state.pull_with_comments(&p.pull)))
    }

    async fn file_content(&self, path: &str, git_ref: &str) -> Result<Option<String>> {
        let state = self.state();
        let files = state
            .tree(git_ref)
            .ok_or_else(|| not_found(format!("ref {}", git_ref)))?;
        Ok(files.get(path).cloned())
    }

    async fn changed_files(&self, sha: &str) -> Result<Vec<String>> {
        self.state()
            .changed_files
            .get(sha)
            .cloned()
            .ok_or_else(|| not_found(format!("commit {}", sha)))
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let mut state = self.state();
        if state.branches.contains_key(branch) {
            return Err(PlatformError::Status {
                operation: "create_branch".to_string(),
                status: 422,
                message: "Reference already exists".to_string(),
            }
            .into());
        }
        if !state.commits.contains_key(sha) {
            return Err(not_found(format!("commit {}", sha)));
        }
        state.branches.insert(branch.to_string(), sha.to_string());
        state.mutations.push(Mutation::CreateBranch {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    async fn force_update_branch(&self, branch: &str, sha: &str, expected_head: &str) -> Result<()> {
        let mut state = self.state();
        let head = state
            .branches
            .get(branch)
            .ok_or_else(|| not_found(format!("branch {}", branch)))?;
        if head != expected_head {
            return Err(PlatformError::PreconditionConflict {
                branch: branch.to_string(),
                expected_head: expected_head.to_string(),
            }
            .into());
        }
        state.branches.insert(branch.to_string(), sha.to_string());
        state.mutations.push(Mutation::ForceUpdateBranch {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    async fn create_commit(&self, request: CommitRequest) -> Result<String> {
        let mut state = self.state();
        let head = state
            .branches
            .get(&request.branch)
            .cloned()
            .ok_or_else(|| not_found(format!("branch {}", request.branch)))?;
        if head != request.expected_head {
            return Err(PlatformError::PreconditionConflict {
                branch: request.branch.clone(),
                expected_head: request.expected_head.clone(),
            }
            .into());
        }

        let mut files = state.commits.get(&head).cloned().unwrap_or_default();
        for addition in &request.files {
            files.insert(addition.path.clone(), addition.contents.clone());
        }
        let sha = format!("commit-{}", state.next_id());
        state.commits.insert(sha.clone(), files);
        state.branches.insert(request.branch.clone(), sha.clone());
        state.mutations.push(Mutation::CreateCommit(request));
        Ok(sha)
    }

    async fn create_pull_request(&self, request: NewPullRequest) -> Result<PullRequest> {
        let mut state = self.state();
        let head_sha = state
            .branches
            .get(&request.head)
            .cloned()
            .ok_or_else(|| not_found(format!("branch {}", request.head)))?;
        let number = state.next_id();
        let pull = PullRequest {
            id: format!("PR_{}", number),
            number,
            title: request.title.clone(),
            head_sha,
            head_branch: request.head.clone(),
            base_branch: request.base.clone(),
            body: request.body.clone(),
            created_at: state.now,
            comments: Vec::new(),
        };
        state.pulls.push(MockPull {
            pull: pull.clone(),
            labels: request.labels.clone(),
        });
        state.mutations.push(Mutation::CreatePullRequest(request));
        Ok(pull)
    }

    async fn update_pull_request(&self, number: u64, update: PullRequestUpdate) -> Result<()> {
        let mut state = self.state();
        let pull = state
            .pulls
            .iter_mut()
            .find(|p| p.pull.number == number)
            .ok_or_else(|| not_found(format!("pull request #{}", number)))?;
        if let Some(title) = &update.title {
            pull.pull.title = title.clone();
        }
        if let Some(body) = &update.body {
            pull.pull.body = body.clone();
        }
        state
            .mutations
            .push(Mutation::UpdatePullRequest { number, update });
        Ok(())
    }

    async fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        self.state().mutations.push(Mutation::AddReaction {
            comment_id,
            reaction,
        });
        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<Comment> {
        let mut state = self.state();
        let comment = Comment {
            id: state.next_id(),
            body: body.to_string(),
            author_login: "relbot[bot]".to_string(),
        };
        state
            .comments
            .entry(number)
            .or_default()
            .push(comment.clone());
        state.mutations.push(Mutation::CreateComment {
            number,
            body: body.to_string(),
        });
        Ok(comment)
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let mut state = self.state();
        let comment = state
            .comments
            .values_mut()
            .flat_map(|comments| comments.iter_mut())
            .find(|c| c.id == comment_id)
            .ok_or_else(|| not_found(format!("comment {}", comment_id)))?;
        comment.body = body.to_string();
        state.mutations.push(Mutation::UpdateComment {
            comment_id,
            body: body.to_string(),
        });
        Ok(())
    }
}
