//! [`GitOperations`] over the `git` binary.

use crate::error::{GitError, PlatformError, Result};
use crate::git::{GitOperations, RebaseRequest};
use std::path::PathBuf;
use std::process::Output;

/// Runs `git` in a local clone of the repository
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
    remote: String,
    user_name: String,
    user_email: String,
}

impl GitCli {
    /// Operate on the clone at `workdir`, pushing to `remote`
    ///
    /// Commits rewritten by a rebase are committed as `<bot_name>[bot]`.
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>, bot_name: &str) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
            user_name: format!("{}[bot]", bot_name),
            user_email: format!("{}[bot]@users.noreply.github.com", bot_name),
        }
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        log::debug!("git {}", args.join(" "));
        let output = tokio::process::Command::new("git")
            .arg("-c")
            .arg(format!("user.name={}", self.user_name))
            .arg("-c")
            .arg(format!("user.email={}", self.user_email))
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| GitError::CommandFailed {
                command: args.join(" "),
                reason: e.to_string(),
            })?;
        Ok(output)
    }

    /// Run a git command and return its trimmed stdout
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitOperations for GitCli {
    async fn rebase_branch(&self, request: &RebaseRequest) -> Result<String> {
        let upstream = format!("{}/{}", self.remote, request.onto);

        self.run(&["fetch", &self.remote, &request.onto, &request.branch])
            .await?;
        self.run(&["checkout", "-B", &request.branch, &request.expected_head])
            .await?;

        // during a rebase "theirs" is the branch being replayed
        let rebase = self.output(&["rebase", "-X", "theirs", &upstream]).await?;
        if !rebase.status.success() {
            if let Err(e) = self.run(&["rebase", "--abort"]).await {
                log::warn!("Could not abort rebase of '{}': {}", request.branch, e);
            }
            return Err(GitError::RebaseConflict {
                branch: request.branch.clone(),
                onto: request.onto.clone(),
                reason: String::from_utf8_lossy(&rebase.stdout).trim().to_string(),
            }
            .into());
        }

        let lease = format!("--force-with-lease={}:{}", request.branch, request.expected_head);
        let refspec = format!("HEAD:refs/heads/{}", request.branch);
        let push = self
            .output(&["push", &lease, &self.remote, &refspec])
            .await?;
        if !push.status.success() {
            let stderr = String::from_utf8_lossy(&push.stderr);
            if stderr.contains("stale info") || stderr.contains("rejected") {
                return Err(PlatformError::PreconditionConflict {
                    branch: request.branch.clone(),
                    expected_head: request.expected_head.clone(),
                }
                .into());
            }
            return Err(GitError::CommandFailed {
                command: format!("push {} {} {}", lease, self.remote, refspec),
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        let head = self.run(&["rev-parse", "HEAD"]).await?;
        log::info!(
            "Rebased '{}' onto '{}', new head {}",
            request.branch,
            request.onto,
            head
        );
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use std::path::Path;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    /// Bare remote with `main` and a release branch that forked before
    /// `main` advanced. Returns (root, clone, release head).
    fn diverged_repo() -> (tempfile::TempDir, PathBuf, String) {
        let root = tempfile::tempdir().unwrap();
        let remote = root.path().join("remote.git");
        let clone = root.path().join("clone");
        std::fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(root.path(), &["clone", remote.to_str().unwrap(), "clone"]);
        git(&clone, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        std::fs::write(clone.join("package.json"), "{\"version\": \"0.0.0\"}\n").unwrap();
        git(&clone, &["add", "."]);
        git(&clone, &["commit", "-m", "init"]);
        git(&clone, &["push", "origin", "main"]);

        git(&clone, &["checkout", "-b", "relbot-core"]);
        std::fs::write(clone.join("package.json"), "{\"version\": \"0.0.1\"}\n").unwrap();
        git(&clone, &["commit", "-am", "chore(release): core v0.0.1"]);
        git(&clone, &["push", "origin", "relbot-core"]);
        let release_head = git(&clone, &["rev-parse", "HEAD"]);

        git(&clone, &["checkout", "main"]);
        std::fs::write(clone.join("feature.txt"), "new\n").unwrap();
        git(&clone, &["add", "."]);
        git(&clone, &["commit", "-m", "feat: more"]);
        git(&clone, &["push", "origin", "main"]);

        (root, clone, release_head)
    }

    #[tokio::test]
    async fn test_rebase_moves_branch_onto_default() {
        if !git_available() {
            return;
        }
        let (_root, clone, release_head) = diverged_repo();
        let cli = GitCli::new(&clone, "origin", "relbot");

        let head = cli
            .rebase_branch(&RebaseRequest {
                branch: "relbot-core".to_string(),
                onto: "main".to_string(),
                expected_head: release_head.clone(),
            })
            .await
            .unwrap();

        assert_ne!(head, release_head);
        let main_head = git(&clone, &["rev-parse", "origin/main"]);
        assert_eq!(git(&clone, &["rev-parse", "HEAD~1"]), main_head);
        git(&clone, &["fetch", "origin"]);
        assert_eq!(git(&clone, &["rev-parse", "origin/relbot-core"]), head);
    }

    #[tokio::test]
    async fn test_push_is_leased_on_observed_head() {
        if !git_available() {
            return;
        }
        let (_root, clone, _release_head) = diverged_repo();
        let stale_head = git(&clone, &["rev-parse", "main~1"]);
        let cli = GitCli::new(&clone, "origin", "relbot");

        let err = cli
            .rebase_branch(&RebaseRequest {
                branch: "relbot-core".to_string(),
                onto: "main".to_string(),
                expected_head: stale_head,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BotError::Platform(PlatformError::PreconditionConflict { .. })
        ));
    }
}
