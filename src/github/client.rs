//! GitHub REST and GraphQL implementation of [`ReleasePlatform`].

use crate::config::EnvConfig;
use crate::error::{BotError, CliError, PlatformError, Result};
use crate::github::{
    BranchRef, CommitRequest, NewPullRequest, PullRequestUpdate, Reaction, ReleasePlatform,
};
use crate::state::{Comment, PullRequest, Tag};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const DEFAULT_API_URL: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

/// Message GitHub returns when `expectedHeadOid` no longer matches
const STALE_HEAD_MESSAGE: &str = "Expected branch to point to";

/// Connection settings for a single repository
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API root
    pub api_url: String,
    /// GraphQL endpoint
    pub graphql_url: String,
    /// Access token
    pub token: String,
}

impl GitHubConfig {
    /// Build from the variables GitHub Actions exposes
    ///
    /// Reads `GITHUB_REPOSITORY` (`owner/repo`), `GITHUB_API_URL`,
    /// `GITHUB_GRAPHQL_URL` and the token from `GH_TOKEN` or `GITHUB_TOKEN`.
    pub fn from_env(env: &EnvConfig) -> Result<Self> {
        let repository = env.get("GITHUB_REPOSITORY").ok_or_else(|| {
            BotError::Cli(CliError::InvalidArguments {
                reason: "GITHUB_REPOSITORY is not set".to_string(),
            })
        })?;
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| {
                BotError::Cli(CliError::InvalidArguments {
                    reason: format!("GITHUB_REPOSITORY '{}' is not owner/repo", repository),
                })
            })?;

        let api_url = env
            .get("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let graphql_url = env
            .get("GITHUB_GRAPHQL_URL")
            .unwrap_or_else(|| format!("{}/graphql", api_url));
        let token = env.github_token().ok_or(PlatformError::MissingToken)?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            api_url,
            graphql_url,
            token,
        })
    }
}

/// GitHub client scoped to one repository
///
/// Each trait method maps to one request, or a fixed short sequence of them.
/// Failed requests are reported, never retried.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a client with authentication and API version headers set
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token)).map_err(|e| {
            PlatformError::Request {
                operation: "client_init".to_string(),
                reason: format!("token is not a valid header value: {}", e),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("relbot/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::Request {
                operation: "client_init".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    /// Repository this client is bound to, as `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url, self.config.owner, self.config.repo, path
        )
    }

    /// Send a request; `None` on 404
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Option<reqwest::Response>> {
        log::debug!("GitHub request: {}", operation);
        let response = request.send().await.map_err(|e| PlatformError::Request {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorWire>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(PlatformError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }
        Ok(Some(response))
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            PlatformError::Decode {
                operation: operation.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        match self.send(operation, request).await? {
            Some(response) => Ok(Some(Self::decode(operation, response).await?)),
            None => Ok(None),
        }
    }

    async fn get_required<T: DeserializeOwned>(
        &self,
        operation: &str,
        what: String,
        request: RequestBuilder,
    ) -> Result<T> {
        self.get_optional(operation, request)
            .await?
            .ok_or_else(|| PlatformError::NotFound { what }.into())
    }

    /// Send a mutation whose response body is not needed
    async fn execute(&self, operation: &str, what: String, request: RequestBuilder) -> Result<()> {
        self.send(operation, request)
            .await?
            .map(|_| ())
            .ok_or_else(|| PlatformError::NotFound { what }.into())
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let request = self
            .http
            .post(&self.config.graphql_url)
            .json(&json!({ "query": query, "variables": variables }));
        let response: GraphQlResponse<T> = self
            .get_required(operation, format!("GraphQL endpoint {}", self.config.graphql_url), request)
            .await?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PlatformError::GraphQl {
                operation: operation.to_string(),
                message,
            }
            .into());
        }
        response.data.ok_or_else(|| {
            PlatformError::Decode {
                operation: operation.to_string(),
                reason: "response carries neither data nor errors".to_string(),
            }
            .into()
        })
    }

    async fn list_pull_requests(&self, head_branch: &str) -> Result<Vec<PullWire>> {
        let request = self.http.get(self.repo_url("/pulls")).query(&[
            ("state", "open".to_string()),
            ("head", format!("{}:{}", self.config.owner, head_branch)),
            ("per_page", PER_PAGE.to_string()),
        ]);
        Ok(self
            .get_optional("list_pull_requests", request)
            .await?
            .unwrap_or_default())
    }

    async fn with_comments(&self, pull: PullWire) -> Result<PullRequest> {
        let comments = self.list_comments(pull.number).await?;
        Ok(pull.into_pull_request(comments))
    }

    /// Comments of a pull request in creation order
    async fn list_comments(&self, number: u64) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        for page in 1.. {
            let request = self
                .http
                .get(self.repo_url(&format!("/issues/{}/comments", number)))
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let batch: Vec<CommentWire> = self
                .get_required("list_comments", format!("pull request #{}", number), request)
                .await?;
            let last_page = batch.len() < PER_PAGE;
            comments.extend(batch.into_iter().map(Comment::from));
            if last_page {
                break;
            }
        }
        Ok(comments)
    }
}

impl ReleasePlatform for GitHubClient {
    async fn list_project_tags(&self, project: &str) -> Result<Vec<Tag>> {
        const QUERY: &str = r#"
query($owner: String!, $name: String!, $query: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: "refs/tags/", query: $query, first: 100, after: $after,
         orderBy: {field: TAG_COMMIT_DATE, direction: ASC}) {
      nodes { name }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;
        let prefix = Tag::project_prefix(project);
        let mut tags = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: TagsData = self
                .graphql(
                    "list_project_tags",
                    QUERY,
                    json!({
                        "owner": self.config.owner,
                        "name": self.config.repo,
                        "query": prefix,
                        "after": after,
                    }),
                )
                .await?;
            let refs = data
                .repository
                .ok_or_else(|| PlatformError::NotFound {
                    what: format!("repository {}", self.repository()),
                })?
                .refs;

            // the ref query is a substring match; keep only this project's tags
            tags.extend(
                refs.nodes
                    .into_iter()
                    .filter(|node| node.name.starts_with(&prefix))
                    .map(|node| Tag::new(node.name)),
            );

            match refs.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(cursor),
                } => after = Some(cursor),
                _ => break,
            }
        }

        log::debug!("Found {} tag(s) for project '{}'", tags.len(), project);
        Ok(tags)
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        let request = self
            .http
            .get(self.repo_url(&format!("/git/ref/heads/{}", branch)));
        let reference: Option<RefWire> = self.get_optional("branch_head", request).await?;
        Ok(reference.map(|r| r.object.sha))
    }

    async fn default_branch_head(&self) -> Result<BranchRef> {
        let request = self.http.get(self.repo_url(""));
        let repo: RepoWire = self
            .get_required(
                "get_repository",
                format!("repository {}", self.repository()),
                request,
            )
            .await?;
        let sha = self.branch_head(&repo.default_branch).await?.ok_or_else(|| {
            PlatformError::NotFound {
                what: format!("branch {}", repo.default_branch),
            }
        })?;
        Ok(BranchRef {
            name: repo.default_branch,
            sha,
        })
    }

    async fn find_release_pull_request(
        &self,
        head_branch: &str,
        label: &str,
    ) -> Result<Option<PullRequest>> {
        let found = self
            .list_pull_requests(head_branch)
            .await?
            .into_iter()
            .filter(|pull| pull.labels.iter().any(|l| l.name == label))
            .last();
        match found {
            Some(pull) => Ok(Some(self.with_comments(pull).await?)),
            None => Ok(None),
        }
    }

    async fn file_content(&self, path: &str, git_ref: &str) -> Result<Option<String>> {
        let request = self
            .http
            .get(self.repo_url(&format!("/contents/{}", path)))
            .query(&[("ref", git_ref)]);
        let Some(content) = self
            .get_optional::<ContentWire>("file_content", request)
            .await?
        else {
            return Ok(None);
        };

        let decode_error = |reason: String| PlatformError::Decode {
            operation: "file_content".to_string(),
            reason: format!("{}: {}", path, reason),
        };
        if content.encoding.as_deref() != Some("base64") {
            return Err(decode_error(format!(
                "unsupported encoding {:?}",
                content.encoding
            ))
            .into());
        }
        let encoded: String = content
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| decode_error(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;
        Ok(Some(text))
    }

    async fn changed_files(&self, sha: &str) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for page in 1.. {
            let request = self
                .http
                .get(self.repo_url(&format!("/commits/{}", sha)))
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let commit: CommitWire = self
                .get_required("changed_files", format!("commit {}", sha), request)
                .await?;
            let last_page = commit.files.len() < PER_PAGE;
            paths.extend(commit.files.into_iter().map(|f| f.filename));
            if last_page {
                break;
            }
        }
        Ok(paths)
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let request = self.http.post(self.repo_url("/git/refs")).json(&json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": sha,
        }));
        self.execute("create_branch", format!("commit {}", sha), request)
            .await
    }

    async fn force_update_branch(&self, branch: &str, sha: &str, expected_head: &str) -> Result<()> {
        // the refs endpoint has no compare-and-swap; check right before the move
        let head = self
            .branch_head(branch)
            .await?
            .ok_or_else(|| PlatformError::NotFound {
                what: format!("branch {}", branch),
            })?;
        if head != expected_head {
            return Err(PlatformError::PreconditionConflict {
                branch: branch.to_string(),
                expected_head: expected_head.to_string(),
            }
            .into());
        }

        let request = self
            .http
            .patch(self.repo_url(&format!("/git/refs/heads/{}", branch)))
            .json(&json!({ "sha": sha, "force": true }));
        self.execute("force_update_branch", format!("branch {}", branch), request)
            .await
    }

    async fn create_commit(&self, request: CommitRequest) -> Result<String> {
        const MUTATION: &str = r#"
mutation($input: CreateCommitOnBranchInput!) {
  createCommitOnBranch(input: $input) { commit { oid } }
}"#;
        let additions: Vec<Value> = request
            .files
            .iter()
            .map(|file| json!({ "path": file.path, "contents": BASE64.encode(&file.contents) }))
            .collect();
        let input = json!({
            "branch": {
                "repositoryNameWithOwner": self.repository(),
                "branchName": request.branch,
            },
            "message": { "headline": request.message },
            "expectedHeadOid": request.expected_head,
            "fileChanges": { "additions": additions },
        });

        let data: CreateCommitData = match self
            .graphql("create_commit", MUTATION, json!({ "input": input }))
            .await
        {
            Ok(data) => data,
            Err(BotError::Platform(PlatformError::GraphQl { message, .. }))
                if message.contains(STALE_HEAD_MESSAGE) =>
            {
                return Err(PlatformError::PreconditionConflict {
                    branch: request.branch,
                    expected_head: request.expected_head,
                }
                .into());
            }
            Err(e) => return Err(e),
        };
        Ok(data.create_commit_on_branch.commit.oid)
    }

    async fn create_pull_request(&self, request: NewPullRequest) -> Result<PullRequest> {
        let create = self.http.post(self.repo_url("/pulls")).json(&json!({
            "title": request.title,
            "head": request.head,
            "base": request.base,
            "body": request.body,
        }));
        let pull: PullWire = self
            .get_required(
                "create_pull_request",
                format!("branch {}", request.head),
                create,
            )
            .await?;

        if !request.labels.is_empty() {
            let label = self
                .http
                .post(self.repo_url(&format!("/issues/{}/labels", pull.number)))
                .json(&json!({ "labels": request.labels }));
            self.execute(
                "add_labels",
                format!("pull request #{}", pull.number),
                label,
            )
            .await?;
        }

        log::info!("Opened pull request #{} from {}", pull.number, request.head);
        Ok(pull.into_pull_request(Vec::new()))
    }

    async fn update_pull_request(&self, number: u64, update: PullRequestUpdate) -> Result<()> {
        let mut fields = serde_json::Map::new();
        if let Some(title) = update.title {
            fields.insert("title".to_string(), Value::String(title));
        }
        if let Some(body) = update.body {
            fields.insert("body".to_string(), Value::String(body));
        }
        let request = self
            .http
            .patch(self.repo_url(&format!("/pulls/{}", number)))
            .json(&Value::Object(fields));
        self.execute(
            "update_pull_request",
            format!("pull request #{}", number),
            request,
        )
        .await
    }

    async fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        let request = self
            .http
            .post(self.repo_url(&format!("/issues/comments/{}/reactions", comment_id)))
            .json(&json!({ "content": reaction.content() }));
        self.execute("add_reaction", format!("comment {}", comment_id), request)
            .await
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<Comment> {
        let request = self
            .http
            .post(self.repo_url(&format!("/issues/{}/comments", number)))
            .json(&json!({ "body": body }));
        let comment: CommentWire = self
            .get_required(
                "create_comment",
                format!("pull request #{}", number),
                request,
            )
            .await?;
        Ok(comment.into())
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let request = self
            .http
            .patch(self.repo_url(&format!("/issues/comments/{}", comment_id)))
            .json(&json!({ "body": body }));
        self.execute("update_comment", format!("comment {}", comment_id), request)
            .await
    }
}

// Wire formats

#[derive(Debug, Deserialize)]
struct ErrorWire {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<ErrorWire>>,
}

#[derive(Debug, Deserialize)]
struct TagsData {
    repository: Option<TagsRepository>,
}

#[derive(Debug, Deserialize)]
struct TagsRepository {
    refs: TagRefs,
}

#[derive(Debug, Deserialize)]
struct TagRefs {
    nodes: Vec<TagNode>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateCommitData {
    #[serde(rename = "createCommitOnBranch")]
    create_commit_on_branch: CreatedCommit,
}

#[derive(Debug, Deserialize)]
struct CreatedCommit {
    commit: CommitOid,
}

#[derive(Debug, Deserialize)]
struct CommitOid {
    oid: String,
}

#[derive(Debug, Deserialize)]
struct RefWire {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RepoWire {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentWire {
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitWire {
    #[serde(default)]
    files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommentWire {
    id: u64,
    body: Option<String>,
    user: Option<UserWire>,
}

impl From<CommentWire> for Comment {
    fn from(wire: CommentWire) -> Self {
        Comment {
            id: wire.id,
            body: wire.body.unwrap_or_default(),
            author_login: wire.user.map(|u| u.login).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BranchWire {
    #[serde(rename = "ref")]
    name: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullWire {
    node_id: String,
    number: u64,
    title: String,
    body: Option<String>,
    created_at: DateTime<Utc>,
    head: BranchWire,
    base: BranchWire,
    #[serde(default)]
    labels: Vec<LabelWire>,
}

impl PullWire {
    fn into_pull_request(self, comments: Vec<Comment>) -> PullRequest {
        PullRequest {
            id: self.node_id,
            number: self.number,
            title: self.title,
            head_sha: self.head.sha,
            head_branch: self.head.name,
            base_branch: self.base.name,
            body: self.body.unwrap_or_default(),
            created_at: self.created_at,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        EnvConfig::from_pairs(pairs.iter().copied())
    }

    /// Answer `"<METHOD> <target>"` requests with canned JSON, 404 otherwise
    async fn serve(routes: Vec<(String, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let line: Vec<&str> = head.lines().next().unwrap_or_default().split(' ').collect();
                let key = format!("{} {}", line[0], line.get(1).copied().unwrap_or_default());
                log.lock().unwrap().push(key.clone());

                let (status, body) = routes
                    .iter()
                    .find(|(route, _)| *route == key)
                    .map(|(_, body)| ("200 OK", body.clone()))
                    .unwrap_or(("404 Not Found", r#"{"message":"Not Found"}"#.to_string()));
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (url, seen)
    }

    fn local_client(api_url: &str) -> GitHubClient {
        GitHubClient {
            http: reqwest::Client::builder().no_proxy().build().unwrap(),
            config: GitHubConfig {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                api_url: api_url.to_string(),
                graphql_url: format!("{}/graphql", api_url),
                token: "t0ken".to_string(),
            },
        }
    }

    fn files_page(range: std::ops::Range<usize>) -> String {
        let files: Vec<Value> = range
            .map(|i| json!({ "filename": format!("core/src/file{}.ts", i) }))
            .collect();
        json!({ "sha": "abc", "files": files }).to_string()
    }

    #[tokio::test]
    async fn test_changed_files_follows_pages() {
        let (url, seen) = serve(vec![
            (
                "GET /repos/acme/widgets/commits/abc?per_page=100&page=1".to_string(),
                files_page(0..100),
            ),
            (
                "GET /repos/acme/widgets/commits/abc?per_page=100&page=2".to_string(),
                files_page(100..130),
            ),
        ])
        .await;

        let paths = local_client(&url).changed_files("abc").await.unwrap();

        assert_eq!(paths.len(), 130);
        assert_eq!(paths[129], "core/src/file129.ts");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_force_update_refuses_moved_branch() {
        let (url, seen) = serve(vec![(
            "GET /repos/acme/widgets/git/ref/heads/relbot-core".to_string(),
            json!({ "object": { "sha": "sha-concurrent" } }).to_string(),
        )])
        .await;

        let err = local_client(&url)
            .force_update_branch("relbot-core", "sha-main", "sha-rel")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BotError::Platform(PlatformError::PreconditionConflict { ref expected_head, .. })
                if expected_head == "sha-rel"
        ));
        assert!(
            seen.lock()
                .unwrap()
                .iter()
                .all(|request| request.starts_with("GET "))
        );
    }

    #[test]
    fn test_config_from_actions_env() {
        let config = GitHubConfig::from_env(&env(&[
            ("GITHUB_REPOSITORY", "acme/widgets"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
            ("GITHUB_TOKEN", "t0ken"),
        ]))
        .unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "widgets");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.graphql_url, "https://ghe.example.com/api/v3/graphql");
        assert_eq!(config.token, "t0ken");
    }

    #[test]
    fn test_config_requires_token_and_repository() {
        let err = GitHubConfig::from_env(&env(&[("GITHUB_REPOSITORY", "acme/widgets")]))
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::Platform(PlatformError::MissingToken)
        ));

        let err = GitHubConfig::from_env(&env(&[("GITHUB_REPOSITORY", "widgets"), ("GH_TOKEN", "x")]))
            .unwrap_err();
        assert!(matches!(err, BotError::Cli(_)));
    }

    #[test]
    fn test_pull_wire_conversion() {
        let wire: PullWire = serde_json::from_value(json!({
            "node_id": "PR_kw",
            "number": 7,
            "title": "Release 'core' v0.0.1",
            "body": null,
            "created_at": "2024-05-01T10:00:00Z",
            "head": { "ref": "relbot-core", "sha": "abc" },
            "base": { "ref": "main", "sha": "def" },
            "labels": [{ "name": "release" }, { "name": "core" }]
        }))
        .unwrap();
        assert_eq!(wire.labels.len(), 2);

        let pull = wire.into_pull_request(Vec::new());
        assert_eq!(pull.number, 7);
        assert_eq!(pull.head_branch, "relbot-core");
        assert_eq!(pull.base_branch, "main");
        assert_eq!(pull.body, "");
    }

    #[test]
    fn test_comment_without_user() {
        let wire: CommentWire =
            serde_json::from_value(json!({ "id": 3, "body": "@relbot rebase", "user": null }))
                .unwrap();
        let comment = Comment::from(wire);
        assert_eq!(comment.id, 3);
        assert_eq!(comment.author_login, "");
    }
}
