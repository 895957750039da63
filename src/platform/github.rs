//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    Commit, IntegrationResult, Platform, PlatformConfig, PrState, PullRequest,
    PullRequestDetails,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Page size for listing PR commits (GitHub maximum)
const COMMITS_PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Deserialize)]
struct ObjectRef {
    sha: String,
}

#[derive(Deserialize)]
struct GitRef {
    object: ObjectRef,
}

#[derive(Deserialize)]
struct PrCommit {
    sha: String,
    commit: PrCommitData,
}

#[derive(Deserialize)]
struct PrCommitData {
    message: String,
    tree: ObjectRef,
}

impl From<PrCommit> for Commit {
    fn from(c: PrCommit) -> Self {
        Self {
            sha: c.sha,
            message: c.commit.message,
            tree_sha: Some(c.commit.tree.sha),
        }
    }
}

/// GitHub service using octocrab for pull requests and raw HTTP for git data
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (git data, merges)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_base = host
            .as_ref()
            .map_or_else(|| "https://api.github.com".to_string(), |h| format!("https://{h}/api/v3"));
        Self::build(token, owner, repo, host, api_base)
    }

    /// Create a GitHub service talking to an explicit API base URL
    ///
    /// Used for GitHub Enterprise installs behind a non-standard path and for
    /// pointing the service at a local test server.
    pub fn with_api_base(token: &str, owner: String, repo: String, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self::build(token, owner, repo, None, api_base)
    }

    fn build(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: String,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if api_base != "https://api.github.com" {
            builder = builder
                .base_uri(api_base.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("pr-cherry-pick")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner,
                repo,
                host,
            },
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base, self.config.owner, self.config.repo, path
        )
    }

    /// URL for a branch ref, escaping each `/`-separated segment of the name
    fn branch_ref_url(&self, endpoint: &str, branch: &str) -> String {
        let segments: Vec<_> = branch.split('/').map(urlencoding::encode).collect();
        self.repo_url(&format!("/git/{endpoint}/heads/{}", segments.join("/")))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

/// Extract GitHub's `message` field from an error response, falling back to the status
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiMessage>(&text).map_or_else(|_| status.to_string(), |m| m.message)
}

async fn api_error(response: Response, context: &str) -> Error {
    let status = response.status();
    let message = error_message(response).await;
    Error::GitHubApi(format!("{context}: {message} ({status})"))
}

fn is_not_found(e: &octocrab::Error) -> bool {
    matches!(e, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        is_draft: pr.draft.unwrap_or(false),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(pr_number, "getting PR details");

        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    Error::NotFound(format!("pull request #{pr_number}"))
                } else {
                    Error::Octocrab(e)
                }
            })?;

        // Determine PR state from GitHub's state field and merged_at
        let state = match pr.state {
            Some(octocrab::models::IssueState::Open) => PrState::Open,
            Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
            // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
            Some(_) | None => PrState::Closed,
        };

        let details = PullRequestDetails {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            state,
            head_ref: pr.head.ref_field.clone(),
            base_ref: pr.base.ref_field.clone(),
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };

        debug!(pr_number, state = ?details.state, "got PR details");
        Ok(details)
    }

    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<Commit>> {
        debug!(pr_number, "listing PR commits");
        let url = self.repo_url(&format!("/pulls/{pr_number}/commits"));

        let mut commits = Vec::new();
        let mut page = 1_u32;
        loop {
            let response = self
                .request(Method::GET, &url)
                .query(&[
                    ("per_page", COMMITS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!("pull request #{pr_number}")));
            }
            if !response.status().is_success() {
                return Err(api_error(response, "Failed to list PR commits").await);
            }

            let batch: Vec<PrCommit> = response.json().await?;
            let last_page = batch.len() < COMMITS_PER_PAGE;
            commits.extend(batch.into_iter().map(Commit::from));
            if last_page {
                break;
            }
            page += 1;
        }

        debug!(pr_number, count = commits.len(), "listed PR commits");
        Ok(commits)
    }

    async fn get_branch_tip(&self, branch: &str) -> Result<String> {
        debug!(branch, "getting branch tip");
        let url = self.branch_ref_url("ref", branch);

        let response = self.request(Method::GET, &url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("branch '{branch}'")));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("Failed to read branch '{branch}'")).await);
        }

        let git_ref: GitRef = response.json().await?;
        debug!(branch, sha = %git_ref.object.sha, "got branch tip");
        Ok(git_ref.object.sha)
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "creating branch");
        let url = self.repo_url("/git/refs");

        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{branch}"),
                "sha": sha,
            }))
            .send()
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let message = error_message(response).await;
            if message.contains("already exists") {
                return Err(Error::RefConflict(branch.to_string()));
            }
            return Err(Error::GitHubApi(format!(
                "Failed to create branch '{branch}': {message}"
            )));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("Failed to create branch '{branch}'")).await);
        }

        debug!(branch, "created branch");
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting branch");
        let url = self.branch_ref_url("refs", branch);

        let response = self.request(Method::DELETE, &url).send().await?;
        match response.status() {
            s if s.is_success() => debug!(branch, "deleted branch"),
            // GitHub answers 422 "Reference does not exist" for missing refs
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                debug!(branch, "branch already absent");
            }
            _ => {
                return Err(api_error(response, &format!("Failed to delete branch '{branch}'")).await);
            }
        }
        Ok(())
    }

    async fn merge_commit(
        &self,
        branch: &str,
        sha: &str,
        message: &str,
    ) -> Result<IntegrationResult> {
        #[derive(Deserialize)]
        struct MergeCommit {
            sha: String,
        }

        debug!(branch, sha, "merging commit into branch");
        let url = self.repo_url("/merges");

        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({
                "base": branch,
                "head": sha,
                "commit_message": message,
            }))
            .send()
            .await?;

        let result = match response.status() {
            StatusCode::NO_CONTENT => IntegrationResult::UpToDate,
            StatusCode::CONFLICT => IntegrationResult::Conflict {
                message: error_message(response).await,
            },
            StatusCode::NOT_FOUND => {
                return Err(Error::NotFound(format!(
                    "merge base '{branch}' or head {sha}"
                )));
            }
            s if s.is_success() => {
                let merge: MergeCommit = response.json().await?;
                IntegrationResult::Applied { sha: merge.sha }
            }
            _ => return Err(api_error(response, "Merge failed").await),
        };

        debug!(branch, sha, result = ?result, "merge finished");
        Ok(result)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String> {
        debug!(tree_sha, parent_sha, "creating commit");
        let url = self.repo_url("/git/commits");

        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({
                "message": message,
                "tree": tree_sha,
                "parents": [parent_sha],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "Failed to create commit").await);
        }

        let created: ObjectRef = response.json().await?;
        debug!(sha = %created.sha, "created commit");
        Ok(created.sha)
    }

    async fn update_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "updating branch");
        let url = self.branch_ref_url("refs", branch);

        let response = self
            .request(Method::PATCH, &url)
            .json(&serde_json::json!({ "sha": sha, "force": false }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, &format!("Failed to update branch '{branch}'")).await);
        }

        debug!(branch, "updated branch");
        Ok(())
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        debug!(head, base, draft, "creating PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.create(title, head, base).draft(draft);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
