//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    Commit, IntegrationResult, Platform, PlatformConfig, PrState, PullRequest,
    PullRequestDetails,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    api_base: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(default)]
    draft: bool,
}

/// MR details for planning
#[derive(Deserialize)]
struct MergeRequestDetails {
    iid: u64,
    title: String,
    state: String, // "opened", "closed", "merged", "locked"
    web_url: String,
    source_branch: String,
    target_branch: String,
}

#[derive(Deserialize)]
struct MrCommit {
    id: String,
    message: String,
}

#[derive(Deserialize)]
struct BranchCommit {
    id: String,
}

#[derive(Deserialize)]
struct Branch {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: serde_json::Value,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
            is_draft: mr.draft,
        }
    }
}

#[derive(Serialize)]
struct CreateMrPayload {
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft: Option<bool>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for listing MR commits
const COMMITS_PER_PAGE: usize = 100;

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(token: String, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());
        let config_host = if host == "gitlab.com" {
            None
        } else {
            Some(host.clone())
        };
        Self::build(token, owner, repo, config_host, format!("https://{host}/api/v4"))
    }

    /// Create a GitLab service talking to an explicit API base URL (including `/api/v4`)
    pub fn with_api_base(token: String, owner: String, repo: String, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self::build(token, owner, repo, None, api_base)
    }

    fn build(
        token: String,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: String,
    ) -> Result<Self> {
        let project_path = format!("{owner}/{repo}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_base,
            config: PlatformConfig {
                platform: Platform::GitLab,
                owner,
                repo,
                host,
            },
            project_path,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn project_url(&self, path: &str) -> String {
        self.api_url(&format!(
            "/projects/{}{}",
            urlencoding::encode(&self.project_path),
            path
        ))
    }

    fn branch_url(&self, branch: &str) -> String {
        self.project_url(&format!(
            "/repository/branches/{}",
            urlencoding::encode(branch)
        ))
    }
}

/// Extract GitLab's `message` field from an error response, falling back to the status
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiMessage>(&text) {
        Ok(ApiMessage {
            message: serde_json::Value::String(message),
        }) => message,
        Ok(ApiMessage { message }) => message.to_string(),
        Err(_) => status.to_string(),
    }
}

async fn api_error(response: Response, context: &str) -> Error {
    let status = response.status();
    let message = error_message(response).await;
    Error::GitLabApi(format!("{context}: {message} ({status})"))
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(mr_iid = pr_number, "getting MR details");
        let url = self.project_url(&format!("/merge_requests/{pr_number}"));

        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("merge request !{pr_number}")));
        }
        let mr: MergeRequestDetails = response
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let state = match mr.state.as_str() {
            "opened" => PrState::Open,
            "merged" => PrState::Merged,
            _ => PrState::Closed,
        };

        let details = PullRequestDetails {
            number: mr.iid,
            title: mr.title,
            state,
            head_ref: mr.source_branch,
            base_ref: mr.target_branch,
            html_url: mr.web_url,
        };

        debug!(mr_iid = pr_number, state = ?details.state, "got MR details");
        Ok(details)
    }

    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<Commit>> {
        debug!(mr_iid = pr_number, "listing MR commits");
        let url = self.project_url(&format!("/merge_requests/{pr_number}/commits"));

        let mut commits = Vec::new();
        let mut page = 1_u32;
        loop {
            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .query(&[
                    ("per_page", COMMITS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!("merge request !{pr_number}")));
            }
            if !response.status().is_success() {
                return Err(api_error(response, "Failed to list MR commits").await);
            }

            let batch: Vec<MrCommit> = response.json().await?;
            let last_page = batch.len() < COMMITS_PER_PAGE;
            commits.extend(batch.into_iter().map(|c| Commit {
                sha: c.id,
                message: c.message,
                tree_sha: None,
            }));
            if last_page {
                break;
            }
            page += 1;
        }

        // GitLab lists MR commits newest first
        commits.reverse();

        debug!(mr_iid = pr_number, count = commits.len(), "listed MR commits");
        Ok(commits)
    }

    async fn get_branch_tip(&self, branch: &str) -> Result<String> {
        debug!(branch, "getting branch tip");

        let response = self
            .client
            .get(self.branch_url(branch))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("branch '{branch}'")));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("Failed to read branch '{branch}'")).await);
        }

        let found: Branch = response.json().await?;
        debug!(branch, sha = %found.commit.id, "got branch tip");
        Ok(found.commit.id)
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "creating branch");
        let url = self.project_url("/repository/branches");

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("branch", branch), ("ref", sha)])
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let message = error_message(response).await;
            if message.contains("already exists") {
                return Err(Error::RefConflict(branch.to_string()));
            }
            return Err(Error::GitLabApi(format!(
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

        let response = self
            .client
            .delete(self.branch_url(branch))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        match response.status() {
            s if s.is_success() => debug!(branch, "deleted branch"),
            StatusCode::NOT_FOUND => debug!(branch, "branch already absent"),
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
        debug!(branch, sha, "cherry-picking commit onto branch");
        let url = self.project_url(&format!("/repository/commits/{sha}/cherry_pick"));

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&serde_json::json!({ "branch": branch, "message": message }))
            .send()
            .await?;

        // GitLab reports conflicts and empty cherry-picks as 400/409 with a message
        let result = match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => IntegrationResult::Conflict {
                message: error_message(response).await,
            },
            StatusCode::NOT_FOUND => {
                return Err(Error::NotFound(format!(
                    "commit {sha} or branch '{branch}'"
                )));
            }
            s if s.is_success() => {
                let created: BranchCommit = response.json().await?;
                IntegrationResult::Applied { sha: created.id }
            }
            _ => return Err(api_error(response, "Cherry-pick failed").await),
        };

        debug!(branch, sha, result = ?result, "cherry-pick finished");
        Ok(result)
    }

    async fn create_commit(
        &self,
        _message: &str,
        _tree_sha: &str,
        _parent_sha: &str,
    ) -> Result<String> {
        Err(Error::Unsupported(
            "GitLab cannot create commits from a tree; use the merge strategy".to_string(),
        ))
    }

    async fn update_branch(&self, _branch: &str, _sha: &str) -> Result<()> {
        Err(Error::Unsupported(
            "GitLab does not allow moving a branch to an arbitrary commit".to_string(),
        ))
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        debug!(head, base, draft, "creating MR");
        let url = self.project_url("/merge_requests");

        let payload = CreateMrPayload {
            source_branch: head.to_string(),
            target_branch: base.to_string(),
            title: title.to_string(),
            description: body.map(ToString::to_string),
            draft: if draft { Some(true) } else { None },
        };

        let mr: MergeRequest = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let pr: PullRequest = mr.into();
        debug!(mr_iid = pr.number, "created MR");
        Ok(pr)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
