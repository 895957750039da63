//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for the remote operations a cherry-pick needs.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{detect_platform, parse_repo_info, parse_repo_slug};
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{Commit, IntegrationResult, PlatformConfig, PullRequest, PullRequestDetails};
use async_trait::async_trait;

/// Platform service trait for PR/MR and branch operations
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// cherry-pick engine to work with either platform.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get PR metadata
    ///
    /// Fails with `Error::NotFound` if the PR does not exist.
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// List the commits of a PR in the order they were added
    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<Commit>>;

    /// Get the commit a branch currently points at
    ///
    /// Fails with `Error::NotFound` if the branch does not exist.
    async fn get_branch_tip(&self, branch: &str) -> Result<String>;

    /// Create a branch pointing at `sha`
    ///
    /// Fails with `Error::RefConflict` if the branch already exists.
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// Delete a branch. Deleting a branch that does not exist succeeds.
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Merge a commit into a branch using the platform's merge primitive
    ///
    /// A content conflict is reported as `IntegrationResult::Conflict`,
    /// not as an error.
    async fn merge_commit(
        &self,
        branch: &str,
        sha: &str,
        message: &str,
    ) -> Result<IntegrationResult>;

    /// Create a commit object from a tree with a single parent
    ///
    /// Returns the new commit ID. The commit is not referenced by any branch.
    async fn create_commit(&self, message: &str, tree_sha: &str, parent_sha: &str)
    -> Result<String>;

    /// Fast-forward a branch to `sha`
    async fn update_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// Create a new PR with explicit body and draft options.
    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
