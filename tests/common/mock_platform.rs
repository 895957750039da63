//! Mock platform service for testing
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_cherry_pick::error::{Error, Result};
use pr_cherry_pick::platform::PlatformService;
use pr_cherry_pick::types::{
    Commit, IntegrationResult, PlatformConfig, PrState, PullRequest, PullRequestDetails,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_branch` and `update_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCall {
    pub branch: String,
    pub sha: String,
}

/// Call record for `merge_commit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub branch: String,
    pub sha: String,
    pub message: String,
}

/// Call record for `create_commit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommitCall {
    pub message: String,
    pub tree_sha: String,
    pub parent_sha: String,
}

/// Call record for `create_pr_with_options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
    pub draft: bool,
}

/// In-memory platform
///
/// Hand-written rather than generated so that branch tips behave like a real
/// remote: merges advance the branch, deleted branches disappear, and
/// creating an existing branch fails with `RefConflict`.
///
/// Features:
/// - Branch tips kept in memory
/// - Scripted conflicts per source commit
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    next_commit: AtomicU64,
    prs: Mutex<HashMap<u64, PullRequestDetails>>,
    pr_commits: Mutex<HashMap<u64, Vec<Commit>>>,
    branches: Mutex<HashMap<String, String>>,
    conflicts: Mutex<HashMap<String, String>>,
    up_to_date: Mutex<Vec<String>>,
    // Call tracking
    get_pr_details_calls: Mutex<Vec<u64>>,
    list_commits_calls: Mutex<Vec<u64>>,
    get_branch_tip_calls: Mutex<Vec<String>>,
    create_branch_calls: Mutex<Vec<BranchCall>>,
    delete_branch_calls: Mutex<Vec<String>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    create_commit_calls: Mutex<Vec<CreateCommitCall>>,
    update_branch_calls: Mutex<Vec<BranchCall>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_list_commits: Mutex<Option<String>>,
    error_on_branch_tip: Mutex<Option<String>>,
    error_on_create_branch: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(456),
            next_commit: AtomicU64::new(1),
            prs: Mutex::new(HashMap::new()),
            pr_commits: Mutex::new(HashMap::new()),
            branches: Mutex::new(HashMap::new()),
            conflicts: Mutex::new(HashMap::new()),
            up_to_date: Mutex::new(Vec::new()),
            get_pr_details_calls: Mutex::new(Vec::new()),
            list_commits_calls: Mutex::new(Vec::new()),
            get_branch_tip_calls: Mutex::new(Vec::new()),
            create_branch_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            create_commit_calls: Mutex::new(Vec::new()),
            update_branch_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_list_commits: Mutex::new(None),
            error_on_branch_tip: Mutex::new(None),
            error_on_create_branch: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Register an open PR with its commits
    pub fn add_pr(&self, number: u64, title: &str, commits: Vec<Commit>) {
        self.prs.lock().unwrap().insert(
            number,
            PullRequestDetails {
                number,
                title: title.to_string(),
                state: PrState::Open,
                head_ref: format!("feature-{number}"),
                base_ref: "main".to_string(),
                html_url: format!("https://github.com/test/repo/pull/{number}"),
            },
        );
        self.pr_commits.lock().unwrap().insert(number, commits);
    }

    /// Change the state of a registered PR
    pub fn set_pr_state(&self, number: u64, state: PrState) {
        if let Some(pr) = self.prs.lock().unwrap().get_mut(&number) {
            pr.state = state;
        }
    }

    /// Create or move a branch
    pub fn set_branch(&self, name: &str, sha: &str) {
        self.branches
            .lock()
            .unwrap()
            .insert(name.to_string(), sha.to_string());
    }

    /// Make integrating `sha` report a conflict
    pub fn conflict_on(&self, sha: &str, message: &str) {
        self.conflicts
            .lock()
            .unwrap()
            .insert(sha.to_string(), message.to_string());
    }

    /// Make merging `sha` report that the branch already contains it
    pub fn up_to_date_on(&self, sha: &str) {
        self.up_to_date.lock().unwrap().push(sha.to_string());
    }

    // === Error injection methods ===

    /// Make `list_pr_commits` return an error
    pub fn fail_list_commits(&self, msg: &str) {
        *self.error_on_list_commits.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_branch_tip` return an error
    pub fn fail_branch_tip(&self, msg: &str) {
        *self.error_on_branch_tip.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_branch` return an error
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_commit` return an error (not a conflict)
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_with_options` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === State inspection ===

    /// Current tip of a branch, if it exists
    pub fn branch_tip(&self, name: &str) -> Option<String> {
        self.branches.lock().unwrap().get(name).cloned()
    }

    // === Call verification methods ===

    pub fn get_pr_details_calls(&self) -> Vec<u64> {
        self.get_pr_details_calls.lock().unwrap().clone()
    }

    pub fn get_list_commits_calls(&self) -> Vec<u64> {
        self.list_commits_calls.lock().unwrap().clone()
    }

    pub fn get_branch_tip_calls(&self) -> Vec<String> {
        self.get_branch_tip_calls.lock().unwrap().clone()
    }

    pub fn get_create_branch_calls(&self) -> Vec<BranchCall> {
        self.create_branch_calls.lock().unwrap().clone()
    }

    pub fn get_delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_create_commit_calls(&self) -> Vec<CreateCommitCall> {
        self.create_commit_calls.lock().unwrap().clone()
    }

    pub fn get_update_branch_calls(&self) -> Vec<BranchCall> {
        self.update_branch_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Number of mutating calls of any kind
    pub fn mutation_count(&self) -> usize {
        self.create_branch_calls.lock().unwrap().len()
            + self.delete_branch_calls.lock().unwrap().len()
            + self.merge_calls.lock().unwrap().len()
            + self.create_commit_calls.lock().unwrap().len()
            + self.update_branch_calls.lock().unwrap().len()
            + self.create_pr_calls.lock().unwrap().len()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that a branch was deleted exactly once
    pub fn assert_deleted_once(&self, branch: &str) {
        let calls = self.get_delete_branch_calls();
        let count = calls.iter().filter(|b| *b == branch).count();
        assert_eq!(count, 1, "Expected one delete_branch({branch}) but got: {calls:?}");
    }

    fn next_sha(&self, prefix: &str) -> String {
        let n = self.next_commit.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}{n:04}")
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.get_pr_details_calls.lock().unwrap().push(pr_number);

        self.prs
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("pull request #{pr_number}")))
    }

    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<Commit>> {
        self.list_commits_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.error_on_list_commits.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.pr_commits
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("pull request #{pr_number}")))
    }

    async fn get_branch_tip(&self, branch: &str) -> Result<String> {
        self.get_branch_tip_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_branch_tip.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.branch_tip(branch)
            .ok_or_else(|| Error::NotFound(format!("branch '{branch}'")))
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        self.create_branch_calls.lock().unwrap().push(BranchCall {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });

        if let Some(msg) = self.error_on_create_branch.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let mut branches = self.branches.lock().unwrap();
        if branches.contains_key(branch) {
            return Err(Error::RefConflict(branch.to_string()));
        }
        branches.insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.branches.lock().unwrap().remove(branch);
        Ok(())
    }

    async fn merge_commit(
        &self,
        branch: &str,
        sha: &str,
        message: &str,
    ) -> Result<IntegrationResult> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            branch: branch.to_string(),
            sha: sha.to_string(),
            message: message.to_string(),
        });

        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        if let Some(message) = self.conflicts.lock().unwrap().get(sha) {
            return Ok(IntegrationResult::Conflict {
                message: message.clone(),
            });
        }
        if self.up_to_date.lock().unwrap().iter().any(|s| s == sha) {
            return Ok(IntegrationResult::UpToDate);
        }
        if self.branch_tip(branch).is_none() {
            return Err(Error::NotFound(format!("branch '{branch}'")));
        }

        let new_sha = self.next_sha("merge");
        self.set_branch(branch, &new_sha);
        Ok(IntegrationResult::Applied { sha: new_sha })
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String> {
        self.create_commit_calls
            .lock()
            .unwrap()
            .push(CreateCommitCall {
                message: message.to_string(),
                tree_sha: tree_sha.to_string(),
                parent_sha: parent_sha.to_string(),
            });
        Ok(self.next_sha("commit"))
    }

    async fn update_branch(&self, branch: &str, sha: &str) -> Result<()> {
        self.update_branch_calls.lock().unwrap().push(BranchCall {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });

        if self.branch_tip(branch).is_none() {
            return Err(Error::NotFound(format!("branch '{branch}'")));
        }
        self.set_branch(branch, sha);
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
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            draft,
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            is_draft: draft,
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
