//! Cherry-pick planning
//!
//! `create_cherry_pick_plan` is pure; `build_plan` gathers its inputs from the
//! platform with read-only calls.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::report::Reporter;
use crate::types::{PrState, SourceChange};
use tracing::debug;

/// What to cherry-pick and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CherryPickRequest {
    /// Source PR/MR number (must be positive)
    pub pr_number: u64,
    /// Branch the commits are replayed onto
    pub target_branch: String,
    /// Open the resulting PR as a draft
    pub draft: bool,
}

impl CherryPickRequest {
    /// Create a non-draft request
    pub fn new(pr_number: u64, target_branch: impl Into<String>) -> Self {
        Self {
            pr_number,
            target_branch: target_branch.into(),
            draft: false,
        }
    }
}

/// Everything the run needs, gathered before any mutation
#[derive(Debug, Clone)]
pub struct CherryPickPlan {
    /// The source PR and its commits, in replay order
    pub source: SourceChange,
    /// Branch the commits are replayed onto
    pub target_branch: String,
    /// Name of the working branch that will hold the replay
    pub branch_name: String,
    /// Title of the PR opened on success
    pub title: String,
}

/// Name of the working branch for a (source PR, target branch) pair
///
/// Deterministic: two runs for the same pair use the same name and the
/// second one fails to create its branch.
pub fn working_branch_name(pr_number: u64, target_branch: &str) -> String {
    format!("cherry-pick-{pr_number}-to-{target_branch}")
}

/// Reject requests that cannot possibly succeed, before touching the remote
pub fn validate_request(request: &CherryPickRequest) -> Result<()> {
    if request.pr_number == 0 {
        return Err(Error::InvalidInput(
            "PR number must be a positive integer".to_string(),
        ));
    }
    if request.target_branch.trim().is_empty() {
        return Err(Error::InvalidInput(
            "target branch must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Create a cherry-pick plan (PURE - no I/O)
///
/// Commits keep the order the platform returned them in; nothing is
/// reordered or deduplicated.
#[must_use]
pub fn create_cherry_pick_plan(source: SourceChange, target_branch: &str) -> CherryPickPlan {
    CherryPickPlan {
        branch_name: working_branch_name(source.number, target_branch),
        title: format!("Cherry-pick PR #{} to {target_branch}", source.number),
        target_branch: target_branch.to_string(),
        source,
    }
}

/// Validate the request and fetch the source PR (read-only)
pub async fn build_plan(
    platform: &dyn PlatformService,
    request: &CherryPickRequest,
    reporter: &dyn Reporter,
) -> Result<CherryPickPlan> {
    validate_request(request)?;

    let details = platform.get_pr_details(request.pr_number).await?;
    debug!(
        pr_number = details.number,
        state = %details.state,
        head = %details.head_ref,
        base = %details.base_ref,
        platform = %platform.config().platform,
        "found source PR"
    );
    if details.state == PrState::Closed {
        reporter.warn(&format!(
            "PR #{} is closed without being merged; cherry-picking its commits anyway",
            details.number
        ));
    }
    let commits = platform.list_pr_commits(request.pr_number).await?;

    reporter.info(&format!(
        "Found {} commits in PR #{}",
        commits.len(),
        request.pr_number
    ));

    let source = SourceChange {
        number: details.number,
        title: details.title,
        html_url: details.html_url,
        commits,
    };
    let plan = create_cherry_pick_plan(source, &request.target_branch);
    debug!(
        pr_number = plan.source.number,
        branch = %plan.branch_name,
        commits = plan.source.commits.len(),
        "built cherry-pick plan"
    );
    Ok(plan)
}
