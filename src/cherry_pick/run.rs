//! Run orchestration
//!
//! `Init → PlanBuilt → BranchCreated → Replaying → {Success | Conflict} → Done`
//!
//! Once the working branch exists, every path out of the run goes through
//! the final match in [`run_cherry_pick`], which deletes the branch unless
//! it became the head of the new PR.

use crate::cherry_pick::branch::{WorkingBranch, create_working_branch, delete_working_branch};
use crate::cherry_pick::outcome::{open_change_request, report_conflict};
use crate::cherry_pick::plan::{CherryPickPlan, CherryPickRequest, build_plan};
use crate::cherry_pick::replay::{IntegrationStrategy, ReplayOutcome, replay_commits};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::report::Reporter;
use crate::types::{Commit, PullRequest};
use tracing::debug;

/// Terminal result of a run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// All commits replayed and the new PR is open
    Success(PullRequest),
    /// A commit conflicted; the recipe was emitted and the branch removed
    Conflict {
        /// Commit that could not be integrated
        commit_sha: String,
        /// Manual recovery commands
        recipe: String,
        /// Failure reason reported by the platform
        reason: String,
    },
    /// Any other failure
    Error(String),
}

impl RunOutcome {
    /// Whether the run opened a PR
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Message to fail the run with, if it failed
    ///
    /// A conflict always fails the run with the conflict reason, even when
    /// the branch cleanup that followed it also failed.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::Conflict {
                commit_sha, reason, ..
            } => Some(
                Error::ReplayConflict {
                    sha: commit_sha.clone(),
                    reason: reason.clone(),
                }
                .to_string(),
            ),
            Self::Error(message) => Some(message.clone()),
        }
    }
}

/// How the branch-holding part of the run ended
enum Finished {
    Opened(PullRequest),
    Conflicted { commit: Commit, reason: String },
}

/// Replay every commit and open the PR
async fn replay_and_open(
    plan: &CherryPickPlan,
    branch: &mut WorkingBranch,
    draft: bool,
    platform: &dyn PlatformService,
    strategy: &dyn IntegrationStrategy,
    reporter: &dyn Reporter,
) -> Result<Finished> {
    if plan.source.commits.is_empty() {
        reporter.warn(&format!(
            "PR #{} has no commits; the new PR will contain no changes",
            plan.source.number
        ));
    }

    match replay_commits(&plan.source.commits, branch, platform, strategy, reporter).await? {
        ReplayOutcome::AppliedAll { applied } => {
            debug!(applied, tip = %branch.tip, "all commits replayed");
            let pr = open_change_request(platform, plan, branch, draft, reporter).await?;
            Ok(Finished::Opened(pr))
        }
        ReplayOutcome::ConflictAt {
            commit, reason, ..
        } => Ok(Finished::Conflicted { commit, reason }),
    }
}

/// Cherry-pick a PR onto a target branch
///
/// Never returns an error: every failure is converted into a
/// [`RunOutcome`] carrying the message the run should fail with.
pub async fn run_cherry_pick(
    request: &CherryPickRequest,
    platform: &dyn PlatformService,
    strategy: &dyn IntegrationStrategy,
    reporter: &dyn Reporter,
) -> RunOutcome {
    let plan = match build_plan(platform, request, reporter).await {
        Ok(plan) => plan,
        Err(e) => return failed(&e),
    };

    let mut branch = match create_working_branch(platform, &plan).await {
        Ok(branch) => branch,
        // Nothing was created by this run, so there is nothing to clean up
        Err(e) => return failed(&e),
    };
    reporter.info(&format!(
        "Created branch {} from {} ({})",
        branch.name, plan.target_branch, branch.base_sha
    ));

    let finished = replay_and_open(
        &plan,
        &mut branch,
        request.draft,
        platform,
        strategy,
        reporter,
    )
    .await;

    match finished {
        Ok(Finished::Opened(pr)) => RunOutcome::Success(pr),
        Ok(Finished::Conflicted { commit, reason }) => {
            let recipe = report_conflict(&plan, &commit, &reason, reporter);
            delete_working_branch(platform, &mut branch, reporter).await;
            debug!(sha = %commit.sha, reason = %reason, "run ended in conflict");
            RunOutcome::Conflict {
                commit_sha: commit.sha,
                recipe,
                reason,
            }
        }
        Err(e) => {
            delete_working_branch(platform, &mut branch, reporter).await;
            failed(&e)
        }
    }
}

fn failed(error: &Error) -> RunOutcome {
    debug!(error = %error, "run failed");
    RunOutcome::Error(error.to_string())
}
