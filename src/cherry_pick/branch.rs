//! Working branch lifecycle

use crate::cherry_pick::plan::CherryPickPlan;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::report::Reporter;
use tracing::debug;

/// Lifecycle of the working branch within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// Not created by this run
    Absent,
    /// Created at the target tip, nothing replayed yet
    Created,
    /// At least one commit replayed
    Advancing,
    /// Head of the new PR; must not be deleted
    Finalized,
    /// Removed after a failed run
    Deleted,
}

/// The temporary branch that stages the replay
#[derive(Debug, Clone)]
pub struct WorkingBranch {
    /// Branch name
    pub name: String,
    /// Target tip the branch was created from
    pub base_sha: String,
    /// Current tip; advances with each replayed commit
    pub tip: String,
    state: BranchState,
    applied: Vec<String>,
}

impl WorkingBranch {
    /// A branch that was just created at `base_sha`
    pub fn new(name: impl Into<String>, base_sha: impl Into<String>) -> Self {
        let base_sha = base_sha.into();
        Self {
            name: name.into(),
            tip: base_sha.clone(),
            base_sha,
            state: BranchState::Created,
            applied: Vec::new(),
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> BranchState {
        self.state
    }

    /// Source commits replayed so far, in order
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Record a replayed commit; `new_tip` is `None` when the branch did not move
    pub fn advance(&mut self, commit_sha: &str, new_tip: Option<String>) {
        if let Some(tip) = new_tip {
            self.tip = tip;
        }
        self.applied.push(commit_sha.to_string());
        self.state = BranchState::Advancing;
    }

    /// Mark the branch as the head of a PR
    pub fn finalize(&mut self) {
        self.state = BranchState::Finalized;
    }

    /// Whether the run still owns the branch and must clean it up on failure
    pub const fn needs_cleanup(&self) -> bool {
        matches!(self.state, BranchState::Created | BranchState::Advancing)
    }
}

/// Create the working branch at the target branch's current tip
///
/// The target tip is read once here and never re-read. Fails with
/// `Error::NotFound` if the target does not exist (nothing is created) and
/// with `Error::RefConflict` if the working branch already exists.
pub async fn create_working_branch(
    platform: &dyn PlatformService,
    plan: &CherryPickPlan,
) -> Result<WorkingBranch> {
    let base_sha = platform.get_branch_tip(&plan.target_branch).await?;
    platform.create_branch(&plan.branch_name, &base_sha).await?;

    debug!(branch = %plan.branch_name, base = %base_sha, "created working branch");
    Ok(WorkingBranch::new(plan.branch_name.clone(), base_sha))
}

/// Delete the working branch (best-effort)
///
/// A deletion failure is reported as a warning and never replaces the error
/// that caused the cleanup. Returns whether the branch was deleted.
pub async fn delete_working_branch(
    platform: &dyn PlatformService,
    branch: &mut WorkingBranch,
    reporter: &dyn Reporter,
) -> bool {
    if !branch.needs_cleanup() {
        return false;
    }

    match platform.delete_branch(&branch.name).await {
        Ok(()) => {
            branch.state = BranchState::Deleted;
            debug!(branch = %branch.name, "deleted working branch");
            true
        }
        Err(e) => {
            reporter.warn("Failed to delete incomplete branch");
            debug!(branch = %branch.name, error = %e, "working branch cleanup failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_branch_starts_at_base() {
        let branch = WorkingBranch::new("cherry-pick-1-to-main", "base");
        assert_eq!(branch.tip, "base");
        assert_eq!(branch.state(), BranchState::Created);
        assert!(branch.needs_cleanup());
    }

    #[test]
    fn test_advance_moves_tip() {
        let mut branch = WorkingBranch::new("b", "base");
        branch.advance("c1", Some("t1".to_string()));
        branch.advance("c2", None);
        assert_eq!(branch.tip, "t1");
        assert_eq!(branch.applied(), ["c1", "c2"]);
        assert_eq!(branch.state(), BranchState::Advancing);
    }

    #[test]
    fn test_finalized_branch_is_not_cleaned_up() {
        let mut branch = WorkingBranch::new("b", "base");
        branch.finalize();
        assert!(!branch.needs_cleanup());
    }
}
