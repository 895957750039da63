//! Commit replay
//!
//! Commits are integrated strictly in source order. The first conflict stops
//! the loop: later commits usually depend on the one that failed, so they are
//! never attempted.

use crate::cherry_pick::branch::WorkingBranch;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::report::Reporter;
use crate::types::{Commit, IntegrationResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// How one commit is put on top of the working branch
#[async_trait]
pub trait IntegrationStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Integrate `commit` onto the current tip of `branch`
    ///
    /// On `Applied`, the remote branch already points at the returned sha.
    async fn integrate(
        &self,
        platform: &dyn PlatformService,
        branch: &WorkingBranch,
        commit: &Commit,
    ) -> Result<IntegrationResult>;
}

/// Uses the platform's merge primitive (GitHub merges, GitLab cherry-pick)
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStrategy;

#[async_trait]
impl IntegrationStrategy for MergeStrategy {
    fn name(&self) -> &'static str {
        "merge"
    }

    async fn integrate(
        &self,
        platform: &dyn PlatformService,
        branch: &WorkingBranch,
        commit: &Commit,
    ) -> Result<IntegrationResult> {
        let message = format!("Cherry-pick: {}", commit.message);
        platform.merge_commit(&branch.name, &commit.sha, &message).await
    }
}

/// Writes a commit with the source commit's tree on top of the branch tip,
/// then fast-forwards the branch to it
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitTreeStrategy;

#[async_trait]
impl IntegrationStrategy for CommitTreeStrategy {
    fn name(&self) -> &'static str {
        "commit-tree"
    }

    async fn integrate(
        &self,
        platform: &dyn PlatformService,
        branch: &WorkingBranch,
        commit: &Commit,
    ) -> Result<IntegrationResult> {
        let tree = commit.tree_sha.as_deref().ok_or_else(|| {
            Error::Unsupported(format!("commit {} has no tree reference", commit.sha))
        })?;
        let sha = platform
            .create_commit(&commit.message, tree, &branch.tip)
            .await?;
        platform.update_branch(&branch.name, &sha).await?;
        Ok(IntegrationResult::Applied { sha })
    }
}

/// Selectable integration strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Platform merge / cherry-pick endpoint
    #[default]
    Merge,
    /// Commit the source tree on top of the branch tip
    CommitTree,
}

impl StrategyKind {
    /// Instantiate the strategy
    pub fn strategy(self) -> Box<dyn IntegrationStrategy> {
        match self {
            Self::Merge => Box::new(MergeStrategy),
            Self::CommitTree => Box::new(CommitTreeStrategy),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "commit-tree" | "commit_tree" => Ok(Self::CommitTree),
            other => Err(Error::InvalidInput(format!(
                "unknown strategy '{other}' (expected 'merge' or 'commit-tree')"
            ))),
        }
    }
}

/// Result of replaying a commit sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Every commit was integrated
    AppliedAll {
        /// Number of commits integrated
        applied: usize,
    },
    /// Integration stopped at `index`; commits after it were not attempted
    ConflictAt {
        /// 0-based position of the failing commit
        index: usize,
        /// The failing commit
        commit: Commit,
        /// Message reported by the platform
        reason: String,
    },
}

/// Replay `commits` onto `branch`, stopping at the first conflict
///
/// Errors other than conflicts are returned as `Err` and also stop the loop.
pub async fn replay_commits(
    commits: &[Commit],
    branch: &mut WorkingBranch,
    platform: &dyn PlatformService,
    strategy: &dyn IntegrationStrategy,
    reporter: &dyn Reporter,
) -> Result<ReplayOutcome> {
    for (index, commit) in commits.iter().enumerate() {
        debug!(
            index,
            sha = %commit.sha,
            strategy = strategy.name(),
            tip = %branch.tip,
            "integrating commit"
        );

        match strategy.integrate(platform, branch, commit).await? {
            IntegrationResult::Applied { sha } => {
                branch.advance(&commit.sha, Some(sha));
                reporter.info(&format!("Successfully cherry-picked commit {}", commit.sha));
            }
            IntegrationResult::UpToDate => {
                branch.advance(&commit.sha, None);
                reporter.info(&format!(
                    "Commit {} is already present on {}",
                    commit.sha, branch.name
                ));
            }
            IntegrationResult::Conflict { message } => {
                debug!(index, sha = %commit.sha, reason = %message, "conflict");
                return Ok(ReplayOutcome::ConflictAt {
                    index,
                    commit: commit.clone(),
                    reason: message,
                });
            }
        }
    }

    Ok(ReplayOutcome::AppliedAll {
        applied: commits.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("merge".parse::<StrategyKind>().unwrap(), StrategyKind::Merge);
        assert_eq!(
            "Commit-Tree".parse::<StrategyKind>().unwrap(),
            StrategyKind::CommitTree
        );
        assert!("rebase".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(StrategyKind::Merge.strategy().name(), "merge");
        assert_eq!(StrategyKind::CommitTree.strategy().name(), "commit-tree");
    }
}
