//! Run outcomes: the new PR on success, the manual recipe on conflict

use crate::cherry_pick::branch::WorkingBranch;
use crate::cherry_pick::plan::CherryPickPlan;
use crate::cherry_pick::recipe::{conflict_summary, manual_recipe};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::report::Reporter;
use crate::types::{Commit, PullRequest};
use std::fmt::Write;
use tracing::debug;

/// Body of the PR opened for a successful cherry-pick
pub fn change_request_body(plan: &CherryPickPlan) -> String {
    let mut body = format!(
        "Cherry-picking changes from PR #{}\n\nOriginal PR: {}\n",
        plan.source.number, plan.source.html_url
    );
    if !plan.source.commits.is_empty() {
        body.push_str("\nCommits:\n");
        for commit in &plan.source.commits {
            let _ = writeln!(body, "- {} {}", commit.short_sha(), commit.summary());
        }
    }
    body
}

/// Open the PR from the working branch into the target branch
///
/// On success the branch is finalized: it is the head of the new PR and is
/// never deleted by this run.
pub async fn open_change_request(
    platform: &dyn PlatformService,
    plan: &CherryPickPlan,
    branch: &mut WorkingBranch,
    draft: bool,
    reporter: &dyn Reporter,
) -> Result<PullRequest> {
    let body = change_request_body(plan);
    let pr = platform
        .create_pr_with_options(
            &branch.name,
            &plan.target_branch,
            &plan.title,
            Some(&body),
            draft,
        )
        .await?;
    branch.finalize();
    debug!(pr_number = pr.number, head = %branch.name, "opened cherry-pick PR");

    reporter.info(&format!("Created new PR: {}", pr.html_url));
    reporter.set_output("cherry_pick_pr_url", &pr.html_url);
    reporter.set_output("cherry_pick_pr_number", &pr.number.to_string());
    reporter.append_summary(&format!(
        "## Cherry-pick of PR #{} to `{}`\n\nCreated [#{}]({}) from `{}`.\n",
        plan.source.number, plan.target_branch, pr.number, pr.html_url, branch.name
    ));
    Ok(pr)
}

/// Report a replay conflict and return the manual recipe
///
/// The recipe goes to the info channel and to the run summary.
pub fn report_conflict(
    plan: &CherryPickPlan,
    failed: &Commit,
    reason: &str,
    reporter: &dyn Reporter,
) -> String {
    reporter.error(&format!("Failed to cherry-pick commit {}", failed.sha));
    reporter.error("Conflicts detected during cherry-pick");

    let recipe = manual_recipe(&plan.target_branch, &plan.branch_name, &plan.source.commits);
    reporter.info("\n=== Manual Cherry-Pick Instructions ===\n");
    reporter.info(&recipe);
    reporter.append_summary(&conflict_summary(
        plan.source.number,
        &failed.sha,
        reason,
        &recipe,
    ));
    recipe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cherry_pick::plan::create_cherry_pick_plan;
    use crate::types::SourceChange;

    #[test]
    fn test_body_references_source_pr() {
        let plan = create_cherry_pick_plan(
            SourceChange {
                number: 123,
                title: "Fix".to_string(),
                html_url: "https://github.com/o/r/pull/123".to_string(),
                commits: vec![Commit {
                    sha: "0123456789".to_string(),
                    message: "Fix the thing\n\ndetails".to_string(),
                    tree_sha: None,
                }],
            },
            "main",
        );

        let body = change_request_body(&plan);
        assert!(body.starts_with("Cherry-picking changes from PR #123\n\nOriginal PR: https://github.com/o/r/pull/123\n"));
        assert!(body.contains("- 0123456 Fix the thing\n"));
    }

    #[test]
    fn test_body_without_commits_has_no_list() {
        let plan = create_cherry_pick_plan(
            SourceChange {
                number: 5,
                title: "Empty".to_string(),
                html_url: "https://github.com/o/r/pull/5".to_string(),
                commits: vec![],
            },
            "main",
        );
        assert!(!change_request_body(&plan).contains("Commits:"));
    }
}
