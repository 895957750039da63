//! Manual recovery instructions

use crate::types::Commit;
use std::fmt::Write;

/// Shell commands that redo the cherry-pick by hand
///
/// Lists every commit of the source PR in original order, not just the one
/// that conflicted, because the working branch is deleted and the user
/// starts over from the target branch.
pub fn manual_recipe(target_branch: &str, branch_name: &str, commits: &[Commit]) -> String {
    let mut recipe = String::new();

    recipe.push_str("\nManual cherry-pick commands:\n\n");
    recipe.push_str("# Setup\n");
    recipe.push_str("git fetch origin\n");
    let _ = writeln!(recipe, "git checkout {target_branch}");
    let _ = writeln!(recipe, "git pull origin {target_branch}");
    let _ = writeln!(recipe, "git checkout -b {branch_name}");

    recipe.push_str("\n# Cherry-pick commits one by one:\n");
    for commit in commits {
        let _ = writeln!(recipe, "git cherry-pick {}  # {}", commit.sha, commit.summary());
    }

    recipe.push_str("\n# If conflicts:\n");
    recipe.push_str("git add .\n");
    recipe.push_str("git cherry-pick --continue\n");
    recipe.push_str("# or\n");
    recipe.push_str("git cherry-pick --abort\n");

    recipe.push_str("\n# After all commits are cherry-picked:\n");
    let _ = writeln!(recipe, "git push origin {branch_name}");

    let _ = write!(recipe, "\n# Create PR: {branch_name} → {target_branch}\n");
    recipe
}

/// Markdown block for the run summary after a conflict
pub fn conflict_summary(pr_number: u64, failed_sha: &str, reason: &str, recipe: &str) -> String {
    format!(
        "## Cherry-pick of PR #{pr_number} needs manual work\n\n\
         Commit `{failed_sha}` could not be applied automatically: {reason}\n\n\
         ```sh\n{recipe}```\n"
    )
}
