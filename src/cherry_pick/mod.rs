//! Cherry-pick engine
//!
//! Phases, each in its own module:
//! 1. Plan - validate the request and gather the source PR (read-only)
//! 2. Branch - create the working branch at the target tip, delete it on failure
//! 3. Replay - integrate each commit in order, stopping at the first conflict
//! 4. Outcome - open the new PR, or emit a manual recipe
//!
//! [`run_cherry_pick`] ties the phases together and is the run boundary:
//! it never returns an error, only a [`RunOutcome`].

mod branch;
mod outcome;
mod plan;
mod recipe;
mod replay;
mod run;

pub use branch::{BranchState, WorkingBranch, create_working_branch, delete_working_branch};
pub use outcome::{change_request_body, open_change_request, report_conflict};
pub use plan::{
    CherryPickPlan, CherryPickRequest, build_plan, create_cherry_pick_plan, validate_request,
    working_branch_name,
};
pub use recipe::{conflict_summary, manual_recipe};
pub use replay::{
    CommitTreeStrategy, IntegrationStrategy, MergeStrategy, ReplayOutcome, StrategyKind,
    replay_commits,
};
pub use run::{RunOutcome, run_cherry_pick};
