//! pr-cherry-pick: replay a pull request's commits onto another branch
//!
//! Given a source PR and a target branch, the engine creates a working branch
//! at the target tip, integrates the PR's commits one by one through the
//! platform API, and opens a new PR. When a commit cannot be integrated
//! automatically, the working branch is removed and the user gets a shell
//! recipe that redoes the cherry-pick by hand.
//!
//! Works with GitHub and GitLab, including self-hosted instances.

pub mod auth;
pub mod cherry_pick;
pub mod config;
pub mod error;
pub mod platform;
pub mod report;
pub mod types;
