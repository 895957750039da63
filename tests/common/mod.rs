//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;
mod recording_reporter;

pub use mock_platform::*;
pub use recording_reporter::RecordingReporter;

use pr_cherry_pick::types::{Commit, Platform, PlatformConfig};

/// Config for a github.com repository
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// A commit with a tree reference
pub fn make_commit(sha: &str, message: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        tree_sha: Some(format!("tree-{sha}")),
    }
}

/// `count` commits named c1, c2, ...
pub fn make_commits(count: usize) -> Vec<Commit> {
    (1..=count)
        .map(|i| make_commit(&format!("c{i}"), &format!("Commit {i}\n\nDetails for {i}")))
        .collect()
}

/// Mock with PR `pr_number` holding `commits` and a `main` branch at `base`
pub fn mock_with_pr(pr_number: u64, commits: Vec<Commit>) -> MockPlatformService {
    let mock = MockPlatformService::with_config(github_config());
    mock.add_pr(pr_number, "Fix the thing", commits);
    mock.set_branch("main", "base");
    mock
}
