//! Core types for pr-cherry-pick

use serde::{Deserialize, Serialize};

/// A single commit of the source pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    /// Git commit ID (hex)
    pub sha: String,
    /// Full commit message (first line is the summary)
    pub message: String,
    /// Tree the commit points at (None when the platform does not expose it)
    pub tree_sha: Option<String>,
}

impl Commit {
    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Abbreviated commit ID for display
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// The pull request whose commits are replayed
///
/// Read once at plan time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChange {
    /// PR/MR number
    pub number: u64,
    /// PR/MR title
    pub title: String,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Commits in the order they were added to the PR
    pub commits: Vec<Commit>,
}

/// A pull request / merge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
    /// Whether PR is a draft
    pub is_draft: bool,
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// PR metadata needed to plan a cherry-pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR/MR number
    pub number: u64,
    /// PR/MR title
    pub title: String,
    /// Current state of the PR
    pub state: PrState,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Web URL for the PR/MR
    pub html_url: String,
}

/// Result of integrating one commit onto a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationResult {
    /// A new commit was written; the branch now points at `sha`
    Applied {
        /// New branch tip
        sha: String,
    },
    /// The branch already contains the commit's changes
    UpToDate,
    /// The platform could not integrate the commit automatically
    Conflict {
        /// Message reported by the platform
        message: String,
    },
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}
