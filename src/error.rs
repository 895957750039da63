//! Error types for pr-cherry-pick

use thiserror::Error;

/// Errors that can occur while cherry-picking a pull request
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed input (no remote call has been made)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced pull request or branch does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The working branch name is already taken on the remote
    #[error("branch '{0}' already exists")]
    RefConflict(String),

    /// A commit could not be integrated automatically
    #[error("{reason}")]
    ReplayConflict {
        /// Commit that failed to apply
        sha: String,
        /// Reason reported by the platform
        reason: String,
    },

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// No usable token was found
    #[error("authentication error: {0}")]
    Auth(String),

    /// Remote URL is not a GitHub or GitLab repository
    #[error("no supported remotes found (expected a GitHub or GitLab URL)")]
    NoSupportedRemotes,

    /// Operation not available on this platform
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Generic platform error (used by test doubles and adapters)
    #[error("platform error: {0}")]
    Platform(String),

    /// Octocrab client error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias for pr-cherry-pick
pub type Result<T> = std::result::Result<T, Error>;
