//! Authentication for GitHub and GitLab
//!
//! Tokens come from the run inputs first, then from the environment
//! variables each platform's own CLI honours.

use crate::error::{Error, Result};
use crate::types::Platform;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token passed as an input (`--token` or `INPUT_GITHUB_TOKEN`)
    Input,
    /// Token from environment variable
    EnvVar(&'static str),
}

/// A token and where it came from
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    /// The token itself
    pub token: String,
    /// Where it was found
    pub source: AuthSource,
}

impl std::fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Environment variables checked for each platform, in order
pub const fn token_env_vars(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::GitHub => &["GITHUB_TOKEN", "GH_TOKEN"],
        Platform::GitLab => &["GITLAB_TOKEN", "GL_TOKEN"],
    }
}

/// Find a token for `platform`
///
/// Blank values are treated as missing.
pub fn resolve_token(
    platform: Platform,
    explicit: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedToken> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        debug!(%platform, "using token from inputs");
        return Ok(ResolvedToken {
            token: token.to_string(),
            source: AuthSource::Input,
        });
    }

    for &var in token_env_vars(platform) {
        if let Some(token) = lookup(var).filter(|t| !t.trim().is_empty()) {
            debug!(%platform, var, "using token from environment");
            return Ok(ResolvedToken {
                token: token.trim().to_string(),
                source: AuthSource::EnvVar(var),
            });
        }
    }

    Err(Error::Auth(format!(
        "no {platform} token found. Pass --token or set {}",
        token_env_vars(platform).join(" or ")
    )))
}
