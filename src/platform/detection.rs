//! Repository detection from remote URLs and `owner/repo` slugs

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// scp-style remote, e.g. `git@github.com:owner/repo.git`
static SCP_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w.+-]+@)?(?P<host>[\w.-]+):(?P<path>[^/].*)$")
        .unwrap_or_else(|e| panic!("invalid scp remote pattern: {e}"))
});

/// Detect platform from a host name
fn platform_for_host(host: &str) -> Option<Platform> {
    let host = host.to_ascii_lowercase();
    if host == "github.com" || host.contains("github") {
        Some(Platform::GitHub)
    } else if host == "gitlab.com" || host.contains("gitlab") {
        Some(Platform::GitLab)
    } else {
        None
    }
}

/// Split a remote URL into host and repository path
fn split_remote(url: &str) -> Option<(String, String)> {
    if let Ok(parsed) = Url::parse(url) {
        let host = parsed.host_str()?.to_string();
        return Some((host, parsed.path().to_string()));
    }
    let caps = SCP_REMOTE.captures(url)?;
    Some((caps["host"].to_string(), caps["path"].to_string()))
}

/// Detect the hosting platform of a remote URL
pub fn detect_platform(url: &str) -> Option<Platform> {
    let (host, _) = split_remote(url)?;
    platform_for_host(&host)
}

/// Parse a git remote URL into a platform configuration
///
/// Supports https and ssh URLs as well as scp-style remotes. GitLab owners
/// may contain nested groups (`group/subgroup`).
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let (host, path) = split_remote(url).ok_or(Error::NoSupportedRemotes)?;
    let platform = platform_for_host(&host).ok_or(Error::NoSupportedRemotes)?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.rsplit_once('/').ok_or(Error::NoSupportedRemotes)?;
    if owner.is_empty() || repo.is_empty() {
        return Err(Error::NoSupportedRemotes);
    }

    let default_host = match platform {
        Platform::GitHub => "github.com",
        Platform::GitLab => "gitlab.com",
    };

    Ok(PlatformConfig {
        platform,
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != default_host).then_some(host),
    })
}

/// Parse an `owner/repo` slug (as found in `GITHUB_REPOSITORY`)
pub fn parse_repo_slug(
    slug: &str,
    platform: Platform,
    host: Option<String>,
) -> Result<PlatformConfig> {
    let slug = slug.trim().trim_matches('/');
    let Some((owner, repo)) = slug.rsplit_once('/') else {
        return Err(Error::InvalidInput(format!(
            "repository '{slug}' is not in owner/repo form"
        )));
    };
    if owner.is_empty() || repo.is_empty() || (platform == Platform::GitHub && owner.contains('/'))
    {
        return Err(Error::InvalidInput(format!(
            "repository '{slug}' is not in owner/repo form"
        )));
    }

    Ok(PlatformConfig {
        platform,
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}
