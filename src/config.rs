//! Run configuration
//!
//! Inputs are layered: CLI flags over environment (GitHub Actions `INPUT_*`
//! convention) over an optional TOML file. [`read_config`] turns the merged
//! raw inputs into a validated [`RunConfig`] without touching the network.

use crate::auth::{ResolvedToken, resolve_token};
use crate::cherry_pick::{CherryPickRequest, StrategyKind};
use crate::error::{Error, Result};
use crate::platform::{parse_repo_info, parse_repo_slug};
use crate::types::{Platform, PlatformConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = ".cherry-pick.toml";

/// Defaults read from the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Platform used with `repository`
    pub platform: Option<Platform>,
    /// Self-hosted instance host
    pub host: Option<String>,
    /// Default integration strategy
    pub strategy: Option<StrategyKind>,
    /// Open PRs as drafts by default
    pub draft: Option<bool>,
}

/// Load the config file
///
/// A missing file yields the empty config, unless `required` is set
/// (the path was given explicitly).
pub fn load_file_config(path: &Path, required: bool) -> Result<FileConfig> {
    if !path.exists() {
        if required {
            return Err(Error::Config(format!("{} does not exist", path.display())));
        }
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let config: FileConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Unvalidated inputs from one configuration layer
///
/// Everything is kept as text so that a malformed value fails the same way
/// whether it came from a flag or an environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    /// Source PR number
    pub pr_number: Option<String>,
    /// Branch to cherry-pick onto
    pub target_branch: Option<String>,
    /// API token
    pub token: Option<String>,
    /// `owner/repo` slug
    pub repository: Option<String>,
    /// Git remote URL, used instead of `repository` to detect the platform
    pub remote_url: Option<String>,
    /// `github` or `gitlab`
    pub platform: Option<String>,
    /// Self-hosted instance host
    pub host: Option<String>,
    /// `merge` or `commit-tree`
    pub strategy: Option<String>,
    /// `true` or `false`
    pub draft: Option<String>,
}

impl RawInputs {
    /// Read the GitHub Actions inputs
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            pr_number: get("INPUT_PR_NUMBER"),
            target_branch: get("INPUT_TARGET_BRANCH"),
            token: get("INPUT_GITHUB_TOKEN"),
            repository: get("GITHUB_REPOSITORY"),
            remote_url: None,
            platform: None,
            host: None,
            strategy: get("INPUT_STRATEGY"),
            draft: get("INPUT_DRAFT"),
        }
    }

    /// Fill unset fields from a lower-precedence layer
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            pr_number: self.pr_number.or(lower.pr_number),
            target_branch: self.target_branch.or(lower.target_branch),
            token: self.token.or(lower.token),
            repository: self.repository.or(lower.repository),
            remote_url: self.remote_url.or(lower.remote_url),
            platform: self.platform.or(lower.platform),
            host: self.host.or(lower.host),
            strategy: self.strategy.or(lower.strategy),
            draft: self.draft.or(lower.draft),
        }
    }

    /// Fill unset fields from the config file
    #[must_use]
    pub fn or_file(self, file: &FileConfig) -> Self {
        let strategy = file.strategy.map(|s| match s {
            StrategyKind::Merge => "merge".to_string(),
            StrategyKind::CommitTree => "commit-tree".to_string(),
        });
        let platform = file.platform.map(|p| match p {
            Platform::GitHub => "github".to_string(),
            Platform::GitLab => "gitlab".to_string(),
        });
        self.or(Self {
            platform,
            host: file.host.clone(),
            strategy,
            draft: file.draft.map(|d| d.to_string()),
            ..Self::default()
        })
    }
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// What to cherry-pick
    pub request: CherryPickRequest,
    /// Repository the PR lives in
    pub repo: PlatformConfig,
    /// API token
    pub token: ResolvedToken,
    /// How commits are integrated
    pub strategy: StrategyKind,
}

fn parse_platform(value: &str) -> Result<Platform> {
    match value.trim().to_ascii_lowercase().as_str() {
        "github" => Ok(Platform::GitHub),
        "gitlab" => Ok(Platform::GitLab),
        other => Err(Error::InvalidInput(format!(
            "unknown platform '{other}' (expected 'github' or 'gitlab')"
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(Error::InvalidInput(format!(
            "{name} must be true or false, got '{other}'"
        ))),
    }
}

fn parse_pr_number(value: Option<&str>) -> Result<u64> {
    let value = value
        .map(str::trim)
        .ok_or_else(|| Error::InvalidInput("pr_number is required".to_string()))?;
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidInput(format!(
            "pr_number must be a positive integer, got '{value}'"
        ))),
    }
}

fn resolve_repo(raw: &RawInputs) -> Result<PlatformConfig> {
    if let Some(url) = raw.remote_url.as_deref() {
        return parse_repo_info(url);
    }

    let platform = raw
        .platform
        .as_deref()
        .map(parse_platform)
        .transpose()?
        .unwrap_or(Platform::GitHub);
    let slug = raw.repository.as_deref().ok_or_else(|| {
        Error::InvalidInput("repository is required (--repo or --remote-url)".to_string())
    })?;
    parse_repo_slug(slug, platform, raw.host.clone())
}

/// Validate merged inputs into a [`RunConfig`]
///
/// `env` is only consulted for the token fallback variables.
pub fn read_config(raw: &RawInputs, env: impl Fn(&str) -> Option<String>) -> Result<RunConfig> {
    let pr_number = parse_pr_number(raw.pr_number.as_deref())?;
    let target_branch = raw
        .target_branch
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::InvalidInput("target_branch is required".to_string()))?;
    let strategy = raw
        .strategy
        .as_deref()
        .map(str::parse::<StrategyKind>)
        .transpose()?
        .unwrap_or_default();
    let draft = raw
        .draft
        .as_deref()
        .map(|d| parse_bool("draft", d))
        .transpose()?
        .unwrap_or(false);

    let repo = resolve_repo(raw)?;
    let token = resolve_token(repo.platform, raw.token.as_deref(), env)?;

    debug!(
        pr_number,
        target = target_branch,
        platform = %repo.platform,
        owner = %repo.owner,
        repo = %repo.repo,
        ?strategy,
        draft,
        "configuration resolved"
    );

    Ok(RunConfig {
        request: CherryPickRequest {
            pr_number,
            target_branch: target_branch.to_string(),
            draft,
        },
        repo,
        token,
        strategy,
    })
}
