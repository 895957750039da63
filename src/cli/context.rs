//! Shared setup for a cherry-pick run
//!
//! Merges the configuration layers, resolves the repository and token, and
//! creates the platform service.

use pr_cherry_pick::cherry_pick::StrategyKind;
use pr_cherry_pick::config::{
    DEFAULT_CONFIG_FILE, RawInputs, RunConfig, load_file_config, read_config,
};
use pr_cherry_pick::error::Result;
use pr_cherry_pick::platform::{PlatformService, create_platform_service};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a run needs once configuration is settled
pub struct CommandContext {
    /// Validated configuration
    pub config: RunConfig,
    /// Platform service (GitHub/GitLab)
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Build the context from CLI inputs and the process environment
    ///
    /// Precedence: CLI flags, then `INPUT_*` variables, then the config file.
    pub fn new(cli: RawInputs, config_path: Option<&Path>) -> Result<Self> {
        let lookup = |name: &str| std::env::var(name).ok();

        let (path, required) = config_path.map_or_else(
            || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
            |p| (p.to_path_buf(), true),
        );
        let file = load_file_config(&path, required)?;

        let raw = cli.or(RawInputs::from_env(lookup)).or_file(&file);
        let config = read_config(&raw, lookup)?;
        let platform = create_platform_service(&config.repo, &config.token.token)?;
        debug!(source = ?config.token.source, "platform service ready");

        Ok(Self { config, platform })
    }

    /// The configured integration strategy
    pub const fn strategy(&self) -> StrategyKind {
        self.config.strategy
    }
}
