//! Platform service construction

use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, PlatformService};
use crate::types::{Platform, PlatformConfig};

/// Create the platform service matching `config`
pub fn create_platform_service(
    config: &PlatformConfig,
    token: &str,
) -> Result<Box<dyn PlatformService>> {
    match config.platform {
        Platform::GitHub => Ok(Box::new(GitHubService::new(
            token,
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
        )?)),
        Platform::GitLab => Ok(Box::new(GitLabService::new(
            token.to_string(),
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
        )?)),
    }
}
