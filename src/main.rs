//! cherry-pick - replay a pull request onto another branch

mod cli;

use anyhow::Result;
use clap::Parser;
use pr_cherry_pick::config::RawInputs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cherry-pick")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cherry-pick a pull request onto another branch", long_about = None)]
struct Cli {
    /// Source PR/MR number [env: INPUT_PR_NUMBER]
    #[arg(long = "pr", value_name = "NUMBER")]
    pr_number: Option<String>,

    /// Branch to cherry-pick onto [env: INPUT_TARGET_BRANCH]
    #[arg(long = "target", value_name = "BRANCH")]
    target_branch: Option<String>,

    /// Repository as owner/name [env: GITHUB_REPOSITORY]
    #[arg(long = "repo", value_name = "OWNER/NAME", conflicts_with = "remote_url")]
    repository: Option<String>,

    /// Git remote URL to detect platform and repository from
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Platform for --repo: github or gitlab
    #[arg(long)]
    platform: Option<String>,

    /// Self-hosted instance host
    #[arg(long)]
    host: Option<String>,

    /// Integration strategy: merge or commit-tree [env: INPUT_STRATEGY]
    #[arg(long)]
    strategy: Option<String>,

    /// Open the new PR as a draft
    #[arg(long)]
    draft: bool,

    /// API token [env: INPUT_GITHUB_TOKEN, GITHUB_TOKEN, GITLAB_TOKEN]
    #[arg(long)]
    token: Option<String>,

    /// Config file (default: .cherry-pick.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show the plan and recovery recipe without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn inputs(&self) -> RawInputs {
        RawInputs {
            pr_number: self.pr_number.clone(),
            target_branch: self.target_branch.clone(),
            token: self.token.clone(),
            repository: self.repository.clone(),
            remote_url: self.remote_url.clone(),
            platform: self.platform.clone(),
            host: self.host.clone(),
            strategy: self.strategy.clone(),
            draft: self.draft.then(|| "true".to_string()),
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("pr_cherry_pick=debug,cherry_pick=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    init_tracing(args.verbose)?;

    let options = cli::RunOptions {
        inputs: args.inputs(),
        config_path: args.config.clone(),
        dry_run: args.dry_run,
    };
    let succeeded = cli::run(options).await;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
