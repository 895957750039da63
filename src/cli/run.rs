//! The cherry-pick command

use crate::cli::context::CommandContext;
use anstream::println;
use owo_colors::OwoColorize;
use pr_cherry_pick::cherry_pick::{CherryPickPlan, build_plan, manual_recipe, run_cherry_pick};
use pr_cherry_pick::config::RawInputs;
use pr_cherry_pick::error::Result;
use pr_cherry_pick::report::{ConsoleReporter, Reporter};
use std::path::PathBuf;

/// Options for the cherry-pick command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Inputs given on the command line
    pub inputs: RawInputs,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// Dry run - show what would be done without making changes
    pub dry_run: bool,
}

/// Run the command, reporting any failure; returns whether it succeeded
pub async fn run(options: RunOptions) -> bool {
    let reporter = ConsoleReporter::from_env(|name| std::env::var(name).ok());

    let result = execute(options, &reporter).await;
    match result {
        Ok(None) => true,
        Ok(Some(message)) | Err(message) => {
            reporter.error(&message);
            false
        }
    }
}

/// Returns the failure message, if the run failed
async fn execute(
    options: RunOptions,
    reporter: &ConsoleReporter,
) -> std::result::Result<Option<String>, String> {
    let ctx = CommandContext::new(options.inputs, options.config_path.as_deref())
        .map_err(|e| e.to_string())?;

    if options.dry_run {
        return dry_run(&ctx, reporter)
            .await
            .map(|()| None)
            .map_err(|e| e.to_string());
    }

    let strategy = ctx.strategy().strategy();
    let outcome = run_cherry_pick(
        &ctx.config.request,
        ctx.platform.as_ref(),
        strategy.as_ref(),
        reporter,
    )
    .await;
    Ok(outcome.failure_message())
}

/// Build the plan with read-only calls and print it
async fn dry_run(ctx: &CommandContext, reporter: &dyn Reporter) -> Result<()> {
    let plan = build_plan(ctx.platform.as_ref(), &ctx.config.request, reporter).await?;
    print_plan(&plan, ctx);
    Ok(())
}

fn print_plan(plan: &CherryPickPlan, ctx: &CommandContext) {
    println!(
        "{} PR #{} → {} ({} strategy)",
        "Dry run:".bold(),
        plan.source.number,
        plan.target_branch.cyan(),
        ctx.strategy().strategy().name()
    );
    println!("Working branch: {}", plan.branch_name.cyan());
    println!("PR title: {}", plan.title);
    println!();

    if plan.source.commits.is_empty() {
        println!("{}", "No commits to cherry-pick".dimmed());
    } else {
        println!("Commits:");
        for commit in &plan.source.commits {
            println!("  {} {}", commit.short_sha().yellow(), commit.summary());
        }
    }
    println!();
    println!(
        "{}",
        manual_recipe(&plan.target_branch, &plan.branch_name, &plan.source.commits)
    );
}
