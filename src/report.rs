//! Reporting channels for a cherry-pick run
//!
//! The engine never prints directly. Everything a user or CI system sees goes
//! through a [`Reporter`], so runs can be observed in tests without a real
//! terminal or workflow environment.

use anstream::{eprintln, println};
use owo_colors::OwoColorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host-environment capability used by the cherry-pick engine
pub trait Reporter: Send + Sync {
    /// Informational message
    fn info(&self, message: &str);

    /// Warning that does not fail the run
    fn warn(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// Append markdown to the long-form run summary, if one is configured.
    ///
    /// Best-effort: an unavailable sink is skipped silently.
    fn append_summary(&self, markdown: &str);

    /// Publish a named run output (e.g. the new PR URL)
    fn set_output(&self, name: &str, value: &str);
}

/// Reporter that discards everything
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn append_summary(&self, _markdown: &str) {}
    fn set_output(&self, _name: &str, _value: &str) {}
}

/// Reporter for terminals and CI runners
///
/// Inside GitHub Actions, warnings and errors are emitted as workflow
/// commands so they show up as annotations; elsewhere they are colored.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    /// Emit `::warning::` / `::error::` workflow commands
    pub annotations: bool,
    /// Markdown summary file (`GITHUB_STEP_SUMMARY`)
    pub summary_path: Option<PathBuf>,
    /// Output file receiving `name=value` lines (`GITHUB_OUTPUT`)
    pub output_path: Option<PathBuf>,
}

impl ConsoleReporter {
    /// Create a console reporter
    pub const fn new(
        annotations: bool,
        summary_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
    ) -> Self {
        Self {
            annotations,
            summary_path,
            output_path,
        }
    }

    /// Configure from GitHub Actions runner variables
    ///
    /// `GITHUB_ACTIONS=true` enables annotations; `GITHUB_STEP_SUMMARY` and
    /// `GITHUB_OUTPUT` name the summary and output files.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            annotations: lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true"),
            summary_path: path("GITHUB_STEP_SUMMARY"),
            output_path: path("GITHUB_OUTPUT"),
        }
    }

    fn append_line(path: &Path, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{text}")
    }
}

/// Escape a message for a workflow command (`%`, CR and LF are reserved)
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        if self.annotations {
            println!("::warning::{}", escape_workflow_data(message));
        } else {
            eprintln!("{} {message}", "warning:".yellow().bold());
        }
    }

    fn error(&self, message: &str) {
        if self.annotations {
            println!("::error::{}", escape_workflow_data(message));
        } else {
            eprintln!("{} {message}", "error:".red().bold());
        }
    }

    fn append_summary(&self, markdown: &str) {
        let Some(path) = &self.summary_path else {
            return;
        };
        if let Err(e) = Self::append_line(path, markdown) {
            debug!(path = %path.display(), error = %e, "skipping unavailable summary sink");
        }
    }

    fn set_output(&self, name: &str, value: &str) {
        let line = format!("{name}={value}");
        match &self.output_path {
            Some(path) => {
                if let Err(e) = Self::append_line(path, &line) {
                    debug!(path = %path.display(), error = %e, "output file unavailable");
                    println!("{line}");
                }
            }
            None => println!("{line}"),
        }
    }
}
