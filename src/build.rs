//! Go build oracle
//!
//! The `go` toolchain is treated as an external pass/fail service: invoke
//! it, capture diagnostics, and never let it block the session forever.

use crate::project::{Project, SOURCE_FILE};
use crate::util::{confirm, run_with_timeout, CommandOutput};
use crate::workflow::{
    run_debug_loop, BuildOracle, CodeFixer, LoopReport, LoopState, MAX_DEBUG_ATTEMPTS,
};
use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};
use std::time::Duration;

pub const BUILD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub success: bool,
    pub diagnostics: String,
    pub timed_out: bool,
}

/// Runs `go build` in the project directory with a wall-clock bound.
pub struct GoBuild {
    pub timeout: Duration,
}

impl Default for GoBuild {
    fn default() -> Self {
        Self {
            timeout: BUILD_TIMEOUT,
        }
    }
}

impl BuildOracle for GoBuild {
    fn build(&mut self, project: &Project) -> Result<BuildOutcome> {
        let mut cmd = Command::new("go");
        cmd.arg("build")
            .arg("-o")
            .arg(&project.name)
            .arg(SOURCE_FILE)
            .current_dir(&project.dir);

        let output = run_with_timeout(&mut cmd, self.timeout)
            .context("Failed to run the Go toolchain (is `go` installed?)")?;

        Ok(outcome_from(output, self.timeout))
    }
}

fn outcome_from(output: CommandOutput, timeout: Duration) -> BuildOutcome {
    if output.timed_out {
        return BuildOutcome {
            success: false,
            diagnostics: format!("go build timed out after {}s", timeout.as_secs()),
            timed_out: true,
        };
    }

    let success = output.status.map(|s| s.success()).unwrap_or(false);

    // go build writes errors to stderr; stdout is usually empty
    let mut diagnostics = output.stderr.trim().to_string();
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        if diagnostics.is_empty() {
            diagnostics = stdout.to_string();
        } else {
            diagnostics = format!("{}\n{}", diagnostics, stdout);
        }
    }

    BuildOutcome {
        success,
        diagnostics,
        timed_out: false,
    }
}

/// Run the built executable with inherited stdio. The program may be
/// interactive, so no timeout applies here.
pub fn run_program(project: &Project) -> Result<ExitStatus> {
    Command::new(project.binary_path())
        .current_dir(&project.dir)
        .status()
        .with_context(|| format!("Failed to run {}", project.binary_path().display()))
}

/// Full build flow for a generated project: the repair loop with the user's
/// consent at each round, then an offer to run the binary on success.
pub async fn build_flow(fixer: &mut impl CodeFixer, project: &Project) -> Result<LoopReport> {
    println!();
    println!("Building your program...");

    let mut oracle = GoBuild::default();
    let report = run_debug_loop(project, &mut oracle, fixer, |attempt| {
        confirm(&format!(
            "\nWould you like to debug and fix the errors? (attempt {}/{}) [y/N]: ",
            attempt, MAX_DEBUG_ATTEMPTS
        ))
        .unwrap_or(false)
    })
    .await?;

    if report.state == LoopState::Succeeded {
        println!();
        println!(
            "  ✓ Success! Built your program at '{}'.",
            project.binary_path().display()
        );
        if confirm("  Run the program? [y/N]: ")? {
            let status = run_program(project)?;
            if !status.success() {
                println!("  Program exited with {}", status);
            }
        } else {
            println!("  Program not run.");
        }
    }

    Ok(report)
}
