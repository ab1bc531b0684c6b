//! Build-and-repair loop
//!
//! Tracks progress through: build -> fail -> ask -> model fix -> rebuild.
//! Every repair round requires explicit consent, and at most
//! [`MAX_DEBUG_ATTEMPTS`] rounds are spent before giving up.

use crate::build::BuildOutcome;
use crate::llm::parse::clean_generated_code;
use crate::project::Project;
use anyhow::Result;

pub const MAX_DEBUG_ATTEMPTS: u32 = 5;

/// The external compiler, pass/fail plus diagnostic text.
pub trait BuildOracle {
    fn build(&mut self, project: &Project) -> Result<BuildOutcome>;
}

/// One round-trip of diagnostics + source to the model for a repair.
#[allow(async_fn_in_trait)]
pub trait CodeFixer {
    async fn fix(&mut self, diagnostics: &str, source: &str) -> Result<String>;
}

/// The current state of the repair loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Compiler running
    Building,
    /// Build failed; waiting for the user's go-ahead on a repair round
    AwaitingConsent { attempt: u32 },
    /// Model producing a fix
    Debugging { attempt: u32 },
    /// Build succeeded
    Succeeded,
    /// User declined a repair, or the model failed to produce one
    Abandoned,
    /// All repair rounds spent and the build still fails
    MaxAttemptsReached,
}

impl LoopState {
    /// Human-readable status for display
    pub fn status_text(&self) -> &'static str {
        match self {
            LoopState::Building => "Building...",
            LoopState::AwaitingConsent { .. } => "Build failed",
            LoopState::Debugging { .. } => "Asking the model for a fix...",
            LoopState::Succeeded => "Build succeeded",
            LoopState::Abandoned => "Debugging abandoned",
            LoopState::MaxAttemptsReached => "Maximum debug attempts reached",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Succeeded | LoopState::Abandoned | LoopState::MaxAttemptsReached
        )
    }
}

/// One build invocation, as observed by the loop.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub index: u32,
    pub diagnostics: Option<String>,
    pub succeeded: bool,
}

/// Terminal state plus the history of one loop run.
#[derive(Debug)]
pub struct LoopReport {
    pub state: LoopState,
    pub attempts: Vec<AttemptRecord>,
    /// Repair rounds actually spent (consented fixes, not build invocations)
    pub debug_rounds: u32,
}

/// Drive the loop until a terminal state.
///
/// The model's repair replaces the source file wholesale (after fence
/// stripping); there is no partial merge. A fixer error abandons the loop
/// rather than crashing the session.
pub async fn run_debug_loop(
    project: &Project,
    oracle: &mut impl BuildOracle,
    fixer: &mut impl CodeFixer,
    mut consent: impl FnMut(u32) -> bool,
) -> Result<LoopReport> {
    let mut attempts: Vec<AttemptRecord> = Vec::new();
    let mut rounds_spent: u32 = 0;
    let report = |state: LoopState, attempts: Vec<AttemptRecord>, rounds: u32| LoopReport {
        state,
        attempts,
        debug_rounds: rounds,
    };

    loop {
        println!("  {}", LoopState::Building.status_text());

        let outcome = oracle.build(project)?;
        let index = attempts.len() as u32;

        if outcome.success {
            attempts.push(AttemptRecord {
                index,
                diagnostics: None,
                succeeded: true,
            });
            println!("  ✓ {}", LoopState::Succeeded.status_text());
            return Ok(report(LoopState::Succeeded, attempts, rounds_spent));
        }

        attempts.push(AttemptRecord {
            index,
            diagnostics: Some(outcome.diagnostics.clone()),
            succeeded: false,
        });
        let failed = LoopState::AwaitingConsent {
            attempt: rounds_spent + 1,
        };
        println!("  ✗ {}", failed.status_text());
        if !outcome.diagnostics.is_empty() {
            println!("{}", outcome.diagnostics.trim_end());
        }

        if rounds_spent >= MAX_DEBUG_ATTEMPTS {
            println!(
                "  ✗ Reached the maximum number of debug attempts ({}). The code still has errors.",
                MAX_DEBUG_ATTEMPTS
            );
            return Ok(report(LoopState::MaxAttemptsReached, attempts, rounds_spent));
        }

        if !consent(rounds_spent + 1) {
            println!("  Debugging skipped.");
            return Ok(report(LoopState::Abandoned, attempts, rounds_spent));
        }

        rounds_spent += 1;
        let debugging = LoopState::Debugging {
            attempt: rounds_spent,
        };
        println!(
            "  Debug attempt {}/{}: {}",
            rounds_spent,
            MAX_DEBUG_ATTEMPTS,
            debugging.status_text()
        );

        let source = project.read_source()?;
        match fixer.fix(&outcome.diagnostics, &source).await {
            Ok(response) => {
                let fixed = clean_generated_code(&response);
                if fixed.is_empty() {
                    eprintln!("  ✗ The model returned no code; keeping the current source.");
                    return Ok(report(LoopState::Abandoned, attempts, rounds_spent));
                }
                project.write_source(&fixed)?;
                println!("  ✓ Fixed code saved to {}", project.source_path().display());
            }
            Err(e) => {
                eprintln!("  ✗ Failed to obtain a fix: {:#}", e);
                return Ok(report(LoopState::Abandoned, attempts, rounds_spent));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn fail(diagnostics: &str) -> BuildOutcome {
        BuildOutcome {
            success: false,
            diagnostics: diagnostics.to_string(),
            timed_out: false,
        }
    }

    fn pass() -> BuildOutcome {
        BuildOutcome {
            success: true,
            diagnostics: String::new(),
            timed_out: false,
        }
    }

    struct ScriptedOracle {
        outcomes: VecDeque<BuildOutcome>,
        default: Option<BuildOutcome>,
        calls: u32,
    }

    impl ScriptedOracle {
        fn failing_forever(diagnostics: &str) -> Self {
            Self {
                outcomes: VecDeque::new(),
                default: Some(fail(diagnostics)),
                calls: 0,
            }
        }

        fn sequence(outcomes: Vec<BuildOutcome>) -> Self {
            Self {
                outcomes: VecDeque::from(outcomes),
                default: None,
                calls: 0,
            }
        }
    }

    impl BuildOracle for ScriptedOracle {
        fn build(&mut self, _project: &Project) -> Result<BuildOutcome> {
            self.calls += 1;
            Ok(self
                .outcomes
                .pop_front()
                .or_else(|| self.default.clone())
                .expect("scripted oracle exhausted"))
        }
    }

    struct CountingFixer {
        calls: u32,
        response: String,
    }

    impl CodeFixer for CountingFixer {
        async fn fix(&mut self, _diagnostics: &str, _source: &str) -> Result<String> {
            self.calls += 1;
            Ok(self.response.clone())
        }
    }

    struct FailingFixer;

    impl CodeFixer for FailingFixer {
        async fn fix(&mut self, _diagnostics: &str, _source: &str) -> Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    fn test_project() -> (tempfile::TempDir, Project) {
        let workspace = tempfile::tempdir().unwrap();
        let project = Project::create(workspace.path(), "demo").unwrap();
        project.write_source("package main").unwrap();
        (workspace, project)
    }

    #[tokio::test]
    async fn test_never_exceeds_attempt_ceiling() {
        let (_ws, project) = test_project();
        let mut oracle = ScriptedOracle::failing_forever("undefined: fmt.Println2");
        let mut fixer = CountingFixer {
            calls: 0,
            response: "```go\npackage main\n```".to_string(),
        };

        let report = run_debug_loop(&project, &mut oracle, &mut fixer, |_| true)
            .await
            .unwrap();

        assert_eq!(report.state, LoopState::MaxAttemptsReached);
        assert_eq!(report.debug_rounds, MAX_DEBUG_ATTEMPTS);
        assert_eq!(fixer.calls, MAX_DEBUG_ATTEMPTS);
        // initial build + one rebuild per repair round
        assert_eq!(oracle.calls, MAX_DEBUG_ATTEMPTS + 1);
        assert!(report.attempts.iter().all(|a| !a.succeeded));
    }

    #[tokio::test]
    async fn test_failures_then_success() {
        let (_ws, project) = test_project();
        let mut oracle =
            ScriptedOracle::sequence(vec![fail("e1"), fail("e2"), fail("e3"), pass()]);
        let mut fixer = CountingFixer {
            calls: 0,
            response: "package main\n\nfunc main() {}".to_string(),
        };

        let report = run_debug_loop(&project, &mut oracle, &mut fixer, |_| true)
            .await
            .unwrap();

        assert_eq!(report.state, LoopState::Succeeded);
        assert_eq!(report.debug_rounds, 3);
        assert_eq!(fixer.calls, 3);
        assert_eq!(report.attempts.len(), 4);
        assert!(report.attempts.last().unwrap().succeeded);
        assert_eq!(report.attempts[0].diagnostics.as_deref(), Some("e1"));
        // the fix landed in the source file, fences stripped
        assert_eq!(
            project.read_source().unwrap(),
            "package main\n\nfunc main() {}"
        );
    }

    #[tokio::test]
    async fn test_declined_consent_abandons_without_fixing() {
        let (_ws, project) = test_project();
        let mut oracle = ScriptedOracle::failing_forever("boom");
        let mut fixer = CountingFixer {
            calls: 0,
            response: String::new(),
        };

        let report = run_debug_loop(&project, &mut oracle, &mut fixer, |_| false)
            .await
            .unwrap();

        assert_eq!(report.state, LoopState::Abandoned);
        assert_eq!(report.debug_rounds, 0);
        assert_eq!(fixer.calls, 0);
        assert_eq!(oracle.calls, 1);
        assert_eq!(project.read_source().unwrap(), "package main");
    }

    #[tokio::test]
    async fn test_fixer_error_abandons_loop() {
        let (_ws, project) = test_project();
        let mut oracle = ScriptedOracle::failing_forever("boom");

        let report = run_debug_loop(&project, &mut oracle, &mut FailingFixer, |_| true)
            .await
            .unwrap();

        assert_eq!(report.state, LoopState::Abandoned);
        assert_eq!(oracle.calls, 1);
    }

    #[tokio::test]
    async fn test_empty_fix_abandons_loop() {
        let (_ws, project) = test_project();
        let mut oracle = ScriptedOracle::failing_forever("boom");
        let mut fixer = CountingFixer {
            calls: 0,
            response: "```go\n```".to_string(),
        };

        let report = run_debug_loop(&project, &mut oracle, &mut fixer, |_| true)
            .await
            .unwrap();

        assert_eq!(report.state, LoopState::Abandoned);
        assert_eq!(project.read_source().unwrap(), "package main");
    }

    #[tokio::test]
    async fn test_immediate_success_records_single_attempt() {
        let (_ws, project) = test_project();
        let mut oracle = ScriptedOracle::sequence(vec![pass()]);
        let mut fixer = CountingFixer {
            calls: 0,
            response: String::new(),
        };

        let report = run_debug_loop(&project, &mut oracle, &mut fixer, |_| {
            panic!("consent must not be asked on success")
        })
        .await
        .unwrap();

        assert_eq!(report.state, LoopState::Succeeded);
        assert_eq!(report.attempts.len(), 1);
        assert!(report.attempts[0].succeeded);
        assert!(report.attempts[0].diagnostics.is_none());
    }

    #[test]
    fn test_state_terminality() {
        assert!(!LoopState::Building.is_terminal());
        assert!(!LoopState::AwaitingConsent { attempt: 1 }.is_terminal());
        assert!(!LoopState::Debugging { attempt: 1 }.is_terminal());
        assert!(LoopState::Succeeded.is_terminal());
        assert!(LoopState::Abandoned.is_terminal());
        assert!(LoopState::MaxAttemptsReached.is_terminal());
    }
}
