// UI layer: progress output for the four steps and the password prompt.
// The orchestrator only talks to the `Reporter` trait, so it stays
// usable without a terminal.

use anyhow::Result;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::StepError;
use crate::orchestrator::{RunReport, Step, StepOutcome};

/// Receives progress events from `Orchestrator::run`.
pub trait Reporter {
    fn step_started(&self, step: Step);
    fn step_failed(&self, step: Step, error: &StepError);
    fn finished(&self, report: &RunReport);
}

/// Discards every event.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn step_started(&self, _step: Step) {}
    fn step_failed(&self, _step: Step, _error: &StepError) {}
    fn finished(&self, _report: &RunReport) {}
}

/// Shows the run as a four-position progress bar and prints one line per
/// step above it.
pub struct TerminalReporter {
    bar: ProgressBar,
}

impl TerminalReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(Step::ALL.len() as u64);
        // The template is a literal, parsing it cannot fail.
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:20}] {pos}/{len} {msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn step_started(&self, step: Step) {
        let message = step.progress_message();
        self.bar.println(&message);
        self.bar.set_position(step.number() as u64 - 1);
        self.bar.set_message(message);
        self.bar.tick();
    }

    fn step_failed(&self, step: Step, error: &StepError) {
        self.bar.println(format!("{step} failed: {error}"));
    }

    fn finished(&self, report: &RunReport) {
        self.bar.set_position(Step::ALL.len() as u64);
        self.bar.finish_and_clear();
        println!("Project id: {}", report.project_id);
        for (step, outcome) in [
            (Step::Compile, &report.compile),
            (Step::Evaluate, &report.evaluate),
        ] {
            if let StepOutcome::Failed(reason) = outcome {
                println!("Warning: {step} did not complete: {reason}");
            }
        }
        println!("Done!");
    }
}

impl Drop for TerminalReporter {
    fn drop(&mut self) {
        // Halted runs never reach `finished`.
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// Ask for the password without echoing it.
pub fn prompt_password(username: &str) -> Result<String> {
    let password = Password::new()
        .with_prompt(format!("Password for {username}"))
        .interact()?;
    Ok(password)
}
