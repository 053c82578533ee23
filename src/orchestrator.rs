// Submission workflow: token -> submit -> compile -> evaluate.
//
// Token and submit produce the values later calls need, so their failures
// always halt the run. Compile and evaluate failures halt it only under
// `FailurePolicy::Strict`; otherwise they are logged and recorded in the
// `RunReport`.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::api::{Credentials, DslabClient, ProjectId};
use crate::error::{StepError, WorkflowError};
use crate::transport::Transport;
use crate::ui::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Token,
    Submit,
    Compile,
    Evaluate,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Token, Step::Submit, Step::Compile, Step::Evaluate];

    /// 1-based position in the workflow.
    pub fn number(self) -> usize {
        match self {
            Step::Token => 1,
            Step::Submit => 2,
            Step::Compile => 3,
            Step::Evaluate => 4,
        }
    }

    pub fn progress_message(self) -> String {
        let action = match self {
            Step::Token => "Getting token...",
            Step::Submit => "Submitting the project...",
            Step::Compile => "Compiling the project...",
            Step::Evaluate => "Evaluating the project...",
        };
        format!("{}/{}: {}", self.number(), Self::ALL.len(), action)
    }

    /// Message shown to the user when this step halts the run.
    pub fn failure_hint(self) -> &'static str {
        match self {
            Step::Token => "No token received. Check your credentials and try again.",
            Step::Submit => "No project ID received. Check your project id and try again.",
            Step::Compile => "Compilation request failed.",
            Step::Evaluate => "Evaluation request failed.",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Token => "token",
            Step::Submit => "submit",
            Step::Compile => "compile",
            Step::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

/// Input of one run.
#[derive(Debug, Clone)]
pub struct Submission {
    pub credentials: Credentials,
    /// DSLab project name, used in the submit URL.
    pub project: String,
    pub zip_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Failed(String),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

/// What a run that was not halted achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub project_id: ProjectId,
    pub compile: StepOutcome,
    pub evaluate: StepOutcome,
}

impl RunReport {
    pub fn all_completed(&self) -> bool {
        self.compile.is_completed() && self.evaluate.is_completed()
    }
}

pub struct Orchestrator<T> {
    client: DslabClient<T>,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(client: DslabClient<T>) -> Self {
        Self { client }
    }

    /// Run the four calls in order, stopping at the first fatal failure.
    pub fn run(
        &self,
        submission: &Submission,
        reporter: &dyn Reporter,
    ) -> Result<RunReport, WorkflowError> {
        info!(project = %submission.project, "starting DSLab submission");

        reporter.step_started(Step::Token);
        let token = self
            .client
            .acquire_token(&submission.credentials)
            .map_err(|e| self.halt(Step::Token, e, reporter))?;

        reporter.step_started(Step::Submit);
        let project_id = self
            .client
            .submit_project(&token, &submission.project, &submission.zip_path)
            .map_err(|e| self.halt(Step::Submit, e, reporter))?;
        info!(%project_id, "project submitted");

        reporter.step_started(Step::Compile);
        let compile = self.settle(
            Step::Compile,
            self.client.compile_project(&token, &project_id),
            reporter,
        )?;

        reporter.step_started(Step::Evaluate);
        let evaluate = self.settle(
            Step::Evaluate,
            self.client.evaluate_project(&token, &project_id),
            reporter,
        )?;

        let report = RunReport {
            project_id,
            compile,
            evaluate,
        };
        info!(project_id = %report.project_id, all_completed = report.all_completed(), "submission finished");
        reporter.finished(&report);
        Ok(report)
    }

    fn halt(&self, step: Step, error: StepError, reporter: &dyn Reporter) -> WorkflowError {
        tracing::error!(%step, error = %error, "workflow halted");
        reporter.step_failed(step, &error);
        WorkflowError::new(step, error)
    }

    /// Turn the result of a compile/evaluate call into an outcome, or a
    /// halt when the policy is strict.
    fn settle(
        &self,
        step: Step,
        result: Result<(), StepError>,
        reporter: &dyn Reporter,
    ) -> Result<StepOutcome, WorkflowError> {
        match result {
            Ok(()) => Ok(StepOutcome::Completed),
            Err(e) if self.client.policy().is_strict() => Err(self.halt(step, e, reporter)),
            Err(e) => {
                warn!(%step, error = %e, "step failed, continuing");
                reporter.step_failed(step, &e);
                Ok(StepOutcome::Failed(e.to_string()))
            }
        }
    }
}
