// core/src/core/control.rs

//! Signals for controlling pipeline flow and the report of a pipeline run.

/// Signal from a handler indicating whether the pipeline should continue or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Continue with the remaining handlers and steps.
  Continue,
  /// Halt the pipeline. No further handlers or steps run.
  Stop,
}

/// Outcome of a full pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (best-effort failures included).
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}

/// What happened to a single step during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
  Succeeded,
  /// The step's handler asked the pipeline to stop.
  Stopped,
  /// A best-effort step failed; the message is the handler error's display form.
  Failed(String),
  /// A best-effort step had no handlers registered.
  NoHandlers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
  pub name: String,
  pub outcome: StepOutcome,
}

/// Per-step account of a run, returned by `Pipeline::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
  pub result: PipelineResult,
  pub steps: Vec<StepRecord>,
}

impl RunReport {
  pub(crate) fn new() -> Self {
    Self {
      result: PipelineResult::Completed,
      steps: Vec::new(),
    }
  }

  pub(crate) fn record(&mut self, name: &str, outcome: StepOutcome) {
    self.steps.push(StepRecord {
      name: name.to_string(),
      outcome,
    });
  }

  pub fn outcome_of(&self, step_name: &str) -> Option<&StepOutcome> {
    self.steps.iter().find(|s| s.name == step_name).map(|s| &s.outcome)
  }

  /// Names of best-effort steps that failed, in execution order.
  pub fn failed_steps(&self) -> Vec<&str> {
    self
      .steps
      .iter()
      .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
      .map(|s| s.name.as_str())
      .collect()
  }

  pub fn is_clean(&self) -> bool {
    self.result == PipelineResult::Completed && self.failed_steps().is_empty()
  }
}
