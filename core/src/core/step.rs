// core/src/core/step.rs

//! Defines the structure for a single step within a pipeline.

/// How a step's failure affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
  /// A handler error aborts the run and is returned to the caller.
  /// A missing handler is a configuration error.
  Required,
  /// A handler error is logged and recorded; the run continues with the next step.
  BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub policy: StepPolicy,
}
