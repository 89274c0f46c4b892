// core/src/pipeline/definition.rs

//! Contains the `Pipeline<TData, Err>` struct definition and methods for its
//! construction and structural modification.

use crate::core::context::Handler;
use crate::core::step::{StepDef, StepPolicy};
use crate::error::PipelineError;
use std::collections::HashMap;

/// An ordered list of named steps over a shared `ContextData<TData>`.
///
/// `Err` is the error type returned by handlers and by `run`. It must be
/// creatable from `PipelineError` so configuration problems (a required step
/// without handlers) surface through the same type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, policy)` pairs, in execution order.
  pub fn new(step_defs: &[(&str, StepPolicy)]) -> Self {
    let mut pipeline = Self {
      steps: Vec::with_capacity(step_defs.len()),
      on: HashMap::new(),
    };
    for (name, policy) in step_defs {
      pipeline.push_step(*name, *policy);
    }
    pipeline
  }

  /// Appends a step at the end of the pipeline. Panics on a duplicate name.
  pub fn push_step<S: Into<String>>(&mut self, step_name: S, policy: StepPolicy) {
    let name: String = step_name.into();
    self.ensure_step_not_exists(&name);
    self.steps.push(StepDef { name, policy });
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Index of a step. Panics if the step does not exist: a misspelled step
  /// name is a setup bug, not a runtime condition.
  fn position_of(&self, step_name: &str) -> usize {
    match self.steps.iter().position(|s| s.name == step_name) {
      Some(idx) => idx,
      None => panic!("Pipeline setup error: step '{}' not found in pipeline definition.", step_name),
    }
  }

  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    self.position_of(step_name);
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline setup error: step '{}' already exists in pipeline definition.",
        step_name
      );
    }
  }
}
