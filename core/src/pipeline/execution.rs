// core/src/pipeline/execution.rs

//! Contains `Pipeline::run()`, which executes the steps in order and applies
//! each step's failure policy.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult, RunReport, StepOutcome};
use crate::core::step::StepPolicy;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the pipeline against the shared context `ctx_data`.
  ///
  /// Returns the run report on completion or stop. Returns `Err` only when a
  /// `Required` step fails or has no handlers; best-effort failures are
  /// recorded in the report instead.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<RunReport, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut report = RunReport::new();

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = step_name,
        step_index = step_idx,
        policy = ?step_def.policy
      );

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => match step_def.policy {
          StepPolicy::Required => {
            event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
            return Err(Err::from(PipelineError::HandlerMissing {
              step_name: step_def.name.clone(),
            }));
          }
          StepPolicy::BestEffort => {
            event!(parent: &step_span, Level::DEBUG, "Best-effort step has no handlers, skipping.");
            report.record(step_name, StepOutcome::NoHandlers);
            continue;
          }
        },
      };

      let mut outcome = StepOutcome::Succeeded;
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        event!(parent: &step_span, Level::TRACE, handler_index = handler_idx, "Executing handler.");
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(parent: &step_span, Level::INFO, "Pipeline stopped by handler.");
            report.record(step_name, StepOutcome::Stopped);
            report.result = PipelineResult::Stopped;
            return Ok(report);
          }
          Err(e) => match step_def.policy {
            StepPolicy::Required => {
              event!(parent: &step_span, Level::ERROR, error = %e, "Required step failed.");
              return Err(e);
            }
            StepPolicy::BestEffort => {
              event!(parent: &step_span, Level::WARN, error = %e, "Best-effort step failed, continuing.");
              outcome = StepOutcome::Failed(e.to_string());
              break;
            }
          },
        }
      }
      report.record(step_name, outcome);
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(report)
  }
}
