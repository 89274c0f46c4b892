// tests/common/mod.rs
#![allow(dead_code)]

use orderline_pipeline::{ContextData, Handler, PipelineControl, PipelineError};
use tracing::Level;

/// Stand-in for an order being finalised: each step leaves a trace of what it did.
#[derive(Clone, Debug, Default)]
pub struct FulfilmentContext {
  pub order_ref: String,
  pub steps_executed: Vec<String>,
  pub notifications: Vec<String>,
  pub ledger_rows: u32,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Pipeline framework error: {0}")]
  Pipeline(String),

  #[error("Carrier unavailable: {0}")]
  Carrier(String),

  #[error("Ledger append failed: {0}")]
  Ledger(String),
}

impl From<PipelineError> for TestError {
  fn from(pe: PipelineError) -> Self {
    TestError::Pipeline(format!("{:?}", pe))
  }
}

pub fn recording_handler(step_name: &'static str) -> Handler<FulfilmentContext, TestError> {
  Box::new(move |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, "executed");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn notifying_handler(step_name: &'static str, text: &'static str) -> Handler<FulfilmentContext, TestError> {
  Box::new(move |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      guard.notifications.push(text.to_string());
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_carrier_handler(step_name: &'static str) -> Handler<FulfilmentContext, TestError> {
  Box::new(move |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      // Guard is dropped before the simulated network wait.
      tokio::time::sleep(std::time::Duration::from_millis(1)).await;
      Err(TestError::Carrier("connection reset".to_string()))
    })
  })
}

use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
