// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use orderline_pipeline::{
  ContextData, Pipeline, PipelineControl, PipelineResult, StepOutcome, StepPolicy,
};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[
    ("notify_customer", StepPolicy::BestEffort),
    ("quote_shipping", StepPolicy::BestEffort),
    ("create_shipment", StepPolicy::BestEffort),
  ]);
  pipeline.on_root("notify_customer", recording_handler("notify_customer"));
  pipeline.on_root("quote_shipping", recording_handler("quote_shipping"));
  pipeline.on_root("create_shipment", recording_handler("create_shipment"));

  let ctx = ContextData::new(FulfilmentContext::default());
  let report = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(report.result, PipelineResult::Completed);
  assert!(report.is_clean());
  assert_eq!(
    ctx.read().steps_executed,
    vec!["notify_customer", "quote_shipping", "create_shipment"]
  );
}

#[tokio::test]
#[serial]
async fn test_best_effort_failure_does_not_block_later_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[]);
  pipeline.then_best_effort("notify_paid", notifying_handler("notify_paid", "payment received"));
  pipeline.then_best_effort("create_shipment", failing_carrier_handler("create_shipment"));
  pipeline.then_best_effort("append_ledger", |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push("append_ledger".to_string());
      guard.ledger_rows += 1;
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(FulfilmentContext::default());
  let report = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(report.result, PipelineResult::Completed);
  assert_eq!(report.failed_steps(), vec!["create_shipment"]);
  assert!(!report.is_clean());
  match report.outcome_of("create_shipment") {
    Some(StepOutcome::Failed(msg)) => assert!(msg.contains("connection reset")),
    other => panic!("Expected create_shipment to fail, got {:?}", other),
  }
  assert_eq!(report.outcome_of("append_ledger"), Some(&StepOutcome::Succeeded));

  let guard = ctx.read();
  assert_eq!(guard.ledger_rows, 1);
  assert_eq!(guard.notifications, vec!["payment received"]);
}

#[tokio::test]
#[serial]
async fn test_required_failure_aborts_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[
    ("create_shipment", StepPolicy::Required),
    ("append_ledger", StepPolicy::BestEffort),
  ]);
  pipeline.on_root("create_shipment", failing_carrier_handler("create_shipment"));
  pipeline.on_root("append_ledger", recording_handler("append_ledger"));

  let ctx = ContextData::new(FulfilmentContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Carrier("connection reset".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["create_shipment"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[
    ("send_payment_request", StepPolicy::BestEffort),
    ("append_ledger", StepPolicy::BestEffort),
  ]);
  pipeline.on_root("send_payment_request", recording_handler("send_payment_request"));
  pipeline.on_root("append_ledger", recording_handler("append_ledger"));

  let ctx = ContextData::new(FulfilmentContext {
    stop_at: Some("send_payment_request".to_string()),
    ..Default::default()
  });
  let report = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(report.result, PipelineResult::Stopped);
  assert_eq!(report.outcome_of("send_payment_request"), Some(&StepOutcome::Stopped));
  assert_eq!(report.outcome_of("append_ledger"), None);
  assert_eq!(ctx.read().steps_executed, vec!["send_payment_request"]);
}

#[tokio::test]
#[serial]
async fn test_multiple_handlers_on_one_step_run_in_registration_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[("notify", StepPolicy::BestEffort)]);
  pipeline.on_root("notify", notifying_handler("notify", "first"));
  pipeline.on_root("notify", notifying_handler("notify", "second"));

  let ctx = ContextData::new(FulfilmentContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().notifications, vec!["first", "second"]);
}

#[test]
fn test_step_names_follow_definition_order() {
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[("a", StepPolicy::Required)]);
  pipeline.push_step("b", StepPolicy::BestEffort);
  assert_eq!(pipeline.step_names(), vec!["a", "b"]);
  assert_eq!(pipeline.len(), 2);
  assert!(!pipeline.is_empty());
}

#[test]
#[should_panic(expected = "already exists")]
fn test_duplicate_step_name_panics() {
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[("notify", StepPolicy::BestEffort)]);
  pipeline.push_step("notify", StepPolicy::BestEffort);
}

#[test]
#[should_panic(expected = "not found")]
fn test_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[]);
  pipeline.on_root("missing", recording_handler("missing"));
}
