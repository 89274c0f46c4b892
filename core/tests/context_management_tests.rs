// tests/context_management_tests.rs
mod common;

use common::*;
use orderline_pipeline::{ContextData, Pipeline, PipelineControl, StepPolicy};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_between_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<FulfilmentContext, TestError>::new(&[
    ("assign_ref", StepPolicy::Required),
    ("use_ref", StepPolicy::Required),
  ]);

  pipeline.on_root("assign_ref", |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      ctx.write().order_ref = "OUO-12345".to_string();
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });
  pipeline.on_root("use_ref", |ctx: ContextData<FulfilmentContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      let note = format!("Order {} confirmed", guard.order_ref);
      guard.notifications.push(note);
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(FulfilmentContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().notifications, vec!["Order OUO-12345 confirmed"]);
}

#[test]
fn test_clones_share_one_cell() {
  let original = ContextData::new(FulfilmentContext::default());
  let cloned = original.clone();
  original.write().ledger_rows = 3;
  assert_eq!(cloned.read().ledger_rows, 3);
  assert!(original.ptr_eq(&cloned));
  assert!(!original.ptr_eq(&ContextData::new(FulfilmentContext::default())));
}

#[test]
fn test_update_and_snapshot() {
  let ctx = ContextData::new(FulfilmentContext::default());
  let previous = ctx.update(|data| {
    let before = data.ledger_rows;
    data.ledger_rows += 1;
    before
  });
  assert_eq!(previous, 0);

  let snap = ctx.snapshot();
  ctx.write().ledger_rows = 10;
  assert_eq!(snap.ledger_rows, 1);
  assert_eq!(ctx.read().ledger_rows, 10);
}

#[tokio::test]
#[serial]
async fn test_concurrent_updates_are_serialised() {
  setup_tracing();
  let ctx = ContextData::new(FulfilmentContext::default());
  let mut tasks = Vec::new();
  for _ in 0..16 {
    let c = ctx.clone();
    tasks.push(tokio::spawn(async move {
      c.update(|d| d.ledger_rows += 1);
    }));
  }
  for t in tasks {
    t.await.unwrap();
  }
  assert_eq!(ctx.read().ledger_rows, 16);
}
