// server/src/pipelines/contexts.rs

//! Context data shared by the steps of an effect pipeline.

use crate::config::OrderSettings;
use crate::lifecycle::LifecycleEvent;
use crate::services::Collaborators;
use crate::store::SessionHandle;
use std::sync::Arc;

pub struct EffectCtxData {
  /// The session the transition was applied to. Steps mutate it in place.
  pub session: SessionHandle,
  pub services: Collaborators,
  pub settings: Arc<OrderSettings>,
  /// Event produced by a step (the carrier's verdict) to apply once the run ends.
  pub follow_up: Option<LifecycleEvent>,
  /// Set when the payment card could not be sent; suppresses the awaiting-payment row.
  pub payment_request_failed: bool,
}

impl EffectCtxData {
  pub fn new(session: SessionHandle, services: Collaborators, settings: Arc<OrderSettings>) -> Self {
    Self {
      session,
      services,
      settings,
      follow_up: None,
      payment_request_failed: false,
    }
  }
}
