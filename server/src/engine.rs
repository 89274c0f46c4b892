// server/src/engine.rs

//! Order lifecycle driver: applies events through the store, runs the resulting
//! effect pipelines and feeds follow-up events back in.

use crate::config::OrderSettings;
use crate::errors::{AppError, Result as AppResult};
use crate::lifecycle::{LifecycleEvent, Transition};
use crate::models::normalize_phone;
use crate::pipelines::{build_effect_pipeline, EffectCtxData};
use crate::services::Collaborators;
use crate::store::SessionStore;
use orderline_pipeline::ContextData;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What the payment provider told us, reduced to the lifecycle-relevant signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSignal {
  Succeeded,
  Failed,
  Other,
}

impl PaymentSignal {
  /// Case-insensitive substring match on the provider's event name.
  pub fn from_event_name(name: &str) -> Self {
    let name = name.to_lowercase();
    if name.contains("paid") {
      PaymentSignal::Succeeded
    } else if name.contains("failed") || name.contains("cancel") || name.contains("expired") {
      PaymentSignal::Failed
    } else {
      PaymentSignal::Other
    }
  }
}

/// A payment callback with its correlation hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
  pub event_name: String,
  pub signal: PaymentSignal,
  pub reference_id: Option<String>,
  /// Contact phone as sent by the provider; normalized before lookup.
  pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
  /// Neither the reference id nor the contact phone matched a session.
  Unresolved,
  /// The session was found but the event name carries no lifecycle signal.
  Ignored { order_id: String },
  Applied {
    order_id: String,
    transitions: Vec<Transition>,
  },
}

pub struct OrderEngine {
  store: Arc<SessionStore>,
  services: Collaborators,
  settings: Arc<OrderSettings>,
}

impl OrderEngine {
  pub fn new(store: Arc<SessionStore>, services: Collaborators, settings: OrderSettings) -> Self {
    Self {
      store,
      services,
      settings: Arc::new(settings),
    }
  }

  pub fn store(&self) -> &Arc<SessionStore> {
    &self.store
  }

  pub fn services(&self) -> &Collaborators {
    &self.services
  }

  /// Runs the details-captured lifecycle for a freshly promoted session:
  /// acknowledge the details, then branch on the requested payment mode.
  #[instrument(name = "OrderEngine::on_details_captured", skip(self))]
  pub async fn on_details_captured(&self, order_id: &str) -> AppResult<Vec<Transition>> {
    let mode = self
      .store
      .get(order_id)
      .map(|s| s.payment_mode)
      .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;
    info!(mode = mode.label(), "Delivery details captured.");

    let mut applied = self.drive(order_id, LifecycleEvent::DetailsSubmitted).await;
    applied.extend(self.drive(order_id, LifecycleEvent::PaymentModeSelected(mode)).await);
    Ok(applied)
  }

  #[instrument(name = "OrderEngine::on_payment_event", skip(self, event), fields(event_name = %event.event_name, reference_id = ?event.reference_id))]
  pub async fn on_payment_event(&self, event: &PaymentEvent) -> PaymentOutcome {
    let Some(order_id) = self.resolve_order(event) else {
      warn!(contact = ?event.contact, "Payment event matches no session, acknowledging and dropping.");
      return PaymentOutcome::Unresolved;
    };

    let lifecycle_event = match event.signal {
      PaymentSignal::Succeeded => LifecycleEvent::PaymentSucceeded,
      PaymentSignal::Failed => LifecycleEvent::PaymentFailed,
      PaymentSignal::Other => {
        info!(order_id = %order_id, "Payment event carries no success or failure signal, ignoring.");
        return PaymentOutcome::Ignored { order_id };
      }
    };

    let transitions = self.drive(&order_id, lifecycle_event).await;
    PaymentOutcome::Applied { order_id, transitions }
  }

  /// Explicit reference id first, then the most recent order of the contact phone.
  pub fn resolve_order(&self, event: &PaymentEvent) -> Option<String> {
    if let Some(reference_id) = event.reference_id.as_deref() {
      if self.store.handle(reference_id).is_some() {
        return Some(reference_id.to_string());
      }
      debug!(reference_id, "Reference id does not match a session, trying contact phone.");
    }
    let phone = normalize_phone(event.contact.as_deref()?);
    if phone.is_empty() {
      return None;
    }
    let order_id = self.store.last_order_for_phone(&phone)?;
    warn!(order_id = %order_id, "Session resolved through phone fallback.");
    Some(order_id)
  }

  /// Applies `event` and any follow-ups the effects produce. Returns the
  /// transitions that actually changed something.
  async fn drive(&self, order_id: &str, event: LifecycleEvent) -> Vec<Transition> {
    let mut applied = Vec::new();
    let mut next = Some(event);

    while let Some(event) = next.take() {
      let Some(transition) = self.store.apply(order_id, &event) else {
        warn!(order_id, "Session disappeared while driving lifecycle.");
        break;
      };
      if transition.is_noop() {
        info!(order_id, state = ?transition.from, event = ?event, "Event does not apply in current state, skipping effects.");
        break;
      }
      let Some(session) = self.store.handle(order_id) else {
        break;
      };

      let ctx = ContextData::new(EffectCtxData::new(
        session,
        self.services.clone(),
        self.settings.clone(),
      ));
      let pipeline = build_effect_pipeline(&transition.effects);
      match pipeline.run(ctx.clone()).await {
        Ok(report) if !report.is_clean() => {
          warn!(order_id, failed_steps = ?report.failed_steps(), "Some effects failed.");
        }
        Ok(_) => {}
        Err(e) => error!(order_id, error = %e, "Effect pipeline aborted."),
      }

      next = ctx.write().follow_up.take();
      applied.push(transition);
    }
    applied
  }
}
