// server/src/dispatch/mod.rs

//! Routes classified chat events and payment callbacks to the store and engine.

pub mod inbound;
pub mod payment;

use crate::engine::{OrderEngine, PaymentOutcome};
use crate::messages;
use crate::models::ProductItem;
use crate::services::{NotificationSink, ReplyButton};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub use inbound::{classify, ChatEvent};
pub use payment::parse_payment_event;

/// What the dispatcher did with one chat delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatDisposition {
  NoMessage,
  Greeted,
  CatalogSent,
  CartUpdated { items: usize, amount: i64 },
  SandboxDiscarded,
  OrderCaptured { order_id: String },
  Fallback,
  Unsupported { kind: String },
}

pub struct WebhookDispatcher {
  engine: Arc<OrderEngine>,
  sandbox_flow_token: String,
}

impl WebhookDispatcher {
  pub fn new(engine: Arc<OrderEngine>, sandbox_flow_token: impl Into<String>) -> Self {
    Self {
      engine,
      sandbox_flow_token: sandbox_flow_token.into(),
    }
  }

  pub fn engine(&self) -> &Arc<OrderEngine> {
    &self.engine
  }

  fn notifier(&self) -> &Arc<dyn NotificationSink> {
    &self.engine.services().notifier
  }

  #[instrument(name = "WebhookDispatcher::handle_chat", skip_all)]
  pub async fn handle_chat(&self, payload: &JsonValue) -> ChatDisposition {
    let Some(event) = classify(payload) else {
      return ChatDisposition::NoMessage;
    };
    info!(from = %event.sender(), "Chat event classified.");

    match event {
      ChatEvent::FormSubmission { from, customer } => {
        if customer.flow_token.as_deref() == Some(self.sandbox_flow_token.as_str()) {
          info!("Ignoring sandbox form submission.");
          return ChatDisposition::SandboxDiscarded;
        }
        let session = self.engine.store().promote(&from, customer);
        if let Err(e) = self.engine.on_details_captured(&session.order_id).await {
          warn!(order_id = %session.order_id, error = %e, "Details-captured processing failed.");
        }
        ChatDisposition::OrderCaptured {
          order_id: session.order_id,
        }
      }
      ChatEvent::CatalogOrder { from, catalog_id, items } => self.on_catalog_order(&from, items, catalog_id).await,
      ChatEvent::Text { from, body } | ChatEvent::Reply { from, title: body } => self.on_keyword(&from, &body).await,
      ChatEvent::Unsupported { kind, .. } => {
        info!(%kind, "Unsupported message type, acknowledging.");
        ChatDisposition::Unsupported { kind }
      }
    }
  }

  async fn on_catalog_order(&self, from: &str, items: Vec<ProductItem>, catalog_id: Option<String>) -> ChatDisposition {
    let cart = self.engine.store().replace_cart(from, items, catalog_id);
    self.send(self.notifier().send_details_form(from).await, "details form");
    self.send(
      self.notifier().send_text(from, messages::DETAILS_FORM_HINT).await,
      "details form hint",
    );
    ChatDisposition::CartUpdated {
      items: cart.product_items.len(),
      amount: cart.amount,
    }
  }

  async fn on_keyword(&self, from: &str, body: &str) -> ChatDisposition {
    let lowered = body.to_lowercase();
    if lowered == "hi" || lowered == "hello" {
      let buttons = [ReplyButton {
        id: messages::PLACE_ORDER_BUTTON_ID.to_string(),
        title: messages::PLACE_ORDER_BUTTON_TITLE.to_string(),
      }];
      self.send(
        self.notifier().send_buttons(from, messages::GREETING, &buttons).await,
        "greeting",
      );
      ChatDisposition::Greeted
    } else if lowered.contains("place order") {
      self.engine.store().get_or_create_cart(from);
      self.send(self.notifier().send_catalog(from).await, "catalog");
      self.send(
        self.notifier().send_text(from, messages::SELECT_ITEMS_HINT).await,
        "catalog hint",
      );
      ChatDisposition::CatalogSent
    } else {
      self.send(self.notifier().send_text(from, messages::FALLBACK).await, "fallback");
      ChatDisposition::Fallback
    }
  }

  fn send(&self, result: crate::errors::Result<()>, what: &str) {
    if let Err(e) = result {
      warn!(error = %e, message = what, "Outbound chat message failed.");
    }
  }

  #[instrument(name = "WebhookDispatcher::handle_payment", skip_all)]
  pub async fn handle_payment(&self, payload: &JsonValue) -> PaymentOutcome {
    let event = parse_payment_event(payload);
    if event.reference_id.is_none() {
      warn!(event_name = %event.event_name, "Payment callback carries no reference id.");
    }
    self.engine.on_payment_event(&event).await
  }
}
