// server/src/dispatch/payment.rs

//! Payment-provider callback parsing.

use crate::engine::{PaymentEvent, PaymentSignal};
use serde_json::Value as JsonValue;

fn text_at(payload: &JsonValue, pointer: &str) -> Option<String> {
  match payload.pointer(pointer)? {
    JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    JsonValue::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Reference id: payment link, then payment, then the payment's `notes.orderId`.
/// Contact: the payment's contact, then the payment link's customer contact.
pub fn parse_payment_event(payload: &JsonValue) -> PaymentEvent {
  let event_name = payload
    .get("event")
    .and_then(JsonValue::as_str)
    .unwrap_or_default()
    .to_string();

  let reference_id = [
    "/payload/payment_link/entity/reference_id",
    "/payload/payment/entity/reference_id",
    "/payload/payment/entity/notes/orderId",
  ]
  .iter()
  .find_map(|p| text_at(payload, p));

  let contact = [
    "/payload/payment/entity/contact",
    "/payload/payment_link/entity/customer/contact",
  ]
  .iter()
  .find_map(|p| text_at(payload, p));

  PaymentEvent {
    signal: PaymentSignal::from_event_name(&event_name),
    event_name,
    reference_id,
    contact,
  }
}
