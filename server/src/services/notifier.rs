// server/src/services/notifier.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::catalog::{self, CATALOG_ID};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, instrument};

const BRAND_FOOTER: &str = "OrangUtan Organics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
  pub id: String,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCardLine {
  pub retailer_id: String,
  pub name: String,
  /// Minor units per unit.
  pub unit_amount: i64,
  pub quantity: u32,
}

/// Payable order card. All amounts are minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCard {
  pub reference_id: String,
  pub items: Vec<OrderCardLine>,
  pub subtotal: i64,
  pub tax: i64,
  pub shipping: i64,
  pub total: i64,
  pub payment_configuration: String,
}

/// Outbound chat delivery, addressed by normalized phone.
#[async_trait]
pub trait NotificationSink: Send + Sync {
  async fn send_text(&self, to: &str, body: &str) -> AppResult<()>;
  async fn send_catalog(&self, to: &str) -> AppResult<()>;
  async fn send_details_form(&self, to: &str) -> AppResult<()>;
  async fn send_buttons(&self, to: &str, body: &str, buttons: &[ReplyButton]) -> AppResult<()>;
  async fn send_order_details(&self, to: &str, card: &OrderCard) -> AppResult<()>;
}

fn amount(value: i64) -> JsonValue {
  json!({ "value": value, "offset": 100 })
}

pub(crate) fn text_payload(to: &str, body: &str) -> JsonValue {
  json!({
    "messaging_product": "whatsapp",
    "to": to,
    "type": "text",
    "text": { "body": body }
  })
}

pub(crate) fn catalog_payload(to: &str) -> JsonValue {
  let product_items: Vec<JsonValue> = catalog::PRODUCTS
    .iter()
    .map(|p| json!({ "product_retailer_id": p.retailer_id }))
    .collect();
  json!({
    "messaging_product": "whatsapp",
    "to": to,
    "type": "interactive",
    "interactive": {
      "type": "product_list",
      "header": { "type": "text", "text": "Featured Products 🌟" },
      "body": { "text": "Browse our catalog and pick your favorites 🌱" },
      "footer": { "text": BRAND_FOOTER },
      "action": {
        "catalog_id": CATALOG_ID,
        "sections": [{ "title": "Our Products", "product_items": product_items }]
      }
    }
  })
}

pub(crate) fn details_form_payload(to: &str, flow_id: &str) -> JsonValue {
  json!({
    "messaging_product": "whatsapp",
    "to": to,
    "type": "interactive",
    "interactive": {
      "type": "flow",
      "header": { "type": "text", "text": "Fill Delivery Details" },
      "body": { "text": "Please tap below to provide your info securely." },
      "footer": { "text": BRAND_FOOTER },
      "action": {
        "name": "flow",
        "parameters": {
          "flow_id": flow_id,
          "flow_message_version": "3",
          "flow_cta": "Enter Details"
        }
      }
    }
  })
}

pub(crate) fn buttons_payload(to: &str, body: &str, buttons: &[ReplyButton]) -> JsonValue {
  let buttons: Vec<JsonValue> = buttons
    .iter()
    .map(|b| json!({ "type": "reply", "reply": { "id": b.id, "title": b.title } }))
    .collect();
  json!({
    "messaging_product": "whatsapp",
    "to": to,
    "type": "interactive",
    "interactive": {
      "type": "button",
      "body": { "text": body },
      "action": { "buttons": buttons }
    }
  })
}

pub(crate) fn order_details_payload(to: &str, card: &OrderCard) -> JsonValue {
  let items: Vec<JsonValue> = card
    .items
    .iter()
    .map(|line| {
      json!({
        "retailer_id": line.retailer_id,
        "name": line.name,
        "amount": amount(line.unit_amount),
        "quantity": line.quantity
      })
    })
    .collect();
  json!({
    "messaging_product": "whatsapp",
    "to": to,
    "type": "interactive",
    "interactive": {
      "type": "order_details",
      "header": { "type": "text", "text": format!("Order {}", card.reference_id) },
      "body": { "text": "Please review your order and complete the payment. NOTE: shipment cost is included" },
      "footer": { "text": BRAND_FOOTER },
      "action": {
        "name": "review_and_pay",
        "parameters": {
          "reference_id": card.reference_id,
          "type": "physical-goods",
          "currency": "INR",
          "total_amount": amount(card.total),
          "payment_type": "payment_gateway:razorpay",
          "payment_configuration": card.payment_configuration,
          "order": {
            "status": "pending",
            "items": items,
            "subtotal": amount(card.subtotal),
            "tax": amount(card.tax),
            "shipping": amount(card.shipping)
          }
        }
      }
    }
  })
}

/// WhatsApp Cloud API client.
pub struct WhatsAppCloudClient {
  client: Client,
  messages_url: String,
  access_token: String,
  flow_id: Option<String>,
}

impl WhatsAppCloudClient {
  pub fn new(
    messages_url: impl Into<String>,
    access_token: impl Into<String>,
    flow_id: Option<String>,
    timeout: Duration,
  ) -> AppResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build chat HTTP client: {}", e)))?;
    Ok(Self {
      client,
      messages_url: messages_url.into(),
      access_token: access_token.into(),
      flow_id,
    })
  }

  async fn post(&self, payload: JsonValue) -> AppResult<()> {
    let response = self
      .client
      .post(&self.messages_url)
      .bearer_auth(&self.access_token)
      .json(&payload)
      .send()
      .await
      .map_err(|e| AppError::Notification(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(AppError::Notification(format!("status {}: {}", status, body)));
    }
    debug!(%status, "Chat message accepted.");
    Ok(())
  }
}

#[async_trait]
impl NotificationSink for WhatsAppCloudClient {
  #[instrument(name = "WhatsAppCloudClient::send_text", skip(self, body))]
  async fn send_text(&self, to: &str, body: &str) -> AppResult<()> {
    self.post(text_payload(to, body)).await
  }

  #[instrument(name = "WhatsAppCloudClient::send_catalog", skip(self))]
  async fn send_catalog(&self, to: &str) -> AppResult<()> {
    self.post(catalog_payload(to)).await
  }

  #[instrument(name = "WhatsAppCloudClient::send_details_form", skip(self))]
  async fn send_details_form(&self, to: &str) -> AppResult<()> {
    let flow_id = self
      .flow_id
      .as_deref()
      .ok_or_else(|| AppError::Config("FLOW_ID is not configured".to_string()))?;
    self.post(details_form_payload(to, flow_id)).await
  }

  #[instrument(name = "WhatsAppCloudClient::send_buttons", skip(self, body, buttons))]
  async fn send_buttons(&self, to: &str, body: &str, buttons: &[ReplyButton]) -> AppResult<()> {
    self.post(buttons_payload(to, body, buttons)).await
  }

  #[instrument(name = "WhatsAppCloudClient::send_order_details", skip(self, card), fields(reference_id = %card.reference_id))]
  async fn send_order_details(&self, to: &str, card: &OrderCard) -> AppResult<()> {
    self.post(order_details_payload(to, card)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_details_carries_amounts_with_offset() {
    let card = OrderCard {
      reference_id: "OUO-12345".into(),
      items: vec![OrderCardLine {
        retailer_id: "43mypu8dye".into(),
        name: "Himalayan badri cow ghee 120gm".into(),
        unit_amount: 34550,
        quantity: 2,
      }],
      subtotal: 69100,
      tax: 0,
      shipping: 5000,
      total: 74100,
      payment_configuration: "upi_test".into(),
    };
    let payload = order_details_payload("919900", &card);
    let params = &payload["interactive"]["action"]["parameters"];
    assert_eq!(params["total_amount"], json!({"value": 74100, "offset": 100}));
    assert_eq!(params["reference_id"], "OUO-12345");
    assert_eq!(params["payment_configuration"], "upi_test");
    assert_eq!(params["order"]["shipping"]["value"], 5000);
    assert_eq!(params["order"]["items"][0]["quantity"], 2);
  }

  #[test]
  fn catalog_lists_every_product() {
    let payload = catalog_payload("919900");
    let items = payload["interactive"]["action"]["sections"][0]["product_items"]
      .as_array()
      .unwrap();
    assert_eq!(items.len(), catalog::PRODUCTS.len());
    assert_eq!(payload["interactive"]["action"]["catalog_id"], CATALOG_ID);
  }

  #[test]
  fn buttons_are_reply_buttons() {
    let payload = buttons_payload(
      "1",
      "hello",
      &[ReplyButton {
        id: "place_order".into(),
        title: "Place order".into(),
      }],
    );
    assert_eq!(payload["interactive"]["action"]["buttons"][0]["reply"]["title"], "Place order");
  }
}
