// server/src/services/shipping.rs

//! Carrier integration: shipping quotes and shipment creation.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{to_minor_units, PaymentMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
  pub origin_pin: String,
  pub destination_pin: String,
  pub weight_grams: u64,
  pub payment_mode: PaymentMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
  /// Shipping charge in minor units.
  Available(i64),
  Unavailable(String),
}

/// Shipment description in the carrier's field naming.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ShipmentRecord {
  pub name: String,
  pub add: String,
  pub pin: String,
  pub city: String,
  pub state: String,
  pub country: String,
  pub phone: String,
  pub order: String,
  pub payment_mode: String,
  pub products_desc: String,
  pub hsn_code: String,
  pub cod_amount: String,
  pub total_amount: String,
  pub seller_add: String,
  pub seller_name: String,
  pub seller_inv: String,
  pub quantity: String,
  pub waybill: String,
  pub shipment_width: String,
  pub shipment_height: String,
  pub weight: String,
  pub shipping_mode: String,
  pub address_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PickupLocation {
  pub name: String,
  pub add: String,
  pub city: String,
  pub pin: String,
  pub phone: String,
}

impl PickupLocation {
  pub fn named(name: impl Into<String>, pin: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      add: String::new(),
      city: String::new(),
      pin: pin.into(),
      phone: String::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentResponse {
  /// The carrier's `success` flag, when the body carries one.
  pub success: Option<bool>,
  pub raw: JsonValue,
}

impl ShipmentResponse {
  pub fn from_body(raw: JsonValue) -> Self {
    Self {
      success: raw.get("success").and_then(JsonValue::as_bool),
      raw,
    }
  }
}

#[async_trait]
pub trait ShippingGateway: Send + Sync {
  /// Never fails: every provider problem becomes `QuoteOutcome::Unavailable`.
  async fn quote(&self, request: &QuoteRequest) -> QuoteOutcome;

  async fn create_shipment(&self, record: &ShipmentRecord) -> AppResult<ShipmentResponse>;
}

/// Extracts `total_amount` (major units) from the rate calculator's response,
/// either the first element of an array or the object itself.
pub fn parse_quote(body: &JsonValue) -> Option<i64> {
  let candidate = match body {
    JsonValue::Array(entries) => entries.first()?.get("total_amount")?,
    JsonValue::Object(_) => body.get("total_amount")?,
    _ => return None,
  };
  let major = match candidate {
    JsonValue::Number(n) => n.as_f64()?,
    JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
    _ => return None,
  };
  if !major.is_finite() || major <= 0.0 {
    return None;
  }
  Some(to_minor_units(major))
}

pub struct DelhiveryClient {
  client: Client,
  charges_url: String,
  create_url: String,
  token: String,
  charges_token: Option<String>,
  pickup: PickupLocation,
}

impl DelhiveryClient {
  pub fn new(
    charges_url: impl Into<String>,
    create_url: impl Into<String>,
    token: impl Into<String>,
    charges_token: Option<String>,
    pickup: PickupLocation,
    timeout: Duration,
  ) -> AppResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build carrier HTTP client: {}", e)))?;
    Ok(Self {
      client,
      charges_url: charges_url.into(),
      create_url: create_url.into(),
      token: token.into(),
      charges_token,
      pickup,
    })
  }

  fn charges_auth(&self) -> String {
    format!("Token {}", self.charges_token.as_deref().unwrap_or(&self.token))
  }
}

#[async_trait]
impl ShippingGateway for DelhiveryClient {
  #[instrument(name = "DelhiveryClient::quote", skip(self), fields(d_pin = %request.destination_pin, cgm = request.weight_grams))]
  async fn quote(&self, request: &QuoteRequest) -> QuoteOutcome {
    let weight = request.weight_grams.to_string();
    let response = self
      .client
      .get(&self.charges_url)
      .header("Authorization", self.charges_auth())
      .query(&[
        ("md", "S"),
        ("ss", "Delivered"),
        ("d_pin", request.destination_pin.as_str()),
        ("o_pin", request.origin_pin.as_str()),
        ("cgm", weight.as_str()),
        ("pt", request.payment_mode.carrier_rate_type()),
      ])
      .send()
      .await;

    let response = match response {
      Ok(r) => r,
      Err(e) => {
        warn!(error = %e, "Shipping quote request failed.");
        return QuoteOutcome::Unavailable(format!("transport error: {}", e));
      }
    };
    if !response.status().is_success() {
      let status = response.status();
      warn!(%status, "Shipping quote returned non-success status.");
      return QuoteOutcome::Unavailable(format!("status {}", status));
    }
    let body: JsonValue = match response.json().await {
      Ok(body) => body,
      Err(e) => {
        warn!(error = %e, "Shipping quote body is not JSON.");
        return QuoteOutcome::Unavailable(format!("unreadable body: {}", e));
      }
    };
    match parse_quote(&body) {
      Some(charge) => {
        info!(charge, "Shipping quote received.");
        QuoteOutcome::Available(charge)
      }
      None => {
        warn!(response = %body, "Could not parse shipping charge from quote response.");
        QuoteOutcome::Unavailable("total_amount missing".to_string())
      }
    }
  }

  #[instrument(name = "DelhiveryClient::create_shipment", skip(self, record), fields(order = %record.order))]
  async fn create_shipment(&self, record: &ShipmentRecord) -> AppResult<ShipmentResponse> {
    let payload = json!({ "shipments": [record], "pickup_location": &self.pickup });
    let data = payload.to_string();

    let response = self
      .client
      .post(&self.create_url)
      .header("Accept", "application/json")
      .header("Authorization", format!("Token {}", self.token))
      .form(&[("format", "json"), ("data", data.as_str())])
      .send()
      .await
      .map_err(|e| AppError::Shipping(format!("shipment create request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(AppError::Shipping(format!("shipment create returned {}: {}", status, body)));
    }
    let body: JsonValue = response
      .json()
      .await
      .map_err(|e| AppError::Shipping(format!("shipment create body is not JSON: {}", e)))?;
    let parsed = ShipmentResponse::from_body(body);
    info!(success = ?parsed.success, "Shipment create responded.");
    Ok(parsed)
  }
}
