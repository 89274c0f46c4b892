// server/src/models/session.rs

use crate::lifecycle::{LifecycleEvent, OrderState};
use crate::models::CustomerDetails;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Converts a major-unit price (rupees) to minor units (paise), rounding to the nearest unit.
pub fn to_minor_units(major: f64) -> i64 {
  (major * 100.0).round() as i64
}

/// Formats minor units as a major-unit string with two decimals.
pub fn format_major(minor: i64) -> String {
  format!("{:.2}", minor as f64 / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
  #[serde(rename = "COD")]
  Cod,
  Prepaid,
}

impl PaymentMode {
  /// Matches the form's free-text mode against the COD synonyms; anything else is prepaid.
  pub fn from_form(raw: &str) -> Self {
    match raw.trim().to_lowercase().as_str() {
      "cod" | "cash on delivery" | "cash-on-delivery" => PaymentMode::Cod,
      _ => PaymentMode::Prepaid,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      PaymentMode::Cod => "COD",
      PaymentMode::Prepaid => "Prepaid",
    }
  }

  /// Payment type understood by the carrier's rate calculator.
  pub fn carrier_rate_type(&self) -> &'static str {
    match self {
      PaymentMode::Cod => "COD",
      PaymentMode::Prepaid => "Pre-paid",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductItem {
  pub product_retailer_id: String,
  pub quantity: u32,
  /// Minor units.
  pub unit_price: i64,
}

impl ProductItem {
  pub fn line_total(&self) -> i64 {
    self.unit_price.saturating_mul(i64::from(self.quantity))
  }
}

pub fn cart_total(items: &[ProductItem]) -> i64 {
  items
    .iter()
    .fold(0i64, |total, item| total.saturating_add(item.line_total()))
}

/// Phone-scoped selection made before any delivery details exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartBucket {
  pub product_items: Vec<ProductItem>,
  pub amount: i64,
  pub catalog_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSession {
  pub order_id: String,
  pub phone: String,
  pub customer: CustomerDetails,
  pub product_items: Vec<ProductItem>,
  pub subtotal: i64,
  pub amount: i64,
  pub shipping_charge: i64,
  pub cod_charge: i64,
  pub payment_mode: PaymentMode,
  pub payment_status: PaymentStatus,
  pub cod_validated: bool,
  pub state: OrderState,
  pub carrier_response: Option<JsonValue>,
  pub created_at: DateTime<Utc>,
}

impl OrderSession {
  pub fn new(order_id: String, phone: String, customer: CustomerDetails, cart: &CartBucket) -> Self {
    let payment_mode = PaymentMode::from_form(&customer.payment_mode);
    Self {
      order_id,
      phone,
      customer,
      product_items: cart.product_items.clone(),
      subtotal: cart.amount,
      amount: cart.amount,
      shipping_charge: 0,
      cod_charge: 0,
      payment_mode,
      payment_status: PaymentStatus::Pending,
      cod_validated: true,
      state: OrderState::CartOpen,
      carrier_response: None,
      created_at: Utc::now(),
    }
  }

  /// Records the bookkeeping an accepted event implies besides the state change.
  pub(crate) fn absorb(&mut self, event: &LifecycleEvent, next: OrderState) {
    match event {
      LifecycleEvent::PaymentModeSelected(mode) => self.payment_mode = *mode,
      LifecycleEvent::PaymentSucceeded => self.payment_status = PaymentStatus::Paid,
      LifecycleEvent::PaymentFailed => self.payment_status = PaymentStatus::Failed,
      _ => {}
    }
    self.state = next;
  }

  /// What the customer is asked to pay for a prepaid order.
  pub fn payable_total(&self) -> i64 {
    self.subtotal.saturating_add(self.shipping_charge)
  }

  pub fn summary(&self) -> OrderSummary {
    OrderSummary {
      order_id: self.order_id.clone(),
      state: self.state,
      payment_mode: self.payment_mode,
      payment_status: self.payment_status,
      amount: self.amount,
      shipping_charge: self.shipping_charge,
      cod_validated: self.cod_validated,
      created_at: self.created_at,
    }
  }
}

/// Customer-free view of a session for the operator endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  pub order_id: String,
  pub state: OrderState,
  pub payment_mode: PaymentMode,
  pub payment_status: PaymentStatus,
  pub amount: i64,
  pub shipping_charge: i64,
  pub cod_validated: bool,
  pub created_at: DateTime<Utc>,
}
