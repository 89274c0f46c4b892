// server/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use orderline_server::config::AppConfig;
use orderline_server::errors::{AppError, Result as AppResult};
use orderline_server::services::{
  Collaborators, Ledger, LedgerRow, NotificationSink, OrderCard, QuoteOutcome, QuoteRequest, ReplyButton,
  ShipmentRecord, ShipmentResponse, ShippingGateway,
};
use orderline_server::state::AppState;
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

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

pub const SANDBOX_TOKEN: &str = "test_101";

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".into(),
    server_port: 0,
    verify_token: "verify-me".into(),
    access_token: "token".into(),
    phone_number_id: "1234".into(),
    graph_base_url: "http://localhost".into(),
    flow_id: Some("flow-1".into()),
    payment_configuration_name: Some("upi_test".into()),
    sandbox_flow_token: SANDBOX_TOKEN.into(),
    delhivery_token: "carrier".into(),
    delhivery_charges_token: None,
    delhivery_charges_url: "http://localhost/charges".into(),
    delhivery_create_url: "http://localhost/create".into(),
    origin_pin: "110042".into(),
    pickup_location_name: "Test Pickup".into(),
    http_timeout: Duration::from_secs(1),
    ledger_path: None,
    order_id_prefix: "OUO".into(),
    cod_surcharge: 15_000,
    reset_cart_after_promotion: false,
  }
}

// --- Fakes ---

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
  Text { to: String, body: String },
  Catalog { to: String },
  DetailsForm { to: String },
  Buttons { to: String, body: String, titles: Vec<String> },
  OrderDetails { to: String, card: OrderCard },
}

#[derive(Default)]
pub struct RecordingSink {
  pub sent: Mutex<Vec<Sent>>,
  pub fail_order_details: bool,
}

impl RecordingSink {
  pub fn all(&self) -> Vec<Sent> {
    self.sent.lock().clone()
  }

  pub fn texts_to(&self, phone: &str) -> Vec<String> {
    self
      .sent
      .lock()
      .iter()
      .filter_map(|s| match s {
        Sent::Text { to, body } if to == phone => Some(body.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn count_texts_containing(&self, needle: &str) -> usize {
    self
      .sent
      .lock()
      .iter()
      .filter(|s| matches!(s, Sent::Text { body, .. } if body.contains(needle)))
      .count()
  }

  pub fn order_cards(&self) -> Vec<OrderCard> {
    self
      .sent
      .lock()
      .iter()
      .filter_map(|s| match s {
        Sent::OrderDetails { card, .. } => Some(card.clone()),
        _ => None,
      })
      .collect()
  }
}

#[async_trait]
impl NotificationSink for RecordingSink {
  async fn send_text(&self, to: &str, body: &str) -> AppResult<()> {
    self.sent.lock().push(Sent::Text {
      to: to.into(),
      body: body.into(),
    });
    Ok(())
  }

  async fn send_catalog(&self, to: &str) -> AppResult<()> {
    self.sent.lock().push(Sent::Catalog { to: to.into() });
    Ok(())
  }

  async fn send_details_form(&self, to: &str) -> AppResult<()> {
    self.sent.lock().push(Sent::DetailsForm { to: to.into() });
    Ok(())
  }

  async fn send_buttons(&self, to: &str, body: &str, buttons: &[ReplyButton]) -> AppResult<()> {
    self.sent.lock().push(Sent::Buttons {
      to: to.into(),
      body: body.into(),
      titles: buttons.iter().map(|b| b.title.clone()).collect(),
    });
    Ok(())
  }

  async fn send_order_details(&self, to: &str, card: &OrderCard) -> AppResult<()> {
    if self.fail_order_details {
      return Err(AppError::Notification("order card rejected".into()));
    }
    self.sent.lock().push(Sent::OrderDetails {
      to: to.into(),
      card: card.clone(),
    });
    Ok(())
  }
}

pub struct FakeShipping {
  pub quote: Mutex<QuoteOutcome>,
  /// Body returned by shipment creation, or an error message.
  pub create: Mutex<Result<JsonValue, String>>,
  pub create_delay: Duration,
  pub quote_calls: AtomicUsize,
  pub create_calls: AtomicUsize,
  pub quote_requests: Mutex<Vec<QuoteRequest>>,
  pub shipments: Mutex<Vec<ShipmentRecord>>,
}

impl FakeShipping {
  pub fn new(quote: QuoteOutcome, create: Result<JsonValue, String>) -> Self {
    Self {
      quote: Mutex::new(quote),
      create: Mutex::new(create),
      create_delay: Duration::from_millis(0),
      quote_calls: AtomicUsize::new(0),
      create_calls: AtomicUsize::new(0),
      quote_requests: Mutex::new(Vec::new()),
      shipments: Mutex::new(Vec::new()),
    }
  }

  pub fn healthy(quote: i64) -> Self {
    Self::new(QuoteOutcome::Available(quote), Ok(json!({ "success": true, "packages": [] })))
  }

  pub fn quote_calls(&self) -> usize {
    self.quote_calls.load(Ordering::SeqCst)
  }

  pub fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ShippingGateway for FakeShipping {
  async fn quote(&self, request: &QuoteRequest) -> QuoteOutcome {
    self.quote_calls.fetch_add(1, Ordering::SeqCst);
    self.quote_requests.lock().push(request.clone());
    self.quote.lock().clone()
  }

  async fn create_shipment(&self, record: &ShipmentRecord) -> AppResult<ShipmentResponse> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    self.shipments.lock().push(record.clone());
    if !self.create_delay.is_zero() {
      tokio::time::sleep(self.create_delay).await;
    }
    let outcome = self.create.lock().clone();
    outcome
      .map(ShipmentResponse::from_body)
      .map_err(AppError::Shipping)
  }
}

#[derive(Default)]
pub struct MemoryLedger {
  pub rows: Mutex<Vec<LedgerRow>>,
  pub fail: bool,
}

impl MemoryLedger {
  pub fn rows(&self) -> Vec<LedgerRow> {
    self.rows.lock().clone()
  }
}

#[async_trait]
impl Ledger for MemoryLedger {
  async fn append(&self, row: &LedgerRow) -> AppResult<()> {
    if self.fail {
      return Err(AppError::Ledger("sheet unavailable".into()));
    }
    self.rows.lock().push(row.clone());
    Ok(())
  }
}

pub struct Harness {
  pub state: AppState,
  pub sink: Arc<RecordingSink>,
  pub shipping: Arc<FakeShipping>,
  pub ledger: Arc<MemoryLedger>,
}

impl Harness {
  pub fn build(config: AppConfig, sink: RecordingSink, shipping: FakeShipping, ledger: MemoryLedger) -> Self {
    setup_tracing();
    let sink = Arc::new(sink);
    let shipping = Arc::new(shipping);
    let ledger = Arc::new(ledger);
    let state = AppState::with_collaborators(
      &config,
      Collaborators {
        notifier: sink.clone(),
        shipping: shipping.clone(),
        ledger: ledger.clone(),
      },
    );
    Self {
      state,
      sink,
      shipping,
      ledger,
    }
  }

  pub fn with_shipping(shipping: FakeShipping) -> Self {
    Self::build(test_config(), RecordingSink::default(), shipping, MemoryLedger::default())
  }

  pub fn healthy() -> Self {
    Self::with_shipping(FakeShipping::healthy(5000))
  }
}

// --- Payload builders ---

pub fn delivery(message: JsonValue) -> JsonValue {
  json!({ "object": "whatsapp_business_account", "entry": [{ "changes": [{ "value": { "messages": [message] } }] }] })
}

pub fn text_message(from: &str, body: &str) -> JsonValue {
  delivery(json!({ "from": from, "type": "text", "text": { "body": body } }))
}

/// Catalog selection; `items` are `(retailer_id, quantity, price in rupees)`.
pub fn catalog_order(from: &str, items: &[(&str, u32, f64)]) -> JsonValue {
  let lines: Vec<JsonValue> = items
    .iter()
    .map(|(id, qty, price)| json!({ "product_retailer_id": id, "quantity": qty, "item_price": price, "currency": "INR" }))
    .collect();
  delivery(json!({
    "from": from,
    "type": "order",
    "order": { "catalog_id": "1262132998945503", "product_items": lines }
  }))
}

pub fn form_submission(from: &str, payment_mode: &str, flow_token: &str) -> JsonValue {
  let response = json!({
    "name": "Asha Rawat",
    "address1": "12 Mall Road",
    "address2": "Near Clock Tower",
    "pincode": "248001",
    "phone": "",
    "email": "asha@example.com",
    "payment_mode": payment_mode,
    "flow_token": flow_token
  });
  delivery(json!({
    "from": from,
    "type": "interactive",
    "interactive": { "type": "nfm_reply", "nfm_reply": { "response_json": response.to_string(), "name": "flow" } }
  }))
}

pub fn payment_event(event: &str, reference_id: Option<&str>, contact: Option<&str>) -> JsonValue {
  json!({
    "event": event,
    "payload": {
      "payment_link": { "entity": { "reference_id": reference_id.unwrap_or("") } },
      "payment": { "entity": { "contact": contact.unwrap_or("") } }
    }
  })
}

/// Two units of the 120g ghee at ₹345.50: subtotal 69,100 paise.
pub const GHEE_CART: &[(&str, u32, f64)] = &[("43mypu8dye", 2, 345.5)];
