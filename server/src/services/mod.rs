// server/src/services/mod.rs

//! Outbound collaborators: chat delivery, carrier API and the audit ledger.

pub mod ledger;
pub mod notifier;
pub mod shipping;

use std::sync::Arc;

pub use ledger::{DisabledLedger, JsonLinesLedger, Ledger, LedgerRow};
pub use notifier::{NotificationSink, OrderCard, OrderCardLine, ReplyButton, WhatsAppCloudClient};
pub use shipping::{
  DelhiveryClient, PickupLocation, QuoteOutcome, QuoteRequest, ShipmentRecord, ShipmentResponse, ShippingGateway,
};

/// The collaborator set handed to every effect pipeline.
#[derive(Clone)]
pub struct Collaborators {
  pub notifier: Arc<dyn NotificationSink>,
  pub shipping: Arc<dyn ShippingGateway>,
  pub ledger: Arc<dyn Ledger>,
}
