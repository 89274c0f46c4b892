// server/src/state.rs

use crate::config::AppConfig;
use crate::dispatch::WebhookDispatcher;
use crate::engine::OrderEngine;
use crate::errors::Result as AppResult;
use crate::services::{
  Collaborators, DelhiveryClient, DisabledLedger, JsonLinesLedger, Ledger, PickupLocation, WhatsAppCloudClient,
};
use crate::store::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub dispatcher: Arc<WebhookDispatcher>,
  pub verify_token: Arc<str>,
}

impl AppState {
  /// Wires the store, engine and dispatcher around an existing collaborator set.
  pub fn with_collaborators(config: &AppConfig, services: Collaborators) -> Self {
    let store = Arc::new(SessionStore::new(
      config.order_id_prefix.clone(),
      config.reset_cart_after_promotion,
    ));
    let engine = Arc::new(OrderEngine::new(store, services, config.order_settings()));
    Self {
      dispatcher: Arc::new(WebhookDispatcher::new(engine, config.sandbox_flow_token.clone())),
      verify_token: Arc::from(config.verify_token.as_str()),
    }
  }

  /// Builds the production collaborators (chat Cloud API, carrier, ledger) from config.
  pub fn from_config(config: &AppConfig) -> AppResult<Self> {
    let notifier = WhatsAppCloudClient::new(
      config.messages_url(),
      config.access_token.clone(),
      config.flow_id.clone(),
      config.http_timeout,
    )?;
    let shipping = DelhiveryClient::new(
      config.delhivery_charges_url.clone(),
      config.delhivery_create_url.clone(),
      config.delhivery_token.clone(),
      config.delhivery_charges_token.clone(),
      PickupLocation::named(config.pickup_location_name.clone(), config.origin_pin.clone()),
      config.http_timeout,
    )?;
    let ledger: Arc<dyn Ledger> = match &config.ledger_path {
      Some(path) => {
        tracing::info!(path = %path, "Ledger rows will be appended to file.");
        Arc::new(JsonLinesLedger::new(path.clone()))
      }
      None => {
        tracing::warn!("LEDGER_PATH not set, ledger rows are only logged.");
        Arc::new(DisabledLedger)
      }
    };
    Ok(Self::with_collaborators(
      config,
      Collaborators {
        notifier: Arc::new(notifier),
        shipping: Arc::new(shipping),
        ledger,
      },
    ))
  }
}
