// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_CHARGES_URL: &str = "https://track.delhivery.com/api/kinko/v1/invoice/charges/.json";
pub const DEFAULT_CREATE_URL: &str = "https://track.delhivery.com/api/cmu/create.json";
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com/v20.0";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  // Chat platform
  pub verify_token: String,
  pub access_token: String,
  pub phone_number_id: String,
  pub graph_base_url: String,
  pub flow_id: Option<String>,
  pub payment_configuration_name: Option<String>,
  pub sandbox_flow_token: String,

  // Carrier
  pub delhivery_token: String,
  pub delhivery_charges_token: Option<String>,
  pub delhivery_charges_url: String,
  pub delhivery_create_url: String,
  pub origin_pin: String,
  pub pickup_location_name: String,

  pub http_timeout: Duration,
  pub ledger_path: Option<String>,

  pub order_id_prefix: String,
  pub cod_surcharge: i64,
  pub reset_cart_after_promotion: bool,
}

/// The subset of configuration the lifecycle effects read.
#[derive(Debug, Clone)]
pub struct OrderSettings {
  pub origin_pin: String,
  pub cod_surcharge: i64,
  pub payment_configuration_name: Option<String>,
}

impl Default for OrderSettings {
  fn default() -> Self {
    Self {
      origin_pin: "110042".to_string(),
      cod_surcharge: 15_000,
      payment_configuration_name: None,
    }
  }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: String) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let optional = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let server_port = parse_var("PORT", get_env("PORT").unwrap_or_else(|_| "3000".to_string()))?;

    let verify_token = get_env("VERIFY_TOKEN")?;
    let access_token = get_env("ACCESS_TOKEN")?;
    let phone_number_id = get_env("PHONE_NUMBER_ID")?;
    let graph_base_url = get_env("GRAPH_BASE_URL").unwrap_or_else(|_| DEFAULT_GRAPH_BASE.to_string());
    let flow_id = optional("FLOW_ID");
    let payment_configuration_name = optional("PAYMENT_CONFIGURATION_NAME");
    let sandbox_flow_token = get_env("SANDBOX_FLOW_TOKEN").unwrap_or_else(|_| "test_101".to_string());

    let delhivery_token = get_env("DELHIVERY_TOKEN")?;
    let delhivery_charges_token = optional("DELHIVERY_CHARGES_TOKEN");
    let delhivery_charges_url = get_env("DELHIVERY_CHARGES_URL").unwrap_or_else(|_| DEFAULT_CHARGES_URL.to_string());
    let delhivery_create_url = get_env("DELHIVERY_CREATE_URL").unwrap_or_else(|_| DEFAULT_CREATE_URL.to_string());
    let origin_pin = get_env("DELHIVERY_ORIGIN_PIN").unwrap_or_else(|_| "110042".to_string());
    let pickup_location_name =
      get_env("DELHIVERY_PICKUP_NAME").unwrap_or_else(|_| "Delhivery Uttarkashi".to_string());

    let timeout_secs: u64 = parse_var(
      "HTTP_TIMEOUT_SECS",
      get_env("HTTP_TIMEOUT_SECS").unwrap_or_else(|_| "15".to_string()),
    )?;
    let ledger_path = optional("LEDGER_PATH");

    let order_id_prefix = get_env("ORDER_ID_PREFIX").unwrap_or_else(|_| "OUO".to_string());
    let cod_surcharge = parse_var("COD_SURCHARGE", get_env("COD_SURCHARGE").unwrap_or_else(|_| "15000".to_string()))?;
    let reset_cart_after_promotion = parse_var(
      "RESET_CART_AFTER_PROMOTION",
      get_env("RESET_CART_AFTER_PROMOTION").unwrap_or_else(|_| "false".to_string()),
    )?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      verify_token,
      access_token,
      phone_number_id,
      graph_base_url,
      flow_id,
      payment_configuration_name,
      sandbox_flow_token,
      delhivery_token,
      delhivery_charges_token,
      delhivery_charges_url,
      delhivery_create_url,
      origin_pin,
      pickup_location_name,
      http_timeout: Duration::from_secs(timeout_secs),
      ledger_path,
      order_id_prefix,
      cod_surcharge,
      reset_cart_after_promotion,
    })
  }

  pub fn messages_url(&self) -> String {
    format!("{}/{}/messages", self.graph_base_url.trim_end_matches('/'), self.phone_number_id)
  }

  pub fn order_settings(&self) -> OrderSettings {
    OrderSettings {
      origin_pin: self.origin_pin.clone(),
      cod_surcharge: self.cod_surcharge,
      payment_configuration_name: self.payment_configuration_name.clone(),
    }
  }
}
