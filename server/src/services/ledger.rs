// server/src/services/ledger.rs

use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// One audit row. Money columns are major units with two decimals; columns that
/// are unknown at the time of writing stay empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerRow {
  pub timestamp: String,
  pub name: String,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub pincode: String,
  pub items: JsonValue,
  pub payment_mode: String,
  pub payment_status: String,
  pub amount: String,
  pub shipping_charge: String,
  pub cod_charge: String,
  pub carrier_response: JsonValue,
  pub order_id: String,
  pub payment_reference: String,
}

#[async_trait]
pub trait Ledger: Send + Sync {
  async fn append(&self, row: &LedgerRow) -> AppResult<()>;
}

/// Appends rows as JSON lines to a local file.
pub struct JsonLinesLedger {
  path: PathBuf,
  write_lock: Mutex<()>,
}

impl JsonLinesLedger {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: Mutex::new(()),
    }
  }
}

#[async_trait]
impl Ledger for JsonLinesLedger {
  #[instrument(name = "JsonLinesLedger::append", skip(self, row), fields(order_id = %row.order_id, status = %row.payment_status))]
  async fn append(&self, row: &LedgerRow) -> AppResult<()> {
    let mut line = serde_json::to_string(row).map_err(|e| AppError::Ledger(e.to_string()))?;
    line.push('\n');

    let _guard = self.write_lock.lock().await;
    let mut file = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .await
      .map_err(|e| AppError::Ledger(format!("open {}: {}", self.path.display(), e)))?;
    file
      .write_all(line.as_bytes())
      .await
      .map_err(|e| AppError::Ledger(format!("write {}: {}", self.path.display(), e)))?;
    file.flush().await.map_err(|e| AppError::Ledger(e.to_string()))?;
    Ok(())
  }
}

/// Used when no ledger is configured; rows are only logged.
pub struct DisabledLedger;

#[async_trait]
impl Ledger for DisabledLedger {
  async fn append(&self, row: &LedgerRow) -> AppResult<()> {
    info!(order_id = %row.order_id, status = %row.payment_status, amount = %row.amount, "Ledger disabled, row not persisted.");
    Ok(())
  }
}
