// server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use orderline_pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Shipping Provider Error: {0}")]
  Shipping(String),

  #[error("Notification Delivery Error: {0}")]
  Notification(String),

  #[error("Ledger Error: {0}")]
  Ledger(String),

  #[error("Pipeline Error: {source}")]
  Pipeline {
    #[from]
    source: PipelineError,
  },
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Shipping(m) => HttpResponse::BadGateway().json(json!({"error": "Shipping provider error", "detail": m})),
      AppError::Notification(m) => {
        HttpResponse::BadGateway().json(json!({"error": "Notification delivery error", "detail": m}))
      }
      AppError::Ledger(m) => HttpResponse::InternalServerError().json(json!({"error": "Ledger error", "detail": m})),
      AppError::Pipeline { source } => {
        tracing::error!(pipeline_error_source = ?source, "Pipeline error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Order processing error", "detail": source.to_string()}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
