// server/src/web/handlers/webhook_handlers.rs

//! Chat and payment webhooks. Every delivery is processed to completion and then
//! acknowledged with 200, whatever happened downstream.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::engine::PaymentOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
  #[serde(rename = "hub.mode")]
  pub mode: Option<String>,
  #[serde(rename = "hub.verify_token")]
  pub verify_token: Option<String>,
  #[serde(rename = "hub.challenge")]
  pub challenge: Option<String>,
}

#[instrument(name = "handler::verify", skip_all)]
pub async fn verify_handler(app_state: web::Data<AppState>, query: web::Query<VerifyQuery>) -> HttpResponse {
  let query = query.into_inner();
  let token_matches = query.verify_token.as_deref() == Some(&*app_state.verify_token);
  if query.mode.as_deref() == Some("subscribe") && token_matches {
    info!("Webhook verified.");
    return HttpResponse::Ok()
      .content_type("text/plain")
      .body(query.challenge.unwrap_or_default());
  }
  warn!(mode = ?query.mode, "Webhook verification rejected.");
  HttpResponse::Forbidden().finish()
}

fn parse_body(body: &web::Bytes) -> Option<JsonValue> {
  match serde_json::from_slice::<JsonValue>(body) {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(error = %e, size = body.len(), "Webhook body is not valid JSON, acknowledging.");
      None
    }
  }
}

#[instrument(name = "handler::chat_webhook", skip_all, fields(delivery_id = %Uuid::new_v4()))]
pub async fn chat_webhook_handler(app_state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
  if let Some(payload) = parse_body(&body) {
    let disposition = app_state.dispatcher.handle_chat(&payload).await;
    info!(?disposition, "Chat delivery handled.");
  }
  HttpResponse::Ok().finish()
}

#[instrument(name = "handler::payment_webhook", skip_all, fields(delivery_id = %Uuid::new_v4()))]
pub async fn payment_webhook_handler(app_state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
  if let Some(payload) = parse_body(&body) {
    match app_state.dispatcher.handle_payment(&payload).await {
      PaymentOutcome::Unresolved => info!("Payment callback acknowledged without a session."),
      PaymentOutcome::Ignored { order_id } => info!(%order_id, "Payment callback acknowledged, no lifecycle signal."),
      PaymentOutcome::Applied { order_id, transitions } => {
        info!(%order_id, transitions = transitions.len(), "Payment callback applied.")
      }
    }
  }
  HttpResponse::Ok().finish()
}
