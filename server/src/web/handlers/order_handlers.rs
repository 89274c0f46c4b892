// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;

/// Lifecycle summary of one order, without customer details.
#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(app_state: web::Data<AppState>, order_id: web::Path<String>) -> AppResult<HttpResponse> {
  let order_id = order_id.into_inner();
  let session = app_state
    .dispatcher
    .engine()
    .store()
    .get(&order_id)
    .ok_or_else(|| AppError::NotFound(format!("Order '{}' not found", order_id)))?;
  Ok(HttpResponse::Ok().json(session.summary()))
}
