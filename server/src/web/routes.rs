// server/src/web/routes.rs

use crate::web::handlers::{order_handlers, webhook_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(webhook_handlers::verify_handler))
    .route("/", web::post().to(webhook_handlers::chat_webhook_handler))
    .route("/payments-webhook", web::post().to(webhook_handlers::payment_webhook_handler))
    .route("/health", web::get().to(health_check_handler))
    .route("/orders/{order_id}", web::get().to(order_handlers::get_order_handler));
}
