// server/src/main.rs

use orderline_server::config::AppConfig;
use orderline_server::state::AppState;
use orderline_server::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting order webhook server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  if app_config.payment_configuration_name.is_none() {
    tracing::warn!(
      "PAYMENT_CONFIGURATION_NAME not set. Prepaid orders cannot be sent a payable order card until it is configured."
    );
  }
  if app_config.flow_id.is_none() {
    tracing::warn!("FLOW_ID not set. Customers cannot be sent the delivery details form.");
  }

  let app_state = match AppState::from_config(&app_config) {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise collaborators.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
