// server/src/pipelines/effects.rs

//! Builds a best-effort pipeline from the effect list of one transition.
//!
//! Every effect becomes its own step, so a failing carrier call or ledger append
//! is logged and recorded in the run report while the remaining steps still run.

use crate::config::OrderSettings;
use crate::errors::AppError;
use crate::lifecycle::{Effect, LedgerKind, LifecycleEvent, Notice};
use crate::messages;
use crate::models::catalog;
use crate::models::{format_major, OrderSession, PaymentMode};
use crate::pipelines::contexts::EffectCtxData;
use crate::services::{LedgerRow, OrderCard, OrderCardLine, QuoteOutcome, QuoteRequest, ShipmentRecord};
use chrono::Utc;
use orderline_pipeline::{ContextData, Pipeline, PipelineControl};
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};

pub type EffectPipeline = Pipeline<EffectCtxData, AppError>;

pub fn build_effect_pipeline(effects: &[Effect]) -> EffectPipeline {
  let mut pipeline = EffectPipeline::new(&[]);
  for effect in effects {
    let step = effect.step_name();
    match *effect {
      Effect::QuoteShipping => add_quote_shipping(&mut pipeline, &step),
      Effect::ApplyCodCharges => add_apply_cod_charges(&mut pipeline, &step),
      Effect::CreateShipment => add_create_shipment(&mut pipeline, &step),
      Effect::SendPaymentRequest => add_send_payment_request(&mut pipeline, &step),
      Effect::AppendLedger(kind) => add_append_ledger(&mut pipeline, &step, kind),
      Effect::Notify(notice) => add_notify(&mut pipeline, &step, notice),
    }
  }
  pipeline
}

fn rupees(minor: i64) -> String {
  ((minor as f64) / 100.0).round().to_string()
}

pub fn quote_request(session: &OrderSession, settings: &OrderSettings) -> QuoteRequest {
  QuoteRequest {
    origin_pin: settings.origin_pin.clone(),
    destination_pin: session.customer.pincode.clone(),
    weight_grams: catalog::total_weight_grams(&session.product_items),
    payment_mode: session.payment_mode,
  }
}

pub fn shipment_record(session: &OrderSession, settings: &OrderSettings) -> ShipmentRecord {
  let customer = &session.customer;
  let (suffix, cod_amount) = match session.payment_mode {
    PaymentMode::Cod => (
      format!("+ COD charge {} + shipping charge", rupees(settings.cod_surcharge)),
      rupees(session.amount),
    ),
    PaymentMode::Prepaid => ("+ shipping charge".to_string(), "0".to_string()),
  };
  ShipmentRecord {
    name: customer.display_name().to_string(),
    add: customer.address_line(),
    pin: customer.pincode.clone(),
    city: customer.city.clone(),
    state: customer.state.clone(),
    country: "India".to_string(),
    phone: customer.contact_phone(&session.phone).to_string(),
    order: format!("Order_{}", session.order_id),
    payment_mode: session.payment_mode.label().to_string(),
    products_desc: catalog::products_description(&session.product_items, &suffix),
    cod_amount,
    total_amount: rupees(session.amount),
    shipment_width: "100".to_string(),
    shipment_height: "100".to_string(),
    weight: catalog::total_weight_grams(&session.product_items).to_string(),
    shipping_mode: "Surface".to_string(),
    ..Default::default()
  }
}

/// The payable card for a prepaid order: total = subtotal + shipping.
pub fn order_card(session: &OrderSession, payment_configuration: &str) -> OrderCard {
  let fallback_unit = session.subtotal / (session.product_items.len().max(1) as i64);
  let items = session
    .product_items
    .iter()
    .map(|item| OrderCardLine {
      retailer_id: item.product_retailer_id.clone(),
      name: catalog::product_name(&item.product_retailer_id).to_string(),
      unit_amount: if item.unit_price > 0 { item.unit_price } else { fallback_unit },
      quantity: item.quantity,
    })
    .collect();
  OrderCard {
    reference_id: session.order_id.clone(),
    items,
    subtotal: session.subtotal,
    tax: 0,
    shipping: session.shipping_charge,
    total: session.payable_total(),
    payment_configuration: payment_configuration.to_string(),
  }
}

pub fn ledger_row(session: &OrderSession, kind: LedgerKind, settings: &OrderSettings) -> LedgerRow {
  let customer = &session.customer;
  let (cod_charge, carrier_response, payment_reference) = match kind {
    LedgerKind::AwaitingPayment => (
      String::new(),
      JsonValue::Null,
      format!(
        "whatsapp_payment_config:{}",
        settings.payment_configuration_name.as_deref().unwrap_or_default()
      ),
    ),
    LedgerKind::CodPlaced => (
      format_major(session.cod_charge),
      session.carrier_response.clone().unwrap_or_else(|| json!({})),
      String::new(),
    ),
    LedgerKind::Paid => (
      format_major(0),
      session.carrier_response.clone().unwrap_or_else(|| json!({})),
      String::new(),
    ),
  };
  LedgerRow {
    timestamp: Utc::now().to_rfc3339(),
    name: customer.name.clone(),
    phone: customer.contact_phone(&session.phone).to_string(),
    email: customer.email.clone(),
    address: customer.address_line(),
    pincode: customer.pincode.clone(),
    items: json!(session.product_items),
    payment_mode: session.payment_mode.label().to_string(),
    payment_status: kind.status_label().to_string(),
    amount: format_major(session.amount),
    shipping_charge: format_major(session.shipping_charge),
    cod_charge,
    carrier_response,
    order_id: session.order_id.clone(),
    payment_reference,
  }
}

fn add_quote_shipping(pipeline: &mut EffectPipeline, step: &str) {
  pipeline.then_best_effort(step, |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let (request, shipping, session) = {
        let guard = ctx.read();
        let request = quote_request(&guard.session.read(), &guard.settings);
        (request, guard.services.shipping.clone(), guard.session.clone())
      };

      let outcome = shipping.quote(&request).await;
      session.update(|s| match outcome {
        QuoteOutcome::Available(charge) => s.shipping_charge = charge,
        QuoteOutcome::Unavailable(reason) => {
          warn!(order_id = %s.order_id, %reason, "Shipping quote unavailable, charging 0.");
          s.shipping_charge = 0;
          if s.payment_mode == PaymentMode::Cod {
            s.cod_validated = false;
          }
        }
      });
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
}

fn add_apply_cod_charges(pipeline: &mut EffectPipeline, step: &str) {
  pipeline.then_best_effort(step, |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      let surcharge = guard.settings.cod_surcharge;
      guard.session.update(|s| {
        s.cod_charge = surcharge;
        s.amount = s.amount.saturating_add(surcharge).saturating_add(s.shipping_charge);
        info!(order_id = %s.order_id, amount = s.amount, "COD surcharge and shipping added.");
      });
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
}

fn add_create_shipment(pipeline: &mut EffectPipeline, step: &str) {
  pipeline.then_best_effort(step, |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let (record, mode, cod_validated, shipping, session) = {
        let guard = ctx.read();
        let s = guard.session.read();
        (
          shipment_record(&s, &guard.settings),
          s.payment_mode,
          s.cod_validated,
          guard.services.shipping.clone(),
          guard.session.clone(),
        )
      };

      let result = shipping.create_shipment(&record).await;
      let follow_up = match mode {
        PaymentMode::Cod => LifecycleEvent::CodShipmentResolved {
          accepted: cod_validated && matches!(&result, Ok(r) if r.success == Some(true)),
        },
        PaymentMode::Prepaid => LifecycleEvent::ShipmentRecorded {
          created: matches!(&result, Ok(r) if r.success != Some(false)),
        },
      };
      if let Ok(response) = &result {
        session.update(|s| s.carrier_response = Some(response.raw.clone()));
      }
      ctx.write().follow_up = Some(follow_up);
      result.map(|_| PipelineControl::Continue)
    })
  });
}

fn add_send_payment_request(pipeline: &mut EffectPipeline, step: &str) {
  pipeline.then_best_effort(step, |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let (phone, card, notifier) = {
        let guard = ctx.read();
        let s = guard.session.read();
        let card = guard
          .settings
          .payment_configuration_name
          .as_deref()
          .map(|name| order_card(&s, name));
        (s.phone.clone(), card, guard.services.notifier.clone())
      };

      let sent = match card {
        Some(card) => notifier
          .send_order_details(&phone, &card)
          .await
          .map(|_| card.reference_id),
        None => {
          error!("PAYMENT_CONFIGURATION_NAME is not configured; cannot send the payable order card.");
          Err(AppError::Config("PAYMENT_CONFIGURATION_NAME is not configured".to_string()))
        }
      };

      match sent {
        Ok(order_id) => {
          notifier.send_text(&phone, &messages::review_and_pay_hint(&order_id)).await?;
          Ok::<_, AppError>(PipelineControl::Continue)
        }
        Err(e) => {
          ctx.write().payment_request_failed = true;
          if let Err(notify_err) = notifier.send_text(&phone, messages::PAYMENT_NOT_INITIATED).await {
            warn!(error = %notify_err, "Could not tell the customer that payment was not initiated.");
          }
          Err(e)
        }
      }
    })
  });
}

fn add_append_ledger(pipeline: &mut EffectPipeline, step: &str, kind: LedgerKind) {
  pipeline.then_best_effort(step, move |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let (row, ledger) = {
        let guard = ctx.read();
        if kind == LedgerKind::AwaitingPayment && guard.payment_request_failed {
          info!("Payment card was not sent, skipping awaiting-payment ledger row.");
          return Ok(PipelineControl::Continue);
        }
        let row = ledger_row(&guard.session.read(), kind, &guard.settings);
        (row, guard.services.ledger.clone())
      };
      ledger.append(&row).await?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
}

fn add_notify(pipeline: &mut EffectPipeline, step: &str, notice: Notice) {
  pipeline.then_best_effort(step, move |ctx: ContextData<EffectCtxData>| {
    Box::pin(async move {
      let (phone, text, notifier) = {
        let guard = ctx.read();
        let s = guard.session.read();
        (s.phone.clone(), messages::notice_text(notice, &s), guard.services.notifier.clone())
      };
      notifier.send_text(&phone, &text).await?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
}
