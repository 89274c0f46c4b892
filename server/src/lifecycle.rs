// server/src/lifecycle.rs

//! Order lifecycle as a pure transition function.
//!
//! ```text
//! CartOpen ─DetailsSubmitted─► DetailsCaptured ─┬─ModeSelected(COD)────► CodPendingConfirmation ─┬─accepted──► ShipmentCreated
//!                                               │                                                  └─rejected──► Abandoned
//!                                               └─ModeSelected(Prepaid)─► AwaitingPayment ─┬─PaymentSucceeded─► Paid ─ShipmentRecorded(true)─► ShipmentCreated
//!                                                                                          └─PaymentFailed────► Failed
//! ```
//!
//! Any pair not listed is a no-op: the state is unchanged and no effects are
//! produced. That is what makes a repeated payment callback harmless.

use crate::models::PaymentMode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderState {
  CartOpen,
  DetailsCaptured,
  CodPendingConfirmation,
  AwaitingPayment,
  Paid,
  Failed,
  ShipmentCreated,
  Abandoned,
}

impl OrderState {
  /// No event moves a session out of these states.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Failed | Self::ShipmentCreated | Self::Abandoned)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
  DetailsSubmitted,
  PaymentModeSelected(PaymentMode),
  CodShipmentResolved { accepted: bool },
  PaymentSucceeded,
  PaymentFailed,
  ShipmentRecorded { created: bool },
}

/// Customer-facing messages an effect can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
  DetailsReceived,
  CodPlaced,
  InvalidDetails,
  PaymentConfirmed,
  PaymentFailed,
  ShipmentCreated,
  ShipmentPending,
}

impl Notice {
  pub fn key(&self) -> &'static str {
    match self {
      Notice::DetailsReceived => "details_received",
      Notice::CodPlaced => "cod_placed",
      Notice::InvalidDetails => "invalid_details",
      Notice::PaymentConfirmed => "payment_confirmed",
      Notice::PaymentFailed => "payment_failed",
      Notice::ShipmentCreated => "shipment_created",
      Notice::ShipmentPending => "shipment_pending",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
  AwaitingPayment,
  CodPlaced,
  Paid,
}

impl LedgerKind {
  pub fn key(&self) -> &'static str {
    match self {
      LedgerKind::AwaitingPayment => "awaiting_payment",
      LedgerKind::CodPlaced => "cod_placed",
      LedgerKind::Paid => "paid",
    }
  }

  /// Payment status label written to the ledger row.
  pub fn status_label(&self) -> &'static str {
    match self {
      LedgerKind::AwaitingPayment => "Awaiting Payment",
      LedgerKind::CodPlaced => "Pending",
      LedgerKind::Paid => "Paid",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
  QuoteShipping,
  ApplyCodCharges,
  CreateShipment,
  SendPaymentRequest,
  AppendLedger(LedgerKind),
  Notify(Notice),
}

impl Effect {
  /// Pipeline step name. Unique among the effects of one transition.
  pub fn step_name(&self) -> String {
    match self {
      Effect::QuoteShipping => "quote_shipping".to_string(),
      Effect::ApplyCodCharges => "apply_cod_charges".to_string(),
      Effect::CreateShipment => "create_shipment".to_string(),
      Effect::SendPaymentRequest => "send_payment_request".to_string(),
      Effect::AppendLedger(kind) => format!("append_ledger_{}", kind.key()),
      Effect::Notify(notice) => format!("notify_{}", notice.key()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub from: OrderState,
  pub next: OrderState,
  pub effects: Vec<Effect>,
}

impl Transition {
  fn unchanged(state: OrderState) -> Self {
    Self {
      from: state,
      next: state,
      effects: Vec::new(),
    }
  }

  pub fn is_noop(&self) -> bool {
    self.from == self.next && self.effects.is_empty()
  }
}

pub fn transition(state: OrderState, event: &LifecycleEvent) -> Transition {
  use Effect::*;
  use LifecycleEvent as E;
  use OrderState as S;

  let (next, effects) = match (state, event) {
    (S::CartOpen, E::DetailsSubmitted) => (S::DetailsCaptured, vec![Notify(Notice::DetailsReceived)]),
    (S::DetailsCaptured, E::PaymentModeSelected(PaymentMode::Cod)) => (
      S::CodPendingConfirmation,
      vec![QuoteShipping, ApplyCodCharges, CreateShipment],
    ),
    (S::DetailsCaptured, E::PaymentModeSelected(PaymentMode::Prepaid)) => (
      S::AwaitingPayment,
      vec![
        QuoteShipping,
        SendPaymentRequest,
        AppendLedger(LedgerKind::AwaitingPayment),
      ],
    ),
    (S::CodPendingConfirmation, E::CodShipmentResolved { accepted: true }) => (
      S::ShipmentCreated,
      vec![AppendLedger(LedgerKind::CodPlaced), Notify(Notice::CodPlaced)],
    ),
    (S::CodPendingConfirmation, E::CodShipmentResolved { accepted: false }) => {
      (S::Abandoned, vec![Notify(Notice::InvalidDetails)])
    }
    (S::AwaitingPayment, E::PaymentSucceeded) => (
      S::Paid,
      vec![
        Notify(Notice::PaymentConfirmed),
        QuoteShipping,
        CreateShipment,
        AppendLedger(LedgerKind::Paid),
      ],
    ),
    (S::AwaitingPayment, E::PaymentFailed) => (S::Failed, vec![Notify(Notice::PaymentFailed)]),
    (S::Paid, E::ShipmentRecorded { created: true }) => (S::ShipmentCreated, vec![Notify(Notice::ShipmentCreated)]),
    (S::Paid, E::ShipmentRecorded { created: false }) => (S::Paid, vec![Notify(Notice::ShipmentPending)]),
    _ => return Transition::unchanged(state),
  };

  Transition {
    from: state,
    next,
    effects,
  }
}
