// server/src/lib.rs

//! Order session and webhook correlation core for a chat-commerce storefront.
//!
//! Chat deliveries, structured-form submissions and payment callbacks arrive
//! independently; this crate correlates them into one order record per
//! checkout, drives the record through its lifecycle and runs the side effects
//! (shipping quotes, shipment creation, notifications, ledger rows) as
//! best-effort pipeline steps.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod messages;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use errors::{AppError, Result};
