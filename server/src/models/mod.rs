// server/src/models/mod.rs

pub mod catalog;
pub mod customer;
pub mod session;

pub use customer::{normalize_phone, CustomerDetails};
pub use session::{
  cart_total, format_major, to_minor_units, CartBucket, OrderSession, OrderSummary, PaymentMode, PaymentStatus,
  ProductItem,
};
