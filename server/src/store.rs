// server/src/store.rs

//! In-memory session store: sessions by order id, cart buckets by phone and the
//! phone → order history index.

use crate::lifecycle::{transition, LifecycleEvent, Transition};
use crate::models::{cart_total, CartBucket, CustomerDetails, OrderSession, ProductItem};
use orderline_pipeline::ContextData;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Shared, lockable cell holding one session.
pub type SessionHandle = ContextData<OrderSession>;

const ORDER_ID_DIGITS: u32 = 5;
const ATTEMPTS_PER_WIDTH: u32 = 16;

#[derive(Default)]
struct Indexes {
  sessions: HashMap<String, SessionHandle>,
  carts: HashMap<String, CartBucket>,
  phone_orders: HashMap<String, Vec<String>>,
}

pub struct SessionStore {
  inner: RwLock<Indexes>,
  id_prefix: String,
  reset_cart_after_promotion: bool,
}

impl Default for SessionStore {
  fn default() -> Self {
    Self::new("OUO", false)
  }
}

impl SessionStore {
  pub fn new(id_prefix: impl Into<String>, reset_cart_after_promotion: bool) -> Self {
    Self {
      inner: RwLock::new(Indexes::default()),
      id_prefix: id_prefix.into(),
      reset_cart_after_promotion,
    }
  }

  pub fn get_or_create_cart(&self, phone: &str) -> CartBucket {
    if let Some(cart) = self.inner.read().carts.get(phone) {
      return cart.clone();
    }
    self.inner.write().carts.entry(phone.to_string()).or_default().clone()
  }

  /// Overwrites the phone's cart with a fresh catalog selection.
  pub fn replace_cart(&self, phone: &str, items: Vec<ProductItem>, catalog_id: Option<String>) -> CartBucket {
    let bucket = CartBucket {
      amount: cart_total(&items),
      product_items: items,
      catalog_id,
    };
    self.inner.write().carts.insert(phone.to_string(), bucket.clone());
    debug!(phone, amount = bucket.amount, "Cart replaced.");
    bucket
  }

  /// Turns the phone's cart into a new session with a fresh order id.
  ///
  /// Id allocation, registration and the history append share one write lock,
  /// so concurrent promotions can never hand out the same id.
  #[instrument(name = "SessionStore::promote", skip(self, customer), fields(phone = %phone))]
  pub fn promote(&self, phone: &str, customer: CustomerDetails) -> OrderSession {
    let mut inner = self.inner.write();
    let cart = inner.carts.get(phone).cloned().unwrap_or_default();
    let order_id = self.allocate_order_id(&inner.sessions);

    let session = OrderSession::new(order_id.clone(), phone.to_string(), customer, &cart);
    inner.sessions.insert(order_id.clone(), ContextData::new(session.clone()));
    inner.phone_orders.entry(phone.to_string()).or_default().push(order_id.clone());
    if self.reset_cart_after_promotion {
      inner.carts.remove(phone);
    }
    info!(order_id = %order_id, amount = session.amount, items = session.product_items.len(), "Session promoted from cart.");
    session
  }

  fn allocate_order_id(&self, taken: &HashMap<String, SessionHandle>) -> String {
    let mut rng = rand::thread_rng();
    let mut digits = ORDER_ID_DIGITS;
    loop {
      for _ in 0..ATTEMPTS_PER_WIDTH {
        let n: u64 = rng.gen_range(0..10u64.pow(digits));
        let candidate = format!("{}-{:0width$}", self.id_prefix, n, width = digits as usize);
        if !taken.contains_key(&candidate) {
          return candidate;
        }
      }
      digits += 1;
    }
  }

  pub fn get(&self, order_id: &str) -> Option<OrderSession> {
    self.handle(order_id).map(|h| h.snapshot())
  }

  pub fn handle(&self, order_id: &str) -> Option<SessionHandle> {
    self.inner.read().sessions.get(order_id).cloned()
  }

  pub fn last_order_for_phone(&self, phone: &str) -> Option<String> {
    self.inner.read().phone_orders.get(phone).and_then(|ids| ids.last().cloned())
  }

  pub fn orders_for_phone(&self, phone: &str) -> Vec<String> {
    self.inner.read().phone_orders.get(phone).cloned().unwrap_or_default()
  }

  pub fn len(&self) -> usize {
    self.inner.read().sessions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Applies `event` to the session's lifecycle state as one check-and-set.
  ///
  /// The transition is computed and committed under the session's write lock;
  /// of two racing identical events only the first gets a non-noop result.
  pub fn apply(&self, order_id: &str, event: &LifecycleEvent) -> Option<Transition> {
    let handle = self.handle(order_id)?;
    let t = handle.update(|session| {
      let t = transition(session.state, event);
      if !t.is_noop() {
        session.absorb(event, t.next);
      }
      t
    });
    debug!(order_id, from = ?t.from, to = ?t.next, event = ?event, noop = t.is_noop(), "Lifecycle event applied.");
    Some(t)
  }
}
