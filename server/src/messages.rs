// server/src/messages.rs

//! Customer-facing message texts.

use crate::lifecycle::Notice;
use crate::models::{format_major, OrderSession};

pub const GREETING: &str = "Namaste 🌱 Welcome to OrangUtan Organics! Tap *Place order* to see our catalog.";
pub const PLACE_ORDER_BUTTON_ID: &str = "place_order";
pub const PLACE_ORDER_BUTTON_TITLE: &str = "Place order";
pub const SELECT_ITEMS_HINT: &str = "Please select items from our catalog.";
pub const DETAILS_FORM_HINT: &str = "Please tap the button above and provide your delivery details.";
pub const FALLBACK: &str = "Sorry, I didn’t understand that. Type *hi* to get started.";
pub const PAYMENT_NOT_INITIATED: &str = "⚠️ Could not initiate payment. Please try again later.";

pub fn review_and_pay_hint(order_id: &str) -> String {
  format!(
    "💳 Please tap *Review and Pay* inside the order card above to complete payment. OrderId: {}",
    order_id
  )
}

pub fn notice_text(notice: Notice, session: &OrderSession) -> String {
  match notice {
    Notice::DetailsReceived => format!(
      "Thanks! We've received your delivery details. (OrderId: {})",
      session.order_id
    ),
    Notice::CodPlaced => format!(
      "✅ Your COD order is placed. Total: ₹{}. We'll notify you when it's shipped.",
      format_major(session.amount)
    ),
    Notice::InvalidDetails => {
      "⚠️ Data you entered in the form is incorrect. Make sure you enter valid delivery details.".to_string()
    }
    Notice::PaymentConfirmed => "✅ Payment successful! Your order is confirmed.".to_string(),
    Notice::PaymentFailed => "⚠️ Your payment failed or expired. Please try placing the order again.".to_string(),
    Notice::ShipmentCreated => "📦 Shipment created. We'll share tracking once available.".to_string(),
    Notice::ShipmentPending => "⚠️ Payment received but shipment creation failed. We'll follow up.".to_string(),
  }
}
