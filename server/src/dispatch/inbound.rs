// server/src/dispatch/inbound.rs

//! Chat-platform delivery payloads and their classification.

use crate::models::{normalize_phone, to_minor_units, CustomerDetails, ProductItem};
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
  #[serde(default)]
  pub from: String,
  #[serde(rename = "type", default)]
  pub kind: String,
  pub text: Option<TextBody>,
  pub interactive: Option<Interactive>,
  pub order: Option<CatalogOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
  #[serde(default)]
  pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interactive {
  #[serde(rename = "type", default)]
  pub kind: String,
  pub button_reply: Option<ReplyTitle>,
  pub list_reply: Option<ReplyTitle>,
  pub nfm_reply: Option<FormReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyTitle {
  #[serde(default)]
  pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormReply {
  #[serde(default)]
  pub response_json: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogOrder {
  pub catalog_id: Option<String>,
  #[serde(default)]
  pub product_items: Vec<CatalogLine>,
}

/// Quantity and price arrive as numbers or strings depending on the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogLine {
  #[serde(default)]
  pub product_retailer_id: String,
  #[serde(default)]
  pub quantity: JsonValue,
  #[serde(default)]
  pub item_price: JsonValue,
}

impl CatalogLine {
  /// Missing, unparseable or zero quantities count as one.
  pub fn quantity(&self) -> u32 {
    let parsed = match &self.quantity {
      JsonValue::Number(n) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
      JsonValue::String(s) => s.trim().parse::<u32>().ok(),
      _ => None,
    };
    parsed.filter(|q| *q > 0).unwrap_or(1)
  }

  /// Unit price in minor units; unparseable prices count as zero.
  pub fn unit_price(&self) -> i64 {
    let major = match &self.item_price {
      JsonValue::Number(n) => n.as_f64(),
      JsonValue::String(s) => s.trim().parse::<f64>().ok(),
      _ => None,
    };
    major.filter(|p| p.is_finite()).map(to_minor_units).unwrap_or(0)
  }

  pub fn to_product_item(&self) -> ProductItem {
    ProductItem {
      product_retailer_id: self.product_retailer_id.clone(),
      quantity: self.quantity(),
      unit_price: self.unit_price(),
    }
  }
}

/// One inbound chat message, classified. `from` is already normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
  Text { from: String, body: String },
  Reply { from: String, title: String },
  CatalogOrder {
    from: String,
    catalog_id: Option<String>,
    items: Vec<ProductItem>,
  },
  FormSubmission { from: String, customer: CustomerDetails },
  Unsupported { from: String, kind: String },
}

impl ChatEvent {
  pub fn sender(&self) -> &str {
    match self {
      ChatEvent::Text { from, .. }
      | ChatEvent::Reply { from, .. }
      | ChatEvent::CatalogOrder { from, .. }
      | ChatEvent::FormSubmission { from, .. }
      | ChatEvent::Unsupported { from, .. } => from,
    }
  }
}

/// Pulls `entry[0].changes[0].value.messages[0]` out of a delivery payload and
/// classifies it. `None` means the delivery carries no message (status updates).
pub fn classify(payload: &JsonValue) -> Option<ChatEvent> {
  let raw = payload.pointer("/entry/0/changes/0/value/messages/0")?;
  let message: InboundMessage = match serde_json::from_value(raw.clone()) {
    Ok(m) => m,
    Err(e) => {
      tracing::warn!(error = %e, "Message does not match the expected shape.");
      let from = raw.get("from").and_then(JsonValue::as_str).unwrap_or_default();
      return Some(ChatEvent::Unsupported {
        from: normalize_phone(from),
        kind: "malformed".to_string(),
      });
    }
  };
  Some(classify_message(message))
}

pub fn classify_message(message: InboundMessage) -> ChatEvent {
  let from = normalize_phone(&message.from);

  if let Some(form) = message.interactive.as_ref().and_then(|i| i.nfm_reply.as_ref()) {
    return ChatEvent::FormSubmission {
      from,
      customer: CustomerDetails::from_form_response(&form.response_json),
    };
  }

  match message.kind.as_str() {
    "text" => ChatEvent::Text {
      from,
      body: message.text.map(|t| t.body.trim().to_string()).unwrap_or_default(),
    },
    "interactive" => {
      let title = message.interactive.and_then(|i| match i.kind.as_str() {
        "button_reply" => i.button_reply.map(|r| r.title),
        "list_reply" => i.list_reply.map(|r| r.title),
        _ => None,
      });
      match title {
        Some(title) => ChatEvent::Reply {
          from,
          title: title.trim().to_string(),
        },
        None => ChatEvent::Unsupported {
          from,
          kind: "interactive".to_string(),
        },
      }
    }
    "order" => {
      let order = message.order.unwrap_or(CatalogOrder {
        catalog_id: None,
        product_items: Vec::new(),
      });
      ChatEvent::CatalogOrder {
        from,
        catalog_id: order.catalog_id,
        items: order.product_items.iter().map(CatalogLine::to_product_item).collect(),
      }
    }
    other => ChatEvent::Unsupported {
      from,
      kind: other.to_string(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn delivery(message: JsonValue) -> JsonValue {
    json!({ "entry": [{ "changes": [{ "value": { "messages": [message] } }] }] })
  }

  #[test]
  fn no_message_is_none() {
    assert!(classify(&json!({ "entry": [{ "changes": [{ "value": { "statuses": [] } }] }] })).is_none());
    assert!(classify(&json!({})).is_none());
  }

  #[test]
  fn text_message_is_trimmed_and_phone_normalized() {
    let event = classify(&delivery(json!({
      "from": "+91 99000 11111", "type": "text", "text": { "body": "  Hi " }
    })))
    .unwrap();
    assert_eq!(
      event,
      ChatEvent::Text {
        from: "919900011111".into(),
        body: "Hi".into()
      }
    );
  }

  #[test]
  fn button_and_list_replies_use_title() {
    let button = classify(&delivery(json!({
      "from": "1", "type": "interactive",
      "interactive": { "type": "button_reply", "button_reply": { "id": "place_order", "title": "Place order" } }
    })))
    .unwrap();
    assert_eq!(button, ChatEvent::Reply { from: "1".into(), title: "Place order".into() });

    let list = classify(&delivery(json!({
      "from": "1", "type": "interactive",
      "interactive": { "type": "list_reply", "list_reply": { "id": "x", "title": "Ghee" } }
    })))
    .unwrap();
    assert_eq!(list, ChatEvent::Reply { from: "1".into(), title: "Ghee".into() });
  }

  #[test]
  fn catalog_order_lines_are_lenient() {
    let event = classify(&delivery(json!({
      "from": "1", "type": "order",
      "order": {
        "catalog_id": "1262132998945503",
        "product_items": [
          { "product_retailer_id": "43mypu8dye", "quantity": 2, "item_price": 345.5, "currency": "INR" },
          { "product_retailer_id": "esltl7pftq", "quantity": "x", "item_price": "99.99" },
          { "product_retailer_id": "obdqyehm1w", "item_price": null }
        ]
      }
    })))
    .unwrap();
    match event {
      ChatEvent::CatalogOrder { items, catalog_id, .. } => {
        assert_eq!(catalog_id.as_deref(), Some("1262132998945503"));
        assert_eq!((items[0].quantity, items[0].unit_price), (2, 34550));
        assert_eq!((items[1].quantity, items[1].unit_price), (1, 9999));
        assert_eq!((items[2].quantity, items[2].unit_price), (1, 0));
      }
      other => panic!("expected catalog order, got {:?}", other),
    }
  }

  #[test]
  fn out_of_range_quantity_counts_as_unparseable() {
    let line = |quantity: JsonValue| CatalogLine {
      product_retailer_id: "294l11gpcm".into(),
      quantity,
      item_price: json!(1.0),
    };
    assert_eq!(line(json!(4_294_967_298u64)).quantity(), 1);
    assert_eq!(line(json!(u32::MAX)).quantity(), u32::MAX);
    assert_eq!(line(json!(-3)).quantity(), 1);
  }

  #[test]
  fn form_submission_takes_precedence() {
    let event = classify(&delivery(json!({
      "from": "1", "type": "interactive",
      "interactive": { "type": "nfm_reply", "nfm_reply": { "response_json": "{\"flow_token\":\"test_101\"}" } }
    })))
    .unwrap();
    match event {
      ChatEvent::FormSubmission { customer, .. } => assert_eq!(customer.flow_token.as_deref(), Some("test_101")),
      other => panic!("expected form submission, got {:?}", other),
    }
  }

  #[test]
  fn other_types_are_unsupported() {
    let event = classify(&delivery(json!({ "from": "1", "type": "image", "image": {} }))).unwrap();
    assert_eq!(event, ChatEvent::Unsupported { from: "1".into(), kind: "image".into() });
  }
}
