// server/src/models/customer.rs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Strips everything but ASCII digits: `+91 98765-43210` becomes `919876543210`.
pub fn normalize_phone(raw: &str) -> String {
  raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Delivery details captured from a structured-form submission.
///
/// The submitted body is kept verbatim in `raw`; when it is not a JSON object the
/// typed fields stay empty and `raw` holds the original text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetails {
  pub name: String,
  pub address1: String,
  pub address2: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub phone: String,
  pub email: String,
  pub payment_mode: String,
  pub flow_token: Option<String>,
  pub raw: JsonValue,
}

fn field(obj: &JsonValue, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| match obj.get(*key) {
    Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Some(JsonValue::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

impl CustomerDetails {
  pub fn from_form_value(raw: JsonValue) -> Self {
    if !raw.is_object() {
      return Self {
        raw,
        ..Default::default()
      };
    }
    let get = |keys: &[&str]| field(&raw, keys).unwrap_or_default();
    Self {
      name: get(&["name"]),
      address1: get(&["address1"]),
      address2: get(&["address2"]),
      city: get(&["city"]),
      state: get(&["state"]),
      pincode: get(&["pincode", "pin"]),
      phone: get(&["phone"]),
      email: get(&["email"]),
      payment_mode: get(&["payment_mode"]),
      flow_token: field(&raw, &["flow_token"]),
      raw,
    }
  }

  /// Parses the form's `response_json`, which the platform sends as a string.
  /// Unparseable text is carried as an opaque string value.
  pub fn from_form_response(response: &JsonValue) -> Self {
    match response {
      JsonValue::String(text) => match serde_json::from_str::<JsonValue>(text) {
        Ok(parsed) => Self::from_form_value(parsed),
        Err(e) => {
          tracing::warn!(error = %e, "Form response is not valid JSON, keeping it as opaque text.");
          Self::from_form_value(JsonValue::String(text.clone()))
        }
      },
      other => Self::from_form_value(other.clone()),
    }
  }

  pub fn address_line(&self) -> String {
    format!("{} {}", self.address1, self.address2).trim().to_string()
  }

  pub fn display_name(&self) -> &str {
    if self.name.is_empty() {
      "Customer"
    } else {
      &self.name
    }
  }

  /// The phone typed into the form, falling back to the chat sender.
  pub fn contact_phone<'a>(&'a self, chat_phone: &'a str) -> &'a str {
    if self.phone.is_empty() {
      chat_phone
    } else {
      &self.phone
    }
  }
}
