// server/src/models/catalog.rs

//! Static product reference data: display names and shipping weights.

use crate::models::ProductItem;

pub const CATALOG_ID: &str = "1262132998945503";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
  pub retailer_id: &'static str,
  pub name: &'static str,
  pub weight_grams: u32,
}

pub const PRODUCTS: &[CatalogEntry] = &[
  CatalogEntry { retailer_id: "43mypu8dye", name: "Himalayan badri cow ghee 120gm", weight_grams: 120 },
  CatalogEntry { retailer_id: "l722c63kq9", name: "Himalayan badri cow ghee 295gm", weight_grams: 295 },
  CatalogEntry { retailer_id: "kkii6r9uvh", name: "Himalayan badri cow ghee 495gm", weight_grams: 495 },
  CatalogEntry { retailer_id: "m519x5gv9s", name: "Himalayan White Rajma 500gm", weight_grams: 500 },
  CatalogEntry { retailer_id: "294l11gpcm", name: "Himalayan White Rajma 1kg", weight_grams: 1000 },
  CatalogEntry { retailer_id: "ezg1lu6edm", name: "Himalayan Red Rajma 500gm", weight_grams: 500 },
  CatalogEntry { retailer_id: "tzz72lpzz2", name: "Himalayan Red Rajma 1kg", weight_grams: 1000 },
  CatalogEntry { retailer_id: "esltl7pftq", name: "Wild Himalayan Tempering Spice", weight_grams: 100 },
  CatalogEntry { retailer_id: "obdqyehm1w", name: "Himalayan Red Rice", weight_grams: 1000 },
];

pub fn lookup(retailer_id: &str) -> Option<&'static CatalogEntry> {
  PRODUCTS.iter().find(|p| p.retailer_id == retailer_id)
}

/// Unknown products are shipped and billed as a generic "Item".
pub fn product_name(retailer_id: &str) -> &'static str {
  lookup(retailer_id).map(|p| p.name).unwrap_or("Item")
}

pub fn weight_grams(retailer_id: &str) -> u32 {
  lookup(retailer_id).map(|p| p.weight_grams).unwrap_or(0)
}

/// Saturates instead of overflowing on absurd quantities.
pub fn total_weight_grams(items: &[ProductItem]) -> u64 {
  items.iter().fold(0u64, |total, item| {
    let line = u64::from(weight_grams(&item.product_retailer_id)).saturating_mul(u64::from(item.quantity));
    total.saturating_add(line)
  })
}

/// One `name(qty)` line per item followed by `suffix`, as printed on the shipping label.
pub fn products_description(items: &[ProductItem], suffix: &str) -> String {
  let mut desc = String::new();
  for item in items {
    desc.push_str(&format!("{}({})\n", product_name(&item.product_retailer_id), item.quantity));
  }
  desc.push_str(suffix);
  desc
}
