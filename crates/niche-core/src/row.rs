//! Normalized rows, the contract between the CSV adapter and the core.
//!
//! Rows are produced once at ingestion and kept verbatim inside the
//! [`Session`](crate::session::Session). Nothing here carries logic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Keyword export ──────────────────────────────────────────────────────────

/// One row of the keyword-ranking export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRow {
  pub phrase:           String,
  pub search_volume:    u64,
  /// Relevance as written in the export. Advisory only; the session
  /// recomputes relevance from `rankings`.
  #[serde(default)]
  pub source_relevance: Option<f64>,
  #[serde(default)]
  pub is_brand:         bool,
  #[serde(default)]
  pub brand_word:       Option<String>,
  /// ASIN → 1-based ranking position. Absent means unranked.
  #[serde(default)]
  pub rankings:         BTreeMap<String, u32>,
}

// ─── Business export ─────────────────────────────────────────────────────────

/// One row of the seller/business export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRow {
  pub asin:           String,
  #[serde(default)]
  pub brand:          String,
  #[serde(default)]
  pub image_url:      String,
  #[serde(default)]
  pub seller_country: String,
  #[serde(default)]
  pub rating:         f64,
  #[serde(default)]
  pub creation_date:  Option<DateTime<Utc>>,
  /// Display price, locale-formatted.
  #[serde(default)]
  pub price:          String,
  #[serde(default)]
  pub sales:          f64,
  /// Revenue as exported, e.g. `"€1.234,56"`.
  #[serde(default)]
  pub revenue:        String,
  #[serde(default)]
  pub category:       String,
  #[serde(default)]
  pub fulfillment:    String,
}

// ─── Catalog export ──────────────────────────────────────────────────────────

/// One row of the catalog/product export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
  pub asin:             String,
  #[serde(default)]
  pub brand:            String,
  #[serde(default)]
  pub image_url:        String,
  #[serde(default)]
  pub image_url_sample: String,
  #[serde(default)]
  pub image_count:      u32,
  #[serde(default)]
  pub title:            String,
  /// Up to five bullet-point features, in export order.
  #[serde(default)]
  pub features:         Vec<String>,
  #[serde(default)]
  pub variation_asins:  Vec<String>,
}

// ─── SourceRows ──────────────────────────────────────────────────────────────

/// The three row sets a session is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRows {
  #[serde(default)]
  pub keywords: Vec<KeywordRow>,
  #[serde(default)]
  pub business: Vec<BusinessRow>,
  #[serde(default)]
  pub products: Vec<ProductRow>,
}

impl KeywordRow {
  /// Convenience constructor for a non-brand row without rankings.
  pub fn new(phrase: impl Into<String>, search_volume: u64) -> Self {
    Self {
      phrase: phrase.into(),
      search_volume,
      source_relevance: None,
      is_brand: false,
      brand_word: None,
      rankings: BTreeMap::new(),
    }
  }

  /// Builder-style helper that records a ranking position for `asin`.
  pub fn ranked(mut self, asin: impl Into<String>, position: u32) -> Self {
    self.rankings.insert(asin.into(), position);
    self
  }

  /// Builder-style helper that marks the row as a brand keyword.
  pub fn brand(mut self) -> Self {
    self.is_brand = true;
    self
  }
}

impl BusinessRow {
  /// A business row carrying only its ASIN; every other field is empty.
  pub fn new(asin: impl Into<String>) -> Self {
    Self {
      asin:           asin.into(),
      brand:          String::new(),
      image_url:      String::new(),
      seller_country: String::new(),
      rating:         0.0,
      creation_date:  None,
      price:          String::new(),
      sales:          0.0,
      revenue:        String::new(),
      category:       String::new(),
      fulfillment:    String::new(),
    }
  }
}

impl ProductRow {
  /// A product row carrying only its ASIN; every other field is empty.
  pub fn new(asin: impl Into<String>) -> Self {
    Self {
      asin:             asin.into(),
      brand:            String::new(),
      image_url:        String::new(),
      image_url_sample: String::new(),
      image_count:      0,
      title:            String::new(),
      features:         Vec::new(),
      variation_asins:  Vec::new(),
    }
  }
}
