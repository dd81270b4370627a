//! Long-lived entities derived from the source rows.
//!
//! Entities are created once by [`crate::join`] and never physically removed.
//! Their `is_deleted` flags are a read cache of the
//! [`DeletionState`](crate::deletion::DeletionState) sets, rewritten on every
//! recalculation pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Strength tier ───────────────────────────────────────────────────────────

/// Four-level classification of a strength percentage.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
pub enum StrengthLevel {
  #[serde(rename = "Molto Forte")]
  MoltoForte,
  #[serde(rename = "Forte")]
  Forte,
  #[serde(rename = "Medio")]
  Medio,
  #[default]
  #[serde(rename = "Debole")]
  Debole,
}

impl StrengthLevel {
  /// Lower bounds are inclusive and checked top-down, so exactly 80 is
  /// `MoltoForte` and exactly 30 is `Medio`.
  pub fn from_percentage(percentage: f64) -> Self {
    if percentage >= 80.0 {
      Self::MoltoForte
    } else if percentage >= 65.0 {
      Self::Forte
    } else if percentage >= 30.0 {
      Self::Medio
    } else {
      Self::Debole
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::MoltoForte => "Molto Forte",
      Self::Forte => "Forte",
      Self::Medio => "Medio",
      Self::Debole => "Debole",
    }
  }
}

impl std::fmt::Display for StrengthLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Ranking positions 1..=30 count as "competing" on a keyword.
pub const TOP_RANK_CUTOFF: u32 = 30;

/// Whether `position` is inside the top-30 window.
pub fn is_top_ranked(position: u32) -> bool {
  (1..=TOP_RANK_CUTOFF).contains(&position)
}

// ─── Keyword ─────────────────────────────────────────────────────────────────

/// A tracked search phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
  /// Unique key.
  pub phrase:           String,
  pub search_volume:    u64,
  pub is_brand:         bool,
  pub brand_word:       Option<String>,
  /// 0–100. Computed at join time from `rankings`; 0 for brand keywords.
  pub relevance:        u32,
  /// The relevance value the export carried, kept for reference only.
  pub source_relevance: Option<f64>,
  pub rankings:         BTreeMap<String, u32>,
  pub is_deleted:       bool,
}

impl Keyword {
  /// The ranking of `asin` on this keyword, when it is in the top 30.
  pub fn top_rank_of(&self, asin: &str) -> Option<u32> {
    self.rankings.get(asin).copied().filter(|p| is_top_ranked(*p))
  }
}

// ─── Competitor ──────────────────────────────────────────────────────────────

/// A seller listing, keyed by ASIN, joined from the business and catalog
/// exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
  pub asin:                String,
  pub brand:               String,
  pub image_url:           String,
  pub seller_country:      String,
  pub rating:              f64,
  /// Snapshot taken at join time; not refreshed afterwards.
  pub listing_age_months:  u32,
  pub price:               String,
  pub sales:               f64,
  /// Revenue as exported, kept for display.
  pub revenue:             String,
  /// `revenue` parsed once at join time.
  pub revenue_amount:      f64,
  pub category:            String,
  pub fulfillment:         String,
  pub variation_count:     u32,
  pub strength_percentage: f64,
  pub strength_level:      StrengthLevel,
  pub is_deleted:          bool,
}

// ─── Product ─────────────────────────────────────────────────────────────────

/// A catalog entry. May or may not share its ASIN with a [`Competitor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub asin:                String,
  pub brand:               String,
  pub title:               String,
  pub image_url:           String,
  pub image_url_sample:    String,
  pub image_count:         u32,
  pub features:            Vec<String>,
  pub variation_asins:     Vec<String>,
  pub keyword_count:       usize,
  /// Phrases of active keywords on which this product ranks top-30.
  pub matching_keywords:   Vec<String>,
  pub strength_percentage: f64,
  pub strength_level:      StrengthLevel,
  pub is_deleted:          bool,
}

// ─── RootKeyword ─────────────────────────────────────────────────────────────

/// Aggregate over all active keywords whose phrase contains `root_word`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootKeyword {
  pub root_word:           String,
  pub total_search_volume: u64,
  pub average_relevance:   u32,
  pub brand_count:         usize,
  pub non_brand_count:     usize,
  pub total_count:         usize,
  pub brand_percentage:    u32,
  pub related_phrases:     Vec<String>,
  pub is_deleted:          bool,
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// The four entity collections of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
  pub keywords:      Vec<Keyword>,
  pub competitors:   Vec<Competitor>,
  pub products:      Vec<Product>,
  /// Derived index; regenerated whenever keyword membership changes.
  pub root_keywords: Vec<RootKeyword>,
}
