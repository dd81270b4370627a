//! Metrics recalculation: a total, deterministic function of the entity
//! collections and the soft-delete sets.
//!
//! Every pass runs all steps in order and rewrites every derived field; no
//! state is carried between passes apart from what the sets say.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  deletion::DeletionState,
  entity::{Entities, Keyword, StrengthLevel},
};

// ─── Output types ────────────────────────────────────────────────────────────

/// Count of active competitors per strength tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthSummary {
  pub molto_forte: usize,
  pub forte:       usize,
  pub medio:       usize,
  pub debole:      usize,
}

impl StrengthSummary {
  fn record(&mut self, level: StrengthLevel) {
    match level {
      StrengthLevel::MoltoForte => self.molto_forte += 1,
      StrengthLevel::Forte => self.forte += 1,
      StrengthLevel::Medio => self.medio += 1,
      StrengthLevel::Debole => self.debole += 1,
    }
  }

  pub fn total(&self) -> usize {
    self.molto_forte + self.forte + self.medio + self.debole
  }
}

/// Per-competitor result of one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorMetrics {
  pub asin:                String,
  pub strength_percentage: f64,
  pub strength_level:      StrengthLevel,
  /// Search volume of active keywords this competitor ranks top-30 on.
  pub top30_search_volume: u64,
}

/// Market-level results of the last pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calculations {
  pub total_market_sv:    u64,
  pub brand_sv:           u64,
  pub strength_summary:   StrengthSummary,
  /// Active competitors only, keyed by ASIN.
  pub competitor_metrics: BTreeMap<String, CompetitorMetrics>,
}

// ─── Pass ────────────────────────────────────────────────────────────────────

/// `100 * part / total`, or 0 when `total` is 0.
pub fn share_percentage(part: u64, total: u64) -> f64 {
  if total == 0 {
    return 0.0;
  }
  part as f64 / total as f64 * 100.0
}

fn top30_volume(active: &[&Keyword], asin: &str) -> u64 {
  active
    .iter()
    .filter(|k| k.top_rank_of(asin).is_some())
    .map(|k| k.search_volume)
    .sum()
}

/// Run a full recalculation pass, rewriting every derived entity field and
/// returning the market-level results.
pub fn recalculate(
  entities: &mut Entities,
  deletions: &DeletionState,
) -> Calculations {
  let Entities {
    keywords,
    competitors,
    products,
    root_keywords,
  } = entities;

  // 1. Flags follow the sets.
  for keyword in keywords.iter_mut() {
    keyword.is_deleted = deletions.is_keyword_deleted(&keyword.phrase);
  }
  for competitor in competitors.iter_mut() {
    competitor.is_deleted = deletions.is_competitor_deleted(&competitor.asin);
  }
  for product in products.iter_mut() {
    product.is_deleted = deletions.is_product_deleted(&product.asin);
  }
  for root in root_keywords.iter_mut() {
    root.is_deleted = deletions.is_root_deleted(&root.root_word);
  }

  // 2. Active keywords.
  let active: Vec<&Keyword> = keywords.iter().filter(|k| !k.is_deleted).collect();

  // 3. Market totals.
  let total_market_sv: u64 = active.iter().map(|k| k.search_volume).sum();
  let brand_sv: u64 = active
    .iter()
    .filter(|k| k.is_brand)
    .map(|k| k.search_volume)
    .sum();

  // 4–5. Active competitors and the tier histogram.
  let mut competitor_metrics = BTreeMap::new();
  let mut strength_summary = StrengthSummary::default();
  for competitor in competitors.iter_mut().filter(|c| !c.is_deleted) {
    let top30_search_volume = top30_volume(&active, &competitor.asin);
    let strength_percentage = share_percentage(top30_search_volume, total_market_sv);
    let strength_level = StrengthLevel::from_percentage(strength_percentage);

    competitor.strength_percentage = strength_percentage;
    competitor.strength_level = strength_level;
    strength_summary.record(strength_level);
    competitor_metrics.insert(
      competitor.asin.clone(),
      CompetitorMetrics {
        asin: competitor.asin.clone(),
        strength_percentage,
        strength_level,
        top30_search_volume,
      },
    );
  }

  // 6. Every product, deleted or not, so a restore shows a current score.
  for product in products.iter_mut() {
    let matching: Vec<&Keyword> = active
      .iter()
      .copied()
      .filter(|k| k.top_rank_of(&product.asin).is_some())
      .collect();
    let product_sv: u64 = matching.iter().map(|k| k.search_volume).sum();

    product.keyword_count = matching.len();
    product.matching_keywords = matching.iter().map(|k| k.phrase.clone()).collect();
    product.strength_percentage = share_percentage(product_sv, total_market_sv);
    product.strength_level = StrengthLevel::from_percentage(product.strength_percentage);
  }

  tracing::debug!(
    active_keywords = active.len(),
    total_market_sv,
    brand_sv,
    active_competitors = competitor_metrics.len(),
    "recalculated metrics",
  );

  Calculations {
    total_market_sv,
    brand_sv,
    strength_summary,
    competitor_metrics,
  }
}
