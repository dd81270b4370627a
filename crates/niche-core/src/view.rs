//! The read-only projection handed to API callers and the CLI report.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  engine::StrengthSummary,
  entity::{Competitor, Keyword, Product, RootKeyword},
  session::{Edit, EditTarget, Session},
};

/// Market-level headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
  pub total_market_sv:       u64,
  pub brand_sv:              u64,
  /// Distinct brands among active competitors.
  pub unique_brand_count:    usize,
  pub active_keyword_count:  usize,
  pub deleted_keyword_count: usize,
  /// Sum of parsed revenue over active competitors.
  pub total_revenue:         f64,
}

/// Returned when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
  pub analysis_id:       Uuid,
  pub total_keywords:    usize,
  pub total_competitors: usize,
  pub total_market_sv:   u64,
}

/// Returned after an edit has been applied and recalculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
  pub recalculated:         bool,
  pub total_market_sv:      u64,
  /// Competitors whose figures may have changed.
  pub affected_competitors: Vec<String>,
}

/// Everything a caller needs to render one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisView {
  pub analysis_id:           Uuid,
  pub created_at:            DateTime<Utc>,
  pub market_summary:        MarketSummary,
  pub competitors:           Vec<Competitor>,
  pub keywords:              Vec<Keyword>,
  pub root_keywords:         Vec<RootKeyword>,
  /// Deleted roots, including those no longer present in `root_keywords`
  /// because every phrase containing them is inactive.
  pub deleted_root_keywords: Vec<String>,
  pub products:              Vec<Product>,
  pub strength_summary:      StrengthSummary,
}

impl Session {
  /// Project the session into an [`AnalysisView`]. Reads only; the session
  /// must already be recalculated.
  pub fn view(&self) -> AnalysisView {
    let entities = &self.entities;
    let active_competitors = entities.competitors.iter().filter(|c| !c.is_deleted);

    let mut brands = BTreeSet::new();
    let mut total_revenue = 0.0;
    for competitor in active_competitors {
      brands.insert(competitor.brand.as_str());
      total_revenue += competitor.revenue_amount;
    }

    let deleted_keyword_count =
      entities.keywords.iter().filter(|k| k.is_deleted).count();

    AnalysisView {
      analysis_id:           self.id,
      created_at:            self.created_at,
      market_summary:        MarketSummary {
        total_market_sv: self.calculations.total_market_sv,
        brand_sv: self.calculations.brand_sv,
        unique_brand_count: brands.len(),
        active_keyword_count: entities.keywords.len() - deleted_keyword_count,
        deleted_keyword_count,
        total_revenue,
      },
      competitors:           entities.competitors.clone(),
      keywords:              entities.keywords.clone(),
      root_keywords:         entities.root_keywords.clone(),
      deleted_root_keywords: self.deletions.root_keywords.iter().cloned().collect(),
      products:              entities.products.clone(),
      strength_summary:      self.calculations.strength_summary,
    }
  }
}

impl Session {
  pub fn upload_summary(&self) -> UploadSummary {
    UploadSummary {
      analysis_id:       self.id,
      total_keywords:    self.entities.keywords.len(),
      total_competitors: self.entities.competitors.len(),
      total_market_sv:   self.calculations.total_market_sv,
    }
  }

  /// Describe the effect of an already-applied `edit`.
  ///
  /// Keyword and root edits move the market total, so every competitor is
  /// affected. Competitor edits affect the named ASINs; product edits the
  /// named ASINs that are also competitors.
  pub fn edit_outcome(&self, edit: &Edit) -> EditOutcome {
    let named = edit.deleted.iter().chain(&edit.restored);
    let affected_competitors = match edit.target {
      EditTarget::Keywords | EditTarget::RootKeywords => self
        .entities
        .competitors
        .iter()
        .map(|c| c.asin.clone())
        .collect(),
      EditTarget::Competitors => named.cloned().collect(),
      EditTarget::Products => named
        .filter(|asin| self.competitor(asin).is_some())
        .cloned()
        .collect(),
    };

    EditOutcome {
      recalculated: true,
      total_market_sv: self.calculations.total_market_sv,
      affected_competitors,
    }
  }
}
