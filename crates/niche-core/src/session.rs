//! [`Session`]: the aggregate root for one niche analysis.
//!
//! A session owns its source rows (immutable after ingestion), the entity
//! collections, the soft-delete sets and the last computed
//! [`Calculations`]. Every mutating method leaves the session fully
//! recalculated; callers never observe a half-applied edit.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  deletion::DeletionState,
  engine::{self, Calculations},
  entity::{Competitor, Entities, Keyword, Product, RootKeyword},
  join, roots,
  row::SourceRows,
  Error, Result,
};

// ─── Edits ───────────────────────────────────────────────────────────────────

/// Which entity kind an [`Edit`] addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
  Keywords,
  RootKeywords,
  Competitors,
  Products,
}

impl EditTarget {
  /// Whether an edit of this kind changes keyword membership.
  fn touches_keywords(self) -> bool {
    matches!(self, Self::Keywords | Self::RootKeywords)
  }
}

impl fmt::Display for EditTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Keywords => "keywords",
      Self::RootKeywords => "root-keywords",
      Self::Competitors => "competitors",
      Self::Products => "products",
    })
  }
}

impl FromStr for EditTarget {
  type Err = Error;

  /// Accepts the path spelling (`root-keywords`) as well as the serde one.
  fn from_str(s: &str) -> Result<Self> {
    match s {
      "keywords" => Ok(Self::Keywords),
      "root-keywords" | "root_keywords" => Ok(Self::RootKeywords),
      "competitors" => Ok(Self::Competitors),
      "products" => Ok(Self::Products),
      other => Err(Error::UnknownEditTarget(other.to_owned())),
    }
  }
}

/// A batched delete/restore request. Deletions apply before restorations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
  pub target:   EditTarget,
  #[serde(default)]
  pub deleted:  Vec<String>,
  #[serde(default)]
  pub restored: Vec<String>,
}

impl Edit {
  pub fn delete(target: EditTarget, keys: &[&str]) -> Self {
    Self {
      target,
      deleted: keys.iter().map(|k| (*k).to_owned()).collect(),
      restored: Vec::new(),
    }
  }

  pub fn restore(target: EditTarget, keys: &[&str]) -> Self {
    Self {
      target,
      deleted: Vec::new(),
      restored: keys.iter().map(|k| (*k).to_owned()).collect(),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One analysis: source rows, entities, soft-delete state and the results of
/// the last recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub id:           Uuid,
  pub created_at:   DateTime<Utc>,
  pub source:       SourceRows,
  pub entities:     Entities,
  pub deletions:    DeletionState,
  pub calculations: Calculations,
}

impl Session {
  /// Join the rows into entities and run the first recalculation.
  pub fn initialize(source: SourceRows) -> Self {
    Self::initialize_at(source, Utc::now())
  }

  /// As [`Session::initialize`], with an explicit clock for listing ages.
  pub fn initialize_at(source: SourceRows, now: DateTime<Utc>) -> Self {
    let entities = Entities {
      keywords:      join::build_keywords(&source.keywords),
      competitors:   join::build_competitors(&source.business, &source.products, now),
      products:      join::build_products(&source.products),
      root_keywords: Vec::new(),
    };

    let mut session = Self {
      id: Uuid::new_v4(),
      created_at: now,
      source,
      entities,
      deletions: DeletionState::default(),
      calculations: Calculations::default(),
    };
    session.refresh_root_keywords();
    session.recalculate();

    tracing::info!(
      session_id = %session.id,
      keywords = session.entities.keywords.len(),
      competitors = session.entities.competitors.len(),
      products = session.entities.products.len(),
      total_market_sv = session.calculations.total_market_sv,
      "initialized session",
    );
    session
  }

  /// Full recalculation pass. Idempotent for unchanged state.
  pub fn recalculate(&mut self) {
    self.calculations = engine::recalculate(&mut self.entities, &self.deletions);
  }

  fn refresh_root_keywords(&mut self) {
    self.entities.root_keywords =
      roots::aggregate(&self.entities.keywords, &self.deletions);
  }

  /// Apply a batched edit and recalculate once.
  pub fn apply(&mut self, edit: &Edit) {
    tracing::info!(
      session_id = %self.id,
      target = %edit.target,
      deleted = edit.deleted.len(),
      restored = edit.restored.len(),
      "applying edit",
    );
    self.apply_deletions(edit.target, &edit.deleted);
    self.apply_restorations(edit.target, &edit.restored);
    if edit.target.touches_keywords() {
      self.refresh_root_keywords();
    }
    self.recalculate();
  }

  fn apply_deletions(&mut self, target: EditTarget, keys: &[String]) {
    if keys.is_empty() {
      return;
    }
    let deletions = &mut self.deletions;
    match target {
      EditTarget::Keywords => deletions.delete_keywords(keys.iter().cloned()),
      EditTarget::RootKeywords => {
        roots::delete_roots(&self.entities.keywords, deletions, keys)
      }
      EditTarget::Competitors => deletions.delete_competitors(keys.iter().cloned()),
      EditTarget::Products => deletions.delete_products(keys.iter().cloned()),
    }
  }

  fn apply_restorations(&mut self, target: EditTarget, keys: &[String]) {
    if keys.is_empty() {
      return;
    }
    let deletions = &mut self.deletions;
    match target {
      EditTarget::Keywords => deletions.restore_keywords(keys),
      EditTarget::RootKeywords => {
        roots::restore_roots(&self.entities.keywords, deletions, keys)
      }
      EditTarget::Competitors => deletions.restore_competitors(keys),
      EditTarget::Products => deletions.restore_products(keys),
    }
  }

  // ── Per-kind operations ───────────────────────────────────────────────────

  pub fn delete_keywords(&mut self, phrases: &[&str]) {
    self.apply(&Edit::delete(EditTarget::Keywords, phrases));
  }

  pub fn restore_keywords(&mut self, phrases: &[&str]) {
    self.apply(&Edit::restore(EditTarget::Keywords, phrases));
  }

  /// Deletes the roots and every keyword containing one of them.
  pub fn delete_root_keywords(&mut self, roots: &[&str]) {
    self.apply(&Edit::delete(EditTarget::RootKeywords, roots));
  }

  /// Restores the roots; a keyword comes back only once none of its roots
  /// is still deleted.
  pub fn restore_root_keywords(&mut self, roots: &[&str]) {
    self.apply(&Edit::restore(EditTarget::RootKeywords, roots));
  }

  pub fn delete_competitors(&mut self, asins: &[&str]) {
    self.apply(&Edit::delete(EditTarget::Competitors, asins));
  }

  pub fn restore_competitors(&mut self, asins: &[&str]) {
    self.apply(&Edit::restore(EditTarget::Competitors, asins));
  }

  /// Deletes the products and the competitors sharing their ASINs.
  pub fn delete_products(&mut self, asins: &[&str]) {
    self.apply(&Edit::delete(EditTarget::Products, asins));
  }

  /// Restores the products and the competitors sharing their ASINs.
  pub fn restore_products(&mut self, asins: &[&str]) {
    self.apply(&Edit::restore(EditTarget::Products, asins));
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub fn keyword(&self, phrase: &str) -> Option<&Keyword> {
    self.entities.keywords.iter().find(|k| k.phrase == phrase)
  }

  pub fn competitor(&self, asin: &str) -> Option<&Competitor> {
    self.entities.competitors.iter().find(|c| c.asin == asin)
  }

  pub fn product(&self, asin: &str) -> Option<&Product> {
    self.entities.products.iter().find(|p| p.asin == asin)
  }

  pub fn root_keyword(&self, root: &str) -> Option<&RootKeyword> {
    self.entities.root_keywords.iter().find(|r| r.root_word == root)
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// Serialise the whole aggregate as a JSON document.
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  /// Inverse of [`Session::to_json`].
  pub fn from_json(document: &str) -> Result<Self> {
    Ok(serde_json::from_str(document)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn edit_targets_parse_their_display_form() {
    for target in [
      EditTarget::Keywords,
      EditTarget::RootKeywords,
      EditTarget::Competitors,
      EditTarget::Products,
    ] {
      assert_eq!(target.to_string().parse::<EditTarget>().unwrap(), target);
    }
    assert_eq!(
      "root_keywords".parse::<EditTarget>().unwrap(),
      EditTarget::RootKeywords
    );
  }

  #[test]
  fn unknown_edit_target_is_an_error() {
    let err = "brands".parse::<EditTarget>().unwrap_err();
    assert!(matches!(err, Error::UnknownEditTarget(t) if t == "brands"));
  }

  #[test]
  fn edit_body_fields_default_to_empty() {
    let edit: Edit = serde_json::from_str(r#"{"target":"root_keywords"}"#).unwrap();
    assert_eq!(edit.target, EditTarget::RootKeywords);
    assert!(edit.deleted.is_empty() && edit.restored.is_empty());
  }
}
