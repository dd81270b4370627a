//! Soft-delete membership: the single source of truth for which entities
//! are excluded from aggregate math.
//!
//! Operations here only touch the sets. Cascades are one-way and defined per
//! operation; there is no graph closure. Naming a phrase or ASIN that does not
//! exist is a harmless no-op.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The four independent soft-delete sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionState {
  /// Keyword phrases.
  pub keywords:      BTreeSet<String>,
  /// Lowercase root words.
  pub root_keywords: BTreeSet<String>,
  /// Competitor ASINs.
  pub competitors:   BTreeSet<String>,
  /// Product ASINs.
  pub products:      BTreeSet<String>,
}

impl DeletionState {
  pub fn is_keyword_deleted(&self, phrase: &str) -> bool {
    self.keywords.contains(phrase)
  }

  pub fn is_root_deleted(&self, root: &str) -> bool {
    self.root_keywords.contains(root)
  }

  pub fn is_competitor_deleted(&self, asin: &str) -> bool {
    self.competitors.contains(asin)
  }

  pub fn is_product_deleted(&self, asin: &str) -> bool {
    self.products.contains(asin)
  }

  // ── Keywords ──────────────────────────────────────────────────────────────

  pub fn delete_keywords<I, S>(&mut self, phrases: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.keywords.extend(phrases.into_iter().map(Into::into));
  }

  pub fn restore_keywords<I, S>(&mut self, phrases: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for phrase in phrases {
      self.keywords.remove(phrase.as_ref());
    }
  }

  // ── Competitors ───────────────────────────────────────────────────────────

  /// Hides competitors only. Products sharing the ASIN are untouched.
  pub fn delete_competitors<I, S>(&mut self, asins: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.competitors.extend(asins.into_iter().map(Into::into));
  }

  pub fn restore_competitors<I, S>(&mut self, asins: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for asin in asins {
      self.competitors.remove(asin.as_ref());
    }
  }

  // ── Products ──────────────────────────────────────────────────────────────

  /// Hides the products and the competitors sharing their ASINs.
  pub fn delete_products<I, S>(&mut self, asins: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    for asin in asins {
      let asin = asin.into();
      self.competitors.insert(asin.clone());
      self.products.insert(asin);
    }
  }

  /// Restores the products and the competitors sharing their ASINs.
  pub fn restore_products<I, S>(&mut self, asins: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for asin in asins {
      let asin = asin.as_ref();
      self.products.remove(asin);
      self.competitors.remove(asin);
    }
  }
}
