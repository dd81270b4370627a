//! Entity join: turns the three row sets into keywords, competitors and
//! products, computing the one-time fields (relevance, listing age,
//! variation count, parsed revenue).
//!
//! Rows missing their identity (empty phrase or ASIN) are skipped; duplicate
//! keys are resolved here so every entity collection is keyed uniquely.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
  amount::parse_amount,
  entity::{Competitor, Keyword, Product, StrengthLevel, is_top_ranked},
  row::{BusinessRow, KeywordRow, ProductRow},
};

/// Days per month used for listing age.
const DAYS_PER_MONTH: i64 = 30;

/// Relevance of a keyword: 0 for brand keywords, otherwise the rounded
/// percentage of its rankings that fall in the top 30.
pub fn keyword_relevance(row: &KeywordRow, is_brand: bool) -> u32 {
  if is_brand || row.rankings.is_empty() {
    return 0;
  }
  let in_top = row.rankings.values().filter(|p| is_top_ranked(**p)).count();
  (100.0 * in_top as f64 / row.rankings.len() as f64).round() as u32
}

/// `ceil(|now - created| in days / 30)`. A missing creation date yields 0.
pub fn listing_age_months(
  created: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> u32 {
  let Some(created) = created else {
    return 0;
  };
  let millis = (now - created).num_milliseconds().unsigned_abs();
  let month_millis = (DAYS_PER_MONTH * 24 * 60 * 60 * 1000) as u64;
  millis.div_ceil(month_millis) as u32
}

/// Number of listed variations; an empty list counts as one listing.
pub fn variation_count(variation_asins: &[String]) -> u32 {
  variation_asins.len().max(1) as u32
}

/// Build keywords, keeping the first row for each phrase.
pub fn build_keywords(rows: &[KeywordRow]) -> Vec<Keyword> {
  let mut seen = HashSet::new();
  let mut keywords = Vec::with_capacity(rows.len());

  for row in rows {
    if row.phrase.trim().is_empty() {
      continue;
    }
    if !seen.insert(row.phrase.as_str()) {
      tracing::debug!(phrase = %row.phrase, "skipping duplicate keyword row");
      continue;
    }

    let brand_word = row
      .brand_word
      .as_deref()
      .map(str::trim)
      .filter(|w| !w.is_empty())
      .map(str::to_owned);
    let is_brand = row.is_brand || brand_word.is_some();
    let relevance = keyword_relevance(row, is_brand);

    if let Some(source) = row.source_relevance
      && keywords.len() < 3
    {
      tracing::debug!(
        phrase = %row.phrase,
        source_relevance = source,
        computed_relevance = relevance,
        "keyword relevance recomputed from rankings",
      );
    }

    keywords.push(Keyword {
      phrase: row.phrase.clone(),
      search_volume: row.search_volume,
      is_brand,
      brand_word,
      relevance,
      source_relevance: row.source_relevance,
      rankings: row.rankings.clone(),
      is_deleted: false,
    });
  }

  keywords
}

/// Build one competitor per distinct business-row ASIN. A later row for the
/// same ASIN replaces the earlier one but keeps its position. Brand and
/// image fall back to the catalog row, then to `"Unknown"` / empty.
pub fn build_competitors(
  business: &[BusinessRow],
  products: &[ProductRow],
  now: DateTime<Utc>,
) -> Vec<Competitor> {
  let mut catalog: HashMap<&str, &ProductRow> = HashMap::new();
  for product in products {
    catalog.entry(product.asin.as_str()).or_insert(product);
  }

  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut competitors: Vec<Competitor> = Vec::new();

  for row in business {
    if row.asin.trim().is_empty() {
      continue;
    }
    let product = catalog.get(row.asin.as_str()).copied();

    let competitor = Competitor {
      asin:                row.asin.clone(),
      brand:               first_non_empty(&[
        row.brand.as_str(),
        product.map_or("", |p| p.brand.as_str()),
      ])
      .unwrap_or("Unknown")
      .to_owned(),
      image_url:           first_non_empty(&[
        row.image_url.as_str(),
        product.map_or("", |p| p.image_url.as_str()),
      ])
      .unwrap_or_default()
      .to_owned(),
      seller_country:      row.seller_country.clone(),
      rating:              row.rating,
      listing_age_months:  listing_age_months(row.creation_date, now),
      price:               row.price.clone(),
      sales:               row.sales,
      revenue:             row.revenue.clone(),
      revenue_amount:      parse_amount(&row.revenue),
      category:            row.category.clone(),
      fulfillment:         row.fulfillment.clone(),
      variation_count:     variation_count(
        product.map_or(&[][..], |p| p.variation_asins.as_slice()),
      ),
      strength_percentage: 0.0,
      strength_level:      StrengthLevel::Debole,
      is_deleted:          false,
    };

    match index.get(row.asin.as_str()).copied() {
      Some(i) => competitors[i] = competitor,
      None => {
        index.insert(row.asin.as_str(), competitors.len());
        competitors.push(competitor);
      }
    }
  }

  competitors
}

/// Build one product per distinct catalog ASIN (first row wins). Scores
/// start at zero and are filled in by the first recalculation pass.
pub fn build_products(rows: &[ProductRow]) -> Vec<Product> {
  let mut seen = HashSet::new();
  rows
    .iter()
    .filter(|row| !row.asin.trim().is_empty())
    .filter(|row| seen.insert(row.asin.as_str()))
    .map(|row| Product {
      asin:                row.asin.clone(),
      brand:               first_non_empty(&[row.brand.as_str()])
        .unwrap_or("Unknown")
        .to_owned(),
      title:               first_non_empty(&[row.title.as_str()])
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Product {}", row.asin)),
      image_url:           row.image_url.clone(),
      image_url_sample:    row.image_url_sample.clone(),
      image_count:         row.image_count,
      features:            row.features.clone(),
      variation_asins:     row.variation_asins.clone(),
      keyword_count:       0,
      matching_keywords:   Vec::new(),
      strength_percentage: 0.0,
      strength_level:      StrengthLevel::Debole,
      is_deleted:          false,
    })
    .collect()
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str> {
  candidates.iter().copied().find(|s| !s.is_empty())
}
