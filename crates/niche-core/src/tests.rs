//! Scenario tests for `Session` against hand-built row sets.

use chrono::{TimeZone, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
  entity::StrengthLevel,
  row::{BusinessRow, KeywordRow, ProductRow, SourceRows},
  session::{Edit, EditTarget, Session},
};

fn session_from(source: SourceRows) -> Session {
  Session::initialize_at(source, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
}

/// kw1 (1000, A@5), kw2 (500, A@40 B@2), "kw3 brand" (200, brand, B@1).
fn three_keyword_session() -> Session {
  let mut business_a = BusinessRow::new("A");
  business_a.brand = "Acme".into();
  business_a.revenue = "€1.000,50".into();
  let mut business_b = BusinessRow::new("B");
  business_b.brand = "Bolt".into();
  business_b.revenue = "$2,000.25".into();

  session_from(SourceRows {
    keywords: vec![
      KeywordRow::new("kw1", 1000).ranked("A", 5),
      KeywordRow::new("kw2", 500).ranked("A", 40).ranked("B", 2),
      KeywordRow::new("kw3 brand", 200).ranked("B", 1).brand(),
    ],
    business: vec![business_a, business_b],
    products: vec![ProductRow::new("A"), ProductRow::new("C")],
  })
}

fn assert_close(actual: f64, expected: f64) {
  assert!(
    (actual - expected).abs() < 1e-9,
    "expected {expected}, got {actual}"
  );
}

// ─── End-to-end example ──────────────────────────────────────────────────────

#[test]
fn initial_pass_computes_market_and_competitor_strength() {
  let s = three_keyword_session();

  assert_eq!(s.calculations.total_market_sv, 1700);
  assert_eq!(s.calculations.brand_sv, 200);

  let a = &s.calculations.competitor_metrics["A"];
  assert_eq!(a.top30_search_volume, 1000);
  assert_close(a.strength_percentage, 1000.0 / 1700.0 * 100.0);
  assert_eq!(a.strength_level, StrengthLevel::Medio);

  let b = &s.calculations.competitor_metrics["B"];
  assert_eq!(b.top30_search_volume, 700);
  assert_close(b.strength_percentage, 700.0 / 1700.0 * 100.0);
  assert_eq!(b.strength_level, StrengthLevel::Medio);

  assert_eq!(s.calculations.strength_summary.medio, 2);
  assert_eq!(s.calculations.strength_summary.total(), 2);
}

#[test]
fn initial_relevance_comes_from_rankings() {
  let s = three_keyword_session();
  assert_eq!(s.keyword("kw1").unwrap().relevance, 100);
  assert_eq!(s.keyword("kw2").unwrap().relevance, 50);
  assert_eq!(s.keyword("kw3 brand").unwrap().relevance, 0);
}

#[test]
fn deleting_a_keyword_recomputes_everything() {
  let mut s = three_keyword_session();
  s.delete_keywords(&["kw1"]);

  assert_eq!(s.calculations.total_market_sv, 700);
  let a = s.competitor("A").unwrap();
  assert_eq!(a.strength_percentage, 0.0);
  assert_eq!(a.strength_level, StrengthLevel::Debole);
  let b = s.competitor("B").unwrap();
  assert_close(b.strength_percentage, 100.0);
  assert_eq!(b.strength_level, StrengthLevel::MoltoForte);
  assert!(s.keyword("kw1").unwrap().is_deleted);
}

#[test]
fn products_match_top_30_keywords() {
  let s = three_keyword_session();
  let a = s.product("A").unwrap();
  assert_eq!(a.keyword_count, 1);
  assert_eq!(a.matching_keywords, vec!["kw1"]);
  assert_close(a.strength_percentage, 1000.0 / 1700.0 * 100.0);

  let c = s.product("C").unwrap();
  assert_eq!(c.keyword_count, 0);
  assert_eq!(c.strength_level, StrengthLevel::Debole);
}

// ─── Idempotence and round-trips ─────────────────────────────────────────────

#[test]
fn recalculation_is_idempotent() {
  let mut s = three_keyword_session();
  s.delete_competitors(&["B"]);
  let before = s.to_json().unwrap();
  s.recalculate();
  s.recalculate();
  assert_eq!(s.to_json().unwrap(), before);
}

#[test]
fn keyword_delete_then_restore_round_trips() {
  let mut s = three_keyword_session();
  let entities = s.entities.clone();
  let calculations = s.calculations.clone();

  s.delete_keywords(&["kw2"]);
  assert_ne!(s.calculations, calculations);
  s.restore_keywords(&["kw2"]);

  assert_eq!(s.entities, entities);
  assert_eq!(s.calculations, calculations);
}

#[test]
fn batched_edit_applies_deletions_before_restorations() {
  let mut s = three_keyword_session();
  s.apply(&Edit {
    target:   EditTarget::Keywords,
    deleted:  vec!["kw1".into(), "kw2".into()],
    restored: vec!["kw2".into()],
  });
  assert!(s.keyword("kw1").unwrap().is_deleted);
  assert!(!s.keyword("kw2").unwrap().is_deleted);
  assert_eq!(s.calculations.total_market_sv, 700);
}

#[test]
fn unknown_references_are_no_ops() {
  let mut s = three_keyword_session();
  let calculations = s.calculations.clone();
  s.delete_competitors(&["B0DOESNOTEXIST"]);
  s.restore_keywords(&["never deleted"]);
  s.restore_root_keywords(&["ghost"]);
  assert_eq!(s.calculations, calculations);
  assert_eq!(s.view().market_summary.deleted_keyword_count, 0);
}

// ─── Zero division ───────────────────────────────────────────────────────────

#[test]
fn no_active_keywords_means_zero_strength_everywhere() {
  let mut s = three_keyword_session();
  s.delete_keywords(&["kw1", "kw2", "kw3 brand"]);

  assert_eq!(s.calculations.total_market_sv, 0);
  for c in &s.entities.competitors {
    assert_eq!(c.strength_percentage, 0.0);
    assert_eq!(c.strength_level, StrengthLevel::Debole);
  }
  for p in &s.entities.products {
    assert_eq!(p.strength_percentage, 0.0);
    assert_eq!(p.strength_level, StrengthLevel::Debole);
  }
  assert!(s.entities.root_keywords.is_empty());
}

#[test]
fn empty_rows_yield_an_empty_valid_session() {
  let s = session_from(SourceRows::default());
  let view = s.view();
  assert_eq!(view.market_summary.total_market_sv, 0);
  assert_eq!(view.market_summary.total_revenue, 0.0);
  assert_eq!(view.strength_summary.total(), 0);
}

// ─── Root cascade ────────────────────────────────────────────────────────────

fn leash_session() -> Session {
  session_from(SourceRows {
    keywords: vec![
      KeywordRow::new("red dog leash", 100),
      KeywordRow::new("red cat leash", 200),
    ],
    ..SourceRows::default()
  })
}

#[test]
fn deleting_a_root_deletes_only_phrases_containing_it() {
  let mut s = leash_session();
  s.delete_root_keywords(&["dog"]);
  assert!(s.keyword("red dog leash").unwrap().is_deleted);
  assert!(!s.keyword("red cat leash").unwrap().is_deleted);
  assert_eq!(s.calculations.total_market_sv, 200);

  let red = s.root_keyword("red").unwrap();
  assert_eq!(red.total_search_volume, 200);
  assert!(s.root_keyword("dog").is_none());
  assert_eq!(s.view().deleted_root_keywords, vec!["dog"]);
}

#[test]
fn deleting_a_shared_root_deletes_every_phrase() {
  let mut s = leash_session();
  s.delete_root_keywords(&["red"]);
  assert!(s.keyword("red dog leash").unwrap().is_deleted);
  assert!(s.keyword("red cat leash").unwrap().is_deleted);
  assert_eq!(s.calculations.total_market_sv, 0);
}

#[test]
fn restoring_one_root_keeps_phrases_pinned_by_another() {
  let mut s = leash_session();
  s.delete_root_keywords(&["dog", "red"]);
  s.restore_root_keywords(&["red"]);

  assert!(s.keyword("red dog leash").unwrap().is_deleted);
  assert!(!s.keyword("red cat leash").unwrap().is_deleted);
  assert!(s.root_keyword("red").is_some_and(|r| !r.is_deleted));

  s.restore_root_keywords(&["dog"]);
  assert!(!s.keyword("red dog leash").unwrap().is_deleted);
  assert_eq!(s.calculations.total_market_sv, 300);
}

#[test]
fn keyword_restore_does_not_restore_its_root() {
  let mut s = leash_session();
  s.delete_root_keywords(&["dog"]);
  s.restore_keywords(&["red dog leash"]);

  assert!(!s.keyword("red dog leash").unwrap().is_deleted);
  assert!(s.deletions.is_root_deleted("dog"));
  assert!(s.root_keyword("dog").is_some_and(|r| r.is_deleted));
}

// ─── Product / competitor cascade ────────────────────────────────────────────

#[test]
fn product_delete_hides_competitor_and_restore_brings_it_back() {
  let mut s = three_keyword_session();
  s.delete_products(&["A"]);

  assert!(s.product("A").unwrap().is_deleted);
  assert!(s.competitor("A").unwrap().is_deleted);
  assert!(!s.calculations.competitor_metrics.contains_key("A"));
  assert_eq!(s.calculations.strength_summary.total(), 1);
  // Deleted products are still scored.
  assert_eq!(s.product("A").unwrap().keyword_count, 1);

  s.restore_products(&["A"]);
  assert!(!s.product("A").unwrap().is_deleted);
  assert!(!s.competitor("A").unwrap().is_deleted);
  assert!(s.calculations.competitor_metrics.contains_key("A"));
}

#[test]
fn competitor_delete_does_not_hide_product() {
  let mut s = three_keyword_session();
  s.delete_competitors(&["A"]);
  assert!(s.competitor("A").unwrap().is_deleted);
  assert!(!s.product("A").unwrap().is_deleted);

  s.delete_products(&["A"]);
  s.restore_competitors(&["A"]);
  assert!(!s.competitor("A").unwrap().is_deleted);
  assert!(s.product("A").unwrap().is_deleted);
}

// ─── View ────────────────────────────────────────────────────────────────────

#[test]
fn view_summarises_active_competitors() {
  let mut s = three_keyword_session();
  let view = s.view();
  assert_eq!(view.market_summary.unique_brand_count, 2);
  assert_close(view.market_summary.total_revenue, 1000.5 + 2000.25);
  assert_eq!(view.market_summary.active_keyword_count, 3);

  s.delete_competitors(&["B"]);
  s.delete_keywords(&["kw2"]);
  let view = s.view();
  assert_eq!(view.market_summary.unique_brand_count, 1);
  assert_close(view.market_summary.total_revenue, 1000.5);
  assert_eq!(view.market_summary.active_keyword_count, 2);
  assert_eq!(view.market_summary.deleted_keyword_count, 1);
  assert_eq!(view.competitors.len(), 2);
}

#[test]
fn edit_outcome_names_affected_competitors() {
  let mut s = three_keyword_session();

  let edit = Edit::delete(EditTarget::Keywords, &["kw1"]);
  s.apply(&edit);
  let outcome = s.edit_outcome(&edit);
  assert!(outcome.recalculated);
  assert_eq!(outcome.total_market_sv, 700);
  assert_eq!(outcome.affected_competitors, vec!["A", "B"]);

  let edit = Edit {
    target:   EditTarget::Competitors,
    deleted:  vec!["B".into()],
    restored: vec!["Z".into()],
  };
  s.apply(&edit);
  assert_eq!(s.edit_outcome(&edit).affected_competitors, vec!["B", "Z"]);

  let edit = Edit::delete(EditTarget::Products, &["A", "C"]);
  s.apply(&edit);
  assert_eq!(s.edit_outcome(&edit).affected_competitors, vec!["A"]);
}

#[test]
fn upload_summary_counts_entities() {
  let s = three_keyword_session();
  let summary = s.upload_summary();
  assert_eq!(summary.analysis_id, s.id);
  assert_eq!(summary.total_keywords, 3);
  assert_eq!(summary.total_competitors, 2);
  assert_eq!(summary.total_market_sv, 1700);
}

#[test]
fn session_survives_a_json_round_trip() {
  let mut s = three_keyword_session();
  s.delete_root_keywords(&["brand"]);
  let restored = Session::from_json(&s.to_json().unwrap()).unwrap();
  assert_eq!(restored, s);
}

// ─── Randomised invariants ───────────────────────────────────────────────────

const ASINS: [&str; 5] = ["B0A", "B0B", "B0C", "B0D", "B0E"];

fn random_session(rng: &mut StdRng) -> Session {
  let keywords = (0..rng.random_range(0..40))
    .map(|i| {
      let mut row = KeywordRow::new(format!("phrase {i} word{}", i % 7), rng.random_range(0..5000));
      row.is_brand = rng.random_bool(0.2);
      for asin in ASINS {
        if rng.random_bool(0.6) {
          row.rankings.insert(asin.to_owned(), rng.random_range(1..60));
        }
      }
      row
    })
    .collect();

  session_from(SourceRows {
    keywords,
    business: ASINS.iter().map(|a| BusinessRow::new(*a)).collect(),
    products: ASINS.iter().map(|a| ProductRow::new(*a)).collect(),
  })
}

#[test]
fn randomised_invariants_hold_under_edits() {
  let mut rng = StdRng::seed_from_u64(0x5eed);

  for _ in 0..50 {
    let mut s = random_session(&mut rng);

    let phrases: Vec<String> = s
      .entities
      .keywords
      .iter()
      .filter(|_| rng.random_bool(0.3))
      .map(|k| k.phrase.clone())
      .collect();
    let phrases: Vec<&str> = phrases.iter().map(String::as_str).collect();
    s.delete_keywords(&phrases);
    if rng.random_bool(0.5) {
      s.delete_root_keywords(&["word3"]);
    }
    if rng.random_bool(0.5) {
      s.delete_products(&["B0C"]);
    }

    // Conservation.
    let expected: u64 = s
      .entities
      .keywords
      .iter()
      .filter(|k| !s.deletions.is_keyword_deleted(&k.phrase))
      .map(|k| k.search_volume)
      .sum();
    assert_eq!(s.calculations.total_market_sv, expected);

    // Bounds and tier consistency.
    for c in s.entities.competitors.iter().filter(|c| !c.is_deleted) {
      assert!((0.0..=100.0 + 1e-9).contains(&c.strength_percentage));
      assert_eq!(c.strength_level, StrengthLevel::from_percentage(c.strength_percentage));
      assert_eq!(c.strength_percentage >= 80.0, c.strength_level == StrengthLevel::MoltoForte);
    }
    for p in &s.entities.products {
      assert!((0.0..=100.0 + 1e-9).contains(&p.strength_percentage));
      assert_eq!(p.strength_level, StrengthLevel::from_percentage(p.strength_percentage));
    }

    // Flags mirror the sets.
    for k in &s.entities.keywords {
      assert_eq!(k.is_deleted, s.deletions.is_keyword_deleted(&k.phrase));
    }
    assert_eq!(
      s.calculations.strength_summary.total(),
      s.entities.competitors.iter().filter(|c| !c.is_deleted).count(),
    );
  }
}
