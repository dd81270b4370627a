//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use niche_core::{
  row::{BusinessRow, KeywordRow, SourceRows},
  session::{Edit, EditTarget, Session},
  store::SessionStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn rows() -> SourceRows {
  SourceRows {
    keywords: vec![
      KeywordRow::new("dog leash", 1000).ranked("B0A", 3),
      KeywordRow::new("cat leash", 400).ranked("B0B", 9),
    ],
    business: vec![BusinessRow::new("B0A"), BusinessRow::new("B0B")],
    products: Vec::new(),
  }
}

fn session_at(days_ago: i64) -> Session {
  let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
  Session::initialize_at(rows(), base - Duration::days(days_ago))
}

// ─── Save / load ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_load_returns_the_same_session() {
  let s = store().await;
  let session = session_at(0);

  s.save(&session).await.unwrap();
  let loaded = s.load(session.id).await.unwrap().expect("stored session");

  assert_eq!(loaded, session);
}

#[tokio::test]
async fn load_missing_returns_none() {
  let s = store().await;
  assert!(s.load(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn saving_again_replaces_the_document() {
  let s = store().await;
  let mut session = session_at(0);
  s.save(&session).await.unwrap();

  session.apply(&Edit::delete(EditTarget::Keywords, &["dog leash"]));
  s.save(&session).await.unwrap();

  let loaded = s.load(session.id).await.unwrap().unwrap();
  assert_eq!(loaded.calculations.total_market_sv, 400);
  assert!(loaded.keyword("dog leash").unwrap().is_deleted);
  assert!(loaded.deletions.is_keyword_deleted("dog leash"));

  let listed = s.list().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].total_market_sv, 400);
}

#[tokio::test]
async fn loaded_session_keeps_accepting_edits() {
  let s = store().await;
  let mut session = session_at(0);
  session.delete_competitors(&["B0B"]);
  s.save(&session).await.unwrap();

  let mut loaded = s.load(session.id).await.unwrap().unwrap();
  loaded.restore_competitors(&["B0B"]);
  session.restore_competitors(&["B0B"]);

  assert_eq!(loaded, session);
  assert!(!loaded.competitor("B0B").unwrap().is_deleted);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_empty_for_a_new_store() {
  let s = store().await;
  assert!(s.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_newest_first_with_counts() {
  let s = store().await;
  let oldest = session_at(10);
  let newest = session_at(0);
  let middle = session_at(5);
  for session in [&oldest, &newest, &middle] {
    s.save(session).await.unwrap();
  }

  let listed = s.list().await.unwrap();
  let ids: Vec<Uuid> = listed.iter().map(|summary| summary.id).collect();
  assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

  let first = &listed[0];
  assert_eq!(first.created_at, newest.created_at);
  assert_eq!(first.keyword_count, 2);
  assert_eq!(first.competitor_count, 2);
  assert_eq!(first.product_count, 0);
  assert_eq!(first.total_market_sv, 1400);
}

// ─── Ingested sessions ───────────────────────────────────────────────────────

#[tokio::test]
async fn parsed_exports_survive_storage() {
  let keywords = "Keyword Phrase,Search Volume,B0A\nblue leash,250,4\n";
  let business = "ASIN,Brand,ASIN Revenue,Creation Date\nB0A,Acme,\"€1.234,56\",2024-01-15\n";
  let products = "ASIN,Titolo,ASIN di variazione\nB0A,Blue Leash,\"B0A1,B0A2\"\n";
  let rows = niche_csv::parse_exports(keywords, business, products).unwrap();
  let session = Session::initialize(rows);

  let s = store().await;
  s.save(&session).await.unwrap();
  let loaded = s.load(session.id).await.unwrap().unwrap();

  let competitor = loaded.competitor("B0A").unwrap();
  assert_eq!(competitor.revenue, "€1.234,56");
  assert_eq!(competitor.revenue_amount, 1234.56);
  assert_eq!(competitor.variation_count, 2);
  assert_eq!(loaded.product("B0A").unwrap().title, "Blue Leash");
  assert_eq!(loaded, session);
}
