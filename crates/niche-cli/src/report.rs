//! Plain-text rendering of an [`AnalysisView`].

use std::io::{self, Write};

use niche_core::{entity::StrengthLevel, view::AnalysisView};

/// Rows shown in the competitor and root-keyword tables.
const TOP_N: usize = 10;
const BAR_WIDTH: usize = 30;

/// `1234567` → `"1,234,567"`.
fn grouped(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

fn bar(count: usize, max: usize) -> String {
  if max == 0 {
    return String::new();
  }
  "█".repeat((count * BAR_WIDTH).div_ceil(max))
}

/// Write the market summary, the strength histogram, the strongest active
/// competitors and the largest root keywords.
pub fn render(view: &AnalysisView, out: &mut impl Write) -> io::Result<()> {
  let market = &view.market_summary;

  writeln!(
    out,
    "Analysis {} ({})",
    view.analysis_id,
    view.created_at.format("%Y-%m-%d %H:%M UTC")
  )?;

  writeln!(out, "\nMarket")?;
  writeln!(out, "  Search volume      {}", grouped(market.total_market_sv))?;
  writeln!(out, "  Brand volume       {}", grouped(market.brand_sv))?;
  writeln!(
    out,
    "  Keywords           {} active, {} deleted",
    market.active_keyword_count, market.deleted_keyword_count
  )?;
  writeln!(out, "  Brands             {}", market.unique_brand_count)?;
  writeln!(out, "  Revenue            {:.2}", market.total_revenue)?;

  let summary = &view.strength_summary;
  let tiers = [
    (StrengthLevel::MoltoForte, summary.molto_forte),
    (StrengthLevel::Forte, summary.forte),
    (StrengthLevel::Medio, summary.medio),
    (StrengthLevel::Debole, summary.debole),
  ];
  let max = tiers.iter().map(|(_, n)| *n).max().unwrap_or(0);
  writeln!(out, "\nCompetitor strength")?;
  for (level, count) in tiers {
    writeln!(out, "  {:<12} {:>4} {}", level.label(), count, bar(count, max))?;
  }

  let mut competitors: Vec<_> =
    view.competitors.iter().filter(|c| !c.is_deleted).collect();
  competitors.sort_by(|a, b| b.strength_percentage.total_cmp(&a.strength_percentage));
  writeln!(out, "\nTop competitors")?;
  if competitors.is_empty() {
    writeln!(out, "  (none)")?;
  }
  for c in competitors.into_iter().take(TOP_N) {
    writeln!(
      out,
      "  {:<12} {:<20} {:>6.1}%  {}",
      c.asin,
      c.brand,
      c.strength_percentage,
      c.strength_level
    )?;
  }

  writeln!(out, "\nTop root keywords")?;
  if view.root_keywords.is_empty() {
    writeln!(out, "  (none)")?;
  }
  for root in view.root_keywords.iter().take(TOP_N) {
    writeln!(
      out,
      "  {:<20} {:>10} sv  {:>3} phrases  {:>3}% brand",
      root.root_word,
      grouped(root.total_search_volume),
      root.total_count,
      root.brand_percentage
    )?;
  }
  if !view.deleted_root_keywords.is_empty() {
    writeln!(
      out,
      "  deleted: {}",
      view.deleted_root_keywords.join(", ")
    )?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use niche_core::{
    row::{BusinessRow, KeywordRow, SourceRows},
    session::Session,
  };

  use super::*;

  fn session() -> Session {
    let mut acme = BusinessRow::new("B0AAA");
    acme.brand = "Acme".into();
    Session::initialize(SourceRows {
      keywords: vec![
        KeywordRow::new("dog leash", 1_250_000).ranked("B0AAA", 3),
        KeywordRow::new("cat collar", 250_000),
      ],
      business: vec![acme, BusinessRow::new("B0BBB")],
      products: Vec::new(),
    })
  }

  fn rendered(session: &Session) -> String {
    let mut out = Vec::new();
    render(&session.view(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn grouped_inserts_thousands_separators() {
    assert_eq!(grouped(0), "0");
    assert_eq!(grouped(999), "999");
    assert_eq!(grouped(1000), "1,000");
    assert_eq!(grouped(1_234_567), "1,234,567");
  }

  #[test]
  fn report_lists_market_competitors_and_roots() {
    let text = rendered(&session());
    assert!(text.contains("Search volume      1,500,000"));
    assert!(text.contains("2 active, 0 deleted"));
    assert!(text.contains("Molto Forte"));
    assert!(text.contains("B0AAA        Acme"));
    assert!(text.contains("83.3%"));
    assert!(text.contains("leash"));
  }

  #[test]
  fn deleted_competitors_and_roots_are_reported_apart() {
    let mut s = session();
    s.delete_competitors(&["B0AAA"]);
    s.delete_root_keywords(&["cat"]);
    let text = rendered(&s);
    assert!(!text.contains("B0AAA"));
    assert!(text.contains("deleted: cat"));
  }
}
