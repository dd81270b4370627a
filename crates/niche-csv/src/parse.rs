//! Column-aware reading of the three exports.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use niche_core::row::{BusinessRow, KeywordRow, ProductRow};
use tracing::debug;

use crate::{
  cells,
  error::{Error, Result},
};

// ─── Column names ───────────────────────────────────────────────────────────

pub const KEYWORD_PHRASE: &str = "Keyword Phrase";
pub const SEARCH_VOLUME: &str = "Search Volume";
pub const RELEVANCE: [&str; 3] = ["Rilevanza", "Relevance", "relevance"];
pub const IS_BRAND: &str = "Is_Brand";
pub const BRAND_WORD: &str = "Brand_Word";
/// Keyword-export columns whose header starts with this are per-ASIN rankings.
pub const RANKING_PREFIX: &str = "B0";

pub const ASIN: &str = "ASIN";
pub const BRAND: &str = "Brand";
pub const IMAGE_URL: &str = "Image URL";
pub const SELLER_COUNTRY: &str = "Seller Country/Region";
pub const RATINGS: &str = "Ratings";
pub const CREATION_DATE: &str = "Creation Date";
pub const PRICE: &str = "Price €";
pub const SALES: &str = "ASIN Sales";
pub const REVENUE: &str = "ASIN Revenue";
pub const CATEGORY: &str = "Category";
pub const FULFILLMENT: &str = "Fulfillment";

pub const MARCA: &str = "Marca";
pub const IMMAGINE: &str = "Immagine";
pub const IMMAGINE_CAMPIONE: &str = "Immagine campione";
pub const CONTEGGIO_IMMAGINI: &str = "Conteggio delle immagini";
pub const TITOLO: &str = "Titolo";
pub const FEATURE_PREFIX: &str = "Descrizione & Funzionalità: Funzione ";
pub const FEATURE_COUNT: usize = 5;
pub const ASIN_VARIAZIONE: &str = "ASIN di variazione";

// ─── Table ──────────────────────────────────────────────────────────────────

const BOM: char = '\u{feff}';

/// A parsed export: its header index plus the data records.
struct Table {
  export:  &'static str,
  columns: HashMap<String, usize>,
  headers: Vec<String>,
  records: Vec<StringRecord>,
}

impl Table {
  fn read(export: &'static str, input: &str) -> Result<Self> {
    let mut reader = ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .trim(Trim::All)
      .from_reader(input.as_bytes());

    let headers: Vec<String> = reader
      .headers()?
      .iter()
      .enumerate()
      .map(|(i, h)| {
        if i == 0 {
          h.trim_start_matches(BOM).trim().to_owned()
        } else {
          h.to_owned()
        }
      })
      .collect();

    let mut columns = HashMap::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
      columns.entry(h.clone()).or_insert(i);
    }

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    debug!(export, columns = headers.len(), records = records.len(), "read export");

    Ok(Self {
      export,
      columns,
      headers,
      records,
    })
  }

  fn require(&self, column: &'static str) -> Result<()> {
    if self.columns.contains_key(column) {
      Ok(())
    } else {
      Err(Error::MissingColumn {
        export: self.export,
        column,
      })
    }
  }

  fn rows(&self) -> impl Iterator<Item = Row<'_>> {
    self.records.iter().map(move |record| Row {
      table: self,
      record,
    })
  }
}

struct Row<'a> {
  table:  &'a Table,
  record: &'a StringRecord,
}

impl<'a> Row<'a> {
  /// The cell under `column`, or `""` when the column or cell is absent.
  fn get(&self, column: &str) -> &'a str {
    self
      .table
      .columns
      .get(column)
      .and_then(|i| self.record.get(*i))
      .unwrap_or_default()
  }

  fn first_of(&self, columns: &[&str]) -> &'a str {
    columns
      .iter()
      .map(|c| self.get(c))
      .find(|v| !v.is_empty())
      .unwrap_or_default()
  }

  fn owned(&self, column: &str) -> String { self.get(column).to_owned() }
}

// ─── Exports ────────────────────────────────────────────────────────────────

/// Parse the keyword export. Rows with an empty phrase or zero search volume
/// are dropped.
pub fn parse_keywords(input: &str) -> Result<Vec<KeywordRow>> {
  let table = Table::read("keyword", input)?;
  table.require(KEYWORD_PHRASE)?;

  let ranking_columns: Vec<(usize, &str)> = table
    .headers
    .iter()
    .enumerate()
    .filter(|(_, h)| h.starts_with(RANKING_PREFIX))
    .map(|(i, h)| (i, h.as_str()))
    .collect();

  let rows: Vec<KeywordRow> = table
    .rows()
    .filter_map(|row| {
      let phrase = row.get(KEYWORD_PHRASE);
      let search_volume = cells::count(row.get(SEARCH_VOLUME));
      if phrase.is_empty() || search_volume == 0 {
        return None;
      }

      let relevance = row.first_of(&RELEVANCE);
      let brand_word = row.get(BRAND_WORD);
      let rankings = ranking_columns
        .iter()
        .filter_map(|(i, asin)| {
          let position = cells::ranking(row.record.get(*i)?)?;
          Some(((*asin).to_owned(), position))
        })
        .collect();

      Some(KeywordRow {
        phrase: phrase.to_owned(),
        search_volume,
        source_relevance: (!relevance.is_empty())
          .then(|| niche_core::amount::parse_leading_float(relevance)),
        is_brand: cells::flag(row.get(IS_BRAND)),
        brand_word: (!brand_word.is_empty()).then(|| brand_word.to_owned()),
        rankings,
      })
    })
    .collect();

  debug!(
    rows = rows.len(),
    ranking_columns = ranking_columns.len(),
    "parsed keyword export"
  );
  Ok(rows)
}

/// Parse the business export. Rows without an ASIN are dropped.
pub fn parse_business(input: &str) -> Result<Vec<BusinessRow>> {
  let table = Table::read("business", input)?;
  table.require(ASIN)?;

  let rows: Vec<BusinessRow> = table
    .rows()
    .filter(|row| !row.get(ASIN).is_empty())
    .map(|row| BusinessRow {
      asin:           row.owned(ASIN),
      brand:          row.owned(BRAND),
      image_url:      row.owned(IMAGE_URL),
      seller_country: row.owned(SELLER_COUNTRY),
      rating:         cells::european_number(row.get(RATINGS)),
      creation_date:  cells::date(row.get(CREATION_DATE)),
      price:          row.owned(PRICE),
      sales:          cells::european_number(row.get(SALES)),
      revenue:        row.owned(REVENUE),
      category:       row.owned(CATEGORY),
      fulfillment:    row.owned(FULFILLMENT),
    })
    .collect();

  debug!(rows = rows.len(), "parsed business export");
  Ok(rows)
}

/// Parse the product export. Rows without an ASIN are dropped.
pub fn parse_products(input: &str) -> Result<Vec<ProductRow>> {
  let table = Table::read("product", input)?;
  table.require(ASIN)?;

  let feature_columns: Vec<String> = (1..=FEATURE_COUNT)
    .map(|n| format!("{FEATURE_PREFIX}{n}"))
    .collect();

  let rows: Vec<ProductRow> = table
    .rows()
    .filter(|row| !row.get(ASIN).is_empty())
    .map(|row| ProductRow {
      asin:              row.owned(ASIN),
      brand:             row.owned(MARCA),
      image_url:         row.owned(IMMAGINE),
      image_url_sample:  row.owned(IMMAGINE_CAMPIONE),
      image_count:       u32::try_from(cells::count(row.get(CONTEGGIO_IMMAGINI)))
        .unwrap_or(u32::MAX),
      title:             row.owned(TITOLO),
      features:          feature_columns
        .iter()
        .map(|c| row.get(c))
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect(),
      variation_asins:   cells::asin_list(row.get(ASIN_VARIAZIONE)),
    })
    .collect();

  debug!(rows = rows.len(), "parsed product export");
  Ok(rows)
}
