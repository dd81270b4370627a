//! Reader for the three marketplace CSV exports a session is built from.
//!
//! [`parse_exports`] turns raw keyword, business and product exports into
//! [`SourceRows`]. Cell decoding is lenient: unreadable numbers become zero
//! and unreadable dates become `None`. Only a missing key column or malformed
//! CSV is an error.

pub mod cells;
pub mod error;
pub mod parse;

pub use error::{Error, Result};
use niche_core::row::SourceRows;
pub use parse::{parse_business, parse_keywords, parse_products};
use tracing::info;

/// Parse all three exports into one [`SourceRows`].
pub fn parse_exports(
  keywords: &str,
  business: &str,
  products: &str,
) -> Result<SourceRows> {
  let rows = SourceRows {
    keywords: parse_keywords(keywords)?,
    business: parse_business(business)?,
    products: parse_products(products)?,
  };
  info!(
    keywords = rows.keywords.len(),
    business = rows.business.len(),
    products = rows.products.len(),
    "parsed exports"
  );
  Ok(rows)
}
