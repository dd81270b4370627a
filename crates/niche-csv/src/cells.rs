//! Decoders for individual cells. None of them fail: unreadable input
//! becomes zero, `false` or `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use niche_core::amount::parse_leading_float;

/// Leading integer of `s` (optional sign, then digits), like `parseInt`.
pub fn leading_int(s: &str) -> Option<i64> {
  let s = s.trim();
  let digits_start = usize::from(s.starts_with(['-', '+']));
  let digits_len = s[digits_start..]
    .bytes()
    .take_while(u8::is_ascii_digit)
    .count();
  if digits_len == 0 {
    return None;
  }
  s[..digits_start + digits_len].parse().ok()
}

/// A non-negative count; negatives and garbage become 0.
pub fn count(s: &str) -> u64 {
  leading_int(s).and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// A ranking position. `0` is kept (it counts towards a keyword's rankings but
/// never as top 30); negative or unreadable cells are unranked.
pub fn ranking(s: &str) -> Option<u32> {
  leading_int(s).and_then(|v| u32::try_from(v).ok())
}

/// `"true"` (any case) or `"1"`.
pub fn flag(s: &str) -> bool {
  let s = s.trim();
  s.eq_ignore_ascii_case("true") || s == "1"
}

/// Parse a number written with European separators.
///
/// - `"24.779,36"` → `24779.36` (comma is the decimal point)
/// - `"1.487"` → `1487` (one dot followed by three or more digits)
/// - `"1.234.567"` → `1234567`
/// - `"4.5"` → `4.5`
pub fn european_number(s: &str) -> f64 {
  let cleaned = s.trim();
  if cleaned.is_empty() {
    return 0.0;
  }

  if let Some((integer, rest)) = cleaned.split_once(',') {
    let decimal = rest.split(',').next().unwrap_or_default();
    return parse_leading_float(&format!("{}.{decimal}", integer.replace('.', "")));
  }

  let parts: Vec<&str> = cleaned.split('.').collect();
  let thousands = (parts.len() == 2 && parts[1].len() > 2) || parts.len() > 2;
  if thousands {
    leading_int(&cleaned.replace('.', "")).map_or(0.0, |v| v as f64)
  } else {
    parse_leading_float(cleaned)
  }
}

/// A creation date in one of the formats the exports use. Day-first is tried
/// before month-first for slash-separated dates.
pub fn date(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
      return Some(dt.and_utc());
    }
  }
  ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"]
    .into_iter()
    .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Comma-separated ASIN list, trimmed, empties dropped.
pub fn asin_list(s: &str) -> Vec<String> {
  s.split(',')
    .map(str::trim)
    .filter(|a| !a.is_empty())
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, Timelike};

  use super::*;

  #[test]
  fn leading_int_behaves_like_parse_int() {
    assert_eq!(leading_int("12"), Some(12));
    assert_eq!(leading_int(" 12.9 "), Some(12));
    assert_eq!(leading_int("-3"), Some(-3));
    assert_eq!(leading_int("abc"), None);
    assert_eq!(leading_int(""), None);
    assert_eq!(leading_int("-"), None);
  }

  #[test]
  fn ranking_keeps_zero_and_rejects_negative() {
    assert_eq!(ranking("7"), Some(7));
    assert_eq!(ranking("0"), Some(0));
    assert_eq!(ranking("-1"), None);
    assert_eq!(ranking(""), None);
  }

  #[test]
  fn flag_accepts_true_and_one() {
    assert!(flag("TRUE"));
    assert!(flag(" 1 "));
    assert!(!flag("false"));
    assert!(!flag("yes"));
  }

  #[test]
  fn european_numbers() {
    assert_eq!(european_number("24.779,36"), 24779.36);
    assert_eq!(european_number("1.487"), 1487.0);
    assert_eq!(european_number("1.234.567"), 1234567.0);
    assert_eq!(european_number("4.5"), 4.5);
    assert_eq!(european_number("4,5"), 4.5);
    assert_eq!(european_number("312"), 312.0);
    assert_eq!(european_number(""), 0.0);
    assert_eq!(european_number("n/a"), 0.0);
  }

  #[test]
  fn dates_in_several_formats() {
    let d = date("2023-04-05").unwrap();
    assert_eq!((d.year(), d.month(), d.day()), (2023, 4, 5));

    let d = date("2023-04-05 13:30:00").unwrap();
    assert_eq!(d.hour(), 13);

    let d = date("2023-04-05T10:00:00+02:00").unwrap();
    assert_eq!(d.hour(), 8);

    let d = date("05/04/2023").unwrap();
    assert_eq!((d.month(), d.day()), (4, 5));

    let d = date("12/31/2023").unwrap();
    assert_eq!((d.month(), d.day()), (12, 31));

    assert!(date("").is_none());
    assert!(date("someday").is_none());
  }

  #[test]
  fn asin_lists_are_trimmed() {
    assert_eq!(asin_list("B01, B02 ,,"), vec!["B01", "B02"]);
    assert!(asin_list("").is_empty());
  }
}
