//! Locale-tolerant parsing of currency amounts such as `"€1.234,56"` or
//! `"$1,234.56"`.

const CURRENCY_SYMBOLS: [char; 4] = ['€', '$', '£', '¥'];

/// Parse a formatted amount into a number. Returns `0.0` for anything that
/// cannot be read as a number.
///
/// - Currency symbols and whitespace are ignored.
/// - With both `,` and `.` present, whichever comes last is the decimal
///   separator.
/// - With only `,` present, it is a decimal separator when it appears once
///   with at most two trailing digits (`"123,45"`), otherwise a thousands
///   separator (`"1,234"`).
pub fn parse_amount(raw: &str) -> f64 {
  let cleaned: String = raw
    .chars()
    .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
    .collect();

  let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
    (Some(comma), Some(dot)) if comma > dot => {
      cleaned.replace('.', "").replacen(',', ".", 1)
    }
    (Some(_), Some(_)) => cleaned.replace(',', ""),
    (Some(_), None) => {
      let parts: Vec<&str> = cleaned.split(',').collect();
      if parts.len() == 2 && parts[1].len() <= 2 {
        cleaned.replacen(',', ".", 1)
      } else {
        cleaned.replace(',', "")
      }
    }
    (None, _) => cleaned,
  };

  parse_leading_float(&normalized)
}

/// Read the longest numeric prefix of `s`, like `parseFloat`. Returns `0.0`
/// when there is none.
pub fn parse_leading_float(s: &str) -> f64 {
  let mut end = 0;
  let mut seen_dot = false;
  let mut seen_digit = false;
  for (i, c) in s.char_indices() {
    match c {
      '-' | '+' if i == 0 => {}
      '0'..='9' => seen_digit = true,
      '.' if !seen_dot => seen_dot = true,
      _ => break,
    }
    end = i + c.len_utf8();
  }
  if !seen_digit {
    return 0.0;
  }
  s[..end]
    .trim_end_matches('.')
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .unwrap_or(0.0)
}
