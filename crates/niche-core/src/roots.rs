//! Root-keyword index: groups keyword phrases by their significant words.
//!
//! The index is always regenerated from scratch over the active keywords;
//! it is never patched. Root deletes cascade into the keyword set; root
//! restores un-delete a keyword only once none of its roots remain deleted.

use std::collections::{BTreeSet, HashMap};

use crate::{
  deletion::DeletionState,
  entity::{Keyword, RootKeyword},
};

/// Short function words never treated as roots.
pub const STOP_WORDS: [&str; 37] = [
  "the", "and", "for", "with", "are", "you", "all", "any", "can", "had",
  "her", "was", "one", "our", "out", "day", "get", "has", "him", "his", "how",
  "its", "may", "new", "now", "old", "see", "two", "way", "who", "boy", "did",
  "men", "run", "she", "try", "use",
];

/// Tokens of this many characters or fewer are never roots.
const MIN_ROOT_CHARS: usize = 2;

/// Lowercase, whitespace-split, drop short tokens and stop words. Order of
/// first occurrence is preserved and each root appears once.
pub fn extract_root_words(phrase: &str) -> Vec<String> {
  let mut seen = BTreeSet::new();
  phrase
    .split_whitespace()
    .map(str::to_lowercase)
    .filter(|w| w.chars().count() > MIN_ROOT_CHARS)
    .filter(|w| !STOP_WORDS.contains(&w.as_str()))
    .filter(|w| seen.insert(w.clone()))
    .collect()
}

/// Canonical form of a caller-supplied root word.
pub fn normalize_root(root: &str) -> String { root.trim().to_lowercase() }

#[derive(Default)]
struct Accumulator {
  total_search_volume: u64,
  relevance_sum:       u64,
  relevance_count:     u64,
  brand_count:         usize,
  non_brand_count:     usize,
  related_phrases:     Vec<String>,
}

/// Build the root index over keywords not in `deletions.keywords`, sorted by
/// total search volume descending (ties keep first-seen order). `is_deleted`
/// reflects `deletions.root_keywords`.
pub fn aggregate(
  keywords: &[Keyword],
  deletions: &DeletionState,
) -> Vec<RootKeyword> {
  let mut order: Vec<String> = Vec::new();
  let mut acc: HashMap<String, Accumulator> = HashMap::new();

  for keyword in keywords
    .iter()
    .filter(|k| !deletions.is_keyword_deleted(&k.phrase))
  {
    for root in extract_root_words(&keyword.phrase) {
      let entry = acc.entry(root.clone()).or_insert_with(|| {
        order.push(root.clone());
        Accumulator::default()
      });
      entry.total_search_volume += keyword.search_volume;
      entry.relevance_sum += u64::from(keyword.relevance);
      entry.relevance_count += 1;
      if keyword.is_brand {
        entry.brand_count += 1;
      } else {
        entry.non_brand_count += 1;
      }
      if !entry.related_phrases.contains(&keyword.phrase) {
        entry.related_phrases.push(keyword.phrase.clone());
      }
    }
  }

  let mut roots: Vec<RootKeyword> = order
    .into_iter()
    .filter_map(|root| acc.remove(&root).map(|a| (root, a)))
    .map(|(root_word, a)| {
      let total_count = a.brand_count + a.non_brand_count;
      RootKeyword {
        is_deleted: deletions.is_root_deleted(&root_word),
        root_word,
        total_search_volume: a.total_search_volume,
        average_relevance: rounded_ratio(a.relevance_sum, a.relevance_count, 1),
        brand_count: a.brand_count,
        non_brand_count: a.non_brand_count,
        total_count,
        brand_percentage: rounded_ratio(
          a.brand_count as u64,
          total_count as u64,
          100,
        ),
        related_phrases: a.related_phrases,
      }
    })
    .collect();

  // Stable sort keeps first-seen order among equal volumes.
  roots.sort_by(|a, b| b.total_search_volume.cmp(&a.total_search_volume));
  roots
}

/// `round(scale * numerator / denominator)`, or 0 when the denominator is 0.
fn rounded_ratio(numerator: u64, denominator: u64, scale: u64) -> u32 {
  if denominator == 0 {
    return 0;
  }
  (scale as f64 * numerator as f64 / denominator as f64).round() as u32
}

/// Mark `roots` deleted and delete every keyword whose phrase contains any
/// of them.
pub fn delete_roots<I, S>(
  keywords: &[Keyword],
  deletions: &mut DeletionState,
  roots: I,
) where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  for root in roots {
    let root = normalize_root(root.as_ref());
    if root.is_empty() {
      continue;
    }
    for keyword in keywords {
      if extract_root_words(&keyword.phrase).contains(&root) {
        deletions.keywords.insert(keyword.phrase.clone());
      }
    }
    deletions.root_keywords.insert(root);
  }
}

/// Un-delete `roots`, restoring each keyword containing one of them unless
/// another of that keyword's roots is still deleted.
pub fn restore_roots<I, S>(
  keywords: &[Keyword],
  deletions: &mut DeletionState,
  roots: I,
) where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  for root in roots {
    let root = normalize_root(root.as_ref());
    deletions.root_keywords.remove(&root);
    for keyword in keywords {
      let words = extract_root_words(&keyword.phrase);
      if !words.contains(&root) {
        continue;
      }
      let pinned = words
        .iter()
        .any(|w| *w != root && deletions.is_root_deleted(w));
      if !pinned {
        deletions.keywords.remove(&keyword.phrase);
      }
    }
  }
}
