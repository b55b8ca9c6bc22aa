use serde::{Deserialize, Serialize};

/// A catalog title as listed, recommended, and persisted.
///
/// Constructed once from API data and never mutated afterwards. This is also
/// the JSON shape of the durable slots, so optional fields default leniently
/// when older persisted data is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
  pub id: u64,
  pub title: String,
  /// Full poster URL, or empty when the catalog carries no poster.
  #[serde(default)]
  pub poster_url: String,
  #[serde(default)]
  pub genres: Vec<String>,
}

/// Merge `incoming` into `existing` by id, first occurrence wins.
/// The order of `existing` is preserved; new titles append in their own order.
pub fn merge_by_id(existing: &[Movie], incoming: &[Movie]) -> Vec<Movie> {
  let mut merged = existing.to_vec();
  for movie in incoming {
    if !merged.iter().any(|m| m.id == movie.id) {
      merged.push(movie.clone());
    }
  }
  merged
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn movie(id: u64, title: &str) -> Movie {
    Movie { id, title: title.to_string(), poster_url: String::new(), genres: Vec::new() }
  }

  #[test]
  fn merge_appends_new_titles_in_order() {
    let existing = vec![movie(1, "Heat"), movie(2, "Alien")];
    let incoming = vec![movie(3, "Arrival"), movie(4, "Dune")];
    let merged = merge_by_id(&existing, &incoming);
    assert_eq!(merged.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn merge_keeps_first_occurrence_on_duplicate_ids() {
    let existing = vec![movie(1, "Heat")];
    let incoming = vec![movie(1, "Heat (remaster)"), movie(2, "Alien")];
    let merged = merge_by_id(&existing, &incoming);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].title, "Heat");
  }

  #[test]
  fn merge_with_empty_existing_is_incoming() {
    let incoming = vec![movie(7, "Ran")];
    assert_eq!(merge_by_id(&[], &incoming), incoming);
  }

  #[test]
  fn older_persisted_shape_defaults_missing_fields() {
    let decoded: Movie = serde_json::from_str(r#"{"id":42,"title":"Stalker"}"#).expect("decode");
    assert_eq!(decoded.poster_url, "");
    assert!(decoded.genres.is_empty());
  }
}
