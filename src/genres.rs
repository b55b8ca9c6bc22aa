use std::collections::HashMap;

use crate::constants::constants;

/// Genre id → display name, built once per session from the catalog API
/// and read-only afterward.
pub type GenreMap = HashMap<u32, String>;

/// Resolve genre ids to display names, preserving input order.
/// Ids absent from the dictionary resolve to the fixed fallback label
/// rather than failing.
pub fn resolve(genre_ids: &[u32], dictionary: &GenreMap) -> Vec<String> {
  genre_ids
    .iter()
    .map(|id| dictionary.get(id).cloned().unwrap_or_else(|| constants().genre_fallback.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn dictionary() -> GenreMap {
    GenreMap::from([(28, "Action".to_string()), (18, "Drama".to_string()), (878, "Science Fiction".to_string())])
  }

  #[test]
  fn resolves_known_ids_in_input_order() {
    assert_eq!(resolve(&[878, 28], &dictionary()), vec!["Science Fiction", "Action"]);
  }

  #[test]
  fn unknown_id_resolves_to_fallback_label() {
    let resolved = resolve(&[9999], &dictionary());
    assert_eq!(resolved, vec![constants().genre_fallback.clone()]);
    assert!(!resolved[0].is_empty());
  }

  #[test]
  fn mixed_known_and_unknown_ids() {
    let resolved = resolve(&[18, 123456, 28], &dictionary());
    assert_eq!(resolved[0], "Drama");
    assert_eq!(resolved[1], constants().genre_fallback);
    assert_eq!(resolved[2], "Action");
  }

  #[test]
  fn empty_ids_resolve_to_empty() {
    assert!(resolve(&[], &dictionary()).is_empty());
  }

  #[test]
  fn empty_dictionary_resolves_everything_to_fallback() {
    let resolved = resolve(&[28, 18], &GenreMap::new());
    assert_eq!(resolved, vec![constants().genre_fallback.clone(), constants().genre_fallback.clone()]);
  }
}
