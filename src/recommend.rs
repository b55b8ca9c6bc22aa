use std::collections::HashMap;
use tracing::debug;

use crate::movie::Movie;

/// Count how often each genre appears across the seen titles.
/// Entries are in first-encounter order, which doubles as the rank tie-break.
pub fn genre_frequency(seen: &[Movie]) -> Vec<(String, usize)> {
  let mut freq: Vec<(String, usize)> = Vec::new();
  for movie in seen {
    for genre in &movie.genres {
      if let Some(entry) = freq.iter_mut().find(|(name, _)| name == genre) {
        entry.1 += 1;
      } else {
        freq.push((genre.clone(), 1));
      }
    }
  }
  freq
}

/// The top `n` genres by descending frequency. The sort is stable, so genres
/// with equal counts keep their first-encounter order.
pub fn top_genres(freq: &[(String, usize)], n: usize) -> Vec<String> {
  let mut ranked = freq.to_vec();
  ranked.sort_by(|a, b| b.1.cmp(&a.1));
  ranked.into_iter().take(n).map(|(genre, _)| genre).collect()
}

/// Genre-based recommender with an explicit memoization cache.
///
/// Cache keys encode only the seen set, so callers must `clear_cache` when
/// the catalog itself changes. Within one session the cache grows unbounded.
pub struct RecommendationEngine {
  top_n: usize,
  cache: HashMap<String, Vec<Movie>>,
}

impl RecommendationEngine {
  pub fn new(top_n: usize) -> Self {
    Self { top_n, cache: HashMap::new() }
  }

  /// Cache key: the seen ids, sorted and comma-joined. Independent of the
  /// order titles were marked in.
  fn cache_key(seen: &[Movie]) -> String {
    let mut ids: Vec<u64> = seen.iter().map(|m| m.id).collect();
    ids.sort_unstable();
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
  }

  /// All catalog titles that carry at least one top genre and are not already
  /// seen, in catalog order. An empty seen set yields an empty top-genre set,
  /// so it recommends nothing; titles without genre data never match.
  pub fn recommend(&mut self, catalog: &[Movie], seen: &[Movie]) -> Vec<Movie> {
    let key = Self::cache_key(seen);
    if let Some(cached) = self.cache.get(&key) {
      return cached.clone();
    }

    let top = top_genres(&genre_frequency(seen), self.top_n);
    let recs: Vec<Movie> = catalog
      .iter()
      .filter(|movie| movie.genres.iter().any(|g| top.contains(g)) && !seen.iter().any(|s| s.id == movie.id))
      .cloned()
      .collect();

    debug!(seen = seen.len(), top = ?top, recommended = recs.len(), "recomputed recommendations");
    self.cache.insert(key, recs.clone());
    recs
  }

  /// Drop all memoized results.
  pub fn clear_cache(&mut self) {
    self.cache.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn movie(id: u64, title: &str, genres: &[&str]) -> Movie {
    Movie {
      id,
      title: title.to_string(),
      poster_url: String::new(),
      genres: genres.iter().map(|g| g.to_string()).collect(),
    }
  }

  fn catalog() -> Vec<Movie> {
    vec![
      movie(1, "Heat", &["Crime", "Drama"]),
      movie(2, "Alien", &["Horror", "Science Fiction"]),
      movie(3, "Se7en", &["Crime", "Thriller"]),
      movie(4, "Arrival", &["Science Fiction", "Drama"]),
      movie(5, "Paterson", &[]),
    ]
  }

  // --- genre_frequency ---

  #[test]
  fn frequency_counts_every_genre_occurrence() {
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"]), movie(3, "Se7en", &["Crime", "Thriller"])];
    assert_eq!(
      genre_frequency(&seen),
      vec![("Crime".to_string(), 2), ("Drama".to_string(), 1), ("Thriller".to_string(), 1)]
    );
  }

  #[test]
  fn frequency_of_empty_history_is_empty() {
    assert!(genre_frequency(&[]).is_empty());
  }

  // --- top_genres ---

  #[test]
  fn top_genres_ranks_by_descending_count() {
    let freq = vec![("Drama".to_string(), 1), ("Crime".to_string(), 3), ("Horror".to_string(), 2)];
    assert_eq!(top_genres(&freq, 2), vec!["Crime", "Horror"]);
  }

  #[test]
  fn top_genres_breaks_ties_by_first_encounter_order() {
    let freq = vec![("Drama".to_string(), 2), ("Crime".to_string(), 2), ("Horror".to_string(), 2)];
    assert_eq!(top_genres(&freq, 2), vec!["Drama", "Crime"]);
  }

  #[test]
  fn top_genres_with_n_beyond_len_returns_all() {
    let freq = vec![("Drama".to_string(), 1)];
    assert_eq!(top_genres(&freq, 6), vec!["Drama"]);
  }

  // --- recommend ---

  #[test]
  fn recommends_unseen_titles_carrying_a_top_genre() {
    let mut engine = RecommendationEngine::new(2);
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"])];
    let recs = engine.recommend(&catalog(), &seen);
    // Top genres: Crime, Drama. Se7en and Arrival match; Heat is seen; Alien
    // carries neither; Paterson has no genre data.
    assert_eq!(recs.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 4]);
  }

  #[test]
  fn output_never_contains_seen_ids() {
    let mut engine = RecommendationEngine::new(6);
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"]), movie(3, "Se7en", &["Crime", "Thriller"])];
    let recs = engine.recommend(&catalog(), &seen);
    assert!(recs.iter().all(|m| seen.iter().all(|s| s.id != m.id)));
  }

  #[test]
  fn every_output_title_carries_a_top_genre() {
    let mut engine = RecommendationEngine::new(2);
    let seen = vec![movie(2, "Alien", &["Horror", "Science Fiction"])];
    let top = top_genres(&genre_frequency(&seen), 2);
    let recs = engine.recommend(&catalog(), &seen);
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|m| m.genres.iter().any(|g| top.contains(g))));
  }

  #[test]
  fn empty_history_recommends_nothing() {
    let mut engine = RecommendationEngine::new(2);
    assert!(engine.recommend(&catalog(), &[]).is_empty());
  }

  #[test]
  fn titles_without_genre_data_are_never_recommended() {
    let mut engine = RecommendationEngine::new(6);
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"])];
    let recs = engine.recommend(&catalog(), &seen);
    assert!(recs.iter().all(|m| m.id != 5));
  }

  #[test]
  fn recommend_preserves_catalog_order() {
    let mut engine = RecommendationEngine::new(6);
    let seen = vec![movie(9, "The Thing", &["Horror", "Science Fiction"])];
    let ids: Vec<u64> = engine.recommend(&catalog(), &seen).iter().map(|m| m.id).collect();
    let mut sorted_by_catalog = ids.clone();
    sorted_by_catalog.sort_unstable();
    assert_eq!(ids, vec![2, 4]);
    assert_eq!(ids, sorted_by_catalog);
  }

  #[test]
  fn repeated_calls_return_equal_results() {
    let mut engine = RecommendationEngine::new(2);
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"])];
    let first = engine.recommend(&catalog(), &seen);
    let second = engine.recommend(&catalog(), &seen);
    assert_eq!(first, second);
  }

  #[test]
  fn cached_result_equals_a_fresh_computation() {
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"]), movie(2, "Alien", &["Horror", "Science Fiction"])];
    let mut warm = RecommendationEngine::new(2);
    warm.recommend(&catalog(), &seen);
    let cached = warm.recommend(&catalog(), &seen);
    let fresh = RecommendationEngine::new(2).recommend(&catalog(), &seen);
    assert_eq!(cached, fresh);
  }

  #[test]
  fn cache_key_ignores_marking_order() {
    let a = vec![movie(1, "Heat", &[]), movie(3, "Se7en", &[])];
    let b = vec![movie(3, "Se7en", &[]), movie(1, "Heat", &[])];
    assert_eq!(RecommendationEngine::cache_key(&a), RecommendationEngine::cache_key(&b));
  }

  #[test]
  fn clear_cache_recomputes_against_a_changed_catalog() {
    let mut engine = RecommendationEngine::new(2);
    let seen = vec![movie(1, "Heat", &["Crime", "Drama"])];
    let before = engine.recommend(&catalog(), &seen);

    let mut grown = catalog();
    grown.push(movie(6, "Chinatown", &["Crime", "Mystery"]));
    engine.clear_cache();
    let after = engine.recommend(&grown, &seen);
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.iter().any(|m| m.id == 6));
  }
}
