use anyhow::Result;
use chrono::{DateTime, Local};
use image::DynamicImage;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::genres::GenreMap;
use crate::history::{CatalogStore, HistoryStore};
use crate::movie::{Movie, merge_by_id};
use crate::recommend::RecommendationEngine;
use crate::theme::THEMES;
use crate::tmdb::CatalogClient;

// --- Types ---

/// Result of the one-time startup fetch: the genre dictionary plus the
/// popular/trending catalog feed.
pub type InitResult = (GenreMap, Vec<Movie>);
pub type SearchResult = Vec<Movie>;
pub type PosterResult = (u64, DynamicImage);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
  Seen,
}

/// In-flight async task receivers. All results are polled with `try_recv`
/// from the single event loop, so no completion ever interleaves with
/// another mutation of the history or the recommendation cache.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) init_rx: Option<oneshot::Receiver<Result<InitResult>>>,
  pub(crate) search_rx: Option<oneshot::Receiver<Result<SearchResult>>>,
  pub(crate) poster_rx: Option<oneshot::Receiver<Result<PosterResult>>>,
}

/// Poster cache for the selected title.
#[derive(Default)]
pub struct PosterState {
  /// Decoded poster, keyed by movie id.
  pub cached: Option<(u64, DynamicImage)>,
  /// Resized copy, keyed by (movie id, target cols, target rows).
  pub resized: Option<(u64, u16, u16, DynamicImage)>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub theme_index: usize,
  pub display_mode: DisplayMode,

  /// Every title known this session: the persisted mirror merged with the
  /// startup feed and all search results. Source set for recommendations.
  pub catalog: Vec<Movie>,
  /// Titles currently shown in the results pane.
  pub results: Vec<Movie>,
  pub seen: Vec<Movie>,
  pub recommended: Vec<Movie>,
  pub genre_map: GenreMap,
  pub catalog_refreshed_at: Option<DateTime<Local>>,

  pub list_state: ListState,
  pub seen_state: ListState,
  pub poster: PosterState,

  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  /// When the last error was set — drives auto-dismiss.
  error_time: Option<Instant>,

  pub(crate) tasks: AsyncTasks,
  engine: RecommendationEngine,
  history: HistoryStore,
  catalog_store: CatalogStore,
  client: CatalogClient,
}

impl App {
  pub fn new(client: CatalogClient, history: HistoryStore, catalog_store: CatalogStore, display_mode: DisplayMode) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };

    let seen = history.load();
    let catalog = catalog_store.load();
    info!(seen = seen.len(), catalog = catalog.len(), "loaded persisted state");

    let mut app = Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Input,
      theme_index,
      display_mode,
      catalog,
      results: Vec::new(),
      seen,
      recommended: Vec::new(),
      genre_map: GenreMap::new(),
      catalog_refreshed_at: None,
      list_state: ListState::default(),
      seen_state: ListState::default(),
      poster: PosterState::default(),
      last_error: None,
      status_message: None,
      should_quit: false,
      error_time: None,
      tasks: AsyncTasks::default(),
      engine: RecommendationEngine::new(constants().top_genre_count),
      history,
      catalog_store,
      client,
    };
    // Persisted state alone already yields recommendations.
    app.refresh_recommendations();
    app
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and clamped on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  // --- Messages ---

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Drop stale error messages after the configured dismiss window.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  // --- State transitions ---

  pub fn selected_result(&self) -> Option<&Movie> {
    self.list_state.selected().and_then(|i| self.results.get(i))
  }

  fn refresh_recommendations(&mut self) {
    self.recommended = self.engine.recommend(&self.catalog, &self.seen);
  }

  /// Merge newly fetched titles into the catalog, persist the mirror, and
  /// invalidate the recommendation cache — its keys only encode the seen set.
  fn absorb_into_catalog(&mut self, incoming: &[Movie]) {
    let merged = merge_by_id(&self.catalog, incoming);
    if merged.len() != self.catalog.len() {
      self.catalog = merged;
      self.engine.clear_cache();
      if let Err(e) = self.catalog_store.save(&self.catalog) {
        warn!(err = %e, "failed to persist catalog mirror");
      }
    }
    self.refresh_recommendations();
  }

  /// Mark the selected result as seen. Duplicate marks are no-ops; the
  /// updated history hits disk before the in-memory state advances.
  pub fn mark_selected_seen(&mut self) {
    let Some(movie) = self.selected_result().cloned() else { return };
    match self.history.add(&self.seen, movie.clone()) {
      Ok(updated) => {
        if updated.len() != self.seen.len() {
          info!(id = movie.id, title = %movie.title, "marked as seen");
          self.seen = updated;
          self.refresh_recommendations();
        }
      }
      Err(e) => self.set_error(format!("Failed to save history: {:#}", e)),
    }
  }

  /// Clear the seen history and erase its persisted slot.
  pub fn clear_history(&mut self) {
    match self.history.clear() {
      Ok(empty) => {
        info!("history cleared");
        self.seen = empty;
        self.seen_state.select(None);
        self.refresh_recommendations();
      }
      Err(e) => self.set_error(format!("Failed to clear history: {:#}", e)),
    }
  }

  // --- Async triggers ---

  /// One-time startup fetch: genre dictionary, then the catalog feed.
  /// A failed dictionary degrades to fallback genre labels; a failed feed
  /// degrades to the persisted catalog mirror.
  pub fn trigger_init(&mut self) {
    self.status_message = Some("Loading catalog…".to_string());
    let client = self.client.clone();

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let dictionary = match client.fetch_genres().await {
        Ok(map) => map,
        Err(e) => {
          warn!(err = %e, "genre dictionary fetch failed, unknown ids will use the fallback label");
          GenreMap::new()
        }
      };
      let feed = client.fetch_popular_and_trending(&dictionary).await;
      let _ = tx.send(feed.map(|movies| (dictionary, movies)));
    });
    self.tasks.init_rx = Some(rx);
  }

  pub fn trigger_search(&mut self) {
    let query = self.input.trim().to_string();
    if query.is_empty() {
      self.set_error("Enter a search term.".to_string());
      return;
    }
    info!(query = %query, "search triggered");
    self.tasks.search_rx = None;
    self.clear_error();
    self.status_message = Some(format!("Searching '{}'…", query));

    let client = self.client.clone();
    let dictionary = self.genre_map.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.search(&query, &dictionary).await);
    });
    self.tasks.search_rx = Some(rx);
  }

  /// Fetch the selected title's poster in the background. Skipped when the
  /// title has no poster or the decoded image is already cached.
  pub fn trigger_poster(&mut self) {
    let Some(movie) = self.selected_result() else { return };
    if movie.poster_url.is_empty() {
      return;
    }
    if self.poster.cached.as_ref().is_some_and(|(id, _)| *id == movie.id) {
      return;
    }
    let id = movie.id;
    let url = movie.poster_url.clone();
    let client = self.client.clone();

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.fetch_poster(&url).await.map(|image| (id, image)));
    });
    self.tasks.poster_rx = Some(rx);
  }

  // --- Completion polling ---

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.init_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok((dictionary, feed)) => {
              self.genre_map = dictionary;
              self.catalog_refreshed_at = Some(Local::now());
              self.results = feed.clone();
              // Fresh feed leads the catalog order; persisted extras follow.
              self.catalog = merge_by_id(&feed, &self.catalog);
              self.engine.clear_cache();
              if let Err(e) = self.catalog_store.save(&self.catalog) {
                warn!(err = %e, "failed to persist catalog mirror");
              }
              self.refresh_recommendations();
              if !self.results.is_empty() {
                self.list_state.select(Some(0));
                self.trigger_poster();
              }
            }
            Err(e) => {
              warn!(err = %e, "catalog feed fetch failed");
              self.set_error(format!("Catalog unavailable: {:#}", e));
              // Degrade to whatever the mirror holds.
              if self.results.is_empty() && !self.catalog.is_empty() {
                self.results = self.catalog.clone();
                self.list_state.select(Some(0));
              }
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.init_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Catalog load task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok(results) if results.is_empty() => {
              self.set_error("No results found.".to_string());
            }
            Ok(results) => {
              self.results = results;
              self.absorb_into_catalog(&self.results.clone());
              self.list_state.select(Some(0));
              self.mode = AppMode::Results;
              self.trigger_poster();
            }
            Err(e) => {
              self.set_error(format!("Search failed: {:#}", e));
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.search_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Search task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.poster_rx.take() {
      match rx.try_recv() {
        Ok(Ok((id, image))) => {
          self.poster.cached = Some((id, image));
          self.poster.resized = None;
        }
        Ok(Err(e)) => {
          // Posters are cosmetic; the placeholder box stays up.
          debug!(err = %e, "poster fetch failed");
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.poster_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }
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

  fn test_app(dir: &std::path::Path) -> App {
    let client = CatalogClient::new("test-key".to_string(), "en-US".to_string());
    App::new(client, HistoryStore::open(dir), CatalogStore::open(dir), DisplayMode::Ascii)
  }

  #[test]
  fn mark_selected_seen_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.results = vec![movie(1, "Heat", &["Crime"])];
    app.list_state.select(Some(0));

    app.mark_selected_seen();
    app.mark_selected_seen();

    assert_eq!(app.seen.len(), 1);
    // The persisted slot agrees.
    assert_eq!(HistoryStore::open(dir.path()).load().len(), 1);
  }

  #[test]
  fn marking_seen_removes_the_title_from_recommendations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.catalog = vec![movie(1, "Heat", &["Crime"]), movie(2, "Se7en", &["Crime"]), movie(3, "Alien", &["Horror"])];
    app.results = app.catalog.clone();
    app.list_state.select(Some(0));

    app.mark_selected_seen();

    let ids: Vec<u64> = app.recommended.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2]);
  }

  #[test]
  fn clear_history_empties_seen_and_recommendations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.catalog = vec![movie(1, "Heat", &["Crime"]), movie(2, "Se7en", &["Crime"])];
    app.results = app.catalog.clone();
    app.list_state.select(Some(0));
    app.mark_selected_seen();
    assert!(!app.recommended.is_empty());

    app.clear_history();

    assert!(app.seen.is_empty());
    assert!(app.recommended.is_empty());
    assert_eq!(HistoryStore::open(dir.path()).load(), Vec::new());
  }

  #[test]
  fn mark_with_no_selection_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.results = vec![movie(1, "Heat", &["Crime"])];

    app.mark_selected_seen();

    assert!(app.seen.is_empty());
  }

  #[test]
  fn empty_search_query_is_rejected_locally() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.input = "   ".to_string();

    app.trigger_search();

    assert!(app.tasks.search_rx.is_none());
    assert!(app.last_error.is_some());
  }

  #[test]
  fn absorb_merges_without_duplicates_and_recomputes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = test_app(dir.path());
    app.catalog = vec![movie(1, "Heat", &["Crime"])];
    app.seen = vec![movie(1, "Heat", &["Crime"])];

    app.absorb_into_catalog(&[movie(1, "Heat", &["Crime"]), movie(2, "Se7en", &["Crime"])]);

    assert_eq!(app.catalog.len(), 2);
    assert_eq!(app.recommended.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2]);
  }
}
