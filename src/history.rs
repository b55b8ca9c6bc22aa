//! Durable JSON slots: the seen-title history and the catalog mirror.
//!
//! Each slot is one file holding a JSON array of movies. Absent or malformed
//! content loads as an empty list — first runs and stale persisted shapes are
//! not errors.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::movie::Movie;

pub const SEEN_SLOT: &str = "seen.json";
pub const CATALOG_SLOT: &str = "catalog.json";

/// One durable slot on disk.
struct MovieSlot {
  path: PathBuf,
}

impl MovieSlot {
  fn new(dir: &Path, file_name: &str) -> Self {
    Self { path: dir.join(file_name) }
  }

  fn load(&self) -> Vec<Movie> {
    let Ok(data) = fs::read_to_string(&self.path) else {
      return Vec::new();
    };
    match serde_json::from_str(&data) {
      Ok(movies) => movies,
      Err(e) => {
        warn!(path = %self.path.display(), err = %e, "malformed slot content, loading as empty");
        Vec::new()
      }
    }
  }

  /// Write the full list, creating the parent directory on demand.
  fn save(&self, movies: &[Movie]) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string(movies).context("Failed to encode slot content")?;
    fs::write(&self.path, data).with_context(|| format!("Failed to write {}", self.path.display()))
  }

  /// Remove the slot file. A missing file already counts as erased.
  fn erase(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("Failed to erase {}", self.path.display())),
    }
  }
}

/// The seen-title history: an id-uniqued, append-only set with an explicit
/// clear. Every mutation persists the full set before returning.
pub struct HistoryStore {
  slot: MovieSlot,
}

impl HistoryStore {
  pub fn open(dir: &Path) -> Self {
    Self { slot: MovieSlot::new(dir, SEEN_SLOT) }
  }

  pub fn load(&self) -> Vec<Movie> {
    self.slot.load()
  }

  /// Append `movie` unless an entry with its id already exists. The updated
  /// set is written to disk before it is returned; a duplicate add returns
  /// the history unchanged without touching disk.
  pub fn add(&self, history: &[Movie], movie: Movie) -> Result<Vec<Movie>> {
    if history.iter().any(|m| m.id == movie.id) {
      debug!(id = movie.id, "already in history, no-op");
      return Ok(history.to_vec());
    }
    let mut updated = history.to_vec();
    updated.push(movie);
    self.slot.save(&updated)?;
    Ok(updated)
  }

  /// Erase persisted state and return the empty history.
  pub fn clear(&self) -> Result<Vec<Movie>> {
    self.slot.erase()?;
    Ok(Vec::new())
  }
}

/// Session-to-session mirror of the merged catalog, so titles discovered by
/// search stay recommendable after a restart.
pub struct CatalogStore {
  slot: MovieSlot,
}

impl CatalogStore {
  pub fn open(dir: &Path) -> Self {
    Self { slot: MovieSlot::new(dir, CATALOG_SLOT) }
  }

  pub fn load(&self) -> Vec<Movie> {
    self.slot.load()
  }

  pub fn save(&self, catalog: &[Movie]) -> Result<()> {
    self.slot.save(catalog)
  }
}

/// Platform data directory for the durable slots and log files.
pub fn default_data_dir() -> Option<PathBuf> {
  directories::ProjectDirs::from("", "", "cine").map(|dirs| dirs.data_dir().to_path_buf())
}
