use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::constants;

/// User preferences persisted under the platform config directory.
///
/// `api_key` and `language` are overrides; when unset, the built-in defaults
/// from `constants.ron` apply.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Config {
  pub theme_name: Option<String>,
  pub api_key: Option<String>,
  pub language: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cine") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cine") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// Effective catalog credential: preference override, else the built-in.
  pub fn api_key(&self) -> String {
    self.api_key.clone().unwrap_or_else(|| constants().api_key.clone())
  }

  /// Effective catalog language: preference override, else the built-in.
  pub fn language(&self) -> String {
    self.language.clone().unwrap_or_else(|| constants().language.clone())
  }
}
