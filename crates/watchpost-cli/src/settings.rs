//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, the TOML file
//! (`watchpost.toml` unless `--config` names another), then `WATCHPOST_*`
//! environment variables. Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "watchpost.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
  /// SQLite database file. A leading `~/` expands to `$HOME`.
  pub database_path: PathBuf,
  /// Directory `seed` reads the standard CSV files from.
  pub data_dir:      PathBuf,
}

impl Settings {
  /// Load settings from `file` (optional on disk) and the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("database_path", "watchpost.db")?
      .set_default("data_dir", "DATA")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("WATCHPOST"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.database_path = expand_tilde(&settings.database_path);
    settings.data_dir = expand_tilde(&settings.data_dir);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.database_path, PathBuf::from("watchpost.db"));
    assert_eq!(settings.data_dir, PathBuf::from("DATA"));
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("watchpost.toml");
    fs::write(&file, "database_path = \"/var/lib/watchpost/incidents.db\"\n").unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.database_path, PathBuf::from("/var/lib/watchpost/incidents.db"));
    assert_eq!(settings.data_dir, PathBuf::from("DATA"));
  }

  #[test]
  fn paths_without_tilde_are_untouched() {
    assert_eq!(expand_tilde(Path::new("data/x.db")), PathBuf::from("data/x.db"));
  }
}
