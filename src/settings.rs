//! Settings store.
//!
//! One persisted key: the refresh interval in seconds. Loaded from the
//! platform config directory with an environment override, written back
//! best-effort — a failed save keeps the in-memory value for the running
//! session and is only logged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MIN_INTERVAL_SECS: u64 = 1;
pub const MAX_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Refresh period in whole seconds, within 1..=300.
    pub refresh_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    fn clamped(mut self) -> Self {
        self.refresh_interval = self
            .refresh_interval
            .clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        self
    }

    /// Load from `path`, overriding with `AXPROGRESS_*` environment
    /// variables. Absent or unparsable settings fall back to defaults.
    pub fn load(path: &Path) -> Self {
        let builder = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("AXPROGRESS"));
        match builder
            .build()
            .and_then(|loaded| loaded.try_deserialize::<Settings>())
        {
            Ok(settings) => settings.clamped(),
            Err(err) => {
                warn!(error = %err, "settings unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Best-effort write-through persistence.
    pub fn save(&self, path: &Path) {
        let rendered = match toml::to_string_pretty(self) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(error = %err, "settings not serializable, not persisted");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(error = %err, "settings directory not creatable, not persisted");
                return;
            }
        }
        match std::fs::write(path, rendered) {
            Ok(()) => debug!(path = %path.display(), "settings persisted"),
            Err(err) => warn!(error = %err, "settings not persisted"),
        }
    }
}

/// Default settings location under the platform config directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("axprogress")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings {
            refresh_interval: 30,
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn unparsable_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "refresh_interval = \"often\"").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "refresh_interval = 0").unwrap();
        assert_eq!(Settings::load(&path).refresh_interval, MIN_INTERVAL_SECS);

        std::fs::write(&path, "refresh_interval = 4000").unwrap();
        assert_eq!(Settings::load(&path).refresh_interval, MAX_INTERVAL_SECS);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // The "file" is a directory, so the write fails.
        let path = dir.path().to_path_buf();
        Settings::default().save(&path);
    }
}
