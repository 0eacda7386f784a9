use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adjustment::RelativePolicy;
use crate::error::{AppError, Result};
use crate::invocation::MAX_TARGET;

pub const APP_DIR: &str = "ddcctl";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// What `set FEATURE N+` does when the result leaves 0..=100
    pub relative_policy: RelativePolicy,
    /// Read a feature back after writing it
    pub verify_writes: bool,
    /// Displays beyond this many are ignored
    pub max_displays: usize,
    pub log: LogConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Level for this crate when RUST_LOG is unset
    pub level: String,
    /// Also send events to the systemd journal
    pub journald: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relative_policy: RelativePolicy::default(),
            verify_writes: true,
            max_displays: MAX_TARGET,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            journald: false,
        }
    }
}

/// `$XDG_CONFIG_HOME/ddcctl/config.toml`, if a config dir exists
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load from an explicit path (which must exist) or the default path
    /// (which may be missing).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|reason| AppError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_toml(text: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(text).map_err(|e| e.message().to_string())?;
        if !(1..=MAX_TARGET).contains(&config.max_displays) {
            return Err(format!(
                "max_displays must be between 1 and {MAX_TARGET}, got {}",
                config.max_displays
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.relative_policy, RelativePolicy::Clamp);
        assert!(config.verify_writes);
        assert_eq!(config.max_displays, 32);
        assert_eq!(config.log.level, "warn");
        assert!(!config.log.journald);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("relative_policy = \"reject\"\n[log]\nlevel = \"debug\"\n")
            .unwrap();
        assert_eq!(config.relative_policy, RelativePolicy::Reject);
        assert_eq!(config.log.level, "debug");
        assert!(config.verify_writes);
        assert!(!config.log.journald);
    }

    #[test]
    fn test_invalid_max_displays() {
        assert!(Config::from_toml("max_displays = 0").is_err());
        assert!(Config::from_toml("max_displays = 33").is_err());
        assert_eq!(Config::from_toml("max_displays = 4").unwrap().max_displays, 4);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("brightness_step = 5").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "verify_writes = false").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(!config.verify_writes);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "relative_policy = \"sometimes\"").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(AppError::Config { .. })
        ));
    }
}
