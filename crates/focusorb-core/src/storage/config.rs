//! TOML-based application configuration.
//!
//! Stores:
//! - Work/break interval lengths
//! - Monitor sampling and alert thresholds
//! - The distraction block-list
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/focusorb/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::monitor::{Blocklist, MonitorSettings, MAX_SCORE, MIN_SCORE};
use crate::timer::TimerSettings;

pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Timer-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_intervals_before_long_break")]
    pub intervals_before_long_break: u32,
}

/// Monitor-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
    /// Scores below this (1-10) count as unproductive.
    #[serde(default = "default_low_score_threshold")]
    pub low_score_threshold: u8,
    #[serde(default = "default_consecutive_low_before_alert")]
    pub consecutive_low_before_alert: u32,
    /// Only consider browser windows as activity.
    #[serde(default)]
    pub browser_only: bool,
    /// Case-insensitive substrings flagged as distractions.
    #[serde(default = "default_blocklist")]
    pub blocklist: Vec<String>,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Use the desktop notification helper instead of the log.
    #[serde(default = "default_true")]
    pub desktop: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusorb/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_intervals_before_long_break() -> u32 {
    4
}
fn default_sample_interval_secs() -> u64 {
    5
}
fn default_low_score_threshold() -> u8 {
    4
}
fn default_consecutive_low_before_alert() -> u32 {
    3
}
fn default_true() -> bool {
    true
}
fn default_blocklist() -> Vec<String> {
    [
        "youtube.com",
        "reddit.com",
        "twitter.com",
        "x.com",
        "instagram.com",
        "tiktok.com",
        "facebook.com",
        "twitch.tv",
        "netflix.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            intervals_before_long_break: default_intervals_before_long_break(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: default_sample_interval_secs(),
            low_score_threshold: default_low_score_threshold(),
            consecutive_low_before_alert: default_consecutive_low_before_alert(),
            browser_only: false,
            blocklist: default_blocklist(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            desktop: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Array(_) => {
                        // Accept a JSON array or a plain comma-separated list.
                        if value.trim_start().starts_with('[') {
                            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                        } else {
                            serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(str::trim)
                                    .filter(|s| !s.is_empty())
                                    .map(|s| serde_json::Value::String(s.to_string()))
                                    .collect(),
                            )
                        }
                    }
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// is out of range, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Check the documented ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |ok: bool, key: &str, message: &str| {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: message.to_string(),
                })
            }
        };
        check(self.timer.work_minutes >= 1, "timer.work_minutes", "must be at least 1")?;
        check(
            self.timer.intervals_before_long_break >= 1,
            "timer.intervals_before_long_break",
            "must be at least 1",
        )?;
        check(
            self.monitor.sample_interval_secs >= 1,
            "monitor.sample_interval_secs",
            "must be at least 1",
        )?;
        check(
            (MIN_SCORE..=MAX_SCORE).contains(&self.monitor.low_score_threshold),
            "monitor.low_score_threshold",
            "must be between 1 and 10",
        )?;
        check(
            self.monitor.consecutive_low_before_alert >= 1,
            "monitor.consecutive_low_before_alert",
            "must be at least 1",
        )
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save to the default location.
    ///
    /// # Errors
    ///
    /// See [`Config::apply`] and [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            work_minutes: self.timer.work_minutes,
            short_break_minutes: self.timer.short_break_minutes,
            long_break_minutes: self.timer.long_break_minutes,
            intervals_before_long_break: self.timer.intervals_before_long_break,
            minute: Duration::from_secs(60),
        }
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            sample_interval: Duration::from_secs(self.monitor.sample_interval_secs),
            low_score_threshold: self.monitor.low_score_threshold,
            consecutive_low_before_alert: self.monitor.consecutive_low_before_alert,
            blocklist: self.blocklist(),
        }
    }

    pub fn blocklist(&self) -> Blocklist {
        Blocklist::new(&self.monitor.blocklist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.timer.work_minutes, 25);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert_eq!(cfg.timer.long_break_minutes, 15);
        assert_eq!(cfg.timer.intervals_before_long_break, 4);
        assert_eq!(cfg.monitor.sample_interval_secs, 5);
        assert_eq!(cfg.monitor.low_score_threshold, 4);
        assert_eq!(cfg.monitor.consecutive_low_before_alert, 3);
        assert!(cfg.monitor.blocklist.contains(&"reddit.com".to_string()));
        assert!(cfg.notifications.enabled);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str("[timer]\nwork_minutes = 50\n").unwrap();
        assert_eq!(cfg.timer.work_minutes, 50);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert_eq!(cfg.monitor, MonitorConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("monitor.low_score_threshold", "6").unwrap();
        cfg.apply("notifications.desktop", "false").unwrap();
        cfg.apply("monitor.blocklist", "news.ycombinator.com, youtube.com").unwrap();
        assert_eq!(cfg.monitor.low_score_threshold, 6);
        assert!(!cfg.notifications.desktop);
        assert_eq!(cfg.monitor.blocklist, vec!["news.ycombinator.com", "youtube.com"]);

        cfg.apply("monitor.blocklist", r#"["a.com"]"#).unwrap();
        assert_eq!(cfg.monitor.blocklist, vec!["a.com"]);
    }

    #[test]
    fn apply_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.apply("notifications.enabled", "maybe").is_err());
        assert!(cfg.apply("timer.work_minutes", "-3").is_err());
        assert!(matches!(
            cfg.apply("monitor.low_score_threshold", "11"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.apply("monitor.low_score_threshold", "300").is_err());
        assert!(cfg.apply("timer.intervals_before_long_break", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_checks_ranges() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());
        cfg.monitor.consecutive_low_before_alert = 0;
        assert!(cfg.validate().is_err());
        cfg = Config::default();
        cfg.monitor.low_score_threshold = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("timer.work_minutes", "50").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.work_minutes, 50);
    }

    #[test]
    fn load_from_rejects_out_of_range_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[monitor]\nlow_score_threshold = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
        std::fs::write(&path, "timer = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn settings_conversion() {
        let cfg = Config::default();
        let timer = cfg.timer_settings();
        assert_eq!(timer.work_minutes, 25);
        assert_eq!(timer.minute, Duration::from_secs(60));
        let monitor = cfg.monitor_settings();
        assert_eq!(monitor.sample_interval, Duration::from_secs(5));
        assert!(monitor.blocklist.matches("REDDIT.com/r/rust"));
    }
}
