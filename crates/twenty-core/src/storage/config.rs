//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Phase durations (work and break length, minutes)
//! - Notification behavior
//! - Theme choice
//!
//! Configuration is stored at `~/.config/twenty/config.toml`. The core
//! reads it as initial configuration; it does not own the values at
//! runtime (the cycle keeps its own copy and applies changes at the next
//! phase entry).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::cycle::PhaseDurations;
use crate::error::ConfigError;

/// Phase duration configuration, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_work_min")]
    pub work_min: u64,
    #[serde(default = "default_break_min")]
    pub break_min: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keep the notification on screen until dismissed.
    #[serde(default)]
    pub persistent: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// One of "dark", "light", "auto".
    #[serde(default = "default_theme")]
    pub theme: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/twenty/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_work_min() -> u64 {
    25
}
fn default_break_min() -> u64 {
    5
}
fn default_theme() -> String {
    "dark".into()
}
fn default_true() -> bool {
    true
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            work_min: default_work_min(),
            break_min: default_break_min(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            persistent: false,
            sound: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle: CycleConfig::default(),
            notifications: NotificationsConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults out on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Configured phase durations. Values below one minute clamp up
    /// rather than producing a zero-length phase.
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::from_minutes(self.cycle.work_min, self.cycle.break_min)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = json_value_at_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// as the key's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        set_json_value_at_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

fn json_value_at_path<'a>(
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

fn set_json_value_at_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.into(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(ConfigError::UnknownKey(key.into()));
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;

            // The new value must match the type already at the key.
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
    }

    Err(ConfigError::UnknownKey(key.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::{Phase, MIN_PHASE_DURATION_MS};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.cycle.work_min, 25);
        assert_eq!(parsed.cycle.break_min, 5);
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.ui.theme, "dark");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("cycle.work_min").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("dark"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        set_json_value_at_path(&mut json, "cycle.work_min", "50").unwrap();
        assert_eq!(
            json_value_at_path(&json, "cycle.work_min").unwrap(),
            &serde_json::Value::Number(50.into())
        );
    }

    #[test]
    fn set_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        set_json_value_at_path(&mut json, "notifications.sound", "false").unwrap();
        assert_eq!(
            json_value_at_path(&json, "notifications.sound").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(matches!(
            set_json_value_at_path(&mut json, "cycle.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_type_mismatch() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(set_json_value_at_path(&mut json, "notifications.enabled", "loud").is_err());
        assert!(set_json_value_at_path(&mut json, "cycle.work_min", "soon").is_err());
    }

    #[test]
    fn zero_durations_clamp_instead_of_failing() {
        let cfg = Config {
            cycle: CycleConfig {
                work_min: 0,
                break_min: 0,
            },
            ..Config::default()
        };
        let durations = cfg.durations();
        assert_eq!(durations.for_phase(Phase::Work), MIN_PHASE_DURATION_MS);
        assert_eq!(durations.for_phase(Phase::Break), MIN_PHASE_DURATION_MS);
    }
}
