//! # Configuration
//!
//! Loading order:
//! 1. `consent-portal.toml` (or the file named by `CONSENT_CONFIG`), defaults if absent
//! 2. `CONSENT_*` environment overrides
//!
//! `load` does not validate; call [`PortalConfig::validate`] afterwards.
//!
//! ```toml
//! [bankid]
//! poll_interval_ms = 2000
//! max_attempts = 30
//! completion_after_ms = 3000
//!
//! [actors]
//! buffer_size = 32
//!
//! [session]
//! path = ".consent/session.json"
//! ```

use crate::bankid::PollConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "consent-portal.toml";

pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 1_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

pub const MIN_COMPLETION_AFTER_MS: u64 = 0;
pub const MAX_COMPLETION_AFTER_MS: u64 = 600_000;
pub const DEFAULT_COMPLETION_AFTER_MS: u64 = 3_000;

pub const MIN_BUFFER_SIZE: usize = 1;
pub const MAX_BUFFER_SIZE: usize = 10_000;
pub const DEFAULT_BUFFER_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub bankid: BankIdConfig,
    pub actors: ActorsConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BankIdConfig {
    /// Wait between two status checks.
    pub poll_interval_ms: u64,
    /// Status checks before a login times out.
    pub max_attempts: u32,
    /// Age at which a simulated order completes.
    pub completion_after_ms: u64,
}

impl Default for BankIdConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            completion_after_ms: DEFAULT_COMPLETION_AFTER_MS,
        }
    }
}

impl BankIdConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            max_attempts: self.max_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn completion_after(&self) -> Duration {
        Duration::from_millis(self.completion_after_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "bankid.poll_interval_ms",
            self.poll_interval_ms,
            MIN_POLL_INTERVAL_MS,
            MAX_POLL_INTERVAL_MS,
        )?;
        check_range(
            "bankid.max_attempts",
            self.max_attempts,
            MIN_MAX_ATTEMPTS,
            MAX_MAX_ATTEMPTS,
        )?;
        check_range(
            "bankid.completion_after_ms",
            self.completion_after_ms,
            MIN_COMPLETION_AFTER_MS,
            MAX_COMPLETION_AFTER_MS,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorsConfig {
    /// Request channel capacity of every record actor.
    pub buffer_size: usize,
}

impl Default for ActorsConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ActorsConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "actors.buffer_size",
            self.buffer_size,
            MIN_BUFFER_SIZE,
            MAX_BUFFER_SIZE,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file for the logged-in session. Sessions live in memory when unset.
    pub path: Option<PathBuf>,
}

impl PortalConfig {
    /// Reads `path` if given, else `CONSENT_CONFIG`, else [`DEFAULT_CONFIG_FILE`]; then
    /// applies environment overrides. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("CONSENT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let mut config = if path.exists() {
            Self::load_toml(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Applies `CONSENT_*` overrides read through `lookup`. Unparseable values are
    /// ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        apply_parse(
            &lookup,
            "CONSENT_POLL_INTERVAL_MS",
            &mut self.bankid.poll_interval_ms,
        );
        apply_parse(&lookup, "CONSENT_MAX_ATTEMPTS", &mut self.bankid.max_attempts);
        apply_parse(
            &lookup,
            "CONSENT_COMPLETION_AFTER_MS",
            &mut self.bankid.completion_after_ms,
        );
        apply_parse(&lookup, "CONSENT_ACTOR_BUFFER", &mut self.actors.buffer_size);
        if let Some(path) = lookup("CONSENT_SESSION_PATH") {
            self.session.path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.bankid.validate()?;
        self.actors.validate()
    }
}

fn apply_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(name) {
        match raw.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(name, value = %raw, "Ignoring unparseable override"),
        }
    }
}

fn check_range<T>(key: &str, value: T, min: T, max: T) -> ConfigResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{key} must be {min}-{max}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = PortalConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bankid.poll_config(), PollConfig::default());
        assert_eq!(config.bankid.completion_after(), Duration::from_secs(3));
        assert!(config.session.path.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        std::fs::write(
            &path,
            "[bankid]\nmax_attempts = 5\n\n[session]\npath = \"s.json\"\n",
        )
        .unwrap();

        let config = PortalConfig::load_toml(&path).unwrap();
        assert_eq!(config.bankid.max_attempts, 5);
        assert_eq!(config.bankid.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.actors.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.session.path, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_bad_toml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        std::fs::write(&path, "[bankid\n").unwrap();

        let err = PortalConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: p, .. } if p == path));
    }

    #[test]
    fn test_overrides_apply_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = [
            ("CONSENT_POLL_INTERVAL_MS", "50"),
            ("CONSENT_MAX_ATTEMPTS", "many"),
            ("CONSENT_SESSION_PATH", "/tmp/session.json"),
        ]
        .into_iter()
        .collect();

        let mut config = PortalConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.bankid.poll_interval_ms, 50);
        assert_eq!(config.bankid.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(
            config.session.path,
            Some(PathBuf::from("/tmp/session.json"))
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let mut config = PortalConfig::default();
        config.bankid.max_attempts = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bankid.max_attempts must be 1-1000, got 0"));

        let mut config = PortalConfig::default();
        config.actors.buffer_size = 0;
        assert!(config.validate().is_err());

        let mut config = PortalConfig::default();
        config.bankid.poll_interval_ms = 5;
        assert!(config.validate().is_err());
    }
}
