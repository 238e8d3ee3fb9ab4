//! TOML-based application configuration.
//!
//! Stores:
//! - Question source location
//! - Scoring policy
//! - Result notification target (sender, credential, endpoint)
//!
//! Configuration is stored at `~/.config/quizroom/config.toml` unless an
//! explicit path is given.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, NotifyError};
use crate::notify::{LogSink, NotificationSink, WebhookSink, WebhookTarget};
use crate::session::ScoringPolicy;

/// Environment variable that overrides `notification.credential`.
pub const CREDENTIAL_ENV: &str = "QUIZROOM_NOTIFY_CREDENTIAL";

/// Shown in place of a stored credential.
pub const CREDENTIAL_MASK: &str = "********";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_questions_path")]
    pub questions_path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub policy: ScoringPolicy,
}

/// Result notification target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// When false, results are only written to the log.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub sender: String,
    /// Empty means "send to the sender".
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub credential: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    /// File this config was loaded from; `save` writes back there.
    #[serde(skip)]
    source: Option<PathBuf>,
}

fn default_questions_path() -> PathBuf {
    PathBuf::from("questions.json")
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_path: default_questions_path(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: String::new(),
            recipient: String::new(),
            credential: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz: QuizConfig::default(),
            scoring: ScoringConfig::default(),
            notification: NotificationConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            return Self::load_from(&path);
        }
        let mut cfg = Self::default();
        cfg.source = Some(path);
        cfg.save()?;
        Ok(cfg)
    }

    /// Load from an explicit file, which must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        cfg.source = Some(path.to_path_buf());
        Ok(cfg)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "notification.timeout_secs".into(),
                message: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }

    /// Copy fit for display, with the credential masked.
    pub fn redacted(&self) -> Config {
        let mut cfg = self.clone();
        if !cfg.notification.credential.is_empty() {
            cfg.notification.credential = CREDENTIAL_MASK.to_string();
        }
        cfg
    }

    /// Persist to the file it was loaded from, or the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path()?,
        };
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Let the environment supply the credential so it can stay out of the file.
    pub fn apply_env(&mut self) {
        if let Ok(credential) = std::env::var(CREDENTIAL_ENV) {
            if !credential.is_empty() {
                self.notification.credential = credential;
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let root = toml::Value::try_from(self).ok()?;
        let value = key
            .split('.')
            .try_fold(&root, |node, part| node.get(part))?;
        match value {
            toml::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing type.
    /// Only updates memory; call `save` to persist.
    ///
    /// # Errors
    ///
    /// `UnknownKey` for keys that do not name an existing leaf value,
    /// `InvalidValue` if the value does not parse or validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut root = toml::Value::try_from(&*self).map_err(|e| invalid(e.to_string()))?;
        let slot = key
            .split('.')
            .try_fold(&mut root, |node, part| node.get_mut(part))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        *slot = match &*slot {
            toml::Value::Boolean(_) => toml::Value::Boolean(
                value.parse().map_err(|_| invalid(format!("'{value}' is not a boolean")))?,
            ),
            toml::Value::Integer(_) => toml::Value::Integer(
                value.parse().map_err(|_| invalid(format!("'{value}' is not an integer")))?,
            ),
            toml::Value::String(_) => toml::Value::String(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };

        let mut updated: Config = root
            .try_into()
            .map_err(|e: toml::de::Error| invalid(e.to_string()))?;
        updated.validate()?;
        updated.source = self.source.take();
        *self = updated;
        Ok(())
    }

    pub fn webhook_target(&self) -> WebhookTarget {
        let n = &self.notification;
        WebhookTarget {
            sender: n.sender.clone(),
            recipient: (!n.recipient.is_empty()).then(|| n.recipient.clone()),
            credential: n.credential.clone(),
            endpoint: n.endpoint.clone(),
            timeout: Duration::from_secs(n.timeout_secs),
        }
    }

    /// Build the notification sink this config describes.
    pub fn sink(&self) -> Result<Arc<dyn NotificationSink>, NotifyError> {
        if self.notification.enabled {
            Ok(Arc::new(WebhookSink::new(self.webhook_target())?))
        } else {
            Ok(Arc::new(LogSink))
        }
    }
}
