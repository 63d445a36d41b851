//! Configuration: per-form options and the engine's user config file

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Submission method used when nothing else names one
pub const DEFAULT_METHOD: &str = "post";

/// Honeypot field name used when the spam filter is on without a name
pub const DEFAULT_HONEYPOT: &str = "bot-field";

/// Form-level options, carried alongside the field registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormOptions {
    /// Submission method
    #[serde(default)]
    pub method: Option<String>,
    /// Styling hook for the form element
    #[serde(default)]
    pub custom_class: Option<String>,
    /// Reject submissions whose honeypot field was filled in
    #[serde(default)]
    pub spam_filter: bool,
    /// Alternate honeypot field name
    #[serde(default)]
    pub honeypot: Option<String>,
}

impl FormOptions {
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_METHOD)
    }

    /// Name of the honeypot field, if the spam filter is enabled
    pub fn honeypot_field(&self) -> Option<&str> {
        if !self.spam_filter {
            return None;
        }
        Some(self.honeypot.as_deref().unwrap_or(DEFAULT_HONEYPOT))
    }
}

/// Policy knobs for [`Form::validate_all`](crate::Form::validate_all)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Leave disabled fields out of the aggregate gate
    pub exempt_disabled: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            exempt_disabled: true,
        }
    }
}

/// User configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Leave disabled fields out of the submission gate (default true)
    pub exempt_disabled_fields: Option<bool>,
    /// Submission method for definitions that do not name one
    pub default_method: Option<String>,
    /// Honeypot name for definitions that enable the spam filter without one
    pub honeypot_field: Option<String>,
}

impl EngineConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formkit", "formkit")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file, defaulting when it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            exempt_disabled: self.exempt_disabled_fields.unwrap_or(true),
        }
    }

    /// Fill in options a definition left open
    pub fn apply_to(&self, options: &mut FormOptions) {
        if options.method.is_none() {
            options.method = self.default_method.clone();
        }
        if options.spam_filter && options.honeypot.is_none() {
            options.honeypot = self.honeypot_field.clone();
        }
    }
}
