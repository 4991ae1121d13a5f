//! User settings for Spendwise
//!
//! Display preferences, the default account type for new users and whether
//! mutations are written to the audit log.

use serde::{Deserialize, Serialize};

use super::paths::SpendwisePaths;
use crate::error::SpendwiseError;
use crate::models::{Money, UserType};

/// User settings for Spendwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol shown in reports and tables
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Account type given to newly registered users
    #[serde(default)]
    pub default_user_type: UserType,

    /// Whether mutations are appended to audit.log
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₱".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_user_type: UserType::default(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SpendwisePaths) -> Result<Self, SpendwiseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SpendwiseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SpendwiseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Not persisted until the caller saves
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendwisePaths) -> Result<(), SpendwiseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SpendwiseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendwiseError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Format an amount with the configured currency symbol
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Set a setting by its key, as used by `spendwise config`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpendwiseError> {
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(SpendwiseError::Validation(
                        "Date format cannot be empty".into(),
                    ));
                }
                self.date_format = value.to_string();
            }
            "default_user_type" => {
                self.default_user_type = value.parse().map_err(SpendwiseError::Validation)?;
            }
            "audit_enabled" => {
                self.audit_enabled = value.parse().map_err(|_| {
                    SpendwiseError::Validation(format!(
                        "audit_enabled must be true or false, got '{}'",
                        value
                    ))
                })?;
            }
            _ => {
                return Err(SpendwiseError::Config(format!(
                    "Unknown setting '{}'",
                    key
                )))
            }
        }
        Ok(())
    }
}
