//! Global World Info settings.
//!
//! Loaded from TOML (or JSON) with per-field defaults, then validated before
//! use. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LoreError, Result};

/// The global activation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldInfoSettings {
    /// Number of most recent chat messages scanned for keys.
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Share of the total context (percent, 0-100) available to entries.
    #[serde(default = "default_budget")]
    pub budget: u32,

    /// Absolute token cap. Zero means uncapped.
    #[serde(default)]
    pub budget_cap: usize,

    /// Entries admitted even when they exceed the budget.
    #[serde(default)]
    pub min_activations: usize,

    /// Restricts the guaranteed admissions to entries matched within this
    /// many recent messages. Zero means unrestricted.
    #[serde(default)]
    pub min_activations_depth_max: usize,

    /// Whether activated content is re-scanned.
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Total number of activation passes. Zero allows only the first pass.
    #[serde(default = "default_max_recursion_steps")]
    pub max_recursion_steps: usize,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub match_whole_words: bool,

    /// Prefix scanned messages with the sender's name.
    #[serde(default = "default_true")]
    pub include_names: bool,

    /// Report when entries were dropped for budget reasons.
    #[serde(default)]
    pub overflow_alert: bool,
}

fn default_depth() -> usize {
    2
}
fn default_budget() -> u32 {
    25
}
fn default_true() -> bool {
    true
}
fn default_max_recursion_steps() -> usize {
    3
}

impl Default for WorldInfoSettings {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            budget: default_budget(),
            budget_cap: 0,
            min_activations: 0,
            min_activations_depth_max: 0,
            recursive: true,
            max_recursion_steps: default_max_recursion_steps(),
            case_sensitive: false,
            match_whole_words: false,
            include_names: true,
            overflow_alert: false,
        }
    }
}

impl WorldInfoSettings {
    /// Parse and validate settings from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a `.toml` or `.json` file. A missing file yields
    /// the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.budget > 100 {
            return Err(LoreError::Config {
                message: format!("budget must be a percentage in [0, 100], got {}", self.budget),
            });
        }
        Ok(())
    }

    /// Number of activation passes the settings allow.
    pub fn max_passes(&self) -> usize {
        if self.recursive {
            self.max_recursion_steps.max(1)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = WorldInfoSettings::default();
        assert_eq!(settings.depth, 2);
        assert_eq!(settings.budget, 25);
        assert!(settings.recursive);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings = WorldInfoSettings::from_toml_str(
            r#"
depth = 4
caseSensitive = true
budgetCap = 800
"#,
        )
        .unwrap();

        assert_eq!(settings.depth, 4);
        assert!(settings.case_sensitive);
        assert_eq!(settings.budget_cap, 800);
        assert_eq!(settings.budget, 25);
        assert!(settings.include_names);
    }

    #[test]
    fn test_budget_out_of_range_rejected() {
        let result = WorldInfoSettings::from_toml_str("budget = 150");
        assert!(matches!(result, Err(LoreError::Config { .. })));
    }

    #[test]
    fn test_max_passes() {
        let mut settings = WorldInfoSettings::default();
        settings.max_recursion_steps = 5;
        assert_eq!(settings.max_passes(), 5);

        settings.max_recursion_steps = 0;
        assert_eq!(settings.max_passes(), 1);

        settings.max_recursion_steps = 5;
        settings.recursive = false;
        assert_eq!(settings.max_passes(), 1);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = WorldInfoSettings::load("/nonexistent/world_info.toml").unwrap();
        assert_eq!(settings, WorldInfoSettings::default());
    }
}
