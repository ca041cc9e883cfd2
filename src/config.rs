//! Engine configuration.
//!
//! Thresholds live in `~/.atos/config.json` (or a path given by the caller).
//! Every field has a default, so a missing file or a partial file is fine;
//! the values are validated on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AtosError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Claimed minus approved (USD) above which a payout shortfall is raised.
    pub payout_shortfall_threshold_usd: f64,
    /// Days without carrier contact before an open claim counts as stale.
    pub stale_interaction_days: i64,
    /// Verified-evidence ratio below which coverage is flagged.
    pub evidence_coverage_floor: f64,
    /// In-progress milestones below this percent are flagged.
    pub low_progress_percent: f64,
    /// Payout/claimed ratio below which recovery is flagged.
    pub recovery_ratio_floor: f64,
    /// Maximum length of the optional request question, in characters.
    pub question_max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            payout_shortfall_threshold_usd: 1_000.0,
            stale_interaction_days: 14,
            evidence_coverage_floor: 0.5,
            low_progress_percent: 50.0,
            recovery_ratio_floor: 0.75,
            question_max_chars: 500,
        }
    }
}

/// `~/.atos/config.json`, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".atos").join("config.json"))
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<EngineConfig, AtosError> {
    let content = fs::read_to_string(path).map_err(|source| AtosError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the explicit path if given, else the default path if it exists,
/// else built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<EngineConfig, AtosError> {
    if let Some(p) = path {
        return load_config(p);
    }
    match default_config_path() {
        Some(p) if p.exists() => load_config(&p),
        _ => {
            log::debug!("No config file found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

pub fn validate_config(config: &EngineConfig) -> Result<(), AtosError> {
    if !config.payout_shortfall_threshold_usd.is_finite() || config.payout_shortfall_threshold_usd < 0.0 {
        return Err(AtosError::InvalidConfig(
            "payoutShortfallThresholdUsd must be a non-negative number".into(),
        ));
    }
    if config.stale_interaction_days < 0 {
        return Err(AtosError::InvalidConfig(
            "staleInteractionDays must not be negative".into(),
        ));
    }
    for (name, value) in [
        ("evidenceCoverageFloor", config.evidence_coverage_floor),
        ("recoveryRatioFloor", config.recovery_ratio_floor),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(AtosError::InvalidConfig(format!(
                "{} must be between 0 and 1, got {}",
                name, value
            )));
        }
    }
    if !(0.0..=100.0).contains(&config.low_progress_percent) {
        return Err(AtosError::InvalidConfig(format!(
            "lowProgressPercent must be between 0 and 100, got {}",
            config.low_progress_percent
        )));
    }
    if config.question_max_chars == 0 {
        return Err(AtosError::InvalidConfig(
            "questionMaxChars must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.stale_interaction_days, 14);
        assert_eq!(config.question_max_chars, 500);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "staleInteractionDays": 21 }}"#).unwrap();

        let config = load_config(file.path()).expect("partial config should load");
        assert_eq!(config.stale_interaction_days, 21);
        assert_eq!(config.payout_shortfall_threshold_usd, 1_000.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EngineConfig::default();
        config.evidence_coverage_floor = 1.5;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), "invalid-config");
        assert!(err.to_string().contains("evidenceCoverageFloor"));

        let mut config = EngineConfig::default();
        config.question_max_chars = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.code(), "config-parse");

        let err = load_config(Path::new("/nonexistent/atos/config.json")).unwrap_err();
        assert_eq!(err.code(), "config-read");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "recoveryRatioFloor": 0.9 }"#).unwrap();
        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.recovery_ratio_floor, 0.9);
    }
}
