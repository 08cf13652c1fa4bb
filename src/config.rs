use crate::error::{BallotError, Result};
use crate::matcher::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Acceptance threshold on the 0-100 scale; the sole tunable
    /// governing validity.
    pub threshold: f64,
    /// External vision CLI used as the OCR provider.
    pub ocr_command: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ocr_command: "claude".into(),
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BallotError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("ballot-verify").join("config.json"))
    }

    /// Environment variable takes precedence over the stored command.
    pub fn effective_ocr_command(&self) -> String {
        std::env::var("BALLOT_OCR_COMMAND").unwrap_or_else(|_| self.ocr_command.clone())
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(BallotError::Config(format!(
                "threshold must be within 0-100, got {}",
                threshold
            )));
        }
        self.threshold = threshold;
        self.save()
    }

    pub fn set_ocr_command(&mut self, command: String) -> Result<()> {
        self.ocr_command = command;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_in_range() {
        let config = Config::default();
        assert!((0.0..=100.0).contains(&config.threshold));
        assert_eq!(config.ocr_command, "claude");
    }

    #[test]
    fn test_threshold_validation() {
        let mut config = Config::default();
        let err = config.set_threshold(150.0).unwrap_err();
        assert!(matches!(err, BallotError::Config(_)));
        // rejected value must not stick
        assert_eq!(config.threshold, Config::default().threshold);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            threshold: 85.0,
            ocr_command: "gemini".into(),
            timeout_seconds: 60,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.threshold, 85.0);
        assert_eq!(parsed.ocr_command, "gemini");
    }
}
