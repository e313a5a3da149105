//! Configuration for settlement engine

use ledger_core::SplitMode;
use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Default tracing directive (overridden by `RUST_LOG`)
    pub log_level: String,

    /// Settlement configuration
    pub settlement: SettlementConfig,

    /// Expense recording configuration
    pub expenses: ExpenseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "splitfast".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            settlement: SettlementConfig::default(),
            expenses: ExpenseConfig::default(),
        }
    }
}

/// Settlement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Largest tolerated |Σ balances| in minor units before settlement
    /// refuses the input. Integer netting always sums to zero, so any
    /// non-zero total means corrupted upstream data.
    pub conservation_tolerance_minor_units: i64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            conservation_tolerance_minor_units: 0,
        }
    }
}

/// Expense recording configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseConfig {
    /// Split mode applied when an expense does not name one
    pub default_split_mode: SplitMode,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(level) = std::env::var("SPLITFAST_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(tolerance) = std::env::var("SPLITFAST_TOLERANCE_MINOR_UNITS") {
            config.settlement.conservation_tolerance_minor_units =
                tolerance.trim().parse().map_err(|e| {
                    crate::Error::Config(format!("Invalid tolerance {:?}: {}", tolerance, e))
                })?;
        }

        if let Ok(mode) = std::env::var("SPLITFAST_DEFAULT_SPLIT") {
            config.expenses.default_split_mode = mode
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid split mode: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.settlement.conservation_tolerance_minor_units < 0 {
            return Err(crate::Error::Config(format!(
                "conservation tolerance must be >= 0, got {}",
                self.settlement.conservation_tolerance_minor_units
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "splitfast");
        assert_eq!(config.settlement.conservation_tolerance_minor_units, 0);
        assert_eq!(
            config.expenses.default_split_mode,
            SplitMode::EqualIncludingPayer
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[settlement]
conservation_tolerance_minor_units = 2

[expenses]
default_split_mode = "equal_excluding_payer"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_name, "splitfast");
        assert_eq!(config.settlement.conservation_tolerance_minor_units, 2);
        assert_eq!(
            config.expenses.default_split_mode,
            SplitMode::EqualExcludingPayer
        );
    }

    #[test]
    fn test_from_file_rejects_negative_tolerance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settlement]\nconservation_tolerance_minor_units = -1").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "settlement = 12").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }
}
