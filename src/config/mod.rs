use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::policy::Policy;

/// Top-level configuration from `.contractshield.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Scan-surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns (relative to the target) excluded from both the
    /// native engine and the Slither invocation.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Whether to run the external Slither analysis at all.
    #[serde(default = "default_slither")]
    pub slither: bool,
}

fn default_slither() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            slither: true,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# contract-shield configuration
# See https://github.com/limaronaldo/contractshield for documentation.

[policy]
# Minimum severity to fail the scan (info, low, medium, high, critical).
fail_on = "high"

# Detector ids to ignore entirely. Works for native rules and Slither checks.
# ignore_detectors = ["SOL-011", "naming-convention"]

# Per-detector severity overrides.
# [policy.overrides]
# "timestamp" = "info"

[scan]
# Glob patterns excluded from analysis, relative to the target directory.
exclude = ["node_modules/*", "lib/*"]

# Set to false to skip the external Slither analysis.
slither = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use std::fs;

    #[test]
    fn missing_file_yields_default() {
        let config = Config::load(Path::new("/nonexistent/.contractshield.toml")).unwrap();
        assert_eq!(config.policy.fail_on, Severity::High);
        assert!(config.scan.slither);
    }

    #[test]
    fn starter_toml_round_trips() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config.policy.fail_on, Severity::High);
        assert_eq!(config.scan.exclude, ["node_modules/*", "lib/*"]);
    }

    #[test]
    fn loads_overrides_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".contractshield.toml");
        fs::write(
            &path,
            r#"
[policy]
fail_on = "critical"
ignore_detectors = ["SOL-011"]

[policy.overrides]
"timestamp" = "info"

[scan]
exclude = ["mocks/*"]
slither = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.policy.fail_on, Severity::Critical);
        assert!(config.policy.ignore_detectors.contains("SOL-011"));
        assert_eq!(config.policy.overrides["timestamp"], Severity::Info);
        assert_eq!(config.scan.exclude, ["mocks/*"]);
        assert!(!config.scan.slither);
    }
}
