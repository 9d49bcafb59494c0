//! contract-shield — static vulnerability scanner for Solidity smart
//! contracts.
//!
//! Two producers emit one normalized finding shape: a native rule engine
//! driven by a declarative table of textual patterns, and an adapter that
//! invokes the external Slither analyzer and reconciles its detector
//! vocabulary into the same shape. Merging across scanners and threat
//! linking happen downstream; findings leave this crate with an empty
//! `threat_id`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use contractshield::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./contracts"), &options).unwrap();
//! println!("Pass: {}, Findings: {}", report.verdict.pass, report.findings.len());
//! ```

pub mod adapter;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod rules;
pub mod source;

use std::path::Path;

use adapter::slither::SlitherAdapter;
use config::Config;
use error::Result;
use output::OutputFormat;
use rules::policy::PolicyVerdict;
use rules::{Finding, RuleEngine};

/// Options for a scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.contractshield.toml` in scan dir).
    pub config_path: Option<std::path::PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
    /// Extra exclude globs, merged with the config's.
    pub exclude: Vec<String>,
    /// Skip the external Slither analysis regardless of config.
    pub skip_slither: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            fail_on_override: None,
            exclude: Vec::new(),
            skip_slither: false,
        }
    }
}

/// Complete scan report.
#[derive(Debug)]
pub struct ScanReport {
    pub target_name: String,
    pub findings: Vec<Finding>,
    pub verdict: PolicyVerdict,
}

/// Run a complete scan: discover sources, run the native rules, run the
/// Slither adapter, evaluate policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanReport> {
    // Load config
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| path.join(".contractshield.toml"));
    let mut config = Config::load(&config_path)?;

    // Apply CLI overrides
    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }
    let mut excludes = config.scan.exclude.clone();
    excludes.extend(options.exclude.iter().cloned());

    // Native rule engine. The rule set is validated here, before any file
    // is touched.
    let engine = RuleEngine::with_builtin_rules()?;
    let sources = source::collect_sources(path, &excludes)?;
    let mut all_findings = engine.scan(&sources);

    // External analysis. A missing or failing tool contributes zero
    // findings and never fails the scan.
    if config.scan.slither && !options.skip_slither {
        all_findings.extend(SlitherAdapter::run(path, &excludes));
    }

    let target_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "target".into());

    // Apply policy (ignore list, overrides)
    let effective_findings = config.policy.apply(&all_findings);
    let verdict = config.policy.evaluate(&all_findings);

    Ok(ScanReport {
        target_name,
        findings: effective_findings,
        verdict,
    })
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    output::render(
        &report.findings,
        &report.verdict,
        format,
        &report.target_name,
    )
}
