use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A normalized vulnerability finding, emitted by the native rule engine or
/// the Slither adapter in the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Sequential identifier, zero-padded, scoped to the producing scanner
    /// and reset per invocation (e.g. "NATIVE-0003").
    pub id: String,
    /// Human-readable rule or detector title.
    pub title: String,
    /// Severity level.
    pub severity: Severity,
    /// Confidence level (how certain we are this is a real issue).
    pub confidence: Confidence,
    /// Human-readable description of the finding.
    pub description: String,
    /// File the match was found in.
    pub file_path: PathBuf,
    /// 1-based line number of the match.
    pub line_number: usize,
    /// Match line plus up to two lines of context on each side.
    pub code_snippet: String,
    /// SWC registry reference (e.g. "SWC-115"), when one applies.
    pub weakness_ref: Option<String>,
    /// How an attacker would leverage the issue.
    pub exploitability: String,
    /// Suggested remediation. Never empty.
    pub remediation: String,
    /// Templated natural-language instruction for an automated-fix consumer.
    pub fix_prompt: String,
    /// Enclosing contract, when one could be determined.
    pub contract_name: Option<String>,
    /// Enclosing function, when one could be determined.
    pub function_name: Option<String>,
    /// Identifier of the rule or external detector that fired.
    pub detector_id: String,
    /// Which producer emitted this finding.
    pub source_tool: SourceTool,
    /// True when the originating rule targets EVM chain semantics rather
    /// than general Solidity hygiene.
    pub chain_specific: bool,
    /// Id of the native rule that produced this finding, if any.
    pub rule_id: Option<String>,
    /// Populated by the downstream threat-linking stage. Always empty when
    /// a finding leaves this crate.
    pub threat_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Which producer emitted a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTool {
    NativeRules,
    Slither,
}

impl SourceTool {
    /// Prefix for sequential finding ids produced by this scanner.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::NativeRules => "NATIVE",
            Self::Slither => "SLITHER",
        }
    }
}

impl std::fmt::Display for SourceTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NativeRules => write!(f, "native-rules"),
            Self::Slither => write!(f, "slither"),
        }
    }
}

/// Sequential, zero-padded finding id scoped to one producer invocation.
pub fn sequential_id(tool: SourceTool, n: usize) -> String {
    format!("{}-{:04}", tool.id_prefix(), n)
}

/// Canned exploitability note per severity. Slither findings append the
/// tool's own confidence label to this.
pub fn exploitability_note(severity: Severity) -> String {
    match severity {
        Severity::Critical => {
            "Exploitable by any external caller; direct loss of funds or full contract takeover is likely."
        }
        Severity::High => {
            "Exploitable under common conditions; attacker-controlled inputs or transactions reach the flagged code."
        }
        Severity::Medium => {
            "Exploitable in combination with other weaknesses or specific contract states."
        }
        Severity::Low => "Limited direct impact; weakens the contract's defensive posture.",
        Severity::Info => "Informational; no direct exploit path, flagged for code hygiene.",
    }
    .to_string()
}

/// Templated instruction for an automated-fix consumer.
pub fn fix_prompt(
    title: &str,
    severity: Severity,
    file_path: &Path,
    line_number: usize,
    contract_name: Option<&str>,
    remediation: &str,
) -> String {
    format!(
        "Fix the {} severity issue \"{}\" in contract '{}' ({}, line {}). {} \
         Return the corrected Solidity source for the affected code only.",
        severity,
        title,
        contract_name.unwrap_or("Unknown"),
        file_path.display(),
        line_number,
        remediation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn severity_lenient_parse() {
        assert_eq!(Severity::from_str_lenient("HIGH"), Some(Severity::High));
        assert_eq!(
            Severity::from_str_lenient("Informational"),
            Some(Severity::Info)
        );
        assert_eq!(Severity::from_str_lenient("banana"), None);
    }

    #[test]
    fn sequential_ids_are_zero_padded() {
        assert_eq!(sequential_id(SourceTool::NativeRules, 1), "NATIVE-0001");
        assert_eq!(sequential_id(SourceTool::Slither, 42), "SLITHER-0042");
        assert_eq!(sequential_id(SourceTool::Slither, 12345), "SLITHER-12345");
    }

    #[test]
    fn fix_prompt_names_location_and_remediation() {
        let prompt = fix_prompt(
            "Weak randomness",
            Severity::High,
            Path::new("contracts/Lottery.sol"),
            10,
            Some("Lottery"),
            "Use a commit-reveal scheme.",
        );
        assert!(prompt.contains("contracts/Lottery.sol"));
        assert!(prompt.contains("line 10"));
        assert!(prompt.contains("Lottery"));
        assert!(prompt.contains("commit-reveal"));
    }
}
