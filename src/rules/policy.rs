use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Finding, Severity};

/// Policy verdict — the final pass/fail decision after applying the
/// ignore list and severity overrides to raw findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_findings: usize,
    pub effective_findings: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
}

/// Policy configuration loaded from `.contractshield.toml`. Keys are
/// detector ids, so native rules ("SOL-002") and Slither checks
/// ("reentrancy-eth") are addressed the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Detector ids to ignore entirely.
    #[serde(default)]
    pub ignore_detectors: HashSet<String>,
    /// Per-detector severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

fn default_fail_on() -> Severity {
    Severity::High
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::High,
            ignore_detectors: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Policy {
    /// Evaluate findings against this policy and produce a verdict.
    pub fn evaluate(&self, findings: &[Finding]) -> PolicyVerdict {
        let effective: Vec<Severity> = findings
            .iter()
            .filter(|f| !self.ignore_detectors.contains(&f.detector_id))
            .map(|f| {
                self.overrides
                    .get(&f.detector_id)
                    .copied()
                    .unwrap_or(f.severity)
            })
            .collect();

        let highest = effective.iter().copied().max();
        let failed = effective.iter().any(|&sev| sev >= self.fail_on);

        PolicyVerdict {
            pass: !failed,
            total_findings: findings.len(),
            effective_findings: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }

    /// Filter findings: remove ignored detectors, apply overrides.
    pub fn apply(&self, findings: &[Finding]) -> Vec<Finding> {
        findings
            .iter()
            .filter(|f| !self.ignore_detectors.contains(&f.detector_id))
            .map(|f| {
                let mut f = f.clone();
                if let Some(&override_sev) = self.overrides.get(&f.detector_id) {
                    f.severity = override_sev;
                }
                f
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{finding, Confidence, SourceTool};
    use std::path::PathBuf;

    fn make_finding(detector_id: &str, severity: Severity) -> Finding {
        Finding {
            id: finding::sequential_id(SourceTool::NativeRules, 1),
            title: "Test".into(),
            severity,
            confidence: Confidence::High,
            description: "test".into(),
            file_path: PathBuf::from("a.sol"),
            line_number: 1,
            code_snippet: String::new(),
            weakness_ref: None,
            exploitability: String::new(),
            remediation: "fix".into(),
            fix_prompt: String::new(),
            contract_name: None,
            function_name: None,
            detector_id: detector_id.into(),
            source_tool: SourceTool::NativeRules,
            chain_specific: false,
            rule_id: Some(detector_id.into()),
            threat_id: String::new(),
        }
    }

    #[test]
    fn default_policy_fails_on_high() {
        let policy = Policy::default();
        let findings = vec![make_finding("SOL-001", Severity::High)];
        let verdict = policy.evaluate(&findings);
        assert!(!verdict.pass);
    }

    #[test]
    fn default_policy_passes_on_medium() {
        let policy = Policy::default();
        let findings = vec![make_finding("SOL-004", Severity::Medium)];
        let verdict = policy.evaluate(&findings);
        assert!(verdict.pass);
    }

    #[test]
    fn ignore_detector_removes_finding() {
        let mut policy = Policy::default();
        policy.ignore_detectors.insert("SOL-001".into());
        let findings = vec![make_finding("SOL-001", Severity::Critical)];
        let verdict = policy.evaluate(&findings);
        assert!(verdict.pass);
        assert_eq!(verdict.effective_findings, 0);
    }

    #[test]
    fn override_downgrades_severity() {
        let mut policy = Policy::default();
        policy.overrides.insert("reentrancy-eth".into(), Severity::Info);
        let findings = vec![make_finding("reentrancy-eth", Severity::Critical)];
        let verdict = policy.evaluate(&findings);
        assert!(verdict.pass);
    }
}
