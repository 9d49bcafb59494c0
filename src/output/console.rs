use crate::rules::policy::PolicyVerdict;
use crate::rules::{Finding, Severity};

/// Render findings as console output, grouped by severity then file path.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict) -> String {
    let mut output = String::new();

    if findings.is_empty() {
        output.push_str("\n  No security findings detected.\n\n");
        return output;
    }

    // Sort by severity (critical first), then by file path
    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.line_number.cmp(&b.line_number))
    });

    output.push_str(&format!("\n  {} finding(s) detected:\n\n", findings.len()));

    for finding in &sorted {
        let severity_tag = match finding.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::High => "[HIGH]    ",
            Severity::Medium => "[MEDIUM]  ",
            Severity::Low => "[LOW]     ",
            Severity::Info => "[INFO]    ",
        };

        let context = match (&finding.contract_name, &finding.function_name) {
            (Some(c), Some(f)) => format!(" ({c}.{f})"),
            (Some(c), None) => format!(" ({c})"),
            _ => String::new(),
        };

        output.push_str(&format!(
            "  {} {} {}\n",
            severity_tag, finding.detector_id, finding.title
        ));
        output.push_str(&format!(
            "           at {}:{}{}\n",
            finding.file_path.display(),
            finding.line_number,
            context,
        ));
        output.push_str(&format!("           fix: {}\n", finding.remediation));
        output.push('\n');
    }

    // Verdict
    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::policy::Policy;
    use crate::rules::{RuleEngine, RuleSet};
    use crate::source::SourceFile;
    use std::path::PathBuf;

    #[test]
    fn empty_findings_render_clean_message() {
        let verdict = Policy::default().evaluate(&[]);
        let out = render(&[], &verdict);
        assert!(out.contains("No security findings"));
    }

    #[test]
    fn findings_render_with_location_and_verdict() {
        let engine = RuleEngine::new(RuleSet::builtin().unwrap());
        let files = [SourceFile {
            path: PathBuf::from("Auth.sol"),
            content: "contract Auth { function f() public { require(tx.origin == msg.sender); } }"
                .into(),
        }];
        let findings = engine.scan(&files);
        let verdict = Policy::default().evaluate(&findings);
        let out = render(&findings, &verdict);

        assert!(out.contains("SOL-001"));
        assert!(out.contains("Auth.sol:1"));
        assert!(out.contains("Result: FAIL"));
    }
}
