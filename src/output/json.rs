use crate::error::Result;
use crate::rules::policy::PolicyVerdict;
use crate::rules::Finding;

use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    tool: &'static str,
    version: &'static str,
    target: &'a str,
    generated_at: String,
    findings: &'a [Finding],
    verdict: &'a PolicyVerdict,
}

/// Render findings as a JSON report.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict, target_name: &str) -> Result<String> {
    let report = JsonReport {
        tool: "contract-shield",
        version: env!("CARGO_PKG_VERSION"),
        target: target_name,
        generated_at: chrono::Utc::now().to_rfc3339(),
        findings,
        verdict,
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::policy::Policy;

    #[test]
    fn report_is_valid_json_with_envelope() {
        let verdict = Policy::default().evaluate(&[]);
        let out = render(&[], &verdict, "contracts").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["tool"], "contract-shield");
        assert_eq!(value["target"], "contracts");
        assert!(value["findings"].as_array().unwrap().is_empty());
        assert_eq!(value["verdict"]["pass"], true);
    }
}
