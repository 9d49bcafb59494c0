//! Slither adapter.
//!
//! Invokes the external `slither` analyzer against a target directory and
//! maps each detector result into a `Finding`: tool impact/confidence
//! labels go through fixed tables, the first location-bearing element
//! supplies file and line, and remediation comes from a static per-check
//! table with a generic fallback.
//!
//! Absence of the tool is an expected condition, not an error: the adapter
//! degrades to an empty result in every failure mode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::{run_command, CommandOutput};
use crate::context;
use crate::rules::finding::{self, Confidence, Finding, Severity, SourceTool};

pub const SLITHER_BIN: &str = "slither";

const RAW_OUTPUT_EXCERPT: usize = 256;

const GENERIC_REMEDIATION: &str =
    "Review the flagged code against the detector's documentation and apply the \
     least-privilege fix for the reported behavior.";

/// Outcome of one Slither invocation. Callers handle all three arms
/// explicitly; there is no nullable escape hatch.
#[derive(Debug)]
pub enum SlitherOutcome {
    /// The tool is not installed or not runnable. Expected, non-fatal.
    Unavailable,
    /// The tool ran but produced no usable report.
    Error(String),
    /// Parsed detector results, possibly empty.
    Ok(Vec<SlitherDetector>),
}

/// Top level of Slither's `--json -` report.
#[derive(Debug, Deserialize)]
pub struct SlitherReport {
    #[serde(default)]
    pub detectors: Vec<SlitherDetector>,
}

#[derive(Debug, Deserialize)]
pub struct SlitherDetector {
    pub check: String,
    pub impact: String,
    pub confidence: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<SlitherElement>,
    #[serde(default)]
    pub first_markdown_element: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlitherElement {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_mapping: Option<SourceMapping>,
    #[serde(default)]
    pub type_specific_fields: Option<TypeSpecificFields>,
}

#[derive(Debug, Deserialize)]
pub struct SourceMapping {
    #[serde(default)]
    pub filename_relative: String,
    #[serde(default)]
    pub lines: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TypeSpecificFields {
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Deserialize)]
pub struct ParentRef {
    #[serde(default)]
    pub name: String,
}

pub struct SlitherAdapter;

impl SlitherAdapter {
    /// Probe the tool with a trivial invocation. Any launch failure or
    /// non-zero exit means unavailable.
    pub fn available() -> bool {
        matches!(
            run_command(SLITHER_BIN, &["--version".to_string()]),
            Ok(output) if output.exit_code == 0
        )
    }

    /// Run Slither against `target_dir` and map its report into findings.
    ///
    /// Never errors: unavailability, tool failure and unparseable output
    /// all degrade to an empty result with a diagnostic log line.
    pub fn run(target_dir: &Path, exclude_paths: &[String]) -> Vec<Finding> {
        match Self::invoke(target_dir, exclude_paths) {
            SlitherOutcome::Unavailable => {
                tracing::info!("slither not found on PATH, skipping external analysis");
                Vec::new()
            }
            SlitherOutcome::Error(_) => Vec::new(),
            SlitherOutcome::Ok(detectors) => map_detectors(target_dir, detectors),
        }
    }

    /// One blocking round-trip: spawn, accumulate both streams in full,
    /// classify on exit. Resolves exactly once; no timeout is applied here
    /// (a wrapping caller may impose one and treat expiry as a tool error).
    pub fn invoke(target_dir: &Path, exclude_paths: &[String]) -> SlitherOutcome {
        if !Self::available() {
            return SlitherOutcome::Unavailable;
        }

        let mut args = vec![
            target_dir.display().to_string(),
            "--json".to_string(),
            "-".to_string(),
        ];
        for path in exclude_paths {
            args.push("--filter-paths".to_string());
            args.push(path.clone());
        }

        match run_command(SLITHER_BIN, &args) {
            Ok(output) => classify_output(output),
            Err(e) => {
                let message = format!("failed to launch slither: {e}");
                tracing::warn!(%message, "external analysis failed");
                SlitherOutcome::Error(message)
            }
        }
    }
}

/// Classify a finished invocation. Slither exits non-zero whenever it
/// reports findings, so the exit code alone means nothing: output presence
/// decides between the parse path and the error path.
fn classify_output(output: CommandOutput) -> SlitherOutcome {
    let stdout = output.stdout.trim();

    if stdout.is_empty() {
        if output.exit_code != 0 {
            if is_no_contracts(&output.stderr) {
                let message = "no Solidity contracts found in target; nothing for slither \
                               to analyze"
                    .to_string();
                tracing::info!(%message, "external analysis skipped");
                return SlitherOutcome::Error(message);
            }
            let message = format!(
                "slither exited with status {} and produced no output; check that the \
                 target compiles",
                output.exit_code
            );
            tracing::warn!(%message, "external analysis failed");
            return SlitherOutcome::Error(message);
        }
        return SlitherOutcome::Ok(Vec::new());
    }

    match serde_json::from_str::<SlitherReport>(stdout) {
        Ok(report) => SlitherOutcome::Ok(report.detectors),
        Err(e) => {
            let message = format!(
                "could not parse slither JSON output: {e}; output began with: {}",
                excerpt(stdout)
            );
            tracing::warn!(%message, "external analysis failed");
            SlitherOutcome::Error(message)
        }
    }
}

fn is_no_contracts(stderr: &str) -> bool {
    stderr.to_lowercase().contains("no contract")
}

fn excerpt(raw: &str) -> &str {
    if raw.len() <= RAW_OUTPUT_EXCERPT {
        return raw;
    }
    let mut end = RAW_OUTPUT_EXCERPT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

/// Map detector results 1:1 into findings. A result with no
/// location-bearing element is dropped silently; the first element that
/// carries a source mapping wins.
fn map_detectors(target_dir: &Path, detectors: Vec<SlitherDetector>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for detector in detectors {
        let Some((element, mapping)) = detector
            .elements
            .iter()
            .find_map(|e| e.source_mapping.as_ref().map(|m| (e, m)))
        else {
            continue;
        };

        let severity = impact_to_severity(&detector.impact);
        let confidence = confidence_from_label(&detector.confidence);
        let line_number = mapping.lines.first().copied().unwrap_or(0);
        let file_path = PathBuf::from(&mapping.filename_relative);
        let contract_name = contract_name_for(element);
        let function_name = (element.kind == "function" && !element.name.is_empty())
            .then(|| element.name.clone());
        let title = display_name(&detector.check);
        let remediation = remediation_for(&detector.check);
        let code_snippet = snippet_from_disk(target_dir, &mapping.filename_relative, line_number);
        let exploitability = format!(
            "{} Reported by Slither's {} detector with {} confidence.",
            finding::exploitability_note(severity),
            detector.check,
            detector.confidence,
        );
        let fix_prompt = finding::fix_prompt(
            &title,
            severity,
            &file_path,
            line_number,
            contract_name.as_deref(),
            &remediation,
        );

        let n = findings.len() + 1;
        findings.push(Finding {
            id: finding::sequential_id(SourceTool::Slither, n),
            title,
            severity,
            confidence,
            description: detector.description.trim().to_string(),
            file_path,
            line_number,
            code_snippet,
            weakness_ref: None,
            exploitability,
            remediation,
            fix_prompt,
            contract_name,
            function_name,
            detector_id: detector.check,
            source_tool: SourceTool::Slither,
            chain_specific: false,
            rule_id: None,
            threat_id: String::new(),
        });
    }

    findings
}

/// Fixed impact table. Unrecognized labels map to the lowest severity;
/// a detector result is never dropped over its label.
fn impact_to_severity(impact: &str) -> Severity {
    match impact {
        "High" => Severity::High,
        "Medium" => Severity::Medium,
        "Low" => Severity::Low,
        "Informational" => Severity::Info,
        "Optimization" => Severity::Info,
        _ => Severity::Info,
    }
}

fn confidence_from_label(confidence: &str) -> Confidence {
    match confidence {
        "High" => Confidence::High,
        "Low" => Confidence::Low,
        _ => Confidence::Medium,
    }
}

/// Contract attribution: nested parent reference first, then the element's
/// own name. `None` means the enclosing contract could not be determined.
fn contract_name_for(element: &SlitherElement) -> Option<String> {
    element
        .type_specific_fields
        .as_ref()
        .and_then(|t| t.parent.as_ref())
        .map(|p| p.name.clone())
        .filter(|name| !name.is_empty())
        .or_else(|| (!element.name.is_empty()).then(|| element.name.clone()))
}

/// Cosmetic display name: "reentrancy-eth" becomes "Reentrancy Eth".
/// Never used for lookups.
pub fn display_name(check: &str) -> String {
    check
        .split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn snippet_from_disk(target_dir: &Path, filename_relative: &str, line_number: usize) -> String {
    if filename_relative.is_empty() || line_number == 0 {
        return String::new();
    }
    match std::fs::read_to_string(target_dir.join(filename_relative)) {
        Ok(content) => context::snippet_around(&content, line_number),
        Err(_) => String::new(),
    }
}

static REMEDIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "reentrancy-eth",
            "Apply checks-effects-interactions: update all state before the external call, \
             or protect the function with a reentrancy guard.",
        ),
        (
            "reentrancy-no-eth",
            "Reorder the function so state updates precede external calls, even when no \
             ether is transferred.",
        ),
        (
            "arbitrary-send-eth",
            "Restrict the destination of value transfers to verified, caller-independent \
             addresses.",
        ),
        (
            "unchecked-transfer",
            "Check the boolean returned by token transfer calls, or use a safe-transfer \
             wrapper that reverts on failure.",
        ),
        (
            "unchecked-lowlevel",
            "Check the success flag returned by low-level calls and revert on failure.",
        ),
        (
            "suicidal",
            "Guard selfdestruct behind strict owner-only access control, or remove it.",
        ),
        (
            "controlled-delegatecall",
            "Only delegatecall into immutable, audited implementation addresses.",
        ),
        (
            "tx-origin",
            "Replace tx.origin authorization with msg.sender checks.",
        ),
        (
            "timestamp",
            "Avoid strict comparisons on block.timestamp; tolerate validator drift.",
        ),
        (
            "weak-prng",
            "Replace block-field randomness with a VRF oracle or commit-reveal scheme.",
        ),
        (
            "uninitialized-state",
            "Initialize all state variables explicitly before they are read.",
        ),
        (
            "uninitialized-storage",
            "Initialize storage pointers explicitly; uninitialized ones alias slot zero.",
        ),
        (
            "unprotected-upgrade",
            "Restrict upgrade and initialization entry points to an authorized admin.",
        ),
        (
            "locked-ether",
            "Add a withdrawal path for contract-held ether, or reject incoming value.",
        ),
        (
            "incorrect-equality",
            "Avoid strict equality on balances or timestamps; use range comparisons.",
        ),
        (
            "low-level-calls",
            "Prefer typed external calls over raw call/delegatecall/staticcall where \
             possible.",
        ),
        (
            "assembly",
            "Keep assembly blocks minimal and document the invariants they rely on.",
        ),
        (
            "solc-version",
            "Pin a recent, audited compiler version across the project.",
        ),
        (
            "naming-convention",
            "Follow the Solidity style guide for naming to keep intent obvious.",
        ),
    ])
});

/// Exact check-id lookup with a generic fallback. Never blank.
fn remediation_for(check: &str) -> String {
    REMEDIATIONS
        .get(check)
        .copied()
        .unwrap_or(GENERIC_REMEDIATION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detector_json(impact: &str, lines: &str) -> String {
        format!(
            r#"{{
              "detectors": [
                {{
                  "check": "weak-prng",
                  "impact": "{impact}",
                  "confidence": "Medium",
                  "description": "Lottery.roll() uses a weak PRNG",
                  "elements": [
                    {{
                      "type": "function",
                      "name": "roll",
                      "source_mapping": {{
                        "filename_relative": "contracts/Lottery.sol",
                        "lines": {lines}
                      }},
                      "type_specific_fields": {{
                        "parent": {{ "name": "Lottery" }}
                      }}
                    }}
                  ]
                }}
              ]
            }}"#
        )
    }

    fn map_str(json: &str) -> Vec<Finding> {
        let report: SlitherReport = serde_json::from_str(json).unwrap();
        map_detectors(Path::new("/nonexistent"), report.detectors)
    }

    #[test]
    fn high_impact_maps_to_high_severity_and_first_line() {
        let findings = map_str(&detector_json("High", "[42, 43]"));
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.id, "SLITHER-0001");
        assert_eq!(f.severity, Severity::High);
        assert_eq!(f.line_number, 42);
        assert_eq!(f.contract_name.as_deref(), Some("Lottery"));
        assert_eq!(f.function_name.as_deref(), Some("roll"));
        assert_eq!(f.detector_id, "weak-prng");
        assert_eq!(f.source_tool, SourceTool::Slither);
        assert!(f.threat_id.is_empty());
    }

    #[test]
    fn unrecognized_impact_defaults_to_info_not_dropped() {
        let findings = map_str(&detector_json("Catastrophic", "[7]"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn result_without_location_is_dropped_silently() {
        let json = r#"{
          "detectors": [
            {
              "check": "pragma",
              "impact": "Informational",
              "confidence": "High",
              "description": "version mismatch",
              "elements": [ { "type": "pragma", "name": "^0.8.0" } ]
            }
          ]
        }"#;
        assert!(map_str(json).is_empty());
    }

    #[test]
    fn contract_name_falls_back_to_element_name() {
        let json = r#"{
          "detectors": [
            {
              "check": "locked-ether",
              "impact": "Medium",
              "confidence": "High",
              "description": "contract locks ether",
              "elements": [
                {
                  "type": "contract",
                  "name": "Vault",
                  "source_mapping": { "filename_relative": "Vault.sol", "lines": [1] }
                }
              ]
            }
          ]
        }"#;
        let findings = map_str(json);
        assert_eq!(findings[0].contract_name.as_deref(), Some("Vault"));
        // A contract element is not a function.
        assert_eq!(findings[0].function_name, None);
    }

    #[test]
    fn remediation_lookup_with_generic_fallback() {
        assert!(remediation_for("weak-prng").contains("VRF"));
        assert_eq!(remediation_for("some-new-check"), GENERIC_REMEDIATION);
    }

    #[test]
    fn display_name_title_cases_hyphen_segments() {
        assert_eq!(display_name("reentrancy-eth"), "Reentrancy Eth");
        assert_eq!(display_name("weak-prng"), "Weak Prng");
        assert_eq!(display_name("timestamp"), "Timestamp");
    }

    #[test]
    fn no_contracts_stderr_takes_the_specific_path() {
        let outcome = classify_output(CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "ERROR: No contract found in the target".into(),
        });
        match outcome {
            SlitherOutcome::Error(message) => {
                assert!(message.contains("no Solidity contracts found"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn silent_nonzero_exit_is_generic_tool_error() {
        let outcome = classify_output(CommandOutput {
            exit_code: 255,
            stdout: String::new(),
            stderr: "Traceback (most recent call last): ...".into(),
        });
        match outcome {
            SlitherOutcome::Error(message) => {
                assert!(message.contains("status 255"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn nonzero_exit_with_output_still_parses() {
        let outcome = classify_output(CommandOutput {
            exit_code: 4,
            stdout: detector_json("High", "[42]"),
            stderr: String::new(),
        });
        match outcome {
            SlitherOutcome::Ok(detectors) => assert_eq!(detectors.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn unparseable_output_carries_bounded_excerpt() {
        let garbage = "x".repeat(10_000);
        let outcome = classify_output(CommandOutput {
            exit_code: 0,
            stdout: garbage,
            stderr: String::new(),
        });
        match outcome {
            SlitherOutcome::Error(message) => {
                assert!(message.contains("could not parse"));
                assert!(message.len() < 1_000);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn run_degrades_to_empty_when_tool_missing_or_failing() {
        // With slither absent this is the Unavailable arm; with slither
        // installed an empty directory takes the no-contracts error arm.
        // Both degrade to zero findings without raising.
        let dir = tempfile::tempdir().unwrap();
        let findings = SlitherAdapter::run(dir.path(), &[]);
        assert!(findings.is_empty());
    }

    #[test]
    fn clean_exit_with_no_output_is_empty_ok() {
        let outcome = classify_output(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert!(matches!(outcome, SlitherOutcome::Ok(d) if d.is_empty()));
    }
}
