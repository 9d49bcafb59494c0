pub mod finding;
pub mod policy;
pub mod solidity;

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::context;
use crate::error::{Result, ScanError};
use crate::source::SourceFile;

pub use finding::{Confidence, Finding, Severity, SourceTool};

/// File-level gate evaluated once per file, before any pattern scanning.
/// Pure function of the full file text.
pub type Predicate = fn(&str) -> bool;

/// Textual pattern plus matching flags. Patterns always scan globally:
/// one finding per non-overlapping match in the full file text, not one
/// per line and not one per file.
#[derive(Debug, Clone, Copy)]
pub struct RulePattern {
    pub source: &'static str,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_newline: bool,
}

impl RulePattern {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            case_insensitive: false,
            multi_line: false,
            dot_matches_newline: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn multi_line(mut self) -> Self {
        self.multi_line = true;
        self
    }

    pub fn dot_matches_newline(mut self) -> Self {
        self.dot_matches_newline = true;
        self
    }
}

/// A declarative detection rule. Rules are data: the engine never branches
/// on a specific rule id, so the set can grow without touching engine logic.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable short code, family-prefixed ordinal (e.g. "SOL-001").
    pub id: &'static str,
    /// Display title.
    pub name: &'static str,
    pub severity: Severity,
    pub confidence: Confidence,
    pub pattern: RulePattern,
    pub description: &'static str,
    pub recommendation: &'static str,
    /// SWC registry reference, when one applies.
    pub weakness_ref: Option<&'static str>,
    /// True when the pattern targets EVM chain semantics rather than
    /// general Solidity hygiene.
    pub chain_specific: bool,
    /// Optional gate: when present and false for a file, the rule is
    /// skipped entirely for that file regardless of pattern matches.
    pub predicate: Option<Predicate>,
}

/// Metadata about a rule, used for `list-rules` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub weakness_ref: Option<String>,
    pub chain_specific: bool,
    pub description: String,
}

impl Rule {
    pub fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: self.id.into(),
            name: self.name.into(),
            severity: self.severity,
            confidence: self.confidence,
            weakness_ref: self.weakness_ref.map(Into::into),
            chain_specific: self.chain_specific,
            description: self.description.into(),
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    rule: Rule,
    regex: Regex,
}

/// A validated, compiled rule set. Construction is the configuration
/// boundary: a malformed pattern or duplicate id fails here and never
/// surfaces mid-scan as a partial result.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if !seen.insert(rule.id) {
                return Err(ScanError::Rule {
                    rule_id: rule.id.into(),
                    message: "duplicate rule id".into(),
                });
            }
            let regex = RegexBuilder::new(rule.pattern.source)
                .case_insensitive(rule.pattern.case_insensitive)
                .multi_line(rule.pattern.multi_line)
                .dot_matches_new_line(rule.pattern.dot_matches_newline)
                .build()
                .map_err(|e| ScanError::Rule {
                    rule_id: rule.id.into(),
                    message: e.to_string(),
                })?;
            compiled.push(CompiledRule { rule, regex });
        }

        Ok(Self { rules: compiled })
    }

    /// The built-in Solidity rule set.
    pub fn builtin() -> Result<Self> {
        Self::new(solidity::rules())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|c| c.rule.metadata()).collect()
    }
}

/// The native rule engine. Runs a rule set over a corpus of source files
/// and emits one finding per match occurrence.
pub struct RuleEngine {
    rule_set: RuleSet,
}

impl RuleEngine {
    pub fn new(rule_set: RuleSet) -> Self {
        Self { rule_set }
    }

    pub fn with_builtin_rules() -> Result<Self> {
        Ok(Self::new(RuleSet::builtin()?))
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Scan a corpus of source files.
    ///
    /// Files without a `.sol` extension are skipped; an input with no
    /// Solidity files yields an empty result, not an error. Iteration
    /// order is an observable contract because the sequential finding ids
    /// depend on it: files in input order, rules in declaration order,
    /// matches in text order.
    pub fn scan(&self, files: &[SourceFile]) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut counter = 0usize;

        for file in files {
            if !file.path.extension().is_some_and(|e| e == "sol") {
                continue;
            }
            for compiled in &self.rule_set.rules {
                if let Some(predicate) = compiled.rule.predicate {
                    if !predicate(&file.content) {
                        continue;
                    }
                }
                for m in compiled.regex.find_iter(&file.content) {
                    counter += 1;
                    findings.push(finding_for_match(&compiled.rule, file, m.start(), counter));
                }
            }
        }

        findings
    }
}

fn finding_for_match(rule: &Rule, file: &SourceFile, offset: usize, n: usize) -> Finding {
    let line_number = context::line_number_at(&file.content, offset);
    let code_snippet = context::snippet_around(&file.content, line_number);
    let contract = context::contract_name(&file.content);
    let contract_name = (contract != "Unknown").then_some(contract);
    let function_name = context::enclosing_function(&file.content, offset);

    let fix_prompt = finding::fix_prompt(
        rule.name,
        rule.severity,
        &file.path,
        line_number,
        contract_name.as_deref(),
        rule.recommendation,
    );

    Finding {
        id: finding::sequential_id(SourceTool::NativeRules, n),
        title: rule.name.into(),
        severity: rule.severity,
        confidence: rule.confidence,
        description: rule.description.into(),
        file_path: file.path.clone(),
        line_number,
        code_snippet,
        weakness_ref: rule.weakness_ref.map(Into::into),
        exploitability: finding::exploitability_note(rule.severity),
        remediation: rule.recommendation.into(),
        fix_prompt,
        contract_name,
        function_name,
        detector_id: rule.id.into(),
        source_tool: SourceTool::NativeRules,
        chain_specific: rule.chain_specific,
        rule_id: Some(rule.id.into()),
        threat_id: String::new(),
    }
}
