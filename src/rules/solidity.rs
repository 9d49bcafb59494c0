//! The built-in Solidity rule table.
//!
//! Rules are declarative records over raw source text. Detection is
//! lexical: a pattern match is evidence, not proof, which is reflected in
//! each rule's confidence level.

use super::{Confidence, Rule, RulePattern, Severity};

/// All built-in rules, in declaration order. Order is load-bearing: the
/// engine scans rules in this order and sequential finding ids depend on it.
pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "SOL-001",
            name: "Authorization through tx.origin",
            severity: Severity::High,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"tx\.origin"),
            description: "tx.origin names the transaction's original EOA, not the immediate \
                          caller. Any contract the user interacts with can pass an \
                          authorization check based on it.",
            recommendation: "Use msg.sender for authorization checks instead of tx.origin.",
            weakness_ref: Some("SWC-115"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-002",
            name: "Weak source of randomness",
            severity: Severity::High,
            confidence: Confidence::Medium,
            pattern: RulePattern::new(r"block\.(?:prevrandao|difficulty)|blockhash\s*\("),
            description: "Block fields such as prevrandao, difficulty and blockhash are \
                          observable or influenceable by validators and must not seed \
                          lotteries, draws or key material.",
            recommendation: "Use a verifiable randomness source (e.g. a VRF oracle) or a \
                            commit-reveal scheme.",
            weakness_ref: Some("SWC-120"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-003",
            name: "Delegatecall to potentially controlled target",
            severity: Severity::Critical,
            confidence: Confidence::Medium,
            pattern: RulePattern::new(r"\.delegatecall\s*[\(\{]"),
            description: "delegatecall executes foreign code in this contract's storage \
                          context. A target address that an attacker can influence hands \
                          over the whole contract state.",
            recommendation: "Restrict delegatecall targets to immutable, audited library \
                            addresses; never derive the target from calldata or storage an \
                            attacker can write.",
            weakness_ref: Some("SWC-112"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-004",
            name: "Contract can be destroyed",
            severity: Severity::Medium,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"\bselfdestruct\s*\("),
            description: "selfdestruct removes the contract and forwards its balance. If \
                          reachable without strict access control, anyone can brick \
                          dependent contracts and redirect funds.",
            recommendation: "Remove selfdestruct or guard it behind multi-step, \
                            owner-restricted access control.",
            weakness_ref: Some("SWC-106"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-005",
            name: "Unchecked low-level call",
            severity: Severity::Medium,
            confidence: Confidence::Low,
            pattern: RulePattern::new(r"\.send\s*\(|\.call\s*\("),
            description: "send and bare call return a success flag instead of reverting. \
                          Ignoring it lets failed transfers pass silently.",
            recommendation: "Check the returned success flag and revert on failure, or use \
                            transfer patterns that propagate errors.",
            weakness_ref: Some("SWC-104"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-006",
            name: "State written after external value call",
            severity: Severity::High,
            confidence: Confidence::Low,
            pattern: RulePattern::new(
                r"\.call\s*\{value:[^}]*\}\s*\(.{0,600}?\[\s*msg\.sender\s*\]\s*=",
            )
            .dot_matches_newline(),
            description: "A value-bearing external call followed by a write to the caller's \
                          balance entry is the classic reentrancy shape: the callee can \
                          re-enter before the state update lands.",
            recommendation: "Apply checks-effects-interactions: update balances before the \
                            external call, or add a reentrancy guard.",
            weakness_ref: Some("SWC-107"),
            chain_specific: true,
            predicate: None,
        },
        Rule {
            id: "SOL-007",
            name: "Floating pragma",
            severity: Severity::Low,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"^\s*pragma\s+solidity\s*(?:\^|>=?|~)").multi_line(),
            description: "A floating pragma lets the contract compile with newer compiler \
                          versions than it was tested against.",
            recommendation: "Pin the pragma to the exact compiler version used for testing \
                            and deployment.",
            weakness_ref: Some("SWC-103"),
            chain_specific: false,
            predicate: None,
        },
        Rule {
            id: "SOL-008",
            name: "Deprecated language construct",
            severity: Severity::Info,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"\b(?:sha3|suicide|throw|callcode|msg\.gas)\b"),
            description: "sha3, suicide, throw, callcode and msg.gas are deprecated and \
                          signal the code predates modern compiler checks.",
            recommendation: "Replace deprecated constructs with their current equivalents \
                            (keccak256, selfdestruct, revert, delegatecall, gasleft()).",
            weakness_ref: Some("SWC-111"),
            chain_specific: false,
            predicate: None,
        },
        Rule {
            id: "SOL-009",
            name: "Block timestamp in value-bearing logic",
            severity: Severity::Medium,
            confidence: Confidence::Low,
            pattern: RulePattern::new(r"block\.timestamp|\bnow\b"),
            description: "Validators can shift block timestamps by several seconds. In \
                          contracts that move value, timestamp-driven branches become \
                          manipulable.",
            recommendation: "Tolerate timestamp drift in the contract logic, or use block \
                            numbers for ordering guarantees.",
            weakness_ref: Some("SWC-116"),
            chain_specific: true,
            // Only worth flagging where the contract actually receives value.
            predicate: Some(mentions_payable),
        },
        Rule {
            id: "SOL-010",
            name: "Inline assembly",
            severity: Severity::Info,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"\bassembly\s*\{"),
            description: "Inline assembly bypasses the compiler's safety checks and needs \
                          manual review.",
            recommendation: "Keep assembly blocks minimal and document the invariants each \
                            block relies on.",
            weakness_ref: None,
            chain_specific: false,
            predicate: None,
        },
        Rule {
            id: "SOL-011",
            name: "Audit marker left in source",
            severity: Severity::Info,
            confidence: Confidence::High,
            pattern: RulePattern::new(r"//\s*(?:todo|fixme|hack|xxx)\b").case_insensitive(),
            description: "TODO/FIXME style markers in deployed contract source indicate \
                          acknowledged, unresolved work.",
            recommendation: "Resolve the marked issue or record why it is acceptable before \
                            deployment.",
            weakness_ref: None,
            chain_specific: false,
            predicate: None,
        },
    ]
}

fn mentions_payable(text: &str) -> bool {
    text.contains("payable")
}
