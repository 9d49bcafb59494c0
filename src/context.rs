//! Lexical context extraction around a pattern match.
//!
//! Everything here operates on raw source text with explicit offset
//! arithmetic. These are heuristics, not a scope analyzer: braces inside
//! string literals or comments are counted like any other brace, and the
//! result is best-effort rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;

static CONTRACT_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:abstract\s+)?(?:contract|library|interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .unwrap()
});

static FUNCTION_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(").unwrap());

/// 1-based line number of a byte offset: newlines before the offset, plus 1.
/// Offsets past the end of the text are clamped.
pub fn line_number_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Up to five lines of context around a 1-based line number: the match line
/// plus two lines on each side, truncated at file boundaries.
pub fn snippet_around(text: &str, line_number: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let index = line_number.saturating_sub(1).min(lines.len() - 1);
    let start = index.saturating_sub(2);
    let end = (index + 2).min(lines.len() - 1);
    lines[start..=end].join("\n")
}

/// Name of the first contract, library, or interface declared anywhere in
/// the file, or "Unknown" when no declaration is present.
///
/// Known limitation: the whole file is scanned, not just the text preceding
/// a match, so in a multi-contract file every match is attributed to the
/// first declaration.
pub fn contract_name(text: &str) -> String {
    CONTRACT_DECL_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Name of the nearest function header preceding the offset whose opening
/// brace is still unclosed when the match is reached, or `None` when the
/// match sits outside any function body.
pub fn enclosing_function(text: &str, offset: usize) -> Option<String> {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let preceding = &text[..end];

    let headers: Vec<(usize, String)> = FUNCTION_DECL_RE
        .captures_iter(preceding)
        .filter_map(|c| {
            let start = c.get(0)?.start();
            Some((start, c.get(1)?.as_str().to_string()))
        })
        .collect();

    // Nearest header first; a header whose body already closed before the
    // match is skipped in favor of the enclosing one.
    for (start, name) in headers.into_iter().rev() {
        let body = &preceding[start..];
        let opens = body.bytes().filter(|&b| b == b'{').count();
        let closes = body.bytes().filter(|&b| b == b'}').count();
        if opens > closes {
            return Some(name);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOTTERY: &str = "\
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

contract Lottery {
    address public winner;

    function roll() public {
        winner = address(uint160(uint256(block.prevrandao)));
    }

    function claim() public {
        payable(winner).transfer(address(this).balance);
    }
}
";

    #[test]
    fn line_number_at_start_is_one() {
        assert_eq!(line_number_at("abc", 0), 1);
    }

    #[test]
    fn line_number_counts_newlines() {
        let text = "a\nb\nc";
        assert_eq!(line_number_at(text, 2), 2);
        assert_eq!(line_number_at(text, 4), 3);
    }

    #[test]
    fn line_number_clamps_past_end() {
        assert_eq!(line_number_at("a\nb", 100), 2);
    }

    #[test]
    fn snippet_in_middle_has_five_lines() {
        let text = "l1\nl2\nl3\nl4\nl5\nl6\nl7";
        assert_eq!(snippet_around(text, 4), "l2\nl3\nl4\nl5\nl6");
    }

    #[test]
    fn snippet_truncates_at_top() {
        let text = "l1\nl2\nl3\nl4";
        assert_eq!(snippet_around(text, 1), "l1\nl2\nl3");
    }

    #[test]
    fn snippet_truncates_at_bottom() {
        let text = "l1\nl2\nl3\nl4";
        assert_eq!(snippet_around(text, 4), "l2\nl3\nl4");
    }

    #[test]
    fn snippet_of_tiny_file_is_whole_file() {
        assert_eq!(snippet_around("only", 1), "only");
        assert_eq!(snippet_around("", 1), "");
    }

    #[test]
    fn contract_name_finds_first_declaration() {
        assert_eq!(contract_name(LOTTERY), "Lottery");
        let multi = "library SafeMath {}\ncontract Vault {}";
        assert_eq!(contract_name(multi), "SafeMath");
    }

    #[test]
    fn contract_name_unknown_when_absent() {
        assert_eq!(contract_name("pragma solidity ^0.8.0;"), "Unknown");
    }

    #[test]
    fn enclosing_function_inside_body() {
        let offset = LOTTERY.find("block.prevrandao").unwrap();
        assert_eq!(enclosing_function(LOTTERY, offset), Some("roll".into()));
    }

    #[test]
    fn enclosing_function_second_body() {
        let offset = LOTTERY.find("transfer").unwrap();
        assert_eq!(enclosing_function(LOTTERY, offset), Some("claim".into()));
    }

    #[test]
    fn enclosing_function_skips_closed_bodies() {
        let text = "contract C {\n    function a() public { x = 1; }\n    uint256 y = 2;\n}";
        let offset = text.find("y = 2").unwrap();
        assert_eq!(enclosing_function(text, offset), None);
    }

    #[test]
    fn enclosing_function_none_outside_functions() {
        let offset = LOTTERY.find("address public winner").unwrap();
        assert_eq!(enclosing_function(LOTTERY, offset), None);
    }

    #[test]
    fn enclosing_function_tolerates_unbalanced_braces() {
        let text = "function broken() public { string memory s = \"}}}\";\n  emit Done();";
        let offset = text.find("emit").unwrap();
        // Braces inside the literal throw the count off; the scan must still
        // return without panicking.
        let _ = enclosing_function(text, offset);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn line_number_matches_naive_count(text in "[ -~\n]{0,200}", frac in 0.0f64..1.0) {
                let offset = (text.len() as f64 * frac) as usize;
                let offset = (0..=offset).rev().find(|&o| text.is_char_boundary(o)).unwrap_or(0);
                let expected = text[..offset].matches('\n').count() + 1;
                prop_assert_eq!(line_number_at(&text, offset), expected);
            }

            #[test]
            fn snippet_never_exceeds_five_lines(text in "[ -~\n]{0,200}", line in 1usize..50) {
                let snippet = snippet_around(&text, line);
                prop_assert!(snippet.lines().count() <= 5);
            }
        }
    }
}
