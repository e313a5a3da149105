//! Free-text debt parser
//!
//! Extracts debt edges from sentences such as
//! `"owen owes mrugank 20, mrugank owes david $15.50 and barath owes david 7"`.
//!
//! # Grammar
//!
//! ```text
//! clause := <name> "owes" <name> ["$"] <digits> ["." <1-2 digits>]
//! name   := <letter> {<letter> | <digit> | "_" | "'" | "-"}
//! ```
//!
//! Matching is case-insensitive and best-effort: every non-overlapping clause
//! is extracted in input order, anything else is skipped. Parsing never fails.
//!
//! Names are single tokens: in `"mary ann owes david 5"` only `ann` is the
//! debtor. Amounts with more than two decimals or above
//! [`Money::MAX_AMOUNT`] are skipped rather than truncated.

use crate::types::{DebtEdge, Money, ParticipantId};
use regex::Regex;
use std::sync::OnceLock;

const CLAUSE_PATTERN: &str =
    r"(\p{L}[\p{L}\p{N}_'-]*) owes (\p{L}[\p{L}\p{N}_'-]*) \$?(\d+(?:\.\d+)?)";

const SEPARATOR_PATTERN: &str = r"[\s,]+";

/// Most fractional digits an amount may carry
const MAX_DECIMALS: usize = 2;

/// Compiled debt-text parser
#[derive(Debug, Clone)]
pub struct DebtTextParser {
    /// One "<name> owes <name> <amount>" clause
    clause_regex: Regex,

    /// Runs of whitespace and commas
    separator_regex: Regex,
}

impl DebtTextParser {
    /// Compile the parser
    pub fn new() -> Self {
        Self {
            clause_regex: Regex::new(CLAUSE_PATTERN).expect("clause pattern is valid"),
            separator_regex: Regex::new(SEPARATOR_PATTERN).expect("separator pattern is valid"),
        }
    }

    /// Collapse separators to single spaces and lower-case
    pub fn normalize(&self, text: &str) -> String {
        self.separator_regex
            .replace_all(text.trim(), " ")
            .to_lowercase()
    }

    /// Extract all debt edges, in the order their clauses appear
    pub fn parse(&self, text: &str) -> Vec<DebtEdge> {
        let normalized = self.normalize(text);

        let edges: Vec<DebtEdge> = self
            .clause_regex
            .captures_iter(&normalized)
            .filter_map(|caps| {
                let debtor = ParticipantId::new(&caps[1]);
                let creditor = ParticipantId::new(&caps[2]);
                if debtor == creditor {
                    tracing::debug!(participant = %debtor, "Skipping self-debt clause");
                    return None;
                }

                let literal = &caps[3];
                let decimals = literal.split_once('.').map_or(0, |(_, frac)| frac.len());
                if decimals > MAX_DECIMALS {
                    tracing::debug!(amount = literal, "Skipping over-precise amount");
                    return None;
                }

                let amount = Money::parse(literal).ok()?;
                DebtEdge::new(debtor, creditor, amount).ok()
            })
            .collect();

        tracing::debug!(edges = edges.len(), "Parsed debt text");
        edges
    }
}

impl Default for DebtTextParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse free text into debt edges with a shared parser instance
pub fn parse_debt_text(text: &str) -> Vec<DebtEdge> {
    static PARSER: OnceLock<DebtTextParser> = OnceLock::new();
    PARSER.get_or_init(DebtTextParser::new).parse(text)
}
