//! MICR line parsing and cross-checking
//!
//! The machine-readable line on a cheque carries, in order: cheque number,
//! routing number, account number and a reserved fourth token. The deep
//! verifier cross-checks the first three against the extracted fields; any
//! token-count or content mismatch is a hard failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of whitespace-separated tokens a well-formed MICR line carries.
pub const MICR_TOKEN_COUNT: usize = 4;

/// A MICR line split into its whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrLine {
    tokens: Vec<String>,
}

impl MicrLine {
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Cross-check the line against the cheque's printed identity.
    ///
    /// Requires exactly [`MICR_TOKEN_COUNT`] tokens; tokens 1-3 must equal the
    /// cheque number, routing number and account number respectively. Token 4
    /// is reserved and not compared.
    pub fn cross_check(
        &self,
        cheque_number: &str,
        routing_number: &str,
        account_number: &str,
    ) -> MicrCheck {
        if self.tokens.len() != MICR_TOKEN_COUNT {
            return MicrCheck::WrongTokenCount(self.tokens.len());
        }
        let expected = [
            ("cheque number", cheque_number),
            ("routing number", routing_number),
            ("account number", account_number),
        ];
        for (index, (field, value)) in expected.into_iter().enumerate() {
            if self.tokens[index] != value {
                return MicrCheck::Mismatch {
                    field,
                    expected: value.to_string(),
                    found: self.tokens[index].clone(),
                };
            }
        }
        MicrCheck::Match
    }
}

/// Result of a MICR cross-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicrCheck {
    Match,
    WrongTokenCount(usize),
    Mismatch {
        field: &'static str,
        expected: String,
        found: String,
    },
}

impl MicrCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, MicrCheck::Match)
    }
}

impl fmt::Display for MicrCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicrCheck::Match => write!(f, "MICR line matches cheque fields"),
            MicrCheck::WrongTokenCount(count) => write!(
                f,
                "MICR line has {} tokens, expected {}",
                count, MICR_TOKEN_COUNT
            ),
            MicrCheck::Mismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "MICR {} mismatch: expected {}, found {}",
                field, expected, found
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_passes() {
        let line = MicrLine::parse("000123 440022 ACC-9001 00");
        assert_eq!(line.token_count(), 4);
        assert!(line.cross_check("000123", "440022", "ACC-9001").is_match());
    }

    #[test]
    fn test_three_tokens_always_fail() {
        // Content identical to the expected values, but the reserved token is
        // missing: still a failure.
        let line = MicrLine::parse("000123 440022 ACC-9001");
        assert_eq!(
            line.cross_check("000123", "440022", "ACC-9001"),
            MicrCheck::WrongTokenCount(3)
        );
    }

    #[test]
    fn test_five_tokens_fail() {
        let line = MicrLine::parse("000123 440022 ACC-9001 00 77");
        assert_eq!(
            line.cross_check("000123", "440022", "ACC-9001"),
            MicrCheck::WrongTokenCount(5)
        );
    }

    #[test]
    fn test_mismatched_routing_number_fails() {
        let line = MicrLine::parse("000123 999999 ACC-9001 00");
        match line.cross_check("000123", "440022", "ACC-9001") {
            MicrCheck::Mismatch { field, expected, found } => {
                assert_eq!(field, "routing number");
                assert_eq!(expected, "440022");
                assert_eq!(found, "999999");
            }
            other => panic!("Expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_token_ignored() {
        let line = MicrLine::parse("000123 440022 ACC-9001 anything");
        assert!(line.cross_check("000123", "440022", "ACC-9001").is_match());
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        let line = MicrLine::parse("  000123   440022  ACC-9001   00 ");
        assert_eq!(line.token_count(), 4);
        assert!(line.cross_check("000123", "440022", "ACC-9001").is_match());
    }
}
