//! Rule outcomes and check reports
//!
//! Every validation phase produces an ordered list of independent, additive
//! rule outcomes. Overall validity is simply "no rule failed"; warnings never
//! fail a report on their own but do route a cheque to human review.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single named rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    Pass,
    Warning,
    Fail,
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleOutcome::Pass => "pass",
            RuleOutcome::Warning => "warning",
            RuleOutcome::Fail => "fail",
        };
        write!(f, "{}", label)
    }
}

/// One named rule result with a human-readable detail line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub name: String,
    pub outcome: RuleOutcome,
    pub detail: String,
}

impl RuleCheck {
    pub fn new(name: impl Into<String>, outcome: RuleOutcome, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome,
            detail: detail.into(),
        }
    }

    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, RuleOutcome::Pass, detail)
    }

    pub fn warning(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, RuleOutcome::Warning, detail)
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, RuleOutcome::Fail, detail)
    }
}

/// Ordered collection of rule results for one validation phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub checks: Vec<RuleCheck>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, check: RuleCheck) {
        self.checks.push(check);
    }

    /// Append every check of `other`, preserving order.
    pub fn merge(&mut self, other: CheckReport) {
        self.checks.extend(other.checks);
    }

    /// Overall validity: no rule failed.
    pub fn is_valid(&self) -> bool {
        !self.checks.iter().any(|c| c.outcome == RuleOutcome::Fail)
    }

    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.outcome == RuleOutcome::Warning)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleCheck> {
        self.checks.iter().filter(|c| c.outcome == RuleOutcome::Fail)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RuleCheck> {
        self.checks
            .iter()
            .filter(|c| c.outcome == RuleOutcome::Warning)
    }

    pub fn find(&self, name: &str) -> Option<&RuleCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}
