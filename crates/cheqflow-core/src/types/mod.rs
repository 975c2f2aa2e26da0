//! Domain types for the clearing pipeline
//!
//! This module contains:
//! - Cheque, lifecycle status and extracted field sets
//! - MICR line parsing and cross-check results
//! - Rule outcomes and check reports
//! - Anomaly, severity, risk tier and decision types

pub mod cheque;
pub mod micr;
pub mod outcome;
pub mod risk;

pub use cheque::{parse_cheque_date, BoundingBox, Cheque, ChequeStatus, ExtractedCheque, ImagePayload};
pub use micr::{MicrCheck, MicrLine};
pub use outcome::{CheckReport, RuleCheck, RuleOutcome};
pub use risk::{Anomaly, AnomalyKind, Decision, DecisionSource, RiskTier, Severity};
