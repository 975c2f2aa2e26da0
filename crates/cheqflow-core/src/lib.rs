//! Cheqflow Core - Core domain types for the Cheqflow clearing pipeline
//!
//! This crate provides the fundamental types shared across the Cheqflow
//! workspace:
//! - Cheque and the lifecycle status state machine
//! - Extracted field sets produced by the field-extraction collaborator
//! - MICR line parsing and cross-checking
//! - Rule outcomes and check reports
//! - Anomaly, severity, risk tier and decision types

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    parse_cheque_date, Anomaly, AnomalyKind, BoundingBox, CheckReport, Cheque, ChequeStatus,
    Decision, DecisionSource, ExtractedCheque, ImagePayload, MicrCheck, MicrLine, RiskTier,
    RuleCheck, RuleOutcome, Severity,
};
