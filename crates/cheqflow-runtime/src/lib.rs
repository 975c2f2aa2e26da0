//! CheqFlow Runtime - Clearing pipeline for deposited cheques
//!
//! This crate wires the pieces of the clearing simulation together: field
//! extraction through a collaborator, basic validation at the presenting
//! bank, routing through the clearing house, deep verification and fraud
//! scoring at the drawer bank, and the behavioral profile store that feeds
//! anomaly detection.

pub mod anomaly;
pub mod clearing;
pub mod collab;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod profile;
pub mod risk;
pub mod validate;

// Re-export main types
pub use anomaly::{AnomalyDetector, CandidateTransaction};
pub use clearing::ClearingRouter;
pub use collab::{
    FieldExtractor, FraudScorer, HttpFieldExtractor, HttpFraudScorer, HttpSignatureScorer,
    MockFieldExtractor, MockFraudScorer, MockSignatureScorer, RiskFactor, ScorerVerdict,
    SignatureMatch, SignatureScorer,
};
pub use config::{BypassPolicy, CollaboratorConfig, EngineConfig, PolicyConstants, Thresholds};
pub use error::{EngineError, Result};
pub use metrics::{Counter, Histogram, PipelineMetrics};
pub use pipeline::{ChequePipeline, Deposit, PipelineOutcome};
pub use profile::ProfileEngine;
pub use risk::{RiskReport, RiskScorer};
pub use validate::{BasicValidator, DeepOutcome, DeepVerifier, VerificationContext};
