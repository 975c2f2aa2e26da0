//! External collaborator interfaces
//!
//! The pipeline never talks to an ML model or OCR service directly; each
//! capability is one async trait with a production HTTP implementation and a
//! mock. A collaborator failure is surfaced as an error and degraded by the
//! caller to a `warning` outcome, never to a silent pass.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cheqflow_core::{ExtractedCheque, ImagePayload};

use crate::error::Result;

pub use http::{HttpFieldExtractor, HttpFraudScorer, HttpSignatureScorer};
pub use mock::{MockFieldExtractor, MockFraudScorer, MockSignatureScorer};

/// Result of comparing an extracted signature against the on-file reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureMatch {
    /// Embedding distance between the two signatures
    pub distance: f64,
    /// Similarity in [0, 1]
    pub similarity: f64,
    pub is_match: bool,
    /// Confidence 0-100 that the signatures were written by the same hand
    pub confidence: f64,
}

/// One risk factor reported by the external fraud model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub severity: String,
    pub description: String,
}

/// Verdict of the external fraud-scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerVerdict {
    /// Model score 0-100; `None` when the model declined to score
    pub fraud_score: Option<f64>,
    pub risk_level: String,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendation: String,
}

/// Turns a cheque image into a structured field set.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, image: &ImagePayload) -> Result<ExtractedCheque>;
}

/// Scores the similarity of two signature images.
#[async_trait]
pub trait SignatureScorer: Send + Sync {
    async fn score(
        &self,
        extracted: &ImagePayload,
        reference: &ImagePayload,
    ) -> Result<SignatureMatch>;
}

/// Asks the external fraud model for an opinion on a cheque.
#[async_trait]
pub trait FraudScorer: Send + Sync {
    async fn assess(
        &self,
        fields: &ExtractedCheque,
        signature_confidence: Option<f64>,
    ) -> Result<ScorerVerdict>;
}
