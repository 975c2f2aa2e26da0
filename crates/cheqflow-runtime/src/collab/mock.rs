//! Mock collaborators for testing
//!
//! Each mock returns a canned response (or a canned failure) so pipeline and
//! verifier tests can run without any of the model services.

use async_trait::async_trait;

use cheqflow_core::{ExtractedCheque, ImagePayload};

use crate::collab::{FieldExtractor, FraudScorer, ScorerVerdict, SignatureMatch, SignatureScorer};
use crate::error::{EngineError, Result};

/// Mock field extractor returning a fixed field set.
pub struct MockFieldExtractor {
    response: ExtractedCheque,
    available: bool,
}

impl MockFieldExtractor {
    pub fn new() -> Self {
        Self {
            response: ExtractedCheque::default(),
            available: true,
        }
    }

    /// Create with a canned extraction result.
    pub fn with_response(response: ExtractedCheque) -> Self {
        Self {
            response,
            available: true,
        }
    }

    /// Create a mock that fails every call, as an unreachable service would.
    pub fn unavailable() -> Self {
        Self {
            response: ExtractedCheque::default(),
            available: false,
        }
    }
}

impl Default for MockFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldExtractor for MockFieldExtractor {
    async fn extract(&self, _image: &ImagePayload) -> Result<ExtractedCheque> {
        if !self.available {
            return Err(EngineError::collaborator("extractor", "mock marked unavailable"));
        }
        Ok(self.response.clone())
    }
}

/// Mock signature scorer returning a fixed confidence.
pub struct MockSignatureScorer {
    response: SignatureMatch,
    available: bool,
}

impl MockSignatureScorer {
    pub fn new() -> Self {
        Self::with_confidence(90.0)
    }

    /// Create with a confidence value; the rest of the match is derived.
    pub fn with_confidence(confidence: f64) -> Self {
        Self {
            response: SignatureMatch {
                distance: 1.0 - confidence / 100.0,
                similarity: confidence / 100.0,
                is_match: confidence >= 70.0,
                confidence,
            },
            available: true,
        }
    }

    pub fn with_response(response: SignatureMatch) -> Self {
        Self {
            response,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            response: SignatureMatch {
                distance: 0.0,
                similarity: 0.0,
                is_match: false,
                confidence: 0.0,
            },
            available: false,
        }
    }
}

impl Default for MockSignatureScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureScorer for MockSignatureScorer {
    async fn score(
        &self,
        _extracted: &ImagePayload,
        _reference: &ImagePayload,
    ) -> Result<SignatureMatch> {
        if !self.available {
            return Err(EngineError::collaborator("signature", "mock marked unavailable"));
        }
        Ok(self.response.clone())
    }
}

/// Mock fraud scorer returning a fixed verdict.
pub struct MockFraudScorer {
    response: ScorerVerdict,
    available: bool,
}

impl MockFraudScorer {
    pub fn new() -> Self {
        Self::with_response(ScorerVerdict {
            fraud_score: Some(10.0),
            risk_level: "low".to_string(),
            risk_factors: Vec::new(),
            recommendation: "APPROVE".to_string(),
        })
    }

    pub fn with_response(response: ScorerVerdict) -> Self {
        Self {
            response,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            response: ScorerVerdict {
                fraud_score: None,
                risk_level: String::new(),
                risk_factors: Vec::new(),
                recommendation: String::new(),
            },
            available: false,
        }
    }
}

impl Default for MockFraudScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FraudScorer for MockFraudScorer {
    async fn assess(
        &self,
        _fields: &ExtractedCheque,
        _signature_confidence: Option<f64>,
    ) -> Result<ScorerVerdict> {
        if !self.available {
            return Err(EngineError::collaborator("fraud", "mock marked unavailable"));
        }
        Ok(self.response.clone())
    }
}
