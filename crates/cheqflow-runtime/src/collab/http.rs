//! HTTP implementations of the collaborator traits
//!
//! Each client owns a `reqwest::Client` with a request timeout; timeouts,
//! transport errors and non-2xx statuses all surface as
//! `EngineError::Collaborator` so the verifier can degrade the affected check
//! to a warning.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use cheqflow_core::{ExtractedCheque, ImagePayload};

use crate::collab::{FieldExtractor, FraudScorer, RiskFactor, ScorerVerdict, SignatureMatch, SignatureScorer};
use crate::error::{EngineError, Result};

fn build_client(service: &'static str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EngineError::collaborator(service, format!("failed to build HTTP client: {}", e)))
}

/// Field-extraction service client.
///
/// POSTs the cheque image to `{base_url}/extract` and deserializes the
/// structured field set from the response body.
pub struct HttpFieldExtractor {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    image: String,
    mime_type: &'a str,
}

impl HttpFieldExtractor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: build_client("extractor", timeout)?,
        })
    }
}

#[async_trait]
impl FieldExtractor for HttpFieldExtractor {
    async fn extract(&self, image: &ImagePayload) -> Result<ExtractedCheque> {
        let url = format!("{}/extract", self.base_url);
        tracing::debug!("Calling field extractor: {}", url);

        let body = ExtractRequest {
            image: BASE64.encode(&image.bytes),
            mime_type: &image.mime_type,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("extractor", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "extractor",
                format!("HTTP request failed with status: {}", response.status()),
            ));
        }

        response
            .json::<ExtractedCheque>()
            .await
            .map_err(|e| EngineError::collaborator("extractor", format!("failed to parse JSON: {}", e)))
    }
}

/// Signature-similarity service client.
pub struct HttpSignatureScorer {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SignatureVerifyRequest {
    signature1: String,
    signature2: String,
}

#[derive(Deserialize)]
struct SignatureVerifyResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Option<SignatureMatch>,
}

impl HttpSignatureScorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: build_client("signature", timeout)?,
        })
    }
}

#[async_trait]
impl SignatureScorer for HttpSignatureScorer {
    async fn score(
        &self,
        extracted: &ImagePayload,
        reference: &ImagePayload,
    ) -> Result<SignatureMatch> {
        let url = format!("{}/verify-signature", self.base_url);
        tracing::debug!("Calling signature scorer: {}", url);

        let body = SignatureVerifyRequest {
            signature1: BASE64.encode(&extracted.bytes),
            signature2: BASE64.encode(&reference.bytes),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("signature", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "signature",
                format!("HTTP request failed with status: {}", response.status()),
            ));
        }

        let parsed: SignatureVerifyResponse = response
            .json()
            .await
            .map_err(|e| EngineError::collaborator("signature", format!("failed to parse JSON: {}", e)))?;

        if !parsed.success {
            let reason = parsed.error.unwrap_or_else(|| "service reported failure".to_string());
            return Err(EngineError::collaborator("signature", reason));
        }
        parsed
            .result
            .ok_or_else(|| EngineError::collaborator("signature", "response without result payload"))
    }
}

/// External fraud-model client. The model speaks camelCase JSON.
pub struct HttpFraudScorer {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FraudPredictRequest<'a> {
    cheque_number: Option<&'a str>,
    account_number: Option<&'a str>,
    payee: Option<&'a str>,
    amount: Option<f64>,
    date: Option<&'a str>,
    signature_confidence: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FraudPredictResponse {
    #[serde(default)]
    fraud_score: Option<f64>,
    #[serde(default)]
    risk_level: String,
    #[serde(default)]
    risk_factors: Vec<FraudRiskFactor>,
    #[serde(default)]
    recommendation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FraudRiskFactor {
    factor: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    description: String,
}

impl HttpFraudScorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: build_client("fraud", timeout)?,
        })
    }
}

#[async_trait]
impl FraudScorer for HttpFraudScorer {
    async fn assess(
        &self,
        fields: &ExtractedCheque,
        signature_confidence: Option<f64>,
    ) -> Result<ScorerVerdict> {
        let url = format!("{}/predict", self.base_url);
        tracing::debug!("Calling fraud scorer: {}", url);

        let body = FraudPredictRequest {
            cheque_number: fields.cheque_number.as_deref(),
            account_number: fields.account_number.as_deref(),
            payee: fields.payee.as_deref(),
            amount: fields.amount_digits,
            date: fields.date.as_deref(),
            signature_confidence,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("fraud", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "fraud",
                format!("HTTP request failed with status: {}", response.status()),
            ));
        }

        let parsed: FraudPredictResponse = response
            .json()
            .await
            .map_err(|e| EngineError::collaborator("fraud", format!("failed to parse JSON: {}", e)))?;

        Ok(ScorerVerdict {
            fraud_score: parsed.fraud_score,
            risk_level: parsed.risk_level,
            risk_factors: parsed
                .risk_factors
                .into_iter()
                .map(|f| RiskFactor {
                    factor: f.factor,
                    severity: f.severity,
                    description: f.description,
                })
                .collect(),
            recommendation: parsed.recommendation,
        })
    }
}
