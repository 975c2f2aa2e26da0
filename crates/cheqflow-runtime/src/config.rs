//! Configuration types for the clearing pipeline
//!
//! Everything tunable lives here: rule thresholds, behavioral policy
//! constants, collaborator endpoints and the check bypass policy. The bypass
//! policy is always injected into validators explicitly; nothing in the
//! pipeline reads the environment at check time.

use serde::{Deserialize, Serialize};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rule outcome thresholds
    pub thresholds: Thresholds,

    /// Behavioral policy constants
    pub policy: PolicyConstants,

    /// Collaborator endpoints and timeouts
    pub collaborators: CollaboratorConfig,

    /// Check bypass policy
    pub bypass: BypassPolicy,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bypass policy
    pub fn with_bypass(mut self, bypass: BypassPolicy) -> Self {
        self.bypass = bypass;
        self
    }

    /// Set the behavioral policy constants
    pub fn with_policy(mut self, policy: PolicyConstants) -> Self {
        self.policy = policy;
        self
    }
}

/// Score thresholds for rule outcomes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Signature confidence at or above this passes
    pub signature_pass: f64,

    /// Signature confidence at or above this (but below pass) needs review
    pub signature_review: f64,

    /// Composite fraud score at or above this fails
    pub fraud_fail: f64,

    /// Composite fraud score at or above this (but below fail) needs review
    pub fraud_review: f64,

    /// Generative-image confidence above this fails when the image is flagged
    pub genai_fail_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            signature_pass: 70.0,
            signature_review: 50.0,
            fraud_fail: 70.0,
            fraud_review: 50.0,
            genai_fail_confidence: 70.0,
        }
    }
}

/// Tunable constants of the behavioral anomaly rules.
///
/// The new-payee gate (`new_payee_min_history`, `new_payee_max_rate`) keeps
/// habitually-varied spenders from being over-flagged; both values are policy,
/// not law.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConstants {
    /// Z-score above which the amount is a high-severity anomaly
    pub zscore_high: f64,

    /// Z-score above which the amount is a medium-severity anomaly
    pub zscore_medium: f64,

    /// Minimum history length before z-scores are evaluated
    pub zscore_min_history: u64,

    /// Amount-to-prior-max ratio above which the above-max anomaly is high
    pub max_ratio_high: f64,

    /// Minimum history length before the new-payee rule fires
    pub new_payee_min_history: u64,

    /// New-payee rate (percent) at or above which the rule stays quiet
    pub new_payee_max_rate: f64,

    /// Start of the night band (inclusive), hour of day
    pub night_start_hour: u8,

    /// End of the night band (inclusive), hour of day
    pub night_end_hour: u8,

    /// Days of inactivity after which reactivation is medium severity
    pub dormancy_medium_days: i64,

    /// Days of inactivity after which reactivation is high severity
    pub dormancy_high_days: i64,

    /// Bounce rate (percent) above which history is medium severity
    pub bounce_medium_rate: f64,

    /// Bounce rate (percent) above which history is high severity
    pub bounce_high_rate: f64,

    /// Minimum cheques issued before the bounce rule fires
    pub bounce_min_issued: u64,

    /// Transactions in the trailing 24h at which velocity is medium severity
    pub velocity_medium: u32,

    /// Transactions in the trailing 24h at which velocity is high severity
    pub velocity_high: u32,

    /// Bound on the most-frequent payee set kept per profile
    pub top_payees: usize,

    /// Cheques older than this many months are stale
    pub stale_months: u32,
}

impl Default for PolicyConstants {
    fn default() -> Self {
        Self {
            zscore_high: 3.0,
            zscore_medium: 2.0,
            zscore_min_history: 3,
            max_ratio_high: 2.0,
            new_payee_min_history: 5,
            new_payee_max_rate: 20.0,
            night_start_hour: 23,
            night_end_hour: 5,
            dormancy_medium_days: 90,
            dormancy_high_days: 180,
            bounce_medium_rate: 10.0,
            bounce_high_rate: 20.0,
            bounce_min_issued: 5,
            velocity_medium: 3,
            velocity_high: 5,
            top_payees: 10,
            stale_months: 6,
        }
    }
}

/// Collaborator endpoints and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Field-extraction service base URL
    pub extractor_url: String,

    /// Signature-similarity service base URL
    pub signature_url: String,

    /// Fraud-scoring service base URL; `None` disables the external model
    pub fraud_url: Option<String>,

    /// Timeout applied to every outbound collaborator call
    pub timeout_secs: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            extractor_url: "http://localhost:5002".to_string(),
            signature_url: "http://localhost:5001".to_string(),
            fraud_url: None,
            timeout_secs: 10,
        }
    }
}

/// Per-check bypass switches, injected into the validators.
///
/// A bypassed check records an auto-pass outcome so reports stay complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassPolicy {
    pub skip_field_checks: bool,
    pub skip_signature_presence: bool,
    pub skip_date_checks: bool,
    pub skip_micr_check: bool,
    pub skip_funds_check: bool,
    pub skip_signature_verification: bool,
    pub skip_genai_screen: bool,
    pub skip_fraud_analysis: bool,
}

impl BypassPolicy {
    /// Read the bypass switches from `CHEQFLOW_BYPASS_*` environment
    /// variables. Values `1`, `true`, `yes` and `on` enable a switch.
    pub fn from_env() -> Self {
        Self {
            skip_field_checks: env_flag("CHEQFLOW_BYPASS_FIELD_CHECKS"),
            skip_signature_presence: env_flag("CHEQFLOW_BYPASS_SIGNATURE_PRESENCE"),
            skip_date_checks: env_flag("CHEQFLOW_BYPASS_DATE_CHECKS"),
            skip_micr_check: env_flag("CHEQFLOW_BYPASS_MICR_CHECK"),
            skip_funds_check: env_flag("CHEQFLOW_BYPASS_FUNDS_CHECK"),
            skip_signature_verification: env_flag("CHEQFLOW_BYPASS_SIGNATURE_VERIFICATION"),
            skip_genai_screen: env_flag("CHEQFLOW_BYPASS_GENAI_SCREEN"),
            skip_fraud_analysis: env_flag("CHEQFLOW_BYPASS_FRAUD_ANALYSIS"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
