//! Risk scorer
//!
//! Folds the detected anomalies, the signature-match confidence and the
//! profile state into a behavior score, a composite fraud score and a risk
//! tier, with a line of rationale per contributing signal.
//!
//! The composition weights are a documented business rule, not an empirical
//! fit: signature risk carries 40% of the composite and behavioral risk 60%.

use cheqflow_core::{Anomaly, RiskTier, Severity};
use cheqflow_repository::CustomerProfile;

use crate::config::Thresholds;

const SIGNATURE_WEIGHT: f64 = 0.4;
const BEHAVIOR_WEIGHT: f64 = 0.6;
/// Applied when a signal is unknown rather than measured.
const NEUTRAL_SCORE: f64 = 50.0;

/// Outcome of one risk assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    /// 100 minus the anomaly severity weights, floored at 0
    pub behavior_score: f64,
    /// Composite fraud score in [0, 100]; higher is worse
    pub fraud_score: f64,
    pub tier: RiskTier,
    pub rationale: Vec<String>,
    pub recommendation: String,
    /// False when the account had no transaction history to assess against
    pub profile_found: bool,
}

pub struct RiskScorer {
    thresholds: Thresholds,
}

impl RiskScorer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn assess(
        &self,
        anomalies: &[Anomaly],
        signature_confidence: Option<f64>,
        profile: Option<&CustomerProfile>,
    ) -> RiskReport {
        let profile_found = profile.is_some_and(|p| p.has_history());
        let mut rationale = Vec::new();

        let behavior_score = if profile_found {
            let penalty: f64 = anomalies.iter().map(|a| a.severity.weight()).sum();
            (100.0 - penalty).max(0.0)
        } else {
            rationale.push(
                "no transaction history for this account; neutral behavior score applied"
                    .to_string(),
            );
            NEUTRAL_SCORE
        };

        for anomaly in anomalies {
            rationale.push(format!(
                "{} ({}): {}",
                anomaly.kind.label(),
                anomaly.severity,
                anomaly.detail
            ));
        }

        let high_count = anomalies
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count();
        let tier = if !profile_found {
            RiskTier::Medium
        } else if high_count >= 2 || behavior_score < 30.0 {
            RiskTier::Critical
        } else if high_count >= 1 || behavior_score < 50.0 {
            RiskTier::High
        } else if behavior_score < 70.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        };

        let signature_risk = match signature_confidence {
            Some(confidence) => {
                if confidence < self.thresholds.signature_pass {
                    rationale.push(format!(
                        "signature confidence {:.1} below the match threshold {:.0}",
                        confidence, self.thresholds.signature_pass
                    ));
                }
                100.0 - confidence
            }
            None => {
                rationale
                    .push("signature could not be verified; neutral signature risk applied".to_string());
                NEUTRAL_SCORE
            }
        };

        let fraud_score = (SIGNATURE_WEIGHT * signature_risk
            + BEHAVIOR_WEIGHT * (100.0 - behavior_score))
            .clamp(0.0, 100.0);

        let base = match tier {
            RiskTier::Critical => "REJECT - Critical fraud risk detected",
            RiskTier::High => "REVIEW - High fraud risk, manual verification required",
            RiskTier::Medium => "CAUTION - Moderate risk, additional checks recommended",
            RiskTier::Low => "APPROVE - Low fraud risk",
        };
        let recommendation = if profile_found {
            base.to_string()
        } else {
            format!("{} (no transaction history on file)", base)
        };

        RiskReport {
            behavior_score,
            fraud_score,
            tier,
            rationale,
            recommendation,
            profile_found,
        }
    }
}
