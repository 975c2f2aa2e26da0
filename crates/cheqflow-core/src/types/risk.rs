//! Anomaly, severity, risk tier and decision types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single behavioral anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Weight subtracted from the behavior score when an anomaly of this
    /// severity is present.
    pub fn weight(self) -> f64 {
        match self {
            Severity::Low => 5.0,
            Severity::Medium => 15.0,
            Severity::High => 25.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        write!(f, "{}", label)
    }
}

/// The typed anomaly signals the detector can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Amount is far outside the historical distribution
    ExtremeAmount { z_score: f64 },
    /// Amount exceeds the historical maximum
    AboveHistoricalMax { ratio: f64 },
    /// Payee never seen in the bounded top-payee set
    NewPayee { payee: String },
    /// Day of week outside the observed set (0 = Monday)
    UnusualDay { day: u8 },
    /// Hour of day outside the observed set
    UnusualHour { hour: u8 },
    /// Account inactive for a long stretch before this transaction
    DormantAccount { idle_days: i64 },
    /// Historical bounce rate is elevated
    BounceHistory { rate: f64 },
    /// Too many transactions in the trailing 24 hours
    HighVelocity { recent: u32 },
}

impl AnomalyKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::ExtremeAmount { .. } => "extreme_amount",
            AnomalyKind::AboveHistoricalMax { .. } => "above_historical_max",
            AnomalyKind::NewPayee { .. } => "new_payee",
            AnomalyKind::UnusualDay { .. } => "unusual_day",
            AnomalyKind::UnusualHour { .. } => "unusual_hour",
            AnomalyKind::DormantAccount { .. } => "dormant_account",
            AnomalyKind::BounceHistory { .. } => "bounce_history",
            AnomalyKind::HighVelocity { .. } => "high_velocity",
        }
    }
}

/// One detected anomaly with its severity and a human-readable detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(flatten)]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub detail: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            detail: detail.into(),
        }
    }
}

/// Risk tier derived from the combined behavioral signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Final decision rendered by the deep verifier or a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
    Flagged,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
            Decision::Flagged => "flagged",
        };
        write!(f, "{}", label)
    }
}

/// Who rendered the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    System,
    Supervisor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::Low.weight(), 5.0);
        assert_eq!(Severity::Medium.weight(), 15.0);
        assert_eq!(Severity::High.weight(), 25.0);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn test_anomaly_serializes_with_kind_tag() {
        let anomaly = Anomaly::new(
            AnomalyKind::ExtremeAmount { z_score: 16.0 },
            Severity::High,
            "Amount is 16.0 standard deviations above the mean",
        );
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["kind"], "extreme_amount");
        assert_eq!(json["z_score"], 16.0);
        assert_eq!(json["severity"], "high");
    }

    #[test]
    fn test_anomaly_labels() {
        let anomaly = AnomalyKind::HighVelocity { recent: 5 };
        assert_eq!(anomaly.label(), "high_velocity");
        assert_eq!(AnomalyKind::NewPayee { payee: "x".into() }.label(), "new_payee");
    }
}
