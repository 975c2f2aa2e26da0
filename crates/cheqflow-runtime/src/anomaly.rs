//! Anomaly detector
//!
//! Compares one candidate transaction against the drawer's behavioral profile
//! and emits typed anomalies with severity. Pure over its inputs: the
//! trailing-24h transaction count is looked up by the caller and passed in,
//! so the detector itself never touches storage.

use chrono::{DateTime, Datelike, Timelike, Utc};

use cheqflow_core::{Anomaly, AnomalyKind, Severity};
use cheqflow_repository::CustomerProfile;

use crate::config::PolicyConstants;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The transaction under scrutiny, plus its recent-activity context.
#[derive(Debug, Clone)]
pub struct CandidateTransaction {
    pub amount: f64,
    pub payee: String,
    pub occurred_at: DateTime<Utc>,
    /// Transactions already recorded in the trailing 24 hours, not counting
    /// this candidate
    pub recent_count: u32,
}

pub struct AnomalyDetector {
    policy: PolicyConstants,
}

impl AnomalyDetector {
    pub fn new(policy: PolicyConstants) -> Self {
        Self { policy }
    }

    /// Run every rule against the profile; emission order is fixed so reports
    /// stay comparable across runs.
    pub fn detect(&self, profile: &CustomerProfile, candidate: &CandidateTransaction) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        self.check_zscore(profile, candidate, &mut anomalies);
        self.check_above_max(profile, candidate, &mut anomalies);
        self.check_new_payee(profile, candidate, &mut anomalies);
        self.check_unusual_day(profile, candidate, &mut anomalies);
        self.check_unusual_hour(profile, candidate, &mut anomalies);
        self.check_dormancy(profile, candidate, &mut anomalies);
        self.check_bounce_history(profile, &mut anomalies);
        self.check_velocity(candidate, &mut anomalies);
        anomalies
    }

    fn check_zscore(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        if profile.transaction_count < self.policy.zscore_min_history {
            return;
        }
        let stddev = profile.stddev_amount();
        if stddev <= 0.0 {
            return;
        }
        let z = (candidate.amount - profile.mean_amount).abs() / stddev;
        let severity = if z > self.policy.zscore_high {
            Severity::High
        } else if z > self.policy.zscore_medium {
            Severity::Medium
        } else {
            return;
        };
        out.push(Anomaly::new(
            AnomalyKind::ExtremeAmount { z_score: z },
            severity,
            format!(
                "amount {:.2} is {:.1} standard deviations from the mean {:.2}",
                candidate.amount, z, profile.mean_amount
            ),
        ));
    }

    fn check_above_max(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        if profile.max_amount <= 0.0 || candidate.amount <= profile.max_amount {
            return;
        }
        let ratio = candidate.amount / profile.max_amount;
        let severity = if ratio > self.policy.max_ratio_high {
            Severity::High
        } else {
            Severity::Medium
        };
        out.push(Anomaly::new(
            AnomalyKind::AboveHistoricalMax { ratio },
            severity,
            format!(
                "amount {:.2} is {:.1}x the historical maximum {:.2}",
                candidate.amount, ratio, profile.max_amount
            ),
        ));
    }

    fn check_new_payee(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        // Habitually-varied spenders are not flagged: the rule only fires
        // once the profile is established and new payees are genuinely rare.
        if profile.transaction_count < self.policy.new_payee_min_history
            || profile.new_payee_rate >= self.policy.new_payee_max_rate
            || profile.knows_payee(&candidate.payee)
        {
            return;
        }
        let severity = if candidate.amount > profile.mean_amount {
            Severity::High
        } else {
            Severity::Low
        };
        out.push(Anomaly::new(
            AnomalyKind::NewPayee {
                payee: candidate.payee.clone(),
            },
            severity,
            format!(
                "payee \"{}\" never seen across {} transactions",
                candidate.payee, profile.transaction_count
            ),
        ));
    }

    fn check_unusual_day(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        let day = candidate.occurred_at.weekday().num_days_from_monday() as u8;
        if profile.active_days.is_empty() || profile.active_days.contains(&day) {
            return;
        }
        let name = DAY_NAMES.get(day as usize).copied().unwrap_or("unknown");
        out.push(Anomaly::new(
            AnomalyKind::UnusualDay { day },
            Severity::Low,
            format!("no prior activity on {}", name),
        ));
    }

    fn check_unusual_hour(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        let hour = candidate.occurred_at.hour() as u8;
        if profile.active_hours.is_empty() || profile.active_hours.contains(&hour) {
            return;
        }
        let in_night_band = hour >= self.policy.night_start_hour || hour <= self.policy.night_end_hour;
        let (severity, detail) = if in_night_band {
            (
                Severity::Medium,
                format!("no prior activity at {:02}:00, within the night band", hour),
            )
        } else {
            (Severity::Low, format!("no prior activity at {:02}:00", hour))
        };
        out.push(Anomaly::new(AnomalyKind::UnusualHour { hour }, severity, detail));
    }

    fn check_dormancy(
        &self,
        profile: &CustomerProfile,
        candidate: &CandidateTransaction,
        out: &mut Vec<Anomaly>,
    ) {
        let Some(last) = profile.last_activity else {
            return;
        };
        let idle_days = (candidate.occurred_at - last).num_days();
        let severity = if idle_days > self.policy.dormancy_high_days {
            Severity::High
        } else if idle_days > self.policy.dormancy_medium_days {
            Severity::Medium
        } else {
            return;
        };
        out.push(Anomaly::new(
            AnomalyKind::DormantAccount { idle_days },
            severity,
            format!("account inactive for {} days before this cheque", idle_days),
        ));
    }

    fn check_bounce_history(&self, profile: &CustomerProfile, out: &mut Vec<Anomaly>) {
        if profile.cheques_issued < self.policy.bounce_min_issued {
            return;
        }
        let severity = if profile.bounce_rate > self.policy.bounce_high_rate {
            Severity::High
        } else if profile.bounce_rate > self.policy.bounce_medium_rate {
            Severity::Medium
        } else {
            return;
        };
        out.push(Anomaly::new(
            AnomalyKind::BounceHistory {
                rate: profile.bounce_rate,
            },
            severity,
            format!(
                "{:.1}% of {} issued cheques bounced",
                profile.bounce_rate, profile.cheques_issued
            ),
        ));
    }

    fn check_velocity(&self, candidate: &CandidateTransaction, out: &mut Vec<Anomaly>) {
        // The candidate itself counts toward the window.
        let recent = candidate.recent_count + 1;
        let severity = if recent >= self.policy.velocity_high {
            Severity::High
        } else if recent >= self.policy.velocity_medium {
            Severity::Medium
        } else {
            return;
        };
        out.push(Anomaly::new(
            AnomalyKind::HighVelocity { recent },
            severity,
            format!("{} transactions within the trailing 24 hours", recent),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(PolicyConstants::default())
    }

    fn candidate(amount: f64, payee: &str, hour: u32) -> CandidateTransaction {
        CandidateTransaction {
            amount,
            payee: payee.to_string(),
            // 2025-03-10 is a Monday
            occurred_at: Utc.with_ymd_and_hms(2025, 3, 10, hour, 15, 0).unwrap(),
            recent_count: 0,
        }
    }

    fn settled_profile() -> CustomerProfile {
        let mut profile = CustomerProfile::new("ACC-1");
        profile.transaction_count = 10;
        profile.mean_amount = 20_000.0;
        profile.variance_amount = 25_000_000.0; // stddev 5,000
        profile.min_amount = 5_000.0;
        profile.max_amount = 40_000.0;
        profile.cheques_issued = 10;
        profile.payee_counts.insert("Acme".to_string(), 6);
        profile.payee_counts.insert("Beta".to_string(), 4);
        profile.new_payee_rate = 10.0;
        profile.active_days.insert(0);
        profile.active_hours.insert(10);
        profile.last_activity = Some(Utc.with_ymd_and_hms(2025, 3, 8, 10, 0, 0).unwrap());
        profile
    }

    fn kinds(anomalies: &[Anomaly]) -> Vec<&'static str> {
        anomalies.iter().map(|a| a.kind.label()).collect()
    }

    #[test]
    fn test_typical_transaction_raises_nothing() {
        let profile = settled_profile();
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        assert!(anomalies.is_empty(), "unexpected: {:?}", anomalies);
    }

    #[test]
    fn test_extreme_amount_is_high() {
        let profile = settled_profile();
        let anomalies = detector().detect(&profile, &candidate(100_000.0, "Acme", 10));
        let extreme = anomalies
            .iter()
            .find(|a| a.kind.label() == "extreme_amount")
            .unwrap();
        assert_eq!(extreme.severity, Severity::High);
        let AnomalyKind::ExtremeAmount { z_score } = extreme.kind else {
            panic!("wrong kind");
        };
        assert!((z_score - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_moderate_deviation_is_medium() {
        let profile = settled_profile();
        // z = 2.4: above the medium threshold, below high
        let anomalies = detector().detect(&profile, &candidate(32_000.0, "Acme", 10));
        let extreme = anomalies
            .iter()
            .find(|a| a.kind.label() == "extreme_amount")
            .unwrap();
        assert_eq!(extreme.severity, Severity::Medium);
    }

    #[test]
    fn test_zscore_needs_history_and_spread() {
        let mut profile = settled_profile();
        profile.transaction_count = 2;
        assert!(kinds(&detector().detect(&profile, &candidate(100_000.0, "Acme", 10)))
            .iter()
            .all(|k| *k != "extreme_amount"));

        let mut flat = settled_profile();
        flat.variance_amount = 0.0;
        assert!(kinds(&detector().detect(&flat, &candidate(100_000.0, "Acme", 10)))
            .iter()
            .all(|k| *k != "extreme_amount"));
    }

    #[test]
    fn test_above_max_ratio_thresholds() {
        let profile = settled_profile();
        let medium = detector().detect(&profile, &candidate(60_000.0, "Acme", 10));
        let hit = medium
            .iter()
            .find(|a| a.kind.label() == "above_historical_max")
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);

        let high = detector().detect(&profile, &candidate(100_000.0, "Acme", 10));
        let hit = high
            .iter()
            .find(|a| a.kind.label() == "above_historical_max")
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
    }

    #[test]
    fn test_new_payee_low_then_high_when_amount_exceeds_mean() {
        let profile = settled_profile();
        let low = detector().detect(&profile, &candidate(1_000.0, "Stranger", 10));
        let hit = low.iter().find(|a| a.kind.label() == "new_payee").unwrap();
        assert_eq!(hit.severity, Severity::Low);

        let high = detector().detect(&profile, &candidate(25_000.0, "Stranger", 10));
        let hit = high.iter().find(|a| a.kind.label() == "new_payee").unwrap();
        assert_eq!(hit.severity, Severity::High);
    }

    #[test]
    fn test_new_payee_not_flagged_for_varied_spenders() {
        let mut profile = settled_profile();
        profile.new_payee_rate = 45.0;
        let anomalies = detector().detect(&profile, &candidate(1_000.0, "Stranger", 10));
        assert!(kinds(&anomalies).iter().all(|k| *k != "new_payee"));

        let mut young = settled_profile();
        young.transaction_count = 4;
        let anomalies = detector().detect(&young, &candidate(1_000.0, "Stranger", 10));
        assert!(kinds(&anomalies).iter().all(|k| *k != "new_payee"));
    }

    #[test]
    fn test_unusual_day_and_hour() {
        let profile = settled_profile();
        // Tuesday, 14:00 — both outside the observed sets, hour not in night band
        let mut c = candidate(21_000.0, "Acme", 14);
        c.occurred_at = Utc.with_ymd_and_hms(2025, 3, 11, 14, 15, 0).unwrap();
        let anomalies = detector().detect(&profile, &c);
        assert_eq!(kinds(&anomalies), vec!["unusual_day", "unusual_hour"]);
        assert!(anomalies.iter().all(|a| a.severity == Severity::Low));
    }

    #[test]
    fn test_night_hour_escalates_to_medium() {
        let profile = settled_profile();
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 2));
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "unusual_hour")
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);
    }

    #[test]
    fn test_dormancy_thresholds() {
        let mut profile = settled_profile();
        profile.last_activity = Some(Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap());
        // ~129 days idle
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "dormant_account")
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);

        profile.last_activity = Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "dormant_account")
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
    }

    #[test]
    fn test_bounce_history_needs_minimum_issued() {
        let mut profile = settled_profile();
        profile.cheques_issued = 4;
        profile.bounce_rate = 50.0;
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        assert!(kinds(&anomalies).iter().all(|k| *k != "bounce_history"));

        profile.cheques_issued = 10;
        profile.bounce_rate = 15.0;
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "bounce_history")
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);

        profile.bounce_rate = 30.0;
        let anomalies = detector().detect(&profile, &candidate(21_000.0, "Acme", 10));
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "bounce_history")
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
    }

    #[test]
    fn test_velocity_counts_the_candidate() {
        let profile = settled_profile();
        let mut c = candidate(21_000.0, "Acme", 10);
        c.recent_count = 2; // plus the candidate = 3
        let anomalies = detector().detect(&profile, &c);
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "high_velocity")
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);

        c.recent_count = 4; // plus the candidate = 5
        let anomalies = detector().detect(&profile, &c);
        let hit = anomalies
            .iter()
            .find(|a| a.kind.label() == "high_velocity")
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
    }
}
