//! Typed records persisted by the clearing pipeline
//!
//! Every row the pipeline stores or loads is one of these structs. They carry
//! the parse/validate boundary of the system: loosely-typed storage rows stop
//! here, and only these shapes flow into scoring and decisioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use cheqflow_core::{
    Anomaly, CheckReport, Decision, DecisionSource, ImagePayload, RiskTier,
};

/// Operational status of a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Dormant,
    Frozen,
    Closed,
}

/// A drawer-bank account as the deep verifier sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: String,
    pub routing_number: String,
    pub bank_code: String,
    pub holder_name: String,
    pub balance: f64,
    pub status: AccountStatus,
    pub national_id: Option<String>,
    /// Reference signature image used for similarity scoring
    pub signature_on_file: Option<ImagePayload>,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// State of one physical cheque form within an issued book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafState {
    Unused,
    Used,
    Stopped,
    Lost,
}

/// One cheque leaf, tracked for use, stop-payment and loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChequeLeaf {
    pub account_number: String,
    pub cheque_number: String,
    pub state: LeafState,
    pub issued_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// What a blacklist entry matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistKind {
    AccountNumber,
    ChequeNumber,
    NationalId,
}

/// Central clearing-house blacklist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: String,
    pub kind: BlacklistKind,
    pub value: String,
    pub reason: String,
    pub listed_at: DateTime<Utc>,
}

impl BlacklistEntry {
    /// Whether this entry matches the given identifiers.
    pub fn matches(
        &self,
        account_number: &str,
        cheque_number: &str,
        national_id: Option<&str>,
    ) -> bool {
        match self.kind {
            BlacklistKind::AccountNumber => self.value == account_number,
            BlacklistKind::ChequeNumber => self.value == cheque_number,
            BlacklistKind::NationalId => national_id.is_some_and(|id| self.value == id),
        }
    }
}

/// Per-customer behavioral profile maintained by the statistics engine.
///
/// Amount statistics follow the streaming (Welford) identities and are
/// recomputable in full batch from the transaction history; the two must
/// agree within floating tolerance. Variance is clamped to zero before any
/// square root is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub account_number: String,
    /// Number of transactions folded into the running statistics
    pub transaction_count: u64,
    pub mean_amount: f64,
    pub variance_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub cheques_issued: u64,
    pub cheques_bounced: u64,
    /// Percentage in [0, 100]
    pub bounce_rate: f64,
    /// Days of week observed, 0 = Monday
    pub active_days: BTreeSet<u8>,
    /// Hours of day observed, 0-23
    pub active_hours: BTreeSet<u8>,
    /// Bounded most-frequent payee set: payee -> times seen
    pub payee_counts: HashMap<String, u64>,
    /// Smoothed share of transactions going to a previously-unseen payee,
    /// percentage in [0, 100]
    pub new_payee_rate: f64,
    pub last_activity: Option<DateTime<Utc>>,
    /// Last computed composite fraud score for this account
    pub risk_score: f64,
    pub risk_tier: RiskTier,
}

impl CustomerProfile {
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            transaction_count: 0,
            mean_amount: 0.0,
            variance_amount: 0.0,
            min_amount: 0.0,
            max_amount: 0.0,
            cheques_issued: 0,
            cheques_bounced: 0,
            bounce_rate: 0.0,
            active_days: BTreeSet::new(),
            active_hours: BTreeSet::new(),
            payee_counts: HashMap::new(),
            new_payee_rate: 0.0,
            last_activity: None,
            risk_score: 0.0,
            risk_tier: RiskTier::Low,
        }
    }

    /// Standard deviation of transaction amounts, with the variance clamped
    /// to zero first.
    pub fn stddev_amount(&self) -> f64 {
        self.variance_amount.max(0.0).sqrt()
    }

    pub fn knows_payee(&self, payee: &str) -> bool {
        self.payee_counts.contains_key(payee)
    }

    pub fn has_history(&self) -> bool {
        self.transaction_count > 0
    }
}

/// Append-only transaction history row.
///
/// Feeds the velocity window and batch profile recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub account_number: String,
    pub cheque_number: Option<String>,
    pub amount: f64,
    pub payee: String,
    pub occurred_at: DateTime<Utc>,
}

/// One inter-bank presentment through the central clearing router.
///
/// Screen hits are stored as back-references to the matched record, not
/// booleans, so downstream review stays explainable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingRecord {
    pub clearing_ref: String,
    pub cheque_number: String,
    pub presenting_bank: String,
    pub drawer_bank: String,
    /// Id of the matching blacklist entry, if any
    pub blacklist_hit: Option<String>,
    /// Clearing reference of the prior presentment, if any
    pub duplicate_of: Option<String>,
    /// Identity of the stopped leaf (`account/cheque`), if any
    pub stop_payment: Option<String>,
    pub forwarded_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ClearingRecord {
    pub fn has_hits(&self) -> bool {
        self.blacklist_hit.is_some() || self.duplicate_of.is_some() || self.stop_payment.is_some()
    }
}

/// Review status of a fraud flag in the human-review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Cleared,
    Confirmed,
}

/// Created when a cheque is flagged for review; consumed by the human-review
/// queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudFlag {
    pub id: String,
    pub cheque_number: String,
    pub priority: RiskTier,
    pub reason: String,
    pub review_status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Per-cheque audit row recording every verification phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub cheque_number: String,
    /// Presenting-bank (basic) validation report
    pub basic: CheckReport,
    pub clearing_ref: Option<String>,
    /// Drawer-bank (deep) verification report, absent when basic validation
    /// failed
    pub deep: Option<CheckReport>,
    pub signature_confidence: Option<f64>,
    pub fraud_score: Option<f64>,
    pub risk_tier: Option<RiskTier>,
    pub anomalies: Vec<Anomaly>,
    pub decision: Option<Decision>,
    pub decided_by: Option<DecisionSource>,
    pub decided_at: Option<DateTime<Utc>>,
    pub notes: Vec<String>,
}

impl VerificationRecord {
    pub fn for_cheque(cheque_number: impl Into<String>, basic: CheckReport) -> Self {
        Self {
            cheque_number: cheque_number.into(),
            basic,
            clearing_ref: None,
            deep: None,
            signature_confidence: None,
            fraud_score: None,
            risk_tier: None,
            anomalies: Vec::new(),
            decision: None,
            decided_by: None,
            decided_at: None,
            notes: Vec::new(),
        }
    }
}
