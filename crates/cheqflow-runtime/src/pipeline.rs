//! Cheque pipeline facade
//!
//! One entry point drives the whole lifecycle: field extraction, cheque
//! creation, basic validation at the presenting bank, routing through the
//! clearing house, deep verification at the drawer bank, the decision status,
//! profile update and the audit trail. Administrative operations (supervisor
//! override, settle, bounce, profile recompute) live here too.
//!
//! Write discipline: cheque status, profiles and transaction history are core
//! state and their failures propagate; verification records and fraud flags
//! are audit writes, logged and swallowed so a computed decision is never
//! masked by a persistence hiccup.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use uuid::Uuid;

use cheqflow_core::{
    parse_cheque_date, Cheque, CheckReport, ChequeStatus, Decision, DecisionSource, ImagePayload,
    RiskTier,
};
use cheqflow_repository::{
    ClearingStore, CustomerProfile, FraudFlag, LeafState, ReviewStatus, VerificationRecord,
};

use crate::clearing::ClearingRouter;
use crate::collab::{FieldExtractor, FraudScorer, SignatureScorer};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::metrics::PipelineMetrics;
use crate::profile::ProfileEngine;
use crate::validate::{BasicValidator, DeepOutcome, DeepVerifier, VerificationContext};

/// A cheque image deposited at a presenting bank.
#[derive(Debug, Clone)]
pub struct Deposit {
    pub presenting_bank: String,
    pub presenting_account: String,
    pub image: ImagePayload,
}

/// What the caller gets back for one submission.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub cheque_number: String,
    pub status: ChequeStatus,
    /// Basic and deep reports merged, in rule order
    pub report: CheckReport,
    pub decision: Option<Decision>,
    pub decided_by: Option<DecisionSource>,
    pub fraud_score: Option<f64>,
    pub risk_tier: Option<RiskTier>,
    pub clearing_ref: Option<String>,
    /// True when an already-known cheque was returned without reprocessing
    pub resubmission: bool,
}

pub struct ChequePipeline {
    store: Arc<dyn ClearingStore>,
    extractor: Arc<dyn FieldExtractor>,
    validator: BasicValidator,
    router: ClearingRouter,
    verifier: DeepVerifier,
    profiles: ProfileEngine,
    metrics: PipelineMetrics,
}

impl ChequePipeline {
    pub fn new(
        store: Arc<dyn ClearingStore>,
        extractor: Arc<dyn FieldExtractor>,
        signature: Arc<dyn SignatureScorer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            validator: BasicValidator::new(config.bypass),
            router: ClearingRouter::new(store.clone()),
            verifier: DeepVerifier::new(store.clone(), signature, &config),
            profiles: ProfileEngine::new(store.clone(), config.policy),
            metrics: PipelineMetrics::new(),
            extractor,
            store,
        }
    }

    /// Attach the optional external fraud model.
    pub fn with_fraud_scorer(mut self, fraud: Arc<dyn FraudScorer>) -> Self {
        self.verifier = self.verifier.with_fraud_scorer(fraud);
        self
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Process one deposited cheque end to end.
    ///
    /// Resubmitting a cheque the pipeline already knows (terminal or still in
    /// flight) returns its current state untouched.
    pub async fn submit(&self, deposit: Deposit) -> Result<PipelineOutcome> {
        let started = Instant::now();
        self.metrics.received.inc();

        let extraction = match self.extractor.extract(&deposit.image).await {
            Ok(fields) => fields,
            Err(error) => {
                self.metrics.collaborator_failures.inc();
                tracing::error!(%error, "field extraction failed; cannot accept deposit");
                return Err(EngineError::Extraction(error.to_string()));
            }
        };

        let cheque_number = extraction
            .cheque_number
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("UNK-{}", Uuid::new_v4().simple()));

        if let Some(existing) = self.store.cheque(&cheque_number).await? {
            self.metrics.resubmissions.inc();
            tracing::info!(
                cheque = %cheque_number,
                status = %existing.status,
                "resubmission returned without processing"
            );
            let record = self.store.verification(&cheque_number).await?;
            return Ok(outcome_from_record(&existing, record, true));
        }

        let now = Utc::now();
        let issue_date = extraction
            .date
            .as_deref()
            .and_then(|raw| parse_cheque_date(raw).ok());
        let mut cheque = Cheque {
            cheque_number: cheque_number.clone(),
            drawer_account: extraction.account_number.clone().unwrap_or_default(),
            drawer_bank: extraction.bank_code.clone().unwrap_or_default(),
            presenting_account: Some(deposit.presenting_account.clone()),
            presenting_bank: Some(deposit.presenting_bank.clone()),
            payee: extraction.payee.clone().unwrap_or_default(),
            amount: extraction.amount_digits.unwrap_or(0.0),
            issue_date,
            micr_line: extraction.micr_line.clone(),
            front_image_ref: None,
            back_image_ref: None,
            status: ChequeStatus::Received,
            created_at: now,
            updated_at: now,
        };
        self.store.save_cheque(cheque.clone()).await?;

        let basic_report = self.validator.validate(&extraction);
        if !basic_report.is_valid() {
            cheque.advance(ChequeStatus::ValidationFailed)?;
            self.store.save_cheque(cheque.clone()).await?;
            self.metrics.validation_failures.inc();
            self.audit(VerificationRecord::for_cheque(&cheque_number, basic_report.clone()))
                .await;
            self.metrics.pipeline_seconds.observe_duration(started.elapsed());
            tracing::info!(cheque = %cheque_number, "basic validation failed");
            return Ok(PipelineOutcome {
                cheque_number,
                status: cheque.status,
                report: basic_report,
                decision: None,
                decided_by: None,
                fraud_score: None,
                risk_tier: None,
                clearing_ref: None,
                resubmission: false,
            });
        }
        cheque.advance(ChequeStatus::Validated)?;
        self.store.save_cheque(cheque.clone()).await?;

        cheque.advance(ChequeStatus::Clearing)?;
        self.store.save_cheque(cheque.clone()).await?;
        let clearing = self.router.route(&cheque).await?;
        cheque.advance(ChequeStatus::AtDrawerBank)?;
        self.store.save_cheque(cheque.clone()).await?;

        let recent_count = self
            .store
            .transactions_since(&cheque.drawer_account, now - Duration::hours(24))
            .await?
            .len() as u32;

        let outcome = self
            .verifier
            .verify(VerificationContext {
                cheque: &cheque,
                extraction: &extraction,
                clearing: &clearing,
                deposit_image: Some(&deposit.image),
                recent_count,
                processing_date: now.date_naive(),
            })
            .await?;
        self.metrics
            .collaborator_failures
            .add(outcome.collaborator_failures as u64);

        let next = match outcome.decision {
            Decision::Approved => ChequeStatus::Approved,
            Decision::Rejected => ChequeStatus::Rejected,
            Decision::Flagged => ChequeStatus::Flagged,
        };
        cheque.advance(next)?;
        self.store.save_cheque(cheque.clone()).await?;
        self.metrics.record_decision(outcome.decision);

        let decided_at = Utc::now();
        self.store
            .mark_clearing_responded(&cheque_number, decided_at)
            .await?;

        if outcome.decision == Decision::Flagged {
            let flag = FraudFlag {
                id: format!("FLG-{}", Uuid::new_v4().simple()),
                cheque_number: cheque_number.clone(),
                priority: outcome.risk.tier,
                reason: flag_reason(&outcome),
                review_status: ReviewStatus::Pending,
                created_at: decided_at,
                resolved_at: None,
            };
            if let Err(error) = self.store.save_fraud_flag(flag).await {
                tracing::error!(%error, cheque = %cheque_number, "failed to persist fraud flag");
            }
        }

        self.profiles
            .record_cheque(
                &cheque.drawer_account,
                &cheque_number,
                cheque.amount,
                &cheque.payee,
                now,
                Some((outcome.risk.fraud_score, outcome.risk.tier)),
            )
            .await?;

        let mut record = VerificationRecord::for_cheque(&cheque_number, basic_report.clone());
        record.clearing_ref = Some(clearing.clearing_ref.clone());
        record.deep = Some(outcome.report.clone());
        record.signature_confidence = outcome.signature.as_ref().map(|s| s.confidence);
        record.fraud_score = Some(outcome.risk.fraud_score);
        record.risk_tier = Some(outcome.risk.tier);
        record.anomalies = outcome.anomalies.clone();
        record.decision = Some(outcome.decision);
        record.decided_by = Some(DecisionSource::System);
        record.decided_at = Some(decided_at);
        record.notes = outcome.risk.rationale.clone();
        record.notes.push(outcome.risk.recommendation.clone());
        self.audit(record).await;

        self.metrics.pipeline_seconds.observe_duration(started.elapsed());
        tracing::info!(
            cheque = %cheque_number,
            decision = %outcome.decision,
            fraud_score = outcome.risk.fraud_score,
            "submission processed"
        );

        let mut report = basic_report;
        report.merge(outcome.report);
        Ok(PipelineOutcome {
            cheque_number,
            status: cheque.status,
            report,
            decision: Some(outcome.decision),
            decided_by: Some(DecisionSource::System),
            fraud_score: Some(outcome.risk.fraud_score),
            risk_tier: Some(outcome.risk.tier),
            clearing_ref: Some(clearing.clearing_ref),
            resubmission: false,
        })
    }

    /// Supervisor override of the system decision.
    ///
    /// Always recorded as `decided_by = supervisor`; the status graph still
    /// applies, so overriding an absolutely terminal cheque fails.
    pub async fn override_decision(
        &self,
        cheque_number: &str,
        decision: Decision,
        reason: &str,
    ) -> Result<PipelineOutcome> {
        let mut cheque = self.load_cheque(cheque_number).await?;
        let next = match decision {
            Decision::Approved => ChequeStatus::Approved,
            Decision::Rejected => ChequeStatus::Rejected,
            Decision::Flagged => ChequeStatus::Flagged,
        };
        cheque.advance(next)?;
        self.store.save_cheque(cheque.clone()).await?;

        let now = Utc::now();
        let mut record = self
            .store
            .verification(cheque_number)
            .await?
            .unwrap_or_else(|| VerificationRecord::for_cheque(cheque_number, CheckReport::new()));
        record.decision = Some(decision);
        record.decided_by = Some(DecisionSource::Supervisor);
        record.decided_at = Some(now);
        record.notes.push(format!("Supervisor override: {}", reason));
        // A supervisor action must be durably recorded; this write propagates.
        self.store.save_verification(record.clone()).await?;

        if decision != Decision::Flagged {
            if let Some(flag) = self.store.fraud_flag_for(cheque_number).await? {
                if flag.review_status == ReviewStatus::Pending {
                    let status = if decision == Decision::Approved {
                        ReviewStatus::Cleared
                    } else {
                        ReviewStatus::Confirmed
                    };
                    self.store.resolve_flag(&flag.id, status, now).await?;
                }
            }
        }
        tracing::info!(cheque = %cheque_number, %decision, "supervisor override applied");
        Ok(outcome_from_record(&cheque, Some(record), false))
    }

    /// Administrative settlement: funds moved, leaf consumed.
    pub async fn settle(&self, cheque_number: &str) -> Result<ChequeStatus> {
        let mut cheque = self.load_cheque(cheque_number).await?;
        cheque.advance(ChequeStatus::Settled)?;
        self.store.save_cheque(cheque.clone()).await?;
        self.store
            .set_leaf_state(
                &cheque.drawer_account,
                &cheque.cheque_number,
                LeafState::Used,
                Utc::now(),
            )
            .await?;
        tracing::info!(cheque = %cheque_number, "cheque settled");
        Ok(cheque.status)
    }

    /// Administrative bounce: returned unpaid, counted against the drawer.
    pub async fn bounce(&self, cheque_number: &str) -> Result<ChequeStatus> {
        let mut cheque = self.load_cheque(cheque_number).await?;
        cheque.advance(ChequeStatus::Bounced)?;
        self.store.save_cheque(cheque.clone()).await?;
        self.store
            .set_leaf_state(
                &cheque.drawer_account,
                &cheque.cheque_number,
                LeafState::Used,
                Utc::now(),
            )
            .await?;
        self.profiles.record_bounce(&cheque.drawer_account).await?;
        tracing::info!(cheque = %cheque_number, "cheque bounced");
        Ok(cheque.status)
    }

    /// Rebuild an account's profile from its full transaction history.
    pub async fn recompute_profile(&self, account_number: &str) -> Result<CustomerProfile> {
        if self.store.account(account_number).await?.is_none()
            && self.store.profile(account_number).await?.is_none()
        {
            return Err(EngineError::UnknownAccount(account_number.to_string()));
        }
        self.profiles.recompute(account_number).await
    }

    async fn load_cheque(&self, cheque_number: &str) -> Result<Cheque> {
        self.store
            .cheque(cheque_number)
            .await?
            .ok_or_else(|| EngineError::UnknownCheque(cheque_number.to_string()))
    }

    async fn audit(&self, record: VerificationRecord) {
        if let Err(error) = self.store.save_verification(record).await {
            tracing::error!(%error, "failed to persist verification record");
        }
    }
}

fn flag_reason(outcome: &DeepOutcome) -> String {
    let warnings: Vec<String> = outcome
        .report
        .warnings()
        .map(|check| format!("{}: {}", check.name, check.detail))
        .collect();
    if warnings.is_empty() {
        outcome.risk.recommendation.clone()
    } else {
        warnings.join("; ")
    }
}

fn outcome_from_record(
    cheque: &Cheque,
    record: Option<VerificationRecord>,
    resubmission: bool,
) -> PipelineOutcome {
    let mut outcome = PipelineOutcome {
        cheque_number: cheque.cheque_number.clone(),
        status: cheque.status,
        report: CheckReport::new(),
        decision: None,
        decided_by: None,
        fraud_score: None,
        risk_tier: None,
        clearing_ref: None,
        resubmission,
    };
    if let Some(record) = record {
        let mut report = record.basic;
        if let Some(deep) = record.deep {
            report.merge(deep);
        }
        outcome.report = report;
        outcome.decision = record.decision;
        outcome.decided_by = record.decided_by;
        outcome.fraud_score = record.fraud_score;
        outcome.risk_tier = record.risk_tier;
        outcome.clearing_ref = record.clearing_ref;
    }
    outcome
}
