//! Deep (drawer-bank) verification
//!
//! Runs with full access to the drawer's account internals: account and leaf
//! state, funds, MICR cross-check, signature scoring against the on-file
//! reference, generative-image screening, behavioral fraud analysis and the
//! holds surfaced by the clearing router. Produces one ordered report and a
//! decision: any failed rule rejects, warnings alone flag for review, a clean
//! report approves.
//!
//! Collaborator failures degrade to warnings ("cannot verify"), never to a
//! silent pass; storage failures on the reads here are real errors and
//! propagate.

use std::sync::Arc;

use chrono::{Months, NaiveDate};

use cheqflow_core::{
    Cheque, CheckReport, Decision, ExtractedCheque, ImagePayload, MicrCheck, MicrLine, RuleCheck,
};
use cheqflow_repository::{Account, ClearingRecord, ClearingStore, LeafState};

use crate::anomaly::{AnomalyDetector, CandidateTransaction};
use crate::collab::{FraudScorer, ScorerVerdict, SignatureMatch, SignatureScorer};
use crate::config::{BypassPolicy, EngineConfig, PolicyConstants, Thresholds};
use crate::error::Result;
use crate::risk::{RiskReport, RiskScorer};

const BYPASSED: &str = "Check bypassed by policy";

/// Everything the verifier needs about one presentment.
pub struct VerificationContext<'a> {
    pub cheque: &'a Cheque,
    pub extraction: &'a ExtractedCheque,
    pub clearing: &'a ClearingRecord,
    /// Front image of the deposited cheque, used for signature scoring
    pub deposit_image: Option<&'a ImagePayload>,
    /// Transactions already recorded for the drawer in the trailing 24 hours
    pub recent_count: u32,
    pub processing_date: NaiveDate,
}

/// Full result of one deep verification.
#[derive(Debug, Clone)]
pub struct DeepOutcome {
    pub report: CheckReport,
    pub signature: Option<SignatureMatch>,
    pub anomalies: Vec<cheqflow_core::Anomaly>,
    pub risk: RiskReport,
    /// External fraud-model verdict, when a scorer is configured and reachable
    pub verdict: Option<ScorerVerdict>,
    pub decision: Decision,
    /// Collaborator calls that failed during this verification
    pub collaborator_failures: u32,
}

pub struct DeepVerifier {
    store: Arc<dyn ClearingStore>,
    signature: Arc<dyn SignatureScorer>,
    fraud: Option<Arc<dyn FraudScorer>>,
    detector: AnomalyDetector,
    scorer: RiskScorer,
    thresholds: Thresholds,
    policy: PolicyConstants,
    bypass: BypassPolicy,
}

impl DeepVerifier {
    pub fn new(
        store: Arc<dyn ClearingStore>,
        signature: Arc<dyn SignatureScorer>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            signature,
            fraud: None,
            detector: AnomalyDetector::new(config.policy),
            scorer: RiskScorer::new(config.thresholds),
            thresholds: config.thresholds,
            policy: config.policy,
            bypass: config.bypass,
        }
    }

    /// Attach the optional external fraud model.
    pub fn with_fraud_scorer(mut self, fraud: Arc<dyn FraudScorer>) -> Self {
        self.fraud = Some(fraud);
        self
    }

    pub async fn verify(&self, ctx: VerificationContext<'_>) -> Result<DeepOutcome> {
        let cheque = ctx.cheque;
        let mut report = CheckReport::new();
        let mut collaborator_failures = 0u32;

        let account = self.store.account(&cheque.drawer_account).await?;
        report.record(self.check_account_status(cheque, account.as_ref()));

        let leaf = self
            .store
            .leaf(&cheque.drawer_account, &cheque.cheque_number)
            .await?;
        report.record(self.check_leaf_status(leaf.as_ref().map(|l| l.state)));

        report.record(self.check_funds(cheque, account.as_ref()));
        report.record(self.check_date_window(cheque, ctx.processing_date));
        report.record(self.check_micr(cheque, ctx.extraction, account.as_ref()));

        let signature = self
            .score_signature(
                &mut report,
                &mut collaborator_failures,
                ctx.deposit_image,
                account.as_ref(),
            )
            .await;
        let signature_confidence = signature.as_ref().map(|s| s.confidence);

        report.record(self.check_genai(ctx.extraction));

        let profile = self.store.profile(&cheque.drawer_account).await?;
        let candidate = CandidateTransaction {
            amount: cheque.amount,
            payee: cheque.payee.clone(),
            occurred_at: cheque.created_at,
            recent_count: ctx.recent_count,
        };
        let anomalies = match profile.as_ref() {
            Some(p) if p.has_history() => self.detector.detect(p, &candidate),
            _ => Vec::new(),
        };
        let risk = self.scorer.assess(&anomalies, signature_confidence, profile.as_ref());
        if self.bypass.skip_fraud_analysis {
            report.record(RuleCheck::pass("fraud_analysis", BYPASSED));
        } else {
            report.record(self.check_fraud_score(&risk));
        }

        let mut verdict = None;
        if let Some(fraud) = &self.fraud {
            if !self.bypass.skip_fraud_analysis {
                match fraud.assess(ctx.extraction, signature_confidence).await {
                    Ok(v) => {
                        report.record(self.check_fraud_model(&v));
                        verdict = Some(v);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "external fraud model unavailable");
                        collaborator_failures += 1;
                        report.record(RuleCheck::warning(
                            "fraud_model",
                            "Fraud model unavailable; manual review required",
                        ));
                    }
                }
            }
        }

        self.record_clearing_holds(ctx.clearing, &mut report);

        let decision = if !report.is_valid() {
            Decision::Rejected
        } else if report.has_warnings() {
            Decision::Flagged
        } else {
            Decision::Approved
        };
        tracing::debug!(
            cheque = %cheque.cheque_number,
            %decision,
            fraud_score = risk.fraud_score,
            "deep verification complete"
        );

        Ok(DeepOutcome {
            report,
            signature,
            anomalies,
            risk,
            verdict,
            decision,
            collaborator_failures,
        })
    }

    fn check_account_status(&self, cheque: &Cheque, account: Option<&Account>) -> RuleCheck {
        const NAME: &str = "account_status";
        match account {
            None => RuleCheck::fail(
                NAME,
                format!("Account {} not found at drawer bank", cheque.drawer_account),
            ),
            Some(account) if !account.is_active() => {
                let status = format!("{:?}", account.status).to_lowercase();
                RuleCheck::fail(NAME, format!("Account is {}", status))
            }
            Some(_) => RuleCheck::pass(NAME, "Account active"),
        }
    }

    fn check_leaf_status(&self, state: Option<LeafState>) -> RuleCheck {
        const NAME: &str = "leaf_status";
        match state {
            None => RuleCheck::fail(NAME, "No leaf issued for this cheque number"),
            Some(LeafState::Unused) => RuleCheck::pass(NAME, "Leaf unused"),
            Some(LeafState::Used) => RuleCheck::fail(NAME, "Leaf already used"),
            Some(LeafState::Stopped) => RuleCheck::fail(NAME, "Stop payment on this leaf"),
            Some(LeafState::Lost) => RuleCheck::fail(NAME, "Leaf reported lost or stolen"),
        }
    }

    // Informational: a low balance warns but never rejects on its own.
    fn check_funds(&self, cheque: &Cheque, account: Option<&Account>) -> RuleCheck {
        const NAME: &str = "funds";
        if self.bypass.skip_funds_check {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        match account {
            None => RuleCheck::warning(NAME, "Account unavailable; funds not checked"),
            Some(account) if account.balance < cheque.amount => RuleCheck::warning(
                NAME,
                format!(
                    "Balance {:.2} below cheque amount {:.2}",
                    account.balance, cheque.amount
                ),
            ),
            Some(_) => RuleCheck::pass(NAME, "Sufficient funds"),
        }
    }

    fn check_date_window(&self, cheque: &Cheque, processing_date: NaiveDate) -> RuleCheck {
        const NAME: &str = "date_window";
        if self.bypass.skip_date_checks {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        let Some(issued) = cheque.issue_date else {
            return RuleCheck::fail(NAME, "No parseable issue date");
        };
        if issued > processing_date {
            return RuleCheck::fail(NAME, format!("Post-dated: {} is in the future", issued));
        }
        if let Some(cutoff) = processing_date.checked_sub_months(Months::new(self.policy.stale_months))
        {
            if issued < cutoff {
                return RuleCheck::fail(
                    NAME,
                    format!("Stale: {} is older than {} months", issued, self.policy.stale_months),
                );
            }
        }
        RuleCheck::pass(NAME, "Issue date within the business window")
    }

    fn check_micr(
        &self,
        cheque: &Cheque,
        extraction: &ExtractedCheque,
        account: Option<&Account>,
    ) -> RuleCheck {
        const NAME: &str = "micr_match";
        if self.bypass.skip_micr_check {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        let Some(raw) = cheque.micr_line.as_deref() else {
            return RuleCheck::fail(NAME, "MICR line missing");
        };
        // The account's routing number is authoritative; extraction is the
        // fallback when the account lookup already failed.
        let routing = account
            .map(|a| a.routing_number.as_str())
            .or(extraction.routing_number.as_deref());
        let Some(routing) = routing else {
            return RuleCheck::fail(NAME, "No routing number available for cross-check");
        };
        let line = MicrLine::parse(raw);
        match line.cross_check(&cheque.cheque_number, routing, &cheque.drawer_account) {
            MicrCheck::Match => RuleCheck::pass(NAME, "MICR tokens match cheque, routing and account"),
            mismatch => RuleCheck::fail(NAME, mismatch.to_string()),
        }
    }

    async fn score_signature(
        &self,
        report: &mut CheckReport,
        failures: &mut u32,
        deposit_image: Option<&ImagePayload>,
        account: Option<&Account>,
    ) -> Option<SignatureMatch> {
        const NAME: &str = "signature_match";
        if self.bypass.skip_signature_verification {
            report.record(RuleCheck::pass(NAME, BYPASSED));
            return None;
        }
        let Some(image) = deposit_image else {
            report.record(RuleCheck::warning(
                NAME,
                "No cheque image for signature comparison; manual review required",
            ));
            return None;
        };
        let Some(reference) = account.and_then(|a| a.signature_on_file.as_ref()) else {
            report.record(RuleCheck::warning(
                NAME,
                "No reference signature on file; manual review required",
            ));
            return None;
        };
        match self.signature.score(image, reference).await {
            Ok(result) => {
                let check = if result.confidence >= self.thresholds.signature_pass {
                    RuleCheck::pass(
                        NAME,
                        format!("Signatures match with confidence {:.1}", result.confidence),
                    )
                } else if result.confidence >= self.thresholds.signature_review {
                    RuleCheck::warning(
                        NAME,
                        format!("Confidence {:.1}; review needed", result.confidence),
                    )
                } else {
                    RuleCheck::fail(
                        NAME,
                        format!("Signature mismatch, confidence {:.1}", result.confidence),
                    )
                };
                report.record(check);
                Some(result)
            }
            Err(error) => {
                tracing::warn!(%error, "signature scorer unavailable");
                *failures += 1;
                report.record(RuleCheck::warning(
                    NAME,
                    "Signature service unavailable; cannot verify",
                ));
                None
            }
        }
    }

    fn check_genai(&self, extraction: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "genai_screen";
        if self.bypass.skip_genai_screen {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        if extraction.genai_flagged && extraction.genai_confidence > self.thresholds.genai_fail_confidence
        {
            RuleCheck::fail(
                NAME,
                format!(
                    "Image flagged as generated with confidence {:.1}",
                    extraction.genai_confidence
                ),
            )
        } else if extraction.genai_flagged {
            RuleCheck::pass(
                NAME,
                format!(
                    "Generative flag below action threshold ({:.1})",
                    extraction.genai_confidence
                ),
            )
        } else {
            RuleCheck::pass(NAME, "No generative-image indicators")
        }
    }

    fn check_fraud_score(&self, risk: &RiskReport) -> RuleCheck {
        const NAME: &str = "fraud_analysis";
        let detail = format!("Fraud score {:.1}, tier {}", risk.fraud_score, risk.tier);
        if risk.fraud_score >= self.thresholds.fraud_fail {
            RuleCheck::fail(NAME, detail)
        } else if risk.fraud_score >= self.thresholds.fraud_review {
            RuleCheck::warning(NAME, detail)
        } else {
            RuleCheck::pass(NAME, detail)
        }
    }

    // Advisory: the external model can force a review, never a rejection.
    fn check_fraud_model(&self, verdict: &ScorerVerdict) -> RuleCheck {
        const NAME: &str = "fraud_model";
        let detail = match verdict.fraud_score {
            Some(score) => format!("External model score {:.1} ({})", score, verdict.risk_level),
            None => format!("External model declined to score ({})", verdict.risk_level),
        };
        if verdict
            .fraud_score
            .is_some_and(|score| score >= self.thresholds.fraud_review)
        {
            RuleCheck::warning(NAME, detail)
        } else {
            RuleCheck::pass(NAME, detail)
        }
    }

    fn record_clearing_holds(&self, clearing: &ClearingRecord, report: &mut CheckReport) {
        report.record(match &clearing.blacklist_hit {
            Some(id) => RuleCheck::fail("blacklist_screen", format!("Blacklist hit {}", id)),
            None => RuleCheck::pass("blacklist_screen", "No blacklist match"),
        });
        report.record(match &clearing.duplicate_of {
            Some(prior) => RuleCheck::fail(
                "duplicate_presentment",
                format!("Already presented under {}", prior),
            ),
            None => RuleCheck::pass("duplicate_presentment", "First presentment"),
        });
        report.record(match &clearing.stop_payment {
            Some(leaf) => RuleCheck::fail("stop_payment_screen", format!("Stop payment on {}", leaf)),
            None => RuleCheck::pass("stop_payment_screen", "No stop payment"),
        });
    }
}
