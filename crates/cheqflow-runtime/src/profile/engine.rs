//! Profile engine: storage-backed statistics with per-account serialization
//!
//! Concurrent submissions for *different* accounts proceed independently, but
//! two cheques drawn on the same account must fold into the profile one at a
//! time or the read-modify-write cycle loses updates. The engine keeps one
//! async mutex per account and holds it across load, fold and save.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use cheqflow_core::RiskTier;
use cheqflow_repository::{ClearingStore, CustomerProfile, TransactionRecord};

use crate::config::PolicyConstants;
use crate::error::Result;
use crate::profile::stats;

pub struct ProfileEngine {
    store: Arc<dyn ClearingStore>,
    policy: PolicyConstants,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileEngine {
    pub fn new(store: Arc<dyn ClearingStore>, policy: PolicyConstants) -> Self {
        Self {
            store,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn account_lock(&self, account_number: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(account_number.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Fold a processed cheque into the drawer's profile and append the
    /// history row, optionally stamping the freshly computed risk snapshot.
    ///
    /// Returns the profile as saved.
    pub async fn record_cheque(
        &self,
        account_number: &str,
        cheque_number: &str,
        amount: f64,
        payee: &str,
        occurred_at: DateTime<Utc>,
        risk: Option<(f64, RiskTier)>,
    ) -> Result<CustomerProfile> {
        let lock = self.account_lock(account_number).await;
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .profile(account_number)
            .await?
            .unwrap_or_else(|| CustomerProfile::new(account_number));
        stats::apply_transaction(
            &mut profile,
            amount,
            payee,
            occurred_at,
            self.policy.top_payees,
        );
        if let Some((score, tier)) = risk {
            profile.risk_score = score;
            profile.risk_tier = tier;
        }

        self.store
            .record_transaction(TransactionRecord {
                account_number: account_number.to_string(),
                cheque_number: Some(cheque_number.to_string()),
                amount,
                payee: payee.to_string(),
                occurred_at,
            })
            .await?;
        self.store.save_profile(profile.clone()).await?;
        tracing::debug!(
            account = %account_number,
            transactions = profile.transaction_count,
            "profile updated"
        );
        Ok(profile)
    }

    /// Count a bounced cheque against the drawer's profile.
    pub async fn record_bounce(&self, account_number: &str) -> Result<CustomerProfile> {
        let lock = self.account_lock(account_number).await;
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .profile(account_number)
            .await?
            .unwrap_or_else(|| CustomerProfile::new(account_number));
        stats::apply_bounce(&mut profile);
        self.store.save_profile(profile.clone()).await?;
        Ok(profile)
    }

    /// Rebuild the profile from full history, repairing any streaming drift.
    ///
    /// Bounce counters and the last risk snapshot are carried over; the
    /// history rows know nothing about either.
    pub async fn recompute(&self, account_number: &str) -> Result<CustomerProfile> {
        let lock = self.account_lock(account_number).await;
        let _guard = lock.lock().await;

        let history = self.store.transactions(account_number).await?;
        let existing = self.store.profile(account_number).await?;
        let bounced = existing.as_ref().map_or(0, |p| p.cheques_bounced);

        let mut rebuilt = stats::recompute(account_number, &history, bounced, self.policy.top_payees);
        if let Some(existing) = existing {
            rebuilt.risk_score = existing.risk_score;
            rebuilt.risk_tier = existing.risk_tier;
        }
        self.store.save_profile(rebuilt.clone()).await?;
        tracing::info!(
            account = %account_number,
            transactions = rebuilt.transaction_count,
            "profile recomputed from history"
        );
        Ok(rebuilt)
    }
}
