//! In-memory reference backend
//!
//! Backs every map with `tokio::sync::RwLock` so one `MemoryStore` handle can
//! be shared across concurrent submissions. This is the backend the test
//! suites run against; a database-backed store would implement the same
//! trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use cheqflow_core::Cheque;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Account, BlacklistEntry, ChequeLeaf, ClearingRecord, CustomerProfile, FraudFlag, LeafState,
    ReviewStatus, TransactionRecord, VerificationRecord,
};
use crate::traits::ClearingStore;

/// In-memory implementation of [`ClearingStore`].
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    leaves: RwLock<HashMap<(String, String), ChequeLeaf>>,
    blacklist: RwLock<Vec<BlacklistEntry>>,
    cheques: RwLock<HashMap<String, Cheque>>,
    profiles: RwLock<HashMap<String, CustomerProfile>>,
    transactions: RwLock<Vec<TransactionRecord>>,
    clearing: RwLock<HashMap<String, ClearingRecord>>,
    verifications: RwLock<HashMap<String, VerificationRecord>>,
    flags: RwLock<HashMap<String, FraudFlag>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transaction history rows across all accounts. Used by tests
    /// asserting that an operation performed no new writes.
    pub async fn transaction_rows(&self) -> usize {
        self.transactions.read().await.len()
    }
}

#[async_trait]
impl ClearingStore for MemoryStore {
    async fn account(&self, account_number: &str) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(account_number).cloned())
    }

    async fn upsert_account(&self, account: Account) -> StoreResult<()> {
        self.accounts
            .write()
            .await
            .insert(account.account_number.clone(), account);
        Ok(())
    }

    async fn leaf(
        &self,
        account_number: &str,
        cheque_number: &str,
    ) -> StoreResult<Option<ChequeLeaf>> {
        let key = (account_number.to_string(), cheque_number.to_string());
        Ok(self.leaves.read().await.get(&key).cloned())
    }

    async fn upsert_leaf(&self, leaf: ChequeLeaf) -> StoreResult<()> {
        let key = (leaf.account_number.clone(), leaf.cheque_number.clone());
        self.leaves.write().await.insert(key, leaf);
        Ok(())
    }

    async fn set_leaf_state(
        &self,
        account_number: &str,
        cheque_number: &str,
        state: LeafState,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let key = (account_number.to_string(), cheque_number.to_string());
        let mut leaves = self.leaves.write().await;
        let leaf = leaves.get_mut(&key).ok_or_else(|| {
            StoreError::not_found("cheque leaf", format!("{}/{}", account_number, cheque_number))
        })?;
        leaf.state = state;
        if state == LeafState::Used {
            leaf.used_at = Some(at);
        }
        Ok(())
    }

    async fn add_blacklist_entry(&self, entry: BlacklistEntry) -> StoreResult<()> {
        self.blacklist.write().await.push(entry);
        Ok(())
    }

    async fn blacklist_match(
        &self,
        account_number: &str,
        cheque_number: &str,
        national_id: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>> {
        let entries = self.blacklist.read().await;
        Ok(entries
            .iter()
            .find(|entry| entry.matches(account_number, cheque_number, national_id))
            .cloned())
    }

    async fn cheque(&self, cheque_number: &str) -> StoreResult<Option<Cheque>> {
        Ok(self.cheques.read().await.get(cheque_number).cloned())
    }

    async fn save_cheque(&self, cheque: Cheque) -> StoreResult<()> {
        self.cheques
            .write()
            .await
            .insert(cheque.cheque_number.clone(), cheque);
        Ok(())
    }

    async fn profile(&self, account_number: &str) -> StoreResult<Option<CustomerProfile>> {
        Ok(self.profiles.read().await.get(account_number).cloned())
    }

    async fn save_profile(&self, profile: CustomerProfile) -> StoreResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.account_number.clone(), profile);
        Ok(())
    }

    async fn record_transaction(&self, record: TransactionRecord) -> StoreResult<()> {
        self.transactions.write().await.push(record);
        Ok(())
    }

    async fn transactions(&self, account_number: &str) -> StoreResult<Vec<TransactionRecord>> {
        let rows = self.transactions.read().await;
        let mut history: Vec<_> = rows
            .iter()
            .filter(|r| r.account_number == account_number)
            .cloned()
            .collect();
        history.sort_by_key(|r| r.occurred_at);
        Ok(history)
    }

    async fn transactions_since(
        &self,
        account_number: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<TransactionRecord>> {
        let mut history = self.transactions(account_number).await?;
        history.retain(|r| r.occurred_at >= since);
        Ok(history)
    }

    async fn clearing_record(&self, cheque_number: &str) -> StoreResult<Option<ClearingRecord>> {
        Ok(self.clearing.read().await.get(cheque_number).cloned())
    }

    async fn save_clearing_record(&self, record: ClearingRecord) -> StoreResult<()> {
        self.clearing
            .write()
            .await
            .insert(record.cheque_number.clone(), record);
        Ok(())
    }

    async fn mark_clearing_responded(
        &self,
        cheque_number: &str,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut records = self.clearing.write().await;
        let record = records
            .get_mut(cheque_number)
            .ok_or_else(|| StoreError::not_found("clearing record", cheque_number))?;
        record.responded_at = Some(responded_at);
        Ok(())
    }

    async fn verification(&self, cheque_number: &str) -> StoreResult<Option<VerificationRecord>> {
        Ok(self.verifications.read().await.get(cheque_number).cloned())
    }

    async fn save_verification(&self, record: VerificationRecord) -> StoreResult<()> {
        self.verifications
            .write()
            .await
            .insert(record.cheque_number.clone(), record);
        Ok(())
    }

    async fn save_fraud_flag(&self, flag: FraudFlag) -> StoreResult<()> {
        self.flags.write().await.insert(flag.id.clone(), flag);
        Ok(())
    }

    async fn fraud_flag_for(&self, cheque_number: &str) -> StoreResult<Option<FraudFlag>> {
        let flags = self.flags.read().await;
        Ok(flags
            .values()
            .filter(|flag| flag.cheque_number == cheque_number)
            .max_by_key(|flag| flag.created_at)
            .cloned())
    }

    async fn resolve_flag(
        &self,
        flag_id: &str,
        status: ReviewStatus,
        resolved_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut flags = self.flags.write().await;
        let flag = flags
            .get_mut(flag_id)
            .ok_or_else(|| StoreError::not_found("fraud flag", flag_id))?;
        flag.review_status = status;
        flag.resolved_at = Some(resolved_at);
        Ok(())
    }
}
