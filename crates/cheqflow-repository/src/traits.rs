//! The `ClearingStore` trait
//!
//! One async trait covers the whole persisted state surface the pipeline
//! consumes: accounts, cheque leaves, blacklist entries, customer profiles,
//! transaction history, cheques, clearing records, verification records and
//! fraud flags. Backends implement it with interior mutability so the
//! pipeline can share one store handle across concurrent submissions.
//!
//! # Examples
//!
//! ```no_run
//! use cheqflow_repository::{ClearingStore, MemoryStore};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = MemoryStore::new();
//!
//! // Screens return the matched record, not a boolean, so review stays
//! // explainable.
//! if let Some(entry) = store.blacklist_match("ACC-9001", "000123", None).await? {
//!     println!("blacklisted: {} ({})", entry.value, entry.reason);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cheqflow_core::Cheque;

use crate::error::StoreResult;
use crate::models::{
    Account, BlacklistEntry, ChequeLeaf, ClearingRecord, CustomerProfile, FraudFlag, LeafState,
    ReviewStatus, TransactionRecord, VerificationRecord,
};

/// Persisted state surface consumed by the clearing pipeline.
///
/// All methods take `&self`; implementations are expected to use interior
/// mutability (the reference backend wraps its maps in `tokio::sync::RwLock`).
#[async_trait]
pub trait ClearingStore: Send + Sync {
    // ---- Accounts ----

    /// Load an account by number.
    async fn account(&self, account_number: &str) -> StoreResult<Option<Account>>;

    /// Insert or replace an account.
    async fn upsert_account(&self, account: Account) -> StoreResult<()>;

    // ---- Cheque leaves ----

    /// Load one leaf of an issued chequebook.
    async fn leaf(
        &self,
        account_number: &str,
        cheque_number: &str,
    ) -> StoreResult<Option<ChequeLeaf>>;

    /// Insert or replace a leaf.
    async fn upsert_leaf(&self, leaf: ChequeLeaf) -> StoreResult<()>;

    /// Move a leaf to a new state, recording when it was used.
    ///
    /// Fails with `NotFound` when the leaf does not exist.
    async fn set_leaf_state(
        &self,
        account_number: &str,
        cheque_number: &str,
        state: LeafState,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // ---- Blacklist ----

    /// Add a blacklist entry.
    async fn add_blacklist_entry(&self, entry: BlacklistEntry) -> StoreResult<()>;

    /// First blacklist entry matching the account number, cheque number or
    /// national id, if any.
    async fn blacklist_match(
        &self,
        account_number: &str,
        cheque_number: &str,
        national_id: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>>;

    // ---- Cheques ----

    /// Load a cheque by number.
    async fn cheque(&self, cheque_number: &str) -> StoreResult<Option<Cheque>>;

    /// Insert or replace a cheque. Every pipeline stage persists the cheque
    /// after advancing its status.
    async fn save_cheque(&self, cheque: Cheque) -> StoreResult<()>;

    // ---- Customer profiles ----

    /// Load the behavioral profile for an account.
    async fn profile(&self, account_number: &str) -> StoreResult<Option<CustomerProfile>>;

    /// Insert or replace a profile.
    async fn save_profile(&self, profile: CustomerProfile) -> StoreResult<()>;

    // ---- Transaction history ----

    /// Append one history row.
    async fn record_transaction(&self, record: TransactionRecord) -> StoreResult<()>;

    /// Full history for an account, oldest first.
    async fn transactions(&self, account_number: &str) -> StoreResult<Vec<TransactionRecord>>;

    /// History rows at or after `since`, oldest first.
    async fn transactions_since(
        &self,
        account_number: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<TransactionRecord>>;

    // ---- Clearing records ----

    /// Load the clearing record for a cheque, if it was ever routed.
    async fn clearing_record(&self, cheque_number: &str) -> StoreResult<Option<ClearingRecord>>;

    /// Insert or replace a clearing record.
    async fn save_clearing_record(&self, record: ClearingRecord) -> StoreResult<()>;

    /// Stamp the drawer bank's response time on a clearing record.
    async fn mark_clearing_responded(
        &self,
        cheque_number: &str,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // ---- Verification records ----

    /// Load the audit record for a cheque.
    async fn verification(&self, cheque_number: &str) -> StoreResult<Option<VerificationRecord>>;

    /// Insert or replace an audit record.
    async fn save_verification(&self, record: VerificationRecord) -> StoreResult<()>;

    // ---- Fraud flags ----

    /// Create a fraud flag.
    async fn save_fraud_flag(&self, flag: FraudFlag) -> StoreResult<()>;

    /// Open or resolved flag for a cheque, if any.
    async fn fraud_flag_for(&self, cheque_number: &str) -> StoreResult<Option<FraudFlag>>;

    /// Resolve a flag out of the review queue.
    ///
    /// Fails with `NotFound` when the flag does not exist.
    async fn resolve_flag(
        &self,
        flag_id: &str,
        status: ReviewStatus,
        resolved_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}
