//! Common test utilities for pipeline integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use cheqflow_core::{Cheque, ExtractedCheque, ImagePayload};
use cheqflow_repository::{
    Account, AccountStatus, BlacklistEntry, ChequeLeaf, ClearingRecord, ClearingStore,
    CustomerProfile, FraudFlag, LeafState, MemoryStore, ReviewStatus, StoreError, StoreResult,
    TransactionRecord, VerificationRecord,
};
use cheqflow_runtime::{
    ChequePipeline, Deposit, EngineConfig, FraudScorer, MockFieldExtractor, MockSignatureScorer,
};

pub const DRAWER_ACCOUNT: &str = "ACC-9001";
pub const DRAWER_BANK: &str = "FNB";
pub const CHEQUE_NUMBER: &str = "000123";
pub const PAYEE: &str = "Acme Supplies";

/// A fully extracted, internally consistent cheque for the happy path.
pub fn extraction() -> ExtractedCheque {
    ExtractedCheque {
        bank_code: Some(DRAWER_BANK.to_string()),
        routing_number: Some("440022".to_string()),
        account_number: Some(DRAWER_ACCOUNT.to_string()),
        cheque_number: Some(CHEQUE_NUMBER.to_string()),
        // printed recently enough to stay inside the presentment window
        // whenever the test runs
        date: Some((Utc::now() - Duration::days(10)).format("%d%m%Y").to_string()),
        payee: Some(PAYEE.to_string()),
        amount_digits: Some(1500.0),
        amount_words: Some("one thousand five hundred dollars".to_string()),
        micr_line: Some(format!("{} 440022 {} 00", CHEQUE_NUMBER, DRAWER_ACCOUNT)),
        signature_present: true,
        signature_box: None,
        genai_confidence: 5.0,
        genai_flagged: false,
    }
}

pub fn deposit() -> Deposit {
    Deposit {
        presenting_bank: "CBZ".to_string(),
        presenting_account: "ACC-1002".to_string(),
        image: ImagePayload::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
    }
}

/// A profile whose day and hour coverage is total, so time-of-day rules stay
/// quiet no matter when the test runs.
pub fn round_the_clock_profile(mean: f64, variance: f64, count: u64, max: f64) -> CustomerProfile {
    let mut profile = CustomerProfile::new(DRAWER_ACCOUNT);
    profile.transaction_count = count;
    profile.cheques_issued = count;
    profile.mean_amount = mean;
    profile.variance_amount = variance;
    profile.min_amount = 500.0;
    profile.max_amount = max;
    profile.active_days = (0..7).collect();
    profile.active_hours = (0..24).collect();
    profile.payee_counts.insert(PAYEE.to_string(), count);
    profile.new_payee_rate = 10.0;
    profile.last_activity = Some(Utc::now() - Duration::days(3));
    profile
}

/// Builder over a seeded [`MemoryStore`] and mock collaborators.
pub struct TestBank {
    pub store: Arc<MemoryStore>,
    extraction: ExtractedCheque,
    signature_confidence: f64,
    signature_unavailable: bool,
    config: EngineConfig,
    fraud: Option<Arc<dyn FraudScorer>>,
}

impl TestBank {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            extraction: extraction(),
            signature_confidence: 92.0,
            signature_unavailable: false,
            config: EngineConfig::default(),
            fraud: None,
        }
    }

    pub fn with_extraction(mut self, extraction: ExtractedCheque) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_signature_confidence(mut self, confidence: f64) -> Self {
        self.signature_confidence = confidence;
        self
    }

    pub fn with_signature_unavailable(mut self) -> Self {
        self.signature_unavailable = true;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fraud_scorer(mut self, fraud: Arc<dyn FraudScorer>) -> Self {
        self.fraud = Some(fraud);
        self
    }

    /// Seed the drawer account with funds, a reference signature and an
    /// unused leaf for [`CHEQUE_NUMBER`].
    pub async fn seed_drawer(&self) {
        self.store
            .upsert_account(Account {
                account_number: DRAWER_ACCOUNT.to_string(),
                routing_number: "440022".to_string(),
                bank_code: DRAWER_BANK.to_string(),
                holder_name: "T. Moyo".to_string(),
                balance: 100_000.0,
                status: AccountStatus::Active,
                national_id: Some("63-123456A".to_string()),
                signature_on_file: Some(ImagePayload::new(vec![1, 2, 3], "image/png")),
                opened_at: Utc.with_ymd_and_hms(2020, 1, 15, 9, 0, 0).unwrap(),
            })
            .await
            .unwrap();
        self.store
            .upsert_leaf(ChequeLeaf {
                account_number: DRAWER_ACCOUNT.to_string(),
                cheque_number: CHEQUE_NUMBER.to_string(),
                state: LeafState::Unused,
                issued_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap(),
                used_at: None,
            })
            .await
            .unwrap();
    }

    pub async fn seed_profile(&self, profile: CustomerProfile) {
        self.store.save_profile(profile).await.unwrap();
    }

    pub fn build(self) -> ChequePipeline {
        let store = self.store.clone();
        self.assemble(store)
    }

    /// Build the pipeline over a custom store (the seeded `MemoryStore`
    /// stays reachable through `self.store` for assertions).
    pub fn build_over(self, store: Arc<dyn ClearingStore>) -> ChequePipeline {
        self.assemble(store)
    }

    fn assemble(self, store: Arc<dyn ClearingStore>) -> ChequePipeline {
        let extractor = Arc::new(MockFieldExtractor::with_response(self.extraction));
        let signature = if self.signature_unavailable {
            Arc::new(MockSignatureScorer::unavailable())
        } else {
            Arc::new(MockSignatureScorer::with_confidence(self.signature_confidence))
        };
        let pipeline = ChequePipeline::new(store, extractor, signature, self.config);
        match self.fraud {
            Some(fraud) => pipeline.with_fraud_scorer(fraud),
            None => pipeline,
        }
    }
}

/// Delegating store that can be told to fail specific write families, used to
/// exercise the audit-write swallow semantics.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    pub fail_verification_writes: AtomicBool,
    pub fail_flag_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_verification_writes: AtomicBool::new(false),
            fail_flag_writes: AtomicBool::new(false),
        }
    }

    fn injected(&self) -> StoreError {
        StoreError::Backend("injected failure".to_string())
    }
}

#[async_trait]
impl ClearingStore for FlakyStore {
    async fn account(&self, account_number: &str) -> StoreResult<Option<Account>> {
        self.inner.account(account_number).await
    }

    async fn upsert_account(&self, account: Account) -> StoreResult<()> {
        self.inner.upsert_account(account).await
    }

    async fn leaf(
        &self,
        account_number: &str,
        cheque_number: &str,
    ) -> StoreResult<Option<ChequeLeaf>> {
        self.inner.leaf(account_number, cheque_number).await
    }

    async fn upsert_leaf(&self, leaf: ChequeLeaf) -> StoreResult<()> {
        self.inner.upsert_leaf(leaf).await
    }

    async fn set_leaf_state(
        &self,
        account_number: &str,
        cheque_number: &str,
        state: LeafState,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner
            .set_leaf_state(account_number, cheque_number, state, at)
            .await
    }

    async fn add_blacklist_entry(&self, entry: BlacklistEntry) -> StoreResult<()> {
        self.inner.add_blacklist_entry(entry).await
    }

    async fn blacklist_match(
        &self,
        account_number: &str,
        cheque_number: &str,
        national_id: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>> {
        self.inner
            .blacklist_match(account_number, cheque_number, national_id)
            .await
    }

    async fn cheque(&self, cheque_number: &str) -> StoreResult<Option<Cheque>> {
        self.inner.cheque(cheque_number).await
    }

    async fn save_cheque(&self, cheque: Cheque) -> StoreResult<()> {
        self.inner.save_cheque(cheque).await
    }

    async fn profile(&self, account_number: &str) -> StoreResult<Option<CustomerProfile>> {
        self.inner.profile(account_number).await
    }

    async fn save_profile(&self, profile: CustomerProfile) -> StoreResult<()> {
        self.inner.save_profile(profile).await
    }

    async fn record_transaction(&self, record: TransactionRecord) -> StoreResult<()> {
        self.inner.record_transaction(record).await
    }

    async fn transactions(&self, account_number: &str) -> StoreResult<Vec<TransactionRecord>> {
        self.inner.transactions(account_number).await
    }

    async fn transactions_since(
        &self,
        account_number: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<TransactionRecord>> {
        self.inner.transactions_since(account_number, since).await
    }

    async fn clearing_record(&self, cheque_number: &str) -> StoreResult<Option<ClearingRecord>> {
        self.inner.clearing_record(cheque_number).await
    }

    async fn save_clearing_record(&self, record: ClearingRecord) -> StoreResult<()> {
        self.inner.save_clearing_record(record).await
    }

    async fn mark_clearing_responded(
        &self,
        cheque_number: &str,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner
            .mark_clearing_responded(cheque_number, responded_at)
            .await
    }

    async fn verification(&self, cheque_number: &str) -> StoreResult<Option<VerificationRecord>> {
        self.inner.verification(cheque_number).await
    }

    async fn save_verification(&self, record: VerificationRecord) -> StoreResult<()> {
        if self.fail_verification_writes.load(Ordering::SeqCst) {
            return Err(self.injected());
        }
        self.inner.save_verification(record).await
    }

    async fn save_fraud_flag(&self, flag: FraudFlag) -> StoreResult<()> {
        if self.fail_flag_writes.load(Ordering::SeqCst) {
            return Err(self.injected());
        }
        self.inner.save_fraud_flag(flag).await
    }

    async fn fraud_flag_for(&self, cheque_number: &str) -> StoreResult<Option<FraudFlag>> {
        self.inner.fraud_flag_for(cheque_number).await
    }

    async fn resolve_flag(
        &self,
        flag_id: &str,
        status: ReviewStatus,
        resolved_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner.resolve_flag(flag_id, status, resolved_at).await
    }
}
