//! Integration tests for the in-memory store backend

use chrono::{Duration, Utc};

use cheqflow_core::{CheckReport, RiskTier, RuleCheck};
use cheqflow_repository::models::{
    Account, AccountStatus, BlacklistEntry, BlacklistKind, ChequeLeaf, ClearingRecord, FraudFlag,
    LeafState, ReviewStatus, TransactionRecord, VerificationRecord,
};
use cheqflow_repository::{ClearingStore, MemoryStore, StoreError};

fn sample_account(number: &str, national_id: Option<&str>) -> Account {
    Account {
        account_number: number.to_string(),
        routing_number: "440022".to_string(),
        bank_code: "FNB".to_string(),
        holder_name: "T. Ncube".to_string(),
        balance: 25_000.0,
        status: AccountStatus::Active,
        national_id: national_id.map(str::to_string),
        signature_on_file: None,
        opened_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_leaf_lifecycle() {
    let store = MemoryStore::new();
    store
        .upsert_leaf(ChequeLeaf {
            account_number: "ACC-1".to_string(),
            cheque_number: "000123".to_string(),
            state: LeafState::Unused,
            issued_at: Utc::now(),
            used_at: None,
        })
        .await
        .unwrap();

    let used_at = Utc::now();
    store
        .set_leaf_state("ACC-1", "000123", LeafState::Used, used_at)
        .await
        .unwrap();

    let leaf = store.leaf("ACC-1", "000123").await.unwrap().unwrap();
    assert_eq!(leaf.state, LeafState::Used);
    assert_eq!(leaf.used_at, Some(used_at));
}

#[tokio::test]
async fn test_blacklist_matches_all_three_kinds() {
    let store = MemoryStore::new();
    store.upsert_account(sample_account("ACC-1", Some("63-555A"))).await.unwrap();
    for (id, kind, value) in [
        ("BL-1", BlacklistKind::AccountNumber, "ACC-1"),
        ("BL-2", BlacklistKind::ChequeNumber, "000777"),
        ("BL-3", BlacklistKind::NationalId, "63-555A"),
    ] {
        store
            .add_blacklist_entry(BlacklistEntry {
                id: id.to_string(),
                kind,
                value: value.to_string(),
                reason: "test".to_string(),
                listed_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    let by_account = store.blacklist_match("ACC-1", "000001", None).await.unwrap();
    assert_eq!(by_account.unwrap().id, "BL-1");

    let by_cheque = store.blacklist_match("ACC-9", "000777", None).await.unwrap();
    assert_eq!(by_cheque.unwrap().id, "BL-2");

    let by_national_id = store
        .blacklist_match("ACC-9", "000001", Some("63-555A"))
        .await
        .unwrap();
    assert_eq!(by_national_id.unwrap().id, "BL-3");

    let clean = store.blacklist_match("ACC-9", "000001", None).await.unwrap();
    assert!(clean.is_none());
}

#[tokio::test]
async fn test_transactions_since_filters_window() {
    let store = MemoryStore::new();
    let now = Utc::now();
    for hours_ago in [50i64, 30, 10, 2] {
        store
            .record_transaction(TransactionRecord {
                account_number: "ACC-1".to_string(),
                cheque_number: None,
                amount: 100.0,
                payee: "Acme".to_string(),
                occurred_at: now - Duration::hours(hours_ago),
            })
            .await
            .unwrap();
    }
    // Unrelated account should not leak in.
    store
        .record_transaction(TransactionRecord {
            account_number: "ACC-2".to_string(),
            cheque_number: None,
            amount: 999.0,
            payee: "Other".to_string(),
            occurred_at: now - Duration::hours(1),
        })
        .await
        .unwrap();

    let recent = store
        .transactions_since("ACC-1", now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|r| r.account_number == "ACC-1"));
}

#[tokio::test]
async fn test_clearing_response_stamp() {
    let store = MemoryStore::new();
    store
        .save_clearing_record(ClearingRecord {
            clearing_ref: "CLR-abc".to_string(),
            cheque_number: "000123".to_string(),
            presenting_bank: "CBZ".to_string(),
            drawer_bank: "FNB".to_string(),
            blacklist_hit: None,
            duplicate_of: None,
            stop_payment: None,
            forwarded_at: Utc::now(),
            responded_at: None,
        })
        .await
        .unwrap();

    let responded_at = Utc::now();
    store
        .mark_clearing_responded("000123", responded_at)
        .await
        .unwrap();
    let record = store.clearing_record("000123").await.unwrap().unwrap();
    assert_eq!(record.responded_at, Some(responded_at));

    let missing = store
        .mark_clearing_responded("999999", responded_at)
        .await
        .unwrap_err();
    assert!(matches!(missing, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_fraud_flag_resolution() {
    let store = MemoryStore::new();
    store
        .save_fraud_flag(FraudFlag {
            id: "FLAG-1".to_string(),
            cheque_number: "000123".to_string(),
            priority: RiskTier::High,
            reason: "Signature review needed".to_string(),
            review_status: ReviewStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        })
        .await
        .unwrap();

    let pending = store.fraud_flag_for("000123").await.unwrap().unwrap();
    assert_eq!(pending.review_status, ReviewStatus::Pending);

    let resolved_at = Utc::now();
    store
        .resolve_flag("FLAG-1", ReviewStatus::Cleared, resolved_at)
        .await
        .unwrap();
    let cleared = store.fraud_flag_for("000123").await.unwrap().unwrap();
    assert_eq!(cleared.review_status, ReviewStatus::Cleared);
    assert_eq!(cleared.resolved_at, Some(resolved_at));
}

#[tokio::test]
async fn test_verification_record_round_trip() {
    let store = MemoryStore::new();
    let mut basic = CheckReport::new();
    basic.record(RuleCheck::pass("mandatory_fields", "All present"));
    let mut record = VerificationRecord::for_cheque("000123", basic);
    record.notes.push("presented at CBZ branch 14".to_string());

    store.save_verification(record.clone()).await.unwrap();
    let loaded = store.verification("000123").await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert!(store.verification("999999").await.unwrap().is_none());
}
