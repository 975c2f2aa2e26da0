//! End-to-end cheque submission example
//!
//! Drives two deposits through the full pipeline over an in-memory store and
//! mock collaborators: a routine cheque that clears, and an out-of-pattern
//! one that lands in the review queue.
//!
//! To run this example:
//! ```bash
//! cargo run --package cheqflow-runtime --example submit_cheque
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};

use cheqflow_core::{ExtractedCheque, ImagePayload};
use cheqflow_repository::{
    Account, AccountStatus, ChequeLeaf, ClearingStore, CustomerProfile, LeafState, MemoryStore,
};
use cheqflow_runtime::{
    ChequePipeline, Deposit, EngineConfig, MockFieldExtractor, MockSignatureScorer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Cheqflow Pipeline Example\n");

    let store = Arc::new(MemoryStore::new());
    seed_drawer_bank(&store).await?;

    // A routine cheque: in pattern, strong signature match
    println!("📝 Submitting a routine cheque...");
    let extraction = ExtractedCheque {
        bank_code: Some("FNB".to_string()),
        routing_number: Some("440022".to_string()),
        account_number: Some("ACC-9001".to_string()),
        cheque_number: Some("000201".to_string()),
        date: Some((Utc::now() - Duration::days(4)).format("%d%m%Y").to_string()),
        payee: Some("Harare Office Supplies".to_string()),
        amount_digits: Some(1_850.0),
        amount_words: Some("one thousand eight hundred fifty dollars".to_string()),
        micr_line: Some("000201 440022 ACC-9001 00".to_string()),
        signature_present: true,
        signature_box: None,
        genai_confidence: 4.0,
        genai_flagged: false,
    };
    let routine = ChequePipeline::new(
        store.clone(),
        Arc::new(MockFieldExtractor::with_response(extraction.clone())),
        Arc::new(MockSignatureScorer::with_confidence(93.0)),
        EngineConfig::default(),
    );
    let outcome = routine.submit(deposit()).await?;
    println!("✅ Cheque {}: {}", outcome.cheque_number, outcome.status);
    if let Some(score) = outcome.fraud_score {
        println!("   Fraud score: {:.1}", score);
    }
    for check in &outcome.report.checks {
        println!("   [{}] {} - {}", check.outcome, check.name, check.detail);
    }

    // The same drawer, but ten times the usual amount and a weak signature
    println!("\n📝 Submitting an out-of-pattern cheque...");
    let mut suspicious = extraction;
    suspicious.cheque_number = Some("000202".to_string());
    suspicious.payee = Some("Unknown Trading Ltd".to_string());
    suspicious.amount_digits = Some(48_000.0);
    suspicious.amount_words = Some("forty eight thousand dollars".to_string());
    suspicious.micr_line = Some("000202 440022 ACC-9001 00".to_string());
    let review = ChequePipeline::new(
        store.clone(),
        Arc::new(MockFieldExtractor::with_response(suspicious)),
        Arc::new(MockSignatureScorer::with_confidence(58.0)),
        EngineConfig::default(),
    );
    let outcome = review.submit(deposit()).await?;
    println!("🚩 Cheque {}: {}", outcome.cheque_number, outcome.status);
    if let Some(tier) = outcome.risk_tier {
        println!("   Risk tier: {}", tier);
    }
    if let Some(flag) = store.fraud_flag_for(&outcome.cheque_number).await? {
        println!("   Review queue entry: {} ({})", flag.id, flag.reason);
    }

    println!("\n📊 Pipeline metrics:");
    println!("   approved: {}", routine.metrics().approved.get());
    println!("   flagged:  {}", review.metrics().flagged.get());

    Ok(())
}

/// Seed the drawer bank with an account, its chequebook leaves and a light
/// transaction history.
async fn seed_drawer_bank(store: &Arc<MemoryStore>) -> Result<(), Box<dyn std::error::Error>> {
    store
        .upsert_account(Account {
            account_number: "ACC-9001".to_string(),
            routing_number: "440022".to_string(),
            bank_code: "FNB".to_string(),
            holder_name: "T. Moyo".to_string(),
            balance: 75_000.0,
            status: AccountStatus::Active,
            national_id: Some("63-123456A".to_string()),
            signature_on_file: Some(ImagePayload::new(vec![1, 2, 3], "image/png")),
            opened_at: Utc::now() - Duration::days(900),
        })
        .await?;
    for cheque_number in ["000201", "000202"] {
        store
            .upsert_leaf(ChequeLeaf {
                account_number: "ACC-9001".to_string(),
                cheque_number: cheque_number.to_string(),
                state: LeafState::Unused,
                issued_at: Utc::now() - Duration::days(60),
                used_at: None,
            })
            .await?;
    }

    // an established pattern: ~2k cheques to regular payees
    let mut profile = CustomerProfile::new("ACC-9001");
    profile.transaction_count = 14;
    profile.cheques_issued = 14;
    profile.mean_amount = 2_100.0;
    profile.variance_amount = 160_000.0;
    profile.min_amount = 1_200.0;
    profile.max_amount = 3_400.0;
    profile.active_days = (0..7).collect();
    profile.active_hours = (0..24).collect();
    profile
        .payee_counts
        .insert("Harare Office Supplies".to_string(), 9);
    profile.payee_counts.insert("City of Harare".to_string(), 5);
    profile.new_payee_rate = 14.0;
    profile.last_activity = Some(Utc::now() - Duration::days(6));
    store.save_profile(profile).await?;
    Ok(())
}

fn deposit() -> Deposit {
    Deposit {
        presenting_bank: "CBZ".to_string(),
        presenting_account: "ACC-1002".to_string(),
        image: ImagePayload::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
    }
}
