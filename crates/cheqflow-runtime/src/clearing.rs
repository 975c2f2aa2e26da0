//! Central clearing router
//!
//! Issues the clearing reference for an inter-bank presentment and runs the
//! clearing-house screens: blacklist, duplicate presentment and stop-payment.
//! Screens never decide anything here; hits are recorded on the clearing
//! record as back-references and folded into the drawer bank's deep
//! verification.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cheqflow_core::Cheque;
use cheqflow_repository::{ClearingRecord, ClearingStore, LeafState};

use crate::error::Result;

pub struct ClearingRouter {
    store: Arc<dyn ClearingStore>,
}

impl ClearingRouter {
    pub fn new(store: Arc<dyn ClearingStore>) -> Self {
        Self { store }
    }

    /// Forward a validated cheque to the drawer bank, screening it on the way.
    pub async fn route(&self, cheque: &Cheque) -> Result<ClearingRecord> {
        let clearing_ref = format!("CLR-{}", Uuid::new_v4().simple());

        let account = self.store.account(&cheque.drawer_account).await?;
        let national_id = account.as_ref().and_then(|a| a.national_id.as_deref());

        let blacklist_hit = self
            .store
            .blacklist_match(&cheque.drawer_account, &cheque.cheque_number, national_id)
            .await?
            .map(|entry| entry.id);

        let duplicate_of = self
            .store
            .clearing_record(&cheque.cheque_number)
            .await?
            .map(|prior| prior.clearing_ref);

        let stop_payment = match self
            .store
            .leaf(&cheque.drawer_account, &cheque.cheque_number)
            .await?
        {
            Some(leaf) if leaf.state == LeafState::Stopped => {
                Some(format!("{}/{}", leaf.account_number, leaf.cheque_number))
            }
            _ => None,
        };

        let record = ClearingRecord {
            clearing_ref,
            cheque_number: cheque.cheque_number.clone(),
            presenting_bank: cheque.presenting_bank.clone().unwrap_or_default(),
            drawer_bank: cheque.drawer_bank.clone(),
            blacklist_hit,
            duplicate_of,
            stop_payment,
            forwarded_at: Utc::now(),
            responded_at: None,
        };
        self.store.save_clearing_record(record.clone()).await?;
        tracing::info!(
            cheque = %cheque.cheque_number,
            clearing_ref = %record.clearing_ref,
            hits = record.has_hits(),
            "cheque routed through clearing"
        );
        Ok(record)
    }
}
