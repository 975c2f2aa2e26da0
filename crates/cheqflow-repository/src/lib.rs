//! Persistence layer for the Cheqflow clearing pipeline
//!
//! This crate defines the typed records the pipeline persists and the
//! [`ClearingStore`] trait through which it reads and writes them. Rows
//! cross the persistence edge as explicit typed structs; nothing
//! loosely-typed ever reaches the scoring logic.
//!
//! # Quick Start
//!
//! ```no_run
//! use cheqflow_repository::{ClearingStore, MemoryStore};
//! use cheqflow_repository::models::{Account, AccountStatus};
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryStore::new();
//!
//!     store
//!         .upsert_account(Account {
//!             account_number: "ACC-9001".to_string(),
//!             routing_number: "440022".to_string(),
//!             bank_code: "FNB".to_string(),
//!             holder_name: "R. Moyo".to_string(),
//!             balance: 52_000.0,
//!             status: AccountStatus::Active,
//!             national_id: None,
//!             signature_on_file: None,
//!             opened_at: Utc::now(),
//!         })
//!         .await?;
//!
//!     let account = store.account("ACC-9001").await?;
//!     assert!(account.is_some());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │          Pipeline Runtime              │
//! │  (validators, router, profile engine)  │
//! └──────────────┬─────────────────────────┘
//!                │ ClearingStore trait
//!                ↓
//! ┌────────────────────────────────────────┐
//! │   Typed records (models module)        │
//! │   Account / ChequeLeaf / Blacklist     │
//! │   CustomerProfile / TransactionRecord  │
//! │   ClearingRecord / VerificationRecord  │
//! │   FraudFlag                            │
//! └──────────────┬─────────────────────────┘
//!                ↓
//! ┌────────────────────────────────────────┐
//! │   MemoryStore (reference backend)      │
//! └────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod traits;

// Re-exports - Error
pub use error::{StoreError, StoreResult};

// Re-exports - Store
pub use memory::MemoryStore;
pub use models::*;
pub use traits::ClearingStore;
