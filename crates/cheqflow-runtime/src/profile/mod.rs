//! Customer behavior statistics
//!
//! `stats` holds the pure streaming/batch math over [`CustomerProfile`]
//! (Welford updates, payee bookkeeping, batch recompute); `engine` wraps it
//! with storage and the per-account serialization the pipeline relies on.
//!
//! [`CustomerProfile`]: cheqflow_repository::CustomerProfile

pub mod engine;
pub mod stats;

pub use engine::ProfileEngine;
