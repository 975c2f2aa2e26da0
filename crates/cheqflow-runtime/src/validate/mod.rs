//! Two-phase cheque validation
//!
//! `basic` is the presenting-bank phase: structural checks over the extracted
//! field set, with no account internals in reach. `deep` is the drawer-bank
//! phase: account state, leaf state, MICR cross-check, signature scoring,
//! behavioral analysis and the final decision.

pub mod basic;
pub mod deep;

pub use basic::BasicValidator;
pub use deep::{DeepOutcome, DeepVerifier, VerificationContext};
