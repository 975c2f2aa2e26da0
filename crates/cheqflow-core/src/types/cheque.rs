//! Cheque, lifecycle status and extracted field sets
//!
//! The `ChequeStatus` state machine is the authoritative sequencing point of
//! the whole pipeline: every stage completes by advancing the status along a
//! fixed directed graph, and no transition may revisit an earlier stage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Lifecycle status of a cheque as it moves through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeStatus {
    /// Deposited at the presenting bank, nothing checked yet
    Received,
    /// Passed basic (presenting-bank) validation
    Validated,
    /// Failed basic validation; terminal
    ValidationFailed,
    /// Handed to the central clearing router
    Clearing,
    /// Arrived at the drawer bank for deep verification
    AtDrawerBank,
    /// Deep verification approved the cheque
    Approved,
    /// Deep verification (or a supervisor) rejected the cheque
    Rejected,
    /// Flagged for human review
    Flagged,
    /// Funds moved; administrative terminal
    Settled,
    /// Returned unpaid; administrative terminal
    Bounced,
}

impl ChequeStatus {
    /// Whether `next` is a legal forward transition from this status.
    pub fn can_advance_to(self, next: ChequeStatus) -> bool {
        use ChequeStatus::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, ValidationFailed)
                | (Validated, Clearing)
                | (Clearing, AtDrawerBank)
                | (AtDrawerBank, Approved)
                | (AtDrawerBank, Rejected)
                | (AtDrawerBank, Flagged)
                | (Flagged, Approved)
                | (Flagged, Rejected)
                | (Approved, Settled)
                | (Approved, Bounced)
        )
    }

    /// Terminal for resubmission purposes: the pipeline never re-processes a
    /// cheque in one of these states. `approved` still admits the
    /// administrative settle/bounce extension.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChequeStatus::ValidationFailed
                | ChequeStatus::Approved
                | ChequeStatus::Rejected
                | ChequeStatus::Settled
                | ChequeStatus::Bounced
        )
    }

    /// True once no further transition of any kind is allowed.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ChequeStatus::ValidationFailed
                | ChequeStatus::Rejected
                | ChequeStatus::Settled
                | ChequeStatus::Bounced
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChequeStatus::Received => "received",
            ChequeStatus::Validated => "validated",
            ChequeStatus::ValidationFailed => "validation_failed",
            ChequeStatus::Clearing => "clearing",
            ChequeStatus::AtDrawerBank => "at_drawer_bank",
            ChequeStatus::Approved => "approved",
            ChequeStatus::Rejected => "rejected",
            ChequeStatus::Flagged => "flagged",
            ChequeStatus::Settled => "settled",
            ChequeStatus::Bounced => "bounced",
        }
    }
}

impl fmt::Display for ChequeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cheque as tracked by the pipeline.
///
/// Created when a deposit arrives at the presenting bank and mutated by every
/// stage; the identity is the cheque number, unique per drawer-bank
/// instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cheque {
    pub cheque_number: String,
    pub drawer_account: String,
    pub drawer_bank: String,
    pub presenting_account: Option<String>,
    pub presenting_bank: Option<String>,
    pub payee: String,
    /// Non-negative face amount
    pub amount: f64,
    /// Date written on the cheque; `None` when extraction could not read it
    pub issue_date: Option<NaiveDate>,
    /// Raw MICR line as extracted from the image
    pub micr_line: Option<String>,
    pub front_image_ref: Option<String>,
    pub back_image_ref: Option<String>,
    pub status: ChequeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cheque {
    /// Advance the lifecycle status, enforcing the transition graph.
    pub fn advance(&mut self, next: ChequeStatus) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Bounding box of a detected region within a cheque image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Raw image handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Field set produced by the field-extraction collaborator.
///
/// Everything the presenting bank knows about a deposited cheque before any
/// account internals are consulted. All fields are optional because
/// extraction is best-effort; the basic validator decides what is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCheque {
    pub bank_code: Option<String>,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub cheque_number: Option<String>,
    /// Date exactly as printed, e.g. `15032025` or `2025-03-15`
    pub date: Option<String>,
    pub payee: Option<String>,
    pub amount_digits: Option<f64>,
    pub amount_words: Option<String>,
    pub micr_line: Option<String>,
    pub signature_present: bool,
    pub signature_box: Option<BoundingBox>,
    /// Confidence 0-100 that the image is AI-generated
    pub genai_confidence: f64,
    pub genai_flagged: bool,
}

/// Parse a cheque date: an 8-digit day-month-year token (`DDMMYYYY`) or one
/// of the common generic date formats.
pub fn parse_cheque_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.len() == 8 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d%m%Y") {
            return Ok(date);
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(CoreError::UnparseableDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cheque() -> Cheque {
        Cheque {
            cheque_number: "000123".to_string(),
            drawer_account: "ACC-9001".to_string(),
            drawer_bank: "FNB".to_string(),
            presenting_account: Some("ACC-1002".to_string()),
            presenting_bank: Some("CBZ".to_string()),
            payee: "Acme Supplies".to_string(),
            amount: 1500.0,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 15),
            micr_line: Some("000123 440022 ACC-9001 00".to_string()),
            front_image_ref: Some("img/front/000123.png".to_string()),
            back_image_ref: None,
            status: ChequeStatus::Received,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_forward_path_advances() {
        let mut cheque = sample_cheque();
        for next in [
            ChequeStatus::Validated,
            ChequeStatus::Clearing,
            ChequeStatus::AtDrawerBank,
            ChequeStatus::Approved,
            ChequeStatus::Settled,
        ] {
            cheque.advance(next).unwrap();
            assert_eq!(cheque.status, next);
        }
    }

    #[test]
    fn test_cannot_revisit_earlier_stage() {
        let mut cheque = sample_cheque();
        cheque.advance(ChequeStatus::Validated).unwrap();
        cheque.advance(ChequeStatus::Clearing).unwrap();
        let err = cheque.advance(ChequeStatus::Received).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(cheque.status, ChequeStatus::Clearing);
    }

    #[test]
    fn test_validation_failed_is_dead_end() {
        let mut cheque = sample_cheque();
        cheque.advance(ChequeStatus::ValidationFailed).unwrap();
        for next in [
            ChequeStatus::Validated,
            ChequeStatus::Clearing,
            ChequeStatus::Approved,
            ChequeStatus::Settled,
        ] {
            assert!(cheque.advance(next).is_err());
        }
    }

    #[test]
    fn test_flagged_resolves_to_approved_or_rejected() {
        assert!(ChequeStatus::Flagged.can_advance_to(ChequeStatus::Approved));
        assert!(ChequeStatus::Flagged.can_advance_to(ChequeStatus::Rejected));
        assert!(!ChequeStatus::Flagged.can_advance_to(ChequeStatus::Settled));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ChequeStatus::ValidationFailed.is_terminal());
        assert!(ChequeStatus::Approved.is_terminal());
        assert!(ChequeStatus::Rejected.is_terminal());
        assert!(ChequeStatus::Settled.is_terminal());
        assert!(ChequeStatus::Bounced.is_terminal());
        assert!(!ChequeStatus::Flagged.is_terminal());
        assert!(!ChequeStatus::AtDrawerBank.is_terminal());
    }

    #[test]
    fn test_approved_is_terminal_but_not_final() {
        assert!(ChequeStatus::Approved.is_terminal());
        assert!(!ChequeStatus::Approved.is_final());
        assert!(ChequeStatus::Settled.is_final());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ChequeStatus::AtDrawerBank).unwrap();
        assert_eq!(json, "\"at_drawer_bank\"");
        assert_eq!(ChequeStatus::ValidationFailed.to_string(), "validation_failed");
    }

    #[test]
    fn test_parse_eight_digit_date() {
        let date = parse_cheque_date("15032025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn test_parse_generic_dates() {
        assert_eq!(
            parse_cheque_date("2025-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            parse_cheque_date("15/03/2025").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            parse_cheque_date(" 15-03-2025 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_cheque_date("not a date").is_err());
        assert!(parse_cheque_date("99999999").is_err());
        assert!(parse_cheque_date("").is_err());
    }
}
