//! Basic (presenting-bank) validation
//!
//! Structural checks over the extracted field set only. Rules are independent
//! and additive; any fail makes the cheque `validation_failed` and deep
//! verification never runs. Each rule consults the bypass policy first and
//! records an explicit auto-pass when switched off, so reports never have
//! silent holes.

use cheqflow_core::{parse_cheque_date, CheckReport, ExtractedCheque, RuleCheck};

use crate::config::BypassPolicy;

const BYPASSED: &str = "Check bypassed by policy";

pub struct BasicValidator {
    bypass: BypassPolicy,
}

impl BasicValidator {
    pub fn new(bypass: BypassPolicy) -> Self {
        Self { bypass }
    }

    pub fn validate(&self, fields: &ExtractedCheque) -> CheckReport {
        let mut report = CheckReport::new();
        report.record(self.check_mandatory_fields(fields));
        report.record(self.check_date_format(fields));
        report.record(self.check_amount_forms(fields));
        report.record(self.check_signature_presence(fields));
        report.record(self.check_micr_presence(fields));
        report
    }

    fn check_mandatory_fields(&self, fields: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "mandatory_fields";
        if self.bypass.skip_field_checks {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        let mut missing = Vec::new();
        if fields.bank_code.as_deref().map_or(true, str::is_empty) {
            missing.push("bank code");
        }
        if fields.routing_number.as_deref().map_or(true, str::is_empty) {
            missing.push("routing number");
        }
        if fields.account_number.as_deref().map_or(true, str::is_empty) {
            missing.push("account number");
        }
        if fields.cheque_number.as_deref().map_or(true, str::is_empty) {
            missing.push("cheque number");
        }
        if fields.date.as_deref().map_or(true, str::is_empty) {
            missing.push("date");
        }
        if fields.payee.as_deref().map_or(true, str::is_empty) {
            missing.push("payee");
        }
        if fields.amount_digits.is_none()
            && fields.amount_words.as_deref().map_or(true, str::is_empty)
        {
            missing.push("amount");
        }
        if !missing.is_empty() {
            return RuleCheck::fail(NAME, format!("Missing: {}", missing.join(", ")));
        }
        if fields.amount_digits.is_some_and(|a| a < 0.0) {
            return RuleCheck::fail(NAME, "Amount must be non-negative");
        }
        RuleCheck::pass(NAME, "All mandatory fields present")
    }

    fn check_date_format(&self, fields: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "date_format";
        if self.bypass.skip_date_checks {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        match fields.date.as_deref() {
            None => RuleCheck::fail(NAME, "No date extracted"),
            Some(raw) => match parse_cheque_date(raw) {
                Ok(date) => RuleCheck::pass(NAME, format!("Date parsed as {}", date)),
                Err(_) => RuleCheck::fail(NAME, format!("Unparseable date \"{}\"", raw)),
            },
        }
    }

    fn check_amount_forms(&self, fields: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "amount_forms";
        if self.bypass.skip_field_checks {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        let digits = fields.amount_digits.is_some();
        let words = fields.amount_words.as_deref().is_some_and(|w| !w.is_empty());
        match (digits, words) {
            (true, true) => RuleCheck::pass(NAME, "Amount present in digits and words"),
            (true, false) => RuleCheck::warning(NAME, "Amount in words missing"),
            (false, true) => RuleCheck::warning(NAME, "Amount in digits missing"),
            (false, false) => RuleCheck::fail(NAME, "No amount in either form"),
        }
    }

    fn check_signature_presence(&self, fields: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "signature_presence";
        if self.bypass.skip_signature_presence {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        if fields.signature_present {
            RuleCheck::pass(NAME, "Signature detected on the cheque face")
        } else {
            RuleCheck::fail(NAME, "No signature found")
        }
    }

    fn check_micr_presence(&self, fields: &ExtractedCheque) -> RuleCheck {
        const NAME: &str = "micr_presence";
        if self.bypass.skip_micr_check {
            return RuleCheck::pass(NAME, BYPASSED);
        }
        if fields.micr_line.as_deref().is_some_and(|m| !m.trim().is_empty()) {
            RuleCheck::pass(NAME, "MICR line present")
        } else {
            RuleCheck::fail(NAME, "MICR line not extractable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cheqflow_core::RuleOutcome;

    fn complete_fields() -> ExtractedCheque {
        ExtractedCheque {
            bank_code: Some("FNB".to_string()),
            routing_number: Some("440022".to_string()),
            account_number: Some("ACC-9001".to_string()),
            cheque_number: Some("000123".to_string()),
            date: Some("15032025".to_string()),
            payee: Some("Acme Supplies".to_string()),
            amount_digits: Some(1500.0),
            amount_words: Some("One thousand five hundred".to_string()),
            micr_line: Some("000123 440022 ACC-9001 00".to_string()),
            signature_present: true,
            signature_box: None,
            genai_confidence: 3.0,
            genai_flagged: false,
        }
    }

    fn validator() -> BasicValidator {
        BasicValidator::new(BypassPolicy::default())
    }

    #[test]
    fn test_complete_cheque_passes_everything() {
        let report = validator().validate(&complete_fields());
        assert!(report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.checks.len(), 5);
    }

    #[test]
    fn test_missing_fields_listed_in_detail() {
        let mut fields = complete_fields();
        fields.payee = None;
        fields.routing_number = Some(String::new());
        let report = validator().validate(&fields);
        let check = report.find("mandatory_fields").unwrap();
        assert_eq!(check.outcome, RuleOutcome::Fail);
        assert!(check.detail.contains("payee"));
        assert!(check.detail.contains("routing number"));
    }

    #[test]
    fn test_negative_amount_fails() {
        let mut fields = complete_fields();
        fields.amount_digits = Some(-5.0);
        let report = validator().validate(&fields);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_unparseable_date_fails() {
        let mut fields = complete_fields();
        fields.date = Some("soon".to_string());
        let report = validator().validate(&fields);
        let check = report.find("date_format").unwrap();
        assert_eq!(check.outcome, RuleOutcome::Fail);
    }

    #[test]
    fn test_one_amount_form_is_warning_only() {
        let mut fields = complete_fields();
        fields.amount_words = None;
        let report = validator().validate(&fields);
        assert!(report.is_valid());
        let check = report.find("amount_forms").unwrap();
        assert_eq!(check.outcome, RuleOutcome::Warning);

        let mut fields = complete_fields();
        fields.amount_digits = None;
        let report = validator().validate(&fields);
        assert!(report.is_valid());
        assert_eq!(report.find("amount_forms").unwrap().outcome, RuleOutcome::Warning);
    }

    #[test]
    fn test_missing_signature_fails() {
        let mut fields = complete_fields();
        fields.signature_present = false;
        let report = validator().validate(&fields);
        let check = report.find("signature_presence").unwrap();
        assert_eq!(check.outcome, RuleOutcome::Fail);
    }

    #[test]
    fn test_missing_micr_fails() {
        let mut fields = complete_fields();
        fields.micr_line = Some("   ".to_string());
        let report = validator().validate(&fields);
        assert_eq!(report.find("micr_presence").unwrap().outcome, RuleOutcome::Fail);
    }

    #[test]
    fn test_bypass_records_auto_pass() {
        let mut fields = complete_fields();
        fields.signature_present = false;
        fields.date = Some("garbage".to_string());
        let bypass = BypassPolicy {
            skip_signature_presence: true,
            skip_date_checks: true,
            ..Default::default()
        };
        let report = BasicValidator::new(bypass).validate(&fields);
        assert!(report.is_valid());
        assert_eq!(report.find("signature_presence").unwrap().detail, BYPASSED);
        assert_eq!(report.find("date_format").unwrap().detail, BYPASSED);
    }
}
