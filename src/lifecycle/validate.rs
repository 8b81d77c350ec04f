//! Local validators.
//!
//! Both validators collect every applicable violation rather than
//! stopping at the first, so the caller can surface the full list in
//! one response. A non-empty result blocks the action before any
//! remote call is issued.

use chrono::{DateTime, Utc};

use crate::domain::{AttachmentRequirement, Question, WorkItem};
use rust_decimal::Decimal;

pub const DEADLINE_PASSED_MSG: &str = "Cannot submit after the deadline has passed";
pub const NO_PREREQUISITES_MSG: &str =
    "No pre-requisite questions or attachments are configured for this account group";
pub const NO_QUESTIONS_MSG: &str =
    "No pre-requisite questions are configured for this account group";
pub const NO_ATTACHMENTS_MSG: &str =
    "No pre-requisite attachments are configured for this account group";

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Validate the pre-requisite questionnaire and attachment responses.
pub fn validate_prerequisites(
    questions: &[Question],
    attachments: &[AttachmentRequirement],
) -> Vec<String> {
    // Admin misconfiguration is reported distinctly from incomplete
    // bidder responses.
    if questions.is_empty() && attachments.is_empty() {
        return vec![NO_PREREQUISITES_MSG.to_string()];
    }

    let mut violations = Vec::new();

    for question in questions {
        if !present(&question.response) {
            violations.push(format!(
                "Response is missing for question: {}",
                question.question_text
            ));
        }
    }

    for attachment in attachments {
        let has_file = attachment.is_present;
        let has_file_fields = present(&attachment.file_name) && present(&attachment.file_url);
        let has_reason = present(&attachment.reason_for_absence);
        let has_description = present(&attachment.response_description);
        let label = &attachment.description;

        if !has_file && !has_reason && !has_description {
            violations.push(format!(
                "No file, reason, or description provided for: {label}"
            ));
        } else if !has_file && !has_reason {
            violations.push(format!("Please provide a file or reason for: {label}"));
        } else if !has_description {
            violations.push(format!("Description is missing for: {label}"));
        } else if has_file && !has_file_fields {
            violations.push(format!(
                "Missing required fields for {label}: File Name, File URL"
            ));
        }
    }

    violations
}

/// Validate the quotation lines ahead of submit, draft, or preview.
/// The deadline violation carries its own message so callers can map
/// it onto the deadline-specific error.
pub fn validate_quotation(
    items: &[WorkItem],
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut violations = Vec::new();

    if now >= deadline {
        violations.push(DEADLINE_PASSED_MSG.to_string());
    }

    let invalid: Vec<&str> = items
        .iter()
        .filter(|item| !item.net_price.is_some_and(|p| p > Decimal::ZERO))
        .map(|item| item.item_number.as_str())
        .collect();

    if !invalid.is_empty() {
        violations.push(format!(
            "Please enter valid net prices for items: {}",
            invalid.join(", ")
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionType;
    use chrono::Duration;

    fn question(id: &str, response: Option<&str>) -> Question {
        Question {
            question_id: id.to_string(),
            question_type: QuestionType::Radio,
            question_text: format!("Question {id}"),
            options: vec![],
            response: response.map(str::to_string),
        }
    }

    fn attachment(desc: &str) -> AttachmentRequirement {
        AttachmentRequirement {
            document_id: "DOC1".to_string(),
            description: desc.to_string(),
            is_present: false,
            file_name: None,
            file_url: None,
            reason_for_absence: None,
            response_description: None,
        }
    }

    fn priced_item(number: &str, price: Option<Decimal>) -> WorkItem {
        WorkItem {
            item_number: number.to_string(),
            material_no: format!("MAT-{number}"),
            material_desc: None,
            quantity: Decimal::ONE,
            uom: None,
            plant: None,
            net_price: price,
            net_worth: price.unwrap_or_default(),
            delivery_date: None,
            expected_delivery_date: None,
        }
    }

    #[test]
    fn empty_configuration_is_a_distinct_combined_violation() {
        let violations = validate_prerequisites(&[], &[]);
        assert_eq!(violations, vec![NO_PREREQUISITES_MSG.to_string()]);
    }

    #[test]
    fn complete_responses_pass() {
        let questions = vec![question("Q1", Some("Yes"))];
        let mut att = attachment("Tax certificate");
        att.is_present = true;
        att.file_name = Some("tax.pdf".to_string());
        att.file_url = Some("ZGF0YQ==".to_string());
        att.response_description = Some("FY 2025 certificate".to_string());
        assert!(validate_prerequisites(&questions, &[att]).is_empty());
    }

    #[test]
    fn all_violations_are_collected() {
        let questions = vec![question("Q1", None), question("Q2", Some("No"))];
        let attachments = vec![attachment("Tax certificate"), attachment("ISO certificate")];
        let violations = validate_prerequisites(&questions, &attachments);
        assert_eq!(violations.len(), 3);
        assert!(violations[0].contains("Question Q1"));
        assert!(violations[1].contains("Tax certificate"));
        assert!(violations[2].contains("ISO certificate"));
    }

    #[test]
    fn attachment_cases_produce_their_specific_messages() {
        let mut nothing = attachment("A");
        nothing.description = "Insurance".to_string();

        let mut no_file_or_reason = attachment("B");
        no_file_or_reason.description = "License".to_string();
        no_file_or_reason.response_description = Some("will follow".to_string());

        let mut no_description = attachment("C");
        no_description.description = "Registration".to_string();
        no_description.reason_for_absence = Some("not applicable".to_string());

        let mut file_without_fields = attachment("D");
        file_without_fields.description = "Balance sheet".to_string();
        file_without_fields.is_present = true;
        file_without_fields.response_description = Some("2025 figures".to_string());

        let violations = validate_prerequisites(
            &[],
            &[nothing, no_file_or_reason, no_description, file_without_fields],
        );
        assert_eq!(
            violations,
            vec![
                "No file, reason, or description provided for: Insurance".to_string(),
                "Please provide a file or reason for: License".to_string(),
                "Description is missing for: Registration".to_string(),
                "Missing required fields for Balance sheet: File Name, File URL".to_string(),
            ]
        );
    }

    #[test]
    fn quotation_fails_past_deadline_regardless_of_prices() {
        let now = Utc::now();
        let items = vec![priced_item("10", Some(Decimal::from(100)))];
        let violations = validate_quotation(&items, now - Duration::hours(1), now);
        assert_eq!(violations, vec![DEADLINE_PASSED_MSG.to_string()]);
    }

    #[test]
    fn quotation_reports_offending_item_numbers() {
        let now = Utc::now();
        let items = vec![
            priced_item("10", Some(Decimal::from(100))),
            priced_item("20", Some(Decimal::ZERO)),
            priced_item("30", None),
        ];
        let violations = validate_quotation(&items, now + Duration::hours(1), now);
        assert_eq!(
            violations,
            vec!["Please enter valid net prices for items: 20, 30".to_string()]
        );
    }

    #[test]
    fn fully_priced_quotation_before_deadline_passes() {
        let now = Utc::now();
        let items = vec![priced_item("10", Some(Decimal::from(100)))];
        assert!(validate_quotation(&items, now + Duration::hours(1), now).is_empty());
    }
}
