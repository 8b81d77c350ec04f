use serde::{Deserialize, Serialize};

/// Pre-requisite attachment uploads are capped at 3 MB.
pub const MAX_PREREQ_ATTACHMENT_BYTES: usize = 3 * 1024 * 1024;

/// Additional (bidder-initiated) attachments are capped at 1 MB.
pub const MAX_ADDITIONAL_ATTACHMENT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Radio,
    Dropdown,
}

impl QuestionType {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "DROPDOWN" | "Dropdown" => Self::Dropdown,
            _ => Self::Radio,
        }
    }
}

/// Admin-defined qualification question for a vendor account group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub question_type: QuestionType,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub response: Option<String>,
}

impl Question {
    /// Initial answer shown before the bidder has touched the field:
    /// "Yes" for radio questions, the first option for dropdowns.
    pub fn default_response(&self) -> Option<String> {
        match self.question_type {
            QuestionType::Radio => Some("Yes".to_string()),
            QuestionType::Dropdown => self.options.first().cloned(),
        }
    }

    pub fn apply_default_response(&mut self) {
        if self.response.is_none() {
            self.response = self.default_response();
        }
    }
}

/// Admin-defined attachment requirement plus the bidder's response
/// fields. `file_url` carries the base64 payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRequirement {
    pub document_id: String,
    pub description: String,
    #[serde(default)]
    pub is_present: bool,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub reason_for_absence: Option<String>,
    pub response_description: Option<String>,
}

/// Bidder-initiated attachment beyond the admin-defined requirements.
/// Document ids are assigned sequentially (`D1`, `D2`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalAttachment {
    pub document_id: String,
    pub file_name: String,
    pub content: String,
    pub description: Option<String>,
}

/// Next sequential document id for an additional attachment.
pub fn next_document_id(existing: &[AdditionalAttachment]) -> String {
    format!("D{}", existing.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_questions_default_to_yes() {
        let q = Question {
            question_id: "Q1".to_string(),
            question_type: QuestionType::Radio,
            question_text: "ISO certified?".to_string(),
            options: vec![],
            response: None,
        };
        assert_eq!(q.default_response().as_deref(), Some("Yes"));
    }

    #[test]
    fn dropdown_questions_default_to_first_option() {
        let q = Question {
            question_id: "Q2".to_string(),
            question_type: QuestionType::Dropdown,
            question_text: "Payment terms".to_string(),
            options: vec!["Net 30".to_string(), "Net 60".to_string()],
            response: None,
        };
        assert_eq!(q.default_response().as_deref(), Some("Net 30"));
    }

    #[test]
    fn saved_response_is_not_overwritten_by_default() {
        let mut q = Question {
            question_id: "Q3".to_string(),
            question_type: QuestionType::Radio,
            question_text: "Has export license?".to_string(),
            options: vec![],
            response: Some("No".to_string()),
        };
        q.apply_default_response();
        assert_eq!(q.response.as_deref(), Some("No"));
    }

    #[test]
    fn document_ids_are_sequential() {
        let existing = vec![AdditionalAttachment {
            document_id: "D1".to_string(),
            file_name: "brochure.pdf".to_string(),
            content: String::new(),
            description: None,
        }];
        assert_eq!(next_document_id(&[]), "D1");
        assert_eq!(next_document_id(&existing), "D2");
    }
}
