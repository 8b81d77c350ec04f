use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transient, session-scoped sub-state layered on top of the
/// persisted RFQ status. Resets to `Creating` on view teardown and on
/// every fresh load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Creating,
    Editing,
    Preview,
    Submitting,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Creating
    }
}

/// Which locked section a revision unlocks on a submitted or drafted
/// quotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviseTarget {
    Prerequisites,
    Quotation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    PreRequisite,
    CreateQuotation,
    AwardedResults,
    RejectedResults,
    Preview,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        Self::PreRequisite,
        Self::CreateQuotation,
        Self::AwardedResults,
        Self::RejectedResults,
        Self::Preview,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ButtonKey {
    Accept,
    Reject,
    Confirm,
    Submit,
    Draft,
    FinalSubmit,
    FinalDraft,
    RevisePreRequisite,
    ReviseQuotation,
    UpdatePreRequisite,
    UpdateQuotation,
    AddCharge,
    DeleteCharge,
}

impl ButtonKey {
    pub const ALL: [ButtonKey; 13] = [
        Self::Accept,
        Self::Reject,
        Self::Confirm,
        Self::Submit,
        Self::Draft,
        Self::FinalSubmit,
        Self::FinalDraft,
        Self::RevisePreRequisite,
        Self::ReviseQuotation,
        Self::UpdatePreRequisite,
        Self::UpdateQuotation,
        Self::AddCharge,
        Self::DeleteCharge,
    ];
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flags {
    pub visible: bool,
    pub enabled: bool,
}

impl Flags {
    pub const ON: Flags = Flags {
        visible: true,
        enabled: true,
    };

    pub const VISIBLE_ONLY: Flags = Flags {
        visible: true,
        enabled: false,
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Submission {
    pub state: SubmissionState,
    pub is_submitting: bool,
}

/// Derived screen affordances. A cache, never a source of truth:
/// every flag is zeroed before a recompute so nothing survives a
/// status transition.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UiState {
    pub sections: BTreeMap<SectionKey, Flags>,
    pub buttons: BTreeMap<ButtonKey, Flags>,
    pub submission: Submission,
}

impl UiState {
    /// All flags off, every key present.
    pub fn cleared(submission: Submission) -> Self {
        let sections = SectionKey::ALL
            .into_iter()
            .map(|k| (k, Flags::default()))
            .collect();
        let buttons = ButtonKey::ALL
            .into_iter()
            .map(|k| (k, Flags::default()))
            .collect();
        Self {
            sections,
            buttons,
            submission,
        }
    }

    pub fn set_section(&mut self, key: SectionKey, flags: Flags) {
        self.sections.insert(key, flags);
    }

    pub fn set_button(&mut self, key: ButtonKey, flags: Flags) {
        self.buttons.insert(key, flags);
    }

    pub fn section(&self, key: SectionKey) -> Flags {
        self.sections.get(&key).copied().unwrap_or_default()
    }

    pub fn button(&self, key: ButtonKey) -> Flags {
        self.buttons.get(&key).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_state_has_every_key_off() {
        let ui = UiState::cleared(Submission::default());
        assert_eq!(ui.sections.len(), SectionKey::ALL.len());
        assert_eq!(ui.buttons.len(), ButtonKey::ALL.len());
        assert!(ui.sections.values().all(|f| !f.visible && !f.enabled));
        assert!(ui.buttons.values().all(|f| !f.visible && !f.enabled));
        assert_eq!(ui.submission.state, SubmissionState::Creating);
        assert!(!ui.submission.is_submitting);
    }

    #[test]
    fn keys_serialize_in_camel_case() {
        let mut ui = UiState::cleared(Submission::default());
        ui.set_button(ButtonKey::FinalSubmit, Flags::ON);
        let json = serde_json::to_value(&ui).expect("serialize");
        assert_eq!(json["buttons"]["finalSubmit"]["visible"], true);
        assert_eq!(json["sections"]["preRequisite"]["visible"], false);
    }
}
