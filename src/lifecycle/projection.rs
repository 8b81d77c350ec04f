//! UI-state projection.
//!
//! `compute_ui_state` is the single place screen affordances are
//! derived. It is pure: same inputs, same output, and every flag is
//! zeroed before the rules for the current status are applied.

use crate::domain::{
    ButtonKey, Flags, ReviseTarget, RfqStatus, SectionKey, Submission, SubmissionState, UiState,
    WorkHeader,
};

pub fn compute_ui_state(
    status: RfqStatus,
    work_header: &WorkHeader,
    submission: Submission,
    edit_target: Option<ReviseTarget>,
) -> UiState {
    let mut ui = UiState::cleared(submission);
    let completed = work_header.prerequisites_completed();

    match status {
        RfqStatus::Pending => {
            ui.set_button(ButtonKey::Accept, Flags::ON);
            ui.set_button(ButtonKey::Reject, Flags::ON);
        }

        RfqStatus::NotAccepted => {
            ui.set_button(ButtonKey::Accept, Flags::VISIBLE_ONLY);
        }

        RfqStatus::Accepted => {
            ui.set_section(SectionKey::PreRequisite, Flags::ON);
            if !completed {
                ui.set_button(ButtonKey::Confirm, Flags::ON);
            } else {
                ui.set_section(SectionKey::CreateQuotation, Flags::ON);
                match submission.state {
                    SubmissionState::Preview | SubmissionState::Submitting => {
                        let actionable = Flags {
                            visible: true,
                            enabled: !submission.is_submitting,
                        };
                        ui.set_section(SectionKey::Preview, Flags::ON);
                        ui.set_button(ButtonKey::FinalSubmit, actionable);
                        ui.set_button(ButtonKey::FinalDraft, actionable);
                    }
                    SubmissionState::Creating | SubmissionState::Editing => {
                        ui.set_button(ButtonKey::Submit, Flags::ON);
                        ui.set_button(ButtonKey::Draft, Flags::ON);
                        ui.set_button(ButtonKey::AddCharge, Flags::ON);
                        ui.set_button(ButtonKey::DeleteCharge, Flags::ON);
                    }
                }
            }
        }

        RfqStatus::Submitted => {
            ui.set_section(SectionKey::PreRequisite, Flags::VISIBLE_ONLY);
            ui.set_section(SectionKey::CreateQuotation, Flags::VISIBLE_ONLY);
            ui.set_button(ButtonKey::RevisePreRequisite, Flags::ON);
            ui.set_button(ButtonKey::ReviseQuotation, Flags::ON);
            if submission.state == SubmissionState::Editing {
                match edit_target {
                    Some(ReviseTarget::Prerequisites) => {
                        ui.set_section(SectionKey::PreRequisite, Flags::ON);
                        ui.set_button(ButtonKey::UpdatePreRequisite, Flags::ON);
                    }
                    Some(ReviseTarget::Quotation) => {
                        ui.set_section(SectionKey::CreateQuotation, Flags::ON);
                        ui.set_button(ButtonKey::UpdateQuotation, Flags::ON);
                        ui.set_button(ButtonKey::AddCharge, Flags::ON);
                        ui.set_button(ButtonKey::DeleteCharge, Flags::ON);
                    }
                    None => {}
                }
            }
        }

        RfqStatus::Draft => {
            ui.set_section(
                SectionKey::PreRequisite,
                Flags {
                    visible: true,
                    enabled: !completed,
                },
            );
            ui.set_section(
                SectionKey::CreateQuotation,
                Flags {
                    visible: true,
                    enabled: completed && submission.state != SubmissionState::Preview,
                },
            );
            ui.set_section(SectionKey::Preview, Flags::ON);
            ui.set_button(ButtonKey::RevisePreRequisite, Flags::ON);
            ui.set_button(ButtonKey::ReviseQuotation, Flags::ON);
            match submission.state {
                SubmissionState::Editing => {
                    ui.set_button(ButtonKey::Submit, Flags::ON);
                    ui.set_button(ButtonKey::Draft, Flags::ON);
                    if edit_target == Some(ReviseTarget::Prerequisites) {
                        ui.set_button(ButtonKey::UpdatePreRequisite, Flags::ON);
                    }
                }
                _ => {
                    let actionable = Flags {
                        visible: true,
                        enabled: !submission.is_submitting,
                    };
                    ui.set_button(ButtonKey::FinalSubmit, actionable);
                    ui.set_button(ButtonKey::FinalDraft, actionable);
                }
            }
        }

        RfqStatus::Awarded => {
            ui.set_section(SectionKey::PreRequisite, Flags::VISIBLE_ONLY);
            ui.set_section(
                SectionKey::CreateQuotation,
                Flags {
                    visible: true,
                    enabled: completed,
                },
            );
            ui.set_section(SectionKey::AwardedResults, Flags::ON);
        }

        RfqStatus::Rejected => {
            ui.set_section(SectionKey::PreRequisite, Flags::VISIBLE_ONLY);
            ui.set_section(SectionKey::CreateQuotation, Flags::VISIBLE_ONLY);
            ui.set_section(SectionKey::RejectedResults, Flags::ON);
        }
    }

    ui
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PrereqStatus;

    fn header(response: PrereqStatus, attachment: PrereqStatus) -> WorkHeader {
        WorkHeader {
            rfq_number: "4500000001".to_string(),
            bidder: "0000100001".to_string(),
            response_status: response,
            attachment_status: attachment,
            ..WorkHeader::default()
        }
    }

    fn creating() -> Submission {
        Submission::default()
    }

    #[test]
    fn pending_shows_only_accept_and_reject() {
        let ui = compute_ui_state(
            RfqStatus::Pending,
            &header(PrereqStatus::Pending, PrereqStatus::Pending),
            creating(),
            None,
        );
        assert_eq!(ui.button(ButtonKey::Accept), Flags::ON);
        assert_eq!(ui.button(ButtonKey::Reject), Flags::ON);
        for key in ButtonKey::ALL {
            if !matches!(key, ButtonKey::Accept | ButtonKey::Reject) {
                assert_eq!(ui.button(key), Flags::default(), "{key:?} should be off");
            }
        }
        for key in SectionKey::ALL {
            assert_eq!(ui.section(key), Flags::default(), "{key:?} should be off");
        }
    }

    #[test]
    fn accepted_without_prereqs_shows_confirm_only() {
        let ui = compute_ui_state(
            RfqStatus::Accepted,
            &header(PrereqStatus::Pending, PrereqStatus::Pending),
            creating(),
            None,
        );
        assert_eq!(ui.section(SectionKey::PreRequisite), Flags::ON);
        assert_eq!(ui.button(ButtonKey::Confirm), Flags::ON);
        assert!(!ui.section(SectionKey::CreateQuotation).visible);
        assert!(!ui.button(ButtonKey::Submit).visible);
    }

    #[test]
    fn accepted_with_prereqs_complete_unlocks_quotation() {
        let ui = compute_ui_state(
            RfqStatus::Accepted,
            &header(PrereqStatus::Completed, PrereqStatus::Completed),
            creating(),
            None,
        );
        assert_eq!(ui.section(SectionKey::CreateQuotation), Flags::ON);
        assert_eq!(ui.button(ButtonKey::Submit), Flags::ON);
        assert_eq!(ui.button(ButtonKey::Draft), Flags::ON);
        assert_eq!(ui.button(ButtonKey::AddCharge), Flags::ON);
        assert!(!ui.button(ButtonKey::Confirm).visible);
        assert!(!ui.button(ButtonKey::FinalSubmit).visible);
    }

    #[test]
    fn preview_suppresses_edit_affordances() {
        let submission = Submission {
            state: SubmissionState::Preview,
            is_submitting: false,
        };
        let ui = compute_ui_state(
            RfqStatus::Accepted,
            &header(PrereqStatus::Completed, PrereqStatus::Completed),
            submission,
            None,
        );
        assert_eq!(ui.section(SectionKey::Preview), Flags::ON);
        assert_eq!(ui.button(ButtonKey::FinalSubmit), Flags::ON);
        assert_eq!(ui.button(ButtonKey::FinalDraft), Flags::ON);
        assert!(!ui.button(ButtonKey::Submit).visible);
        assert!(!ui.button(ButtonKey::AddCharge).visible);
        assert!(!ui.button(ButtonKey::DeleteCharge).visible);
    }

    #[test]
    fn submitting_disables_final_buttons() {
        let submission = Submission {
            state: SubmissionState::Submitting,
            is_submitting: true,
        };
        let ui = compute_ui_state(
            RfqStatus::Accepted,
            &header(PrereqStatus::Completed, PrereqStatus::Completed),
            submission,
            None,
        );
        let final_submit = ui.button(ButtonKey::FinalSubmit);
        assert!(final_submit.visible);
        assert!(!final_submit.enabled);
    }

    #[test]
    fn submitted_offers_revision_only() {
        let ui = compute_ui_state(
            RfqStatus::Submitted,
            &header(PrereqStatus::Completed, PrereqStatus::Completed),
            creating(),
            None,
        );
        assert_eq!(ui.button(ButtonKey::RevisePreRequisite), Flags::ON);
        assert_eq!(ui.button(ButtonKey::ReviseQuotation), Flags::ON);
        assert!(ui.section(SectionKey::PreRequisite).visible);
        assert!(!ui.section(SectionKey::PreRequisite).enabled);
        assert!(!ui.button(ButtonKey::UpdateQuotation).visible);
    }

    #[test]
    fn revising_quotation_unlocks_its_section() {
        let submission = Submission {
            state: SubmissionState::Editing,
            is_submitting: false,
        };
        let ui = compute_ui_state(
            RfqStatus::Submitted,
            &header(PrereqStatus::Completed, PrereqStatus::Completed),
            submission,
            Some(ReviseTarget::Quotation),
        );
        assert_eq!(ui.section(SectionKey::CreateQuotation), Flags::ON);
        assert_eq!(ui.button(ButtonKey::UpdateQuotation), Flags::ON);
        assert!(!ui.button(ButtonKey::UpdatePreRequisite).visible);
        assert!(!ui.section(SectionKey::PreRequisite).enabled);
    }

    #[test]
    fn awarded_and_rejected_expose_their_result_sections() {
        let wh = header(PrereqStatus::Completed, PrereqStatus::Completed);
        let awarded = compute_ui_state(RfqStatus::Awarded, &wh, creating(), None);
        assert_eq!(awarded.section(SectionKey::AwardedResults), Flags::ON);
        assert!(awarded.section(SectionKey::CreateQuotation).enabled);

        let rejected = compute_ui_state(RfqStatus::Rejected, &wh, creating(), None);
        assert_eq!(rejected.section(SectionKey::RejectedResults), Flags::ON);
        assert!(!rejected.section(SectionKey::CreateQuotation).enabled);
    }

    #[test]
    fn projection_is_idempotent() {
        let wh = header(PrereqStatus::Completed, PrereqStatus::Pending);
        let submission = Submission {
            state: SubmissionState::Editing,
            is_submitting: false,
        };
        let first = compute_ui_state(
            RfqStatus::Draft,
            &wh,
            submission,
            Some(ReviseTarget::Prerequisites),
        );
        let second = compute_ui_state(
            RfqStatus::Draft,
            &wh,
            submission,
            Some(ReviseTarget::Prerequisites),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn no_stale_flags_survive_a_status_change() {
        let wh = header(PrereqStatus::Completed, PrereqStatus::Completed);
        let accepted = compute_ui_state(RfqStatus::Accepted, &wh, creating(), None);
        assert!(accepted.button(ButtonKey::Submit).visible);

        let submitted = compute_ui_state(RfqStatus::Submitted, &wh, creating(), None);
        assert!(!submitted.button(ButtonKey::Submit).visible);
        assert!(!submitted.button(ButtonKey::AddCharge).visible);
    }
}
