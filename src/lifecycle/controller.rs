//! Lifecycle orchestration.
//!
//! `LifecycleService` sequences every bidder action the same way:
//! check the status guard, validate locally, issue the remote call,
//! then reload the full view and recompute the UI projection. The
//! remote service stays the source of truth; nothing observed before
//! a mutation is trusted after it.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    next_document_id, AdditionalAttachment, AttachmentRequirement, Charge, Question,
    QuotationTotals, ReviseTarget, RfqHeader, RfqItem, RfqListRow, RfqStatus, Submission,
    SubmissionState, UiState, WorkHeader, WorkItem, MAX_ADDITIONAL_ATTACHMENT_BYTES,
    MAX_PREREQ_ATTACHMENT_BYTES,
};
use crate::error::ApiError;
use crate::imports::PricePatch;
use crate::services::rfq_data::StatusChangeOutcome;
use crate::services::RfqDataClient;

use super::countdown::{spawn_countdown, Countdown};
use super::projection::compute_ui_state;
use super::session::{SessionKey, SessionStore};
use super::status;
use super::validate::{
    validate_prerequisites, validate_quotation, DEADLINE_PASSED_MSG, NO_ATTACHMENTS_MSG,
    NO_PREREQUISITES_MSG, NO_QUESTIONS_MSG,
};

pub const CONFIRMATION_MSG: &str = "Confirmation is required for this action";
pub const ATTACHMENT_TOO_LARGE_MSG: &str = "Attachment exceeds the 1 MB size limit";
pub const PREREQ_ATTACHMENT_TOO_LARGE_MSG: &str = "Attachment exceeds the 3 MB size limit";
pub const CHARGE_NAME_MSG: &str = "A charge name is required";
pub const CHARGE_PRICE_MSG: &str = "Charge price cannot be negative";
pub const NET_PRICE_NEGATIVE_MSG: &str = "Net price cannot be negative";

/// Everything one screen needs, rebuilt from scratch on every load.
#[derive(Debug, Clone, Serialize)]
pub struct RfqView {
    pub header: RfqHeader,
    pub items: Vec<RfqItem>,
    pub work_header: WorkHeader,
    pub work_items: Vec<WorkItem>,
    pub questions: Vec<Question>,
    pub attachments: Vec<AttachmentRequirement>,
    pub totals: QuotationTotals,
    pub countdown: Countdown,
    pub ui_state: UiState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_warnings: Vec<String>,
}

/// Result of a status-changing action: the remote display message
/// plus the reloaded view.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_quotation: Option<String>,
    pub view: RfqView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargesView {
    pub charges: Vec<Charge>,
    pub totals: QuotationTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    pub item: WorkItem,
    pub totals: QuotationTotals,
}

/// Bidder input for the pre-requisite save and update flows.
#[derive(Debug, Clone, Deserialize)]
pub struct PrerequisiteSubmission {
    pub questions: Vec<Question>,
    pub attachments: Vec<AttachmentRequirement>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Clone)]
pub struct LifecycleService {
    rfq_data: RfqDataClient,
    sessions: SessionStore,
    default_currency: String,
}

impl LifecycleService {
    pub fn new(rfq_data: RfqDataClient, sessions: SessionStore, default_currency: &str) -> Self {
        Self {
            rfq_data,
            sessions,
            default_currency: default_currency.to_string(),
        }
    }

    pub async fn list_rfqs(&self, bidder: Option<&str>) -> Result<Vec<RfqListRow>, ApiError> {
        let headers = self.rfq_data.fetch_rfq_list(bidder).await?;
        Ok(headers.into_iter().map(Into::into).collect())
    }

    /// Full view load. Replaces any previous session for this key, so
    /// a reload always lands in the `Creating` sub-state.
    pub async fn load_view(&self, rfq_number: &str, bidder: &str) -> Result<RfqView, ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());

        let (header, items, work_header, mut work_items) = tokio::try_join!(
            self.rfq_data.fetch_header(rfq_number, bidder),
            self.rfq_data.fetch_items(rfq_number, bidder),
            self.rfq_data.fetch_work_header(rfq_number, bidder),
            self.rfq_data.fetch_work_items(rfq_number, bidder),
        )?;

        if work_items.is_empty() {
            work_items = seed_work_items(&items);
        }

        let (questions_result, attachments_result) = tokio::join!(
            self.rfq_data.fetch_questions(&header.vendor_account_group),
            self.rfq_data
                .fetch_attachment_definitions(&header.vendor_account_group),
        );
        let mut questions = questions_result.unwrap_or_else(|e| {
            warn!(error = %e, "Question configuration unavailable");
            Vec::new()
        });
        let mut attachments = attachments_result.unwrap_or_else(|e| {
            warn!(error = %e, "Attachment configuration unavailable");
            Vec::new()
        });
        let config_warnings = config_warnings(&questions, &attachments);

        // Saved answers are merged best-effort: a read failure here
        // must not block the view, only lose the prefill.
        if work_header.response_status.is_completed() {
            match self.rfq_data.fetch_prior_responses(rfq_number, bidder).await {
                Ok(prior) => merge_prior_responses(&mut questions, &prior),
                Err(e) => warn!(error = %e, "Saved questionnaire responses unavailable"),
            }
        }
        if work_header.attachment_status.is_completed() {
            match self
                .rfq_data
                .fetch_prior_attachments(rfq_number, bidder)
                .await
            {
                Ok(prior) => merge_prior_attachments(&mut attachments, &prior),
                Err(e) => warn!(error = %e, "Saved attachment responses unavailable"),
            }
        }
        for question in &mut questions {
            question.apply_default_response();
        }

        let now = Utc::now();
        let countdown = Countdown::remaining(header.deadline, now);
        let handle = (!countdown.expired).then(|| spawn_countdown(header.deadline));

        self.sessions.reset(
            &key,
            work_items.clone(),
            work_header.additional_charges.clone(),
            work_header.additional_attachments.clone(),
            handle,
        );

        let totals = QuotationTotals::compute(&work_items, &work_header.additional_charges);
        let ui_state = compute_ui_state(
            header.status,
            &work_header,
            Submission::default(),
            None,
        );

        Ok(RfqView {
            header,
            items,
            work_header,
            work_items,
            questions,
            attachments,
            totals,
            countdown,
            ui_state,
            config_warnings,
        })
    }

    /// View teardown. Drops the session and aborts its countdown.
    pub fn close_view(&self, rfq_number: &str, bidder: &str) {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        self.sessions.teardown(&key);
    }

    /// Latest countdown snapshot without a remote round trip. `None`
    /// when no view is loaded; expired-at-load sessions have no timer
    /// task and report the expired snapshot directly.
    pub fn countdown(&self, rfq_number: &str, bidder: &str) -> Option<Countdown> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        if !self.sessions.has_session(&key) {
            return None;
        }
        Some(
            self.sessions
                .countdown(&key)
                .unwrap_or_else(Countdown::expired),
        )
    }

    /// Current session-local quotation lines, as the exports render
    /// them, including unsaved price edits.
    pub fn session_items(&self, rfq_number: &str, bidder: &str) -> Option<Vec<WorkItem>> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        self.sessions.work_items(&key)
    }

    // =========================================================================
    // Invitation
    // =========================================================================

    pub async fn accept(
        &self,
        rfq_number: &str,
        bidder: &str,
        confirmed: bool,
    ) -> Result<ActionOutcome, ApiError> {
        if !confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        status::accept(header.status, header.deadline, Utc::now())?;

        let outcome = self
            .rfq_data
            .set_status(rfq_number, bidder, status::StatusAction::Accept.as_wire(), None)
            .await?;
        drop(_busy);

        let view = self.load_view(rfq_number, bidder).await?;
        Ok(ActionOutcome {
            message: outcome.message,
            supplier_quotation: outcome.supplier_quotation,
            view,
        })
    }

    pub async fn reject(
        &self,
        rfq_number: &str,
        bidder: &str,
        reason: &str,
        confirmed: bool,
    ) -> Result<ActionOutcome, ApiError> {
        if !confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        status::reject(header.status, header.deadline, Utc::now(), reason)?;

        let outcome = self
            .rfq_data
            .set_status(
                rfq_number,
                bidder,
                status::StatusAction::Reject.as_wire(),
                Some(reason),
            )
            .await?;
        drop(_busy);

        let view = self.load_view(rfq_number, bidder).await?;
        Ok(ActionOutcome {
            message: outcome.message,
            supplier_quotation: outcome.supplier_quotation,
            view,
        })
    }

    // =========================================================================
    // Pre-requisites
    // =========================================================================

    pub async fn save_prerequisites(
        &self,
        rfq_number: &str,
        bidder: &str,
        submission: &PrerequisiteSubmission,
    ) -> Result<RfqView, ApiError> {
        if !submission.confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        let mut violations = validate_prerequisites(&submission.questions, &submission.attachments);
        violations.extend(oversize_prereq_attachments(&submission.attachments));
        if !violations.is_empty() {
            return Err(ApiError::validation(violations));
        }

        self.rfq_data
            .save_prerequisites(
                rfq_number,
                bidder,
                &submission.questions,
                &submission.attachments,
                submission.remarks.as_deref(),
            )
            .await?;
        drop(_busy);

        self.load_view(rfq_number, bidder).await
    }

    pub async fn update_prerequisites(
        &self,
        rfq_number: &str,
        bidder: &str,
        submission: &PrerequisiteSubmission,
    ) -> Result<RfqView, ApiError> {
        if !submission.confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        if self.sessions.edit_target(&key) != Some(ReviseTarget::Prerequisites) {
            return Err(ApiError::conflict(status::STATUS_GUARD_MSG));
        }
        let mut violations = validate_prerequisites(&submission.questions, &submission.attachments);
        violations.extend(oversize_prereq_attachments(&submission.attachments));
        if !violations.is_empty() {
            return Err(ApiError::validation(violations));
        }

        self.rfq_data
            .edit_prerequisites(
                rfq_number,
                bidder,
                &submission.questions,
                &submission.attachments,
                submission.remarks.as_deref(),
            )
            .await?;
        drop(_busy);

        self.load_view(rfq_number, bidder).await
    }

    // =========================================================================
    // Quotation editing (session-local)
    // =========================================================================

    pub fn edit_net_price(
        &self,
        rfq_number: &str,
        bidder: &str,
        item_number: &str,
        net_price: Decimal,
    ) -> Result<PriceUpdate, ApiError> {
        if net_price < Decimal::ZERO {
            return Err(ApiError::bad_request(NET_PRICE_NEGATIVE_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let item = self
            .sessions
            .update_work_item(&key, item_number, |item| item.set_net_price(net_price))
            .ok_or_else(|| ApiError::not_found("Quotation item not found"))?;
        Ok(PriceUpdate {
            item,
            totals: self.session_totals(&key),
        })
    }

    pub fn add_charge(
        &self,
        rfq_number: &str,
        bidder: &str,
        name: &str,
        price: Decimal,
    ) -> Result<ChargesView, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request(CHARGE_NAME_MSG));
        }
        if price < Decimal::ZERO {
            return Err(ApiError::bad_request(CHARGE_PRICE_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let charges = self.sessions.add_charge(
            &key,
            Charge {
                name: name.trim().to_string(),
                price,
                unit: self.default_currency.clone(),
            },
        );
        Ok(ChargesView {
            charges,
            totals: self.session_totals(&key),
        })
    }

    pub fn delete_charges(
        &self,
        rfq_number: &str,
        bidder: &str,
        indices: &[usize],
    ) -> Result<ChargesView, ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let charges = self.sessions.remove_charges(&key, indices);
        Ok(ChargesView {
            charges,
            totals: self.session_totals(&key),
        })
    }

    pub fn add_additional_attachment(
        &self,
        rfq_number: &str,
        bidder: &str,
        file_name: &str,
        content: &str,
        description: Option<&str>,
    ) -> Result<Vec<AdditionalAttachment>, ApiError> {
        if decoded_len(content) > MAX_ADDITIONAL_ATTACHMENT_BYTES {
            return Err(ApiError::bad_request(ATTACHMENT_TOO_LARGE_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let existing = self.sessions.additional_attachments(&key);
        let attachment = AdditionalAttachment {
            document_id: next_document_id(&existing),
            file_name: file_name.to_string(),
            content: content.to_string(),
            description: description.map(str::to_string),
        };
        Ok(self.sessions.add_additional_attachment(&key, attachment))
    }

    pub fn remove_additional_attachment(
        &self,
        rfq_number: &str,
        bidder: &str,
        index: usize,
    ) -> Result<Vec<AdditionalAttachment>, ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        self.sessions.remove_additional_attachment(&key, index)
    }

    /// Patch imported prices onto the session lines. Either every row
    /// applies or none do.
    pub fn apply_import(
        &self,
        rfq_number: &str,
        bidder: &str,
        patches: &[PricePatch],
    ) -> Result<(Vec<WorkItem>, QuotationTotals), ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let mut items = self
            .sessions
            .work_items(&key)
            .ok_or_else(|| ApiError::not_found("No quotation is loaded for this RFQ"))?;

        let unknown: Vec<&str> = patches
            .iter()
            .filter(|p| !items.iter().any(|i| i.item_number == p.item_number))
            .map(|p| p.item_number.as_str())
            .collect();
        if !unknown.is_empty() {
            return Err(ApiError::validation(vec![format!(
                "Unknown item numbers in uploaded sheet: {}",
                unknown.join(", ")
            )]));
        }

        for patch in patches {
            if let Some(item) = items.iter_mut().find(|i| i.item_number == patch.item_number) {
                item.set_net_price(patch.net_price);
                if patch.expected_delivery_date.is_some() {
                    item.expected_delivery_date = patch.expected_delivery_date;
                }
            }
        }
        self.sessions.set_work_items(&key, items.clone());
        let totals = self.session_totals(&key);
        Ok((items, totals))
    }

    // =========================================================================
    // Preview, submit, draft
    // =========================================================================

    /// Move the session into the preview sub-state after a full local
    /// validation of the priced lines.
    pub async fn enter_preview(&self, rfq_number: &str, bidder: &str) -> Result<RfqView, ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        let items = self
            .sessions
            .work_items(&key)
            .ok_or_else(|| ApiError::not_found("No quotation is loaded for this RFQ"))?;

        let violations = validate_quotation(&items, header.deadline, Utc::now());
        if !violations.is_empty() {
            return Err(quotation_error(violations));
        }

        self.sessions.set_state(&key, SubmissionState::Preview);
        self.project_current(&key, &header).await
    }

    /// Final submit from the preview screen. The sub-state shows
    /// `Submitting` for the duration of the remote call and settles
    /// back to `Preview` if the call fails.
    pub async fn final_submit(
        &self,
        rfq_number: &str,
        bidder: &str,
        remarks: Option<&str>,
        confirmed: bool,
    ) -> Result<ActionOutcome, ApiError> {
        if !confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        status::submit(header.status)?;

        let items = self
            .sessions
            .work_items(&key)
            .ok_or_else(|| ApiError::not_found("No quotation is loaded for this RFQ"))?;
        let violations = validate_quotation(&items, header.deadline, Utc::now());
        if !violations.is_empty() {
            return Err(quotation_error(violations));
        }

        self.sessions.set_state(&key, SubmissionState::Submitting);
        let charges = self.sessions.charges(&key);
        let attachments = self.sessions.additional_attachments(&key);
        let result = self
            .rfq_data
            .submit_quotation(rfq_number, bidder, &items, &charges, &attachments, remarks)
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.sessions.set_state(&key, SubmissionState::Preview);
                return Err(e);
            }
        };
        drop(_busy);

        let view = self.load_view(rfq_number, bidder).await?;
        Ok(ActionOutcome {
            message: outcome.message,
            supplier_quotation: outcome.supplier_quotation,
            view,
        })
    }

    /// Save the current lines as a draft. Creates the draft record on
    /// the first save and refreshes it afterwards.
    pub async fn final_draft(
        &self,
        rfq_number: &str,
        bidder: &str,
        remarks: Option<&str>,
        confirmed: bool,
    ) -> Result<ActionOutcome, ApiError> {
        if !confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        status::draft(header.status)?;

        let items = self
            .sessions
            .work_items(&key)
            .ok_or_else(|| ApiError::not_found("No quotation is loaded for this RFQ"))?;
        let charges = self.sessions.charges(&key);
        let attachments = self.sessions.additional_attachments(&key);

        self.sessions.set_state(&key, SubmissionState::Submitting);
        let result = if header.status == RfqStatus::Draft {
            self.rfq_data
                .update_draft(rfq_number, bidder, &items, &charges, &attachments, remarks)
                .await
        } else {
            self.rfq_data
                .save_draft(rfq_number, bidder, &items, &charges, &attachments, remarks)
                .await
        };
        if let Err(e) = result {
            self.sessions.set_state(&key, SubmissionState::Preview);
            return Err(e);
        }
        drop(_busy);

        let view = self.load_view(rfq_number, bidder).await?;
        Ok(ActionOutcome {
            message: "Quotation saved as draft".to_string(),
            supplier_quotation: None,
            view,
        })
    }

    // =========================================================================
    // Revision
    // =========================================================================

    /// Open one of the submitted sections for editing. Status does not
    /// change; only the session sub-state does.
    pub async fn revise(
        &self,
        rfq_number: &str,
        bidder: &str,
        target: ReviseTarget,
    ) -> Result<RfqView, ApiError> {
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        if !status::can_revise(header.status) {
            return Err(ApiError::conflict(status::STATUS_GUARD_MSG));
        }
        if !self.sessions.has_session(&key) {
            return Err(ApiError::not_found("No quotation is loaded for this RFQ"));
        }

        self.sessions.set_state(&key, SubmissionState::Editing);
        self.sessions.set_edit_target(&key, Some(target));
        self.project_current(&key, &header).await
    }

    /// Push the revised quotation lines to the remote service.
    pub async fn update_quotation(
        &self,
        rfq_number: &str,
        bidder: &str,
        remarks: Option<&str>,
        confirmed: bool,
    ) -> Result<RfqView, ApiError> {
        if !confirmed {
            return Err(ApiError::bad_request(CONFIRMATION_MSG));
        }
        let key: SessionKey = (rfq_number.to_string(), bidder.to_string());
        let _busy = self.sessions.begin_mutation(&key)?;

        if self.sessions.edit_target(&key) != Some(ReviseTarget::Quotation) {
            return Err(ApiError::conflict(status::STATUS_GUARD_MSG));
        }
        let header = self.rfq_data.fetch_header(rfq_number, bidder).await?;
        let items = self
            .sessions
            .work_items(&key)
            .ok_or_else(|| ApiError::not_found("No quotation is loaded for this RFQ"))?;
        let violations = validate_quotation(&items, header.deadline, Utc::now());
        if !violations.is_empty() {
            return Err(quotation_error(violations));
        }
        let charges = self.sessions.charges(&key);
        let attachments = self.sessions.additional_attachments(&key);

        self.rfq_data
            .edit_quotation(rfq_number, bidder, &items, &charges, &attachments, remarks)
            .await?;
        drop(_busy);

        self.load_view(rfq_number, bidder).await
    }

    // =========================================================================
    // Template
    // =========================================================================

    pub async fn mass_upload_template(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<String, ApiError> {
        self.rfq_data
            .generate_mass_upload_template(rfq_number, bidder)
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn session_totals(&self, key: &SessionKey) -> QuotationTotals {
        let items = self.sessions.work_items(key).unwrap_or_default();
        let charges = self.sessions.charges(key);
        QuotationTotals::compute(&items, &charges)
    }

    /// Recompute the projection for the current session without a full
    /// reload, keeping the in-progress lines intact.
    async fn project_current(
        &self,
        key: &SessionKey,
        header: &RfqHeader,
    ) -> Result<RfqView, ApiError> {
        let (rfq_number, bidder) = (key.0.as_str(), key.1.as_str());
        let (items, work_header) = tokio::try_join!(
            self.rfq_data.fetch_items(rfq_number, bidder),
            self.rfq_data.fetch_work_header(rfq_number, bidder),
        )?;
        let work_items = self.sessions.work_items(key).unwrap_or_default();
        let charges = self.sessions.charges(key);
        let totals = QuotationTotals::compute(&work_items, &charges);
        let submission = self.sessions.submission(key);
        let edit_target = self.sessions.edit_target(key);
        let countdown = self
            .sessions
            .countdown(key)
            .unwrap_or_else(|| Countdown::remaining(header.deadline, Utc::now()));
        let ui_state = compute_ui_state(header.status, &work_header, submission, edit_target);

        Ok(RfqView {
            header: header.clone(),
            items,
            work_header,
            work_items,
            questions: Vec::new(),
            attachments: Vec::new(),
            totals,
            countdown,
            ui_state,
            config_warnings: Vec::new(),
        })
    }
}

/// A quotation past its deadline maps onto the deadline error; any
/// other violation set is a plain validation failure.
fn quotation_error(violations: Vec<String>) -> ApiError {
    if violations.iter().any(|v| v == DEADLINE_PASSED_MSG) {
        ApiError::deadline_passed(DEADLINE_PASSED_MSG)
    } else {
        ApiError::validation(violations)
    }
}

/// Unpriced lines for an RFQ whose bidder has no saved work items yet.
fn seed_work_items(items: &[RfqItem]) -> Vec<WorkItem> {
    items
        .iter()
        .map(|item| WorkItem {
            item_number: item.item_number.clone(),
            material_no: item.material_no.clone(),
            material_desc: item.material_desc.clone(),
            quantity: item.quantity,
            uom: item.uom.clone(),
            plant: item.plant.clone(),
            net_price: None,
            net_worth: Decimal::ZERO,
            delivery_date: item.delivery_date,
            expected_delivery_date: None,
        })
        .collect()
}

fn config_warnings(questions: &[Question], attachments: &[AttachmentRequirement]) -> Vec<String> {
    match (questions.is_empty(), attachments.is_empty()) {
        (true, true) => vec![NO_PREREQUISITES_MSG.to_string()],
        (true, false) => vec![NO_QUESTIONS_MSG.to_string()],
        (false, true) => vec![NO_ATTACHMENTS_MSG.to_string()],
        (false, false) => Vec::new(),
    }
}

fn merge_prior_responses(
    questions: &mut [Question],
    prior: &[crate::services::rfq_data::PriorResponse],
) {
    for saved in prior {
        if let Some(question) = questions
            .iter_mut()
            .find(|q| q.question_id == saved.question_id)
        {
            question.response = Some(saved.response.clone());
        }
    }
}

/// Overlay saved attachment responses onto the admin definitions,
/// matched by document id. Saved records for retired definitions are
/// dropped.
fn merge_prior_attachments(
    definitions: &mut [AttachmentRequirement],
    prior: &[AttachmentRequirement],
) {
    for saved in prior {
        if let Some(def) = definitions
            .iter_mut()
            .find(|d| d.document_id == saved.document_id)
        {
            def.is_present = saved.is_present;
            def.file_name = saved.file_name.clone();
            def.file_url = saved.file_url.clone();
            def.reason_for_absence = saved.reason_for_absence.clone();
            def.response_description = saved.response_description.clone();
        }
    }
}

/// Size of the decoded payload without allocating for it.
fn decoded_len(base64_content: &str) -> usize {
    let trimmed = base64_content.trim_end_matches('=');
    trimmed.len() * 3 / 4
}

/// Pre-requisite uploads carry their payload in `file_url`; anything
/// past the 3 MB cap is a violation alongside the completeness checks.
fn oversize_prereq_attachments(attachments: &[AttachmentRequirement]) -> Vec<String> {
    attachments
        .iter()
        .filter(|a| {
            a.file_url
                .as_deref()
                .is_some_and(|content| decoded_len(content) > MAX_PREREQ_ATTACHMENT_BYTES)
        })
        .map(|a| format!("{PREREQ_ATTACHMENT_TOO_LARGE_MSG}: {}", a.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionType;

    fn rfq_item(number: &str) -> RfqItem {
        RfqItem {
            item_number: number.to_string(),
            material_no: format!("MAT-{number}"),
            material_desc: Some("Steel rod".to_string()),
            quantity: Decimal::from(5),
            uom: Some("EA".to_string()),
            plant: Some("1000".to_string()),
            delivery_date: None,
        }
    }

    #[test]
    fn seeded_lines_start_unpriced() {
        let seeded = seed_work_items(&[rfq_item("10"), rfq_item("20")]);
        assert_eq!(seeded.len(), 2);
        assert!(seeded.iter().all(|i| i.net_price.is_none()));
        assert!(seeded.iter().all(|i| i.net_worth.is_zero()));
        assert_eq!(seeded[0].quantity, Decimal::from(5));
    }

    #[test]
    fn deadline_violation_dominates_other_violations() {
        let err = quotation_error(vec![
            DEADLINE_PASSED_MSG.to_string(),
            "Please enter valid net prices for items: 10".to_string(),
        ]);
        assert!(matches!(err, ApiError::DeadlinePassed(_)));

        let err = quotation_error(vec![
            "Please enter valid net prices for items: 10".to_string()
        ]);
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn config_warnings_name_the_missing_track() {
        let q = Question {
            question_id: "Q1".to_string(),
            question_type: QuestionType::Radio,
            question_text: "ISO certified?".to_string(),
            options: vec![],
            response: None,
        };
        let a = AttachmentRequirement {
            document_id: "DOC1".to_string(),
            description: "Tax certificate".to_string(),
            is_present: false,
            file_name: None,
            file_url: None,
            reason_for_absence: None,
            response_description: None,
        };
        assert_eq!(config_warnings(&[], &[]), vec![NO_PREREQUISITES_MSG]);
        assert_eq!(
            config_warnings(&[], std::slice::from_ref(&a)),
            vec![NO_QUESTIONS_MSG]
        );
        assert_eq!(
            config_warnings(std::slice::from_ref(&q), &[]),
            vec![NO_ATTACHMENTS_MSG]
        );
        assert!(config_warnings(&[q], &[a]).is_empty());
    }

    #[test]
    fn prior_answers_overlay_definitions_by_id() {
        let mut questions = vec![
            Question {
                question_id: "Q1".to_string(),
                question_type: QuestionType::Radio,
                question_text: "ISO certified?".to_string(),
                options: vec![],
                response: None,
            },
            Question {
                question_id: "Q2".to_string(),
                question_type: QuestionType::Radio,
                question_text: "Export license?".to_string(),
                options: vec![],
                response: None,
            },
        ];
        let prior = vec![crate::services::rfq_data::PriorResponse {
            question_id: "Q2".to_string(),
            response: "No".to_string(),
        }];
        merge_prior_responses(&mut questions, &prior);
        assert_eq!(questions[0].response, None);
        assert_eq!(questions[1].response.as_deref(), Some("No"));
    }

    #[test]
    fn saved_attachment_for_a_retired_definition_is_dropped() {
        let mut defs = vec![AttachmentRequirement {
            document_id: "DOC1".to_string(),
            description: "Tax certificate".to_string(),
            is_present: false,
            file_name: None,
            file_url: None,
            reason_for_absence: None,
            response_description: None,
        }];
        let prior = vec![
            AttachmentRequirement {
                document_id: "DOC1".to_string(),
                description: "Tax certificate".to_string(),
                is_present: true,
                file_name: Some("tax.pdf".to_string()),
                file_url: Some("ZGF0YQ==".to_string()),
                reason_for_absence: None,
                response_description: Some("FY 2025".to_string()),
            },
            AttachmentRequirement {
                document_id: "DOC9".to_string(),
                description: "Retired".to_string(),
                is_present: true,
                file_name: None,
                file_url: None,
                reason_for_absence: None,
                response_description: None,
            },
        ];
        merge_prior_attachments(&mut defs, &prior);
        assert_eq!(defs.len(), 1);
        assert!(defs[0].is_present);
        assert_eq!(defs[0].file_name.as_deref(), Some("tax.pdf"));
    }

    #[test]
    fn decoded_length_tracks_base64_padding() {
        assert_eq!(decoded_len("ZGF0YQ=="), 4); // "data"
        assert_eq!(decoded_len(""), 0);
        assert!(decoded_len(&"A".repeat(1_400_000)) > MAX_ADDITIONAL_ATTACHMENT_BYTES);
    }

    fn offline_service() -> LifecycleService {
        let client = RfqDataClient::new("http://127.0.0.1:9", "100", 1).unwrap();
        LifecycleService::new(client, SessionStore::new(), "INR")
    }

    #[tokio::test]
    async fn unconfirmed_accept_is_rejected_before_any_remote_call() {
        let service = offline_service();
        let err = service
            .accept("7000001", "BIDDER01", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == CONFIRMATION_MSG));
    }

    #[tokio::test]
    async fn unconfirmed_prerequisite_save_is_rejected() {
        let service = offline_service();
        let submission = PrerequisiteSubmission {
            questions: vec![],
            attachments: vec![],
            remarks: None,
            confirmed: false,
        };
        let err = service
            .save_prerequisites("7000001", "BIDDER01", &submission)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == CONFIRMATION_MSG));
    }

    #[test]
    fn oversize_prereq_upload_is_reported_by_description() {
        let within = AttachmentRequirement {
            document_id: "DOC1".to_string(),
            description: "Tax certificate".to_string(),
            is_present: true,
            file_name: Some("tax.pdf".to_string()),
            file_url: Some("ZGF0YQ==".to_string()),
            reason_for_absence: None,
            response_description: Some("FY 2025".to_string()),
        };
        let mut oversize = within.clone();
        oversize.description = "Balance sheet".to_string();
        oversize.file_url = Some("A".repeat(4_200_000));

        let violations = oversize_prereq_attachments(&[within, oversize]);
        assert_eq!(
            violations,
            vec![format!("{PREREQ_ATTACHMENT_TOO_LARGE_MSG}: Balance sheet")]
        );
    }
}
