//! RFQ lifecycle routes
//!
//! List screens, the full view bundle, invitation responses,
//! pre-requisites, quotation editing, submit/draft/revise, spreadsheet
//! import, and the export schemas. Every mutating handler delegates to
//! the lifecycle service; nothing here touches the remote service
//! directly except the read-only export and template passthroughs.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::{DataResponse, NoContent};
use crate::app::AppState;
use crate::domain::{
    QuotationTotals, ReviseTarget, RfqListRow, RfqStatus, WorkItem,
    MAX_ADDITIONAL_ATTACHMENT_BYTES,
};
use crate::error::ApiError;
use crate::exports;
use crate::imports::{reconcile, SheetUpload};
use crate::lifecycle::controller::{PrerequisiteSubmission, ATTACHMENT_TOO_LARGE_MSG};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub bidder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuotationActionRequest {
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviseRequest {
    pub target: ReviseTarget,
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub net_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChargesRequest {
    pub indices: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct ImportResult {
    items: Vec<WorkItem>,
    totals: QuotationTotals,
}

#[derive(Debug, Serialize)]
struct TemplateResponse {
    file_url: String,
}

/// GET /rfqs
///
/// Every RFQ for the bidder except drafts.
pub async fn list_rfqs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.lifecycle.list_rfqs(params.bidder.as_deref()).await?;
    let rows: Vec<RfqListRow> = rows
        .into_iter()
        .filter(|r| r.status != RfqStatus::Draft)
        .collect();
    Ok(paginate(rows, &pagination))
}

/// GET /rfqs/drafts
pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.lifecycle.list_rfqs(params.bidder.as_deref()).await?;
    let rows: Vec<RfqListRow> = rows
        .into_iter()
        .filter(|r| r.status == RfqStatus::Draft)
        .collect();
    Ok(paginate(rows, &pagination))
}

/// The remote service has no paging of its own, so list pages are cut
/// from the full filtered result.
fn paginate(rows: Vec<RfqListRow>, pagination: &PaginationParams) -> Paginated<RfqListRow> {
    let total = rows.len() as u64;
    let page: Vec<RfqListRow> = rows
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();
    Paginated::new(page, pagination, total)
}

/// GET /rfqs/:rfq_number/:bidder
///
/// Full view bundle. Loading replaces any previous session for this
/// RFQ/bidder pair.
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.lifecycle.load_view(&rfq_number, &bidder).await?;
    Ok(DataResponse::new(view))
}

/// DELETE /rfqs/:rfq_number/:bidder/session
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.lifecycle.close_view(&rfq_number, &bidder);
    Ok(NoContent)
}

/// GET /rfqs/:rfq_number/:bidder/countdown
pub async fn get_countdown(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let countdown = state
        .lifecycle
        .countdown(&rfq_number, &bidder)
        .ok_or_else(|| ApiError::not_found("No view is loaded for this RFQ"))?;
    Ok(DataResponse::new(countdown))
}

/// POST /rfqs/:rfq_number/:bidder/accept
pub async fn accept_rfq(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<ConfirmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Accepting RFQ invitation");

    let outcome = state
        .lifecycle
        .accept(&rfq_number, &bidder, req.confirmed)
        .await?;
    Ok(DataResponse::new(outcome))
}

/// POST /rfqs/:rfq_number/:bidder/reject
pub async fn reject_rfq(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Rejecting RFQ invitation");

    let outcome = state
        .lifecycle
        .reject(&rfq_number, &bidder, &req.reason, req.confirmed)
        .await?;
    Ok(DataResponse::new(outcome))
}

/// POST /rfqs/:rfq_number/:bidder/prerequisites
pub async fn save_prerequisites(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<PrerequisiteSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Saving pre-requisites");

    let view = state
        .lifecycle
        .save_prerequisites(&rfq_number, &bidder, &req)
        .await?;
    Ok(DataResponse::new(view))
}

/// PUT /rfqs/:rfq_number/:bidder/prerequisites
///
/// Only valid after a revise opened the pre-requisite section.
pub async fn update_prerequisites(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<PrerequisiteSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Updating pre-requisites");

    let view = state
        .lifecycle
        .update_prerequisites(&rfq_number, &bidder, &req)
        .await?;
    Ok(DataResponse::new(view))
}

/// POST /rfqs/:rfq_number/:bidder/quotation/preview
pub async fn preview_quotation(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.lifecycle.enter_preview(&rfq_number, &bidder).await?;
    Ok(DataResponse::new(view))
}

/// POST /rfqs/:rfq_number/:bidder/quotation/submit
pub async fn submit_quotation(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<QuotationActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Submitting quotation");

    let outcome = state
        .lifecycle
        .final_submit(&rfq_number, &bidder, req.remarks.as_deref(), req.confirmed)
        .await?;
    Ok(DataResponse::new(outcome))
}

/// POST /rfqs/:rfq_number/:bidder/quotation/draft
pub async fn draft_quotation(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<QuotationActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Saving quotation draft");

    let outcome = state
        .lifecycle
        .final_draft(&rfq_number, &bidder, req.remarks.as_deref(), req.confirmed)
        .await?;
    Ok(DataResponse::new(outcome))
}

/// PUT /rfqs/:rfq_number/:bidder/quotation
///
/// Push revised quotation lines. Only valid after a revise opened the
/// quotation section.
pub async fn update_quotation(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<QuotationActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, "Updating quotation");

    let view = state
        .lifecycle
        .update_quotation(&rfq_number, &bidder, req.remarks.as_deref(), req.confirmed)
        .await?;
    Ok(DataResponse::new(view))
}

/// POST /rfqs/:rfq_number/:bidder/revise
pub async fn revise(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<ReviseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(rfq_number = %rfq_number, bidder = %bidder, target = ?req.target, "Opening revision");

    let view = state
        .lifecycle
        .revise(&rfq_number, &bidder, req.target)
        .await?;
    Ok(DataResponse::new(view))
}

/// PUT /rfqs/:rfq_number/:bidder/items/:item_number/price
pub async fn update_price(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder, item_number)): Path<(String, String, String)>,
    Json(req): Json<PriceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state
        .lifecycle
        .edit_net_price(&rfq_number, &bidder, &item_number, req.net_price)?;
    Ok(DataResponse::new(update))
}

/// POST /rfqs/:rfq_number/:bidder/charges
pub async fn add_charge(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<ChargeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let charges = state
        .lifecycle
        .add_charge(&rfq_number, &bidder, &req.name, req.price)?;
    Ok(DataResponse::new(charges))
}

/// DELETE /rfqs/:rfq_number/:bidder/charges
pub async fn delete_charges(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(req): Json<DeleteChargesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let charges = state
        .lifecycle
        .delete_charges(&rfq_number, &bidder, &req.indices)?;
    Ok(DataResponse::new(charges))
}

/// POST /rfqs/:rfq_number/:bidder/attachments
///
/// Multipart upload of one additional attachment: a `file` part plus
/// an optional `description` part. The payload is carried onward as
/// base64.
pub async fn add_attachment(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file_name: Option<String> = None;
    let mut content: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                if bytes.len() > MAX_ADDITIONAL_ATTACHMENT_BYTES {
                    return Err(ApiError::bad_request(ATTACHMENT_TOO_LARGE_MSG));
                }
                content = Some(BASE64.encode(&bytes));
            }
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("A file part is required"))?;
    let file_name = file_name.unwrap_or_else(|| "attachment".to_string());

    tracing::info!(
        rfq_number = %rfq_number,
        bidder = %bidder,
        file_name = %file_name,
        "Adding additional attachment"
    );

    let attachments = state.lifecycle.add_additional_attachment(
        &rfq_number,
        &bidder,
        &file_name,
        &content,
        description.as_deref(),
    )?;
    Ok(DataResponse::new(attachments))
}

/// DELETE /rfqs/:rfq_number/:bidder/attachments/:index
pub async fn delete_attachment(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder, index)): Path<(String, String, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments = state
        .lifecycle
        .remove_additional_attachment(&rfq_number, &bidder, index)?;
    Ok(DataResponse::new(attachments))
}

/// POST /rfqs/:rfq_number/:bidder/import
///
/// Reconcile a client-decoded mass-upload sheet against the loaded
/// quotation. All rows apply or none do.
pub async fn import_sheet(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
    Json(upload): Json<SheetUpload>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        rfq_number = %rfq_number,
        bidder = %bidder,
        rows = upload.rows.len(),
        "Importing price sheet"
    );

    let patches =
        reconcile(&upload.rows, Utc::now().date_naive()).map_err(ApiError::validation)?;
    let (items, totals) = state.lifecycle.apply_import(&rfq_number, &bidder, &patches)?;
    Ok(DataResponse::new(ImportResult { items, totals }))
}

/// GET /rfqs/:rfq_number/:bidder/export/workbook
pub async fn export_workbook(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let header = state.rfq_data.fetch_header(&rfq_number, &bidder).await?;
    let items = match state.lifecycle.session_items(&rfq_number, &bidder) {
        Some(items) => items,
        None => state.rfq_data.fetch_work_items(&rfq_number, &bidder).await?,
    };
    Ok(DataResponse::new(exports::workbook_sheet(&header, &items)))
}

/// GET /rfqs/:rfq_number/:bidder/export/pdf
pub async fn export_pdf(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let items = match state.lifecycle.session_items(&rfq_number, &bidder) {
        Some(items) => items,
        None => state.rfq_data.fetch_work_items(&rfq_number, &bidder).await?,
    };
    Ok(DataResponse::new(exports::pdf_sheet(&items)))
}

/// POST /rfqs/:rfq_number/:bidder/template
///
/// Ask the remote service to generate the mass-upload template and
/// return its file URL.
pub async fn generate_template(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let file_url = state
        .lifecycle
        .mass_upload_template(&rfq_number, &bidder)
        .await?;
    Ok(DataResponse::new(TemplateResponse { file_url }))
}
