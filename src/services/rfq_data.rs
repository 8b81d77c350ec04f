//! Client for the remote RFQ data service (OData-style).
//!
//! All durable RFQ state lives behind this client: headers, items,
//! the bidder's work records, pre-requisite definitions, and the
//! function imports that move an RFQ through its lifecycle. Failures
//! surface as a single upstream error built from the service's error
//! payload; nothing here retries automatically.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::{
    AdditionalAttachment, AttachmentRequirement, Charge, PrereqStatus, Question, QuestionType,
    RfqHeader, RfqItem, RfqStatus, WorkHeader, WorkItem,
};
use crate::error::ApiError;

/// Client for the RFQ data service.
#[derive(Clone)]
pub struct RfqDataClient {
    client: Client,
    base_url: String,
    sap_client: String,
}

// =============================================================================
// Envelope and error shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ODataList<T> {
    d: ODataResults<T>,
}

#[derive(Debug, Deserialize)]
struct ODataResults<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ODataSingle<T> {
    d: T,
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    error: ODataErrorInner,
}

#[derive(Debug, Deserialize)]
struct ODataErrorInner {
    message: ODataErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ODataErrorMessage {
    value: String,
}

/// Outcome of the set-status function import. The service responds
/// with a display message, optionally carrying the generated supplier
/// quotation number after `SupplierQuotation=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeOutcome {
    pub message: String,
    pub supplier_quotation: Option<String>,
}

impl StatusChangeOutcome {
    fn parse(raw: &str) -> Self {
        let mut message = raw.trim().to_string();
        let mut supplier_quotation = None;
        if let Some((left, right)) = raw.split_once('|') {
            message = left.trim().to_string();
            if let Some(value) = right.trim().strip_prefix("SupplierQuotation=") {
                let value = value.trim();
                if !value.is_empty() {
                    supplier_quotation = Some(value.to_string());
                }
            }
        }
        Self {
            message,
            supplier_quotation,
        }
    }
}

// =============================================================================
// Wire records
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HeaderRecord {
    rfq_number: String,
    bidder: String,
    rfq_title: Option<String>,
    status: String,
    deadline: String,
    vendor_account_group: String,
    buyer_name: Option<String>,
    currency: Option<String>,
    plant_address: Option<String>,
}

impl TryFrom<HeaderRecord> for RfqHeader {
    type Error = ApiError;

    fn try_from(r: HeaderRecord) -> Result<Self, ApiError> {
        let deadline = parse_odata_datetime(&r.deadline).ok_or_else(|| {
            ApiError::upstream(format!("Unreadable deadline on RFQ {}", r.rfq_number))
        })?;
        Ok(Self {
            rfq_number: r.rfq_number,
            bidder: r.bidder,
            title: r.rfq_title,
            status: RfqStatus::from_wire(&r.status),
            deadline,
            vendor_account_group: r.vendor_account_group,
            buyer_name: r.buyer_name,
            currency: r.currency,
            plant_address: r.plant_address,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemRecord {
    item_number: String,
    material_no: String,
    material_desc: Option<String>,
    quantity: Decimal,
    uom: Option<String>,
    plant: Option<String>,
    delivery_date: Option<String>,
}

impl From<ItemRecord> for RfqItem {
    fn from(r: ItemRecord) -> Self {
        Self {
            item_number: r.item_number,
            material_no: r.material_no,
            material_desc: r.material_desc,
            quantity: r.quantity,
            uom: r.uom,
            plant: r.plant,
            delivery_date: r.delivery_date.as_deref().and_then(parse_odata_date),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WorkHeaderRecord {
    rfq_number: String,
    bidder: String,
    response_status: String,
    attachment_status: String,
    remarks: Option<String>,
    price_unit: Option<String>,
    #[serde(default)]
    additional_charges: Option<ODataResults<ChargeRecord>>,
    #[serde(default)]
    additional_attachments: Option<ODataResults<AdditionalAttachmentRecord>>,
}

impl From<WorkHeaderRecord> for WorkHeader {
    fn from(r: WorkHeaderRecord) -> Self {
        Self {
            rfq_number: r.rfq_number,
            bidder: r.bidder,
            response_status: PrereqStatus::from_wire(&r.response_status),
            attachment_status: PrereqStatus::from_wire(&r.attachment_status),
            remarks: r.remarks,
            price_unit: r.price_unit,
            additional_charges: r
                .additional_charges
                .map(|c| c.results.into_iter().map(Into::into).collect())
                .unwrap_or_default(),
            additional_attachments: r
                .additional_attachments
                .map(|a| a.results.into_iter().map(Into::into).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChargeRecord {
    charge_name: String,
    charge_price: Decimal,
    charge_unit: Option<String>,
}

impl From<ChargeRecord> for Charge {
    fn from(r: ChargeRecord) -> Self {
        Self {
            name: r.charge_name,
            price: r.charge_price,
            unit: r.charge_unit.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AdditionalAttachmentRecord {
    document_id: String,
    file_name: String,
    content: Option<String>,
    description: Option<String>,
}

impl From<AdditionalAttachmentRecord> for AdditionalAttachment {
    fn from(r: AdditionalAttachmentRecord) -> Self {
        Self {
            document_id: r.document_id,
            file_name: r.file_name,
            content: r.content.unwrap_or_default(),
            description: r.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WorkItemRecord {
    item_number: String,
    material_no: String,
    material_desc: Option<String>,
    quantity: Decimal,
    uom: Option<String>,
    plant: Option<String>,
    net_price: Option<Decimal>,
    net_worth: Option<Decimal>,
    delivery_date: Option<String>,
    expected_delivery_date: Option<String>,
}

impl From<WorkItemRecord> for WorkItem {
    fn from(r: WorkItemRecord) -> Self {
        Self {
            item_number: r.item_number,
            material_no: r.material_no,
            material_desc: r.material_desc,
            quantity: r.quantity,
            uom: r.uom,
            plant: r.plant,
            net_price: r.net_price.filter(|p| !p.is_zero()),
            net_worth: r.net_worth.unwrap_or_default(),
            delivery_date: r.delivery_date.as_deref().and_then(parse_odata_date),
            expected_delivery_date: r
                .expected_delivery_date
                .as_deref()
                .and_then(parse_odata_date),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QuestionRecord {
    question_id: String,
    question_type: String,
    question_text: String,
    /// Semicolon-separated list for dropdown questions.
    options: Option<String>,
}

impl From<QuestionRecord> for Question {
    fn from(r: QuestionRecord) -> Self {
        let options = r
            .options
            .as_deref()
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            question_id: r.question_id,
            question_type: QuestionType::from_wire(&r.question_type),
            question_text: r.question_text,
            options,
            response: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttachmentDefRecord {
    document_id: String,
    description: String,
}

impl From<AttachmentDefRecord> for AttachmentRequirement {
    fn from(r: AttachmentDefRecord) -> Self {
        Self {
            document_id: r.document_id,
            description: r.description,
            is_present: false,
            file_name: None,
            file_url: None,
            reason_for_absence: None,
            response_description: None,
        }
    }
}

/// A previously saved questionnaire answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriorResponse {
    pub question_id: String,
    pub response: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PriorAttachmentRecord {
    document_id: String,
    description: Option<String>,
    /// SAP-style flag, "X" when a file was supplied.
    is_present: Option<String>,
    file_name: Option<String>,
    file_url: Option<String>,
    reason_for_absence: Option<String>,
    response_description: Option<String>,
}

impl From<PriorAttachmentRecord> for AttachmentRequirement {
    fn from(r: PriorAttachmentRecord) -> Self {
        Self {
            document_id: r.document_id,
            description: r.description.unwrap_or_default(),
            is_present: flag(&r.is_present),
            file_name: r.file_name,
            file_url: r.file_url,
            reason_for_absence: r.reason_for_absence,
            response_description: r.response_description,
        }
    }
}

// =============================================================================
// Outgoing payloads
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResponsePayload<'a> {
    question_id: &'a str,
    response: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttachmentPayload<'a> {
    document_id: &'a str,
    is_present: &'static str,
    file_name: Option<&'a str>,
    file_url: Option<&'a str>,
    reason_for_absence: Option<&'a str>,
    response_description: Option<&'a str>,
}

impl<'a> AttachmentPayload<'a> {
    fn from_domain(a: &'a AttachmentRequirement) -> Self {
        Self {
            document_id: &a.document_id,
            is_present: if a.is_present { "X" } else { "" },
            file_name: a.file_name.as_deref(),
            file_url: a.file_url.as_deref(),
            reason_for_absence: a.reason_for_absence.as_deref(),
            response_description: a.response_description.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PrerequisitesPayload<'a> {
    rfq_number: &'a str,
    bidder: &'a str,
    response_status: &'static str,
    attachment_status: &'static str,
    remarks: Option<&'a str>,
    responses: Vec<ResponsePayload<'a>>,
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct QuotationItemPayload<'a> {
    item_number: &'a str,
    net_price: Decimal,
    net_worth: Decimal,
    delivery_date: Option<String>,
    expected_delivery_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChargePayload<'a> {
    charge_name: &'a str,
    charge_price: Decimal,
    charge_unit: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdditionalAttachmentPayload<'a> {
    document_id: &'a str,
    file_name: &'a str,
    content: &'a str,
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct QuotationPayload<'a> {
    rfq_number: &'a str,
    bidder: &'a str,
    remarks: Option<&'a str>,
    items: Vec<QuotationItemPayload<'a>>,
    charges: Vec<ChargePayload<'a>>,
    additional_attachments: Vec<AdditionalAttachmentPayload<'a>>,
}

fn quotation_payload<'a>(
    rfq_number: &'a str,
    bidder: &'a str,
    items: &'a [WorkItem],
    charges: &'a [Charge],
    additional_attachments: &'a [AdditionalAttachment],
    remarks: Option<&'a str>,
) -> QuotationPayload<'a> {
    QuotationPayload {
        rfq_number,
        bidder,
        remarks,
        items: items
            .iter()
            .map(|i| QuotationItemPayload {
                item_number: &i.item_number,
                net_price: i.net_price.unwrap_or_default(),
                net_worth: i.net_worth,
                delivery_date: i.delivery_date.map(|d| d.to_string()),
                expected_delivery_date: i.expected_delivery_date.map(|d| d.to_string()),
            })
            .collect(),
        charges: charges
            .iter()
            .map(|c| ChargePayload {
                charge_name: &c.name,
                charge_price: c.price,
                charge_unit: &c.unit,
            })
            .collect(),
        additional_attachments: additional_attachments
            .iter()
            .map(|a| AdditionalAttachmentPayload {
                document_id: &a.document_id,
                file_name: &a.file_name,
                content: &a.content,
                description: a.description.as_deref(),
            })
            .collect(),
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("X")
}

/// Timestamps arrive either as RFC 3339 or in the legacy
/// `/Date(milliseconds)/` form.
fn parse_odata_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(millis) = raw
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
        .and_then(|digits| digits.parse::<i64>().ok())
    {
        return Utc.timestamp_millis_opt(millis).single();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_odata_date(raw: &str) -> Option<NaiveDate> {
    if let Some(dt) = parse_odata_datetime(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn odata_quote(value: &str) -> String {
    value.replace('\'', "''")
}

fn key_filter(rfq_number: &str, bidder: &str) -> String {
    format!(
        "RfqNumber eq '{}' and Bidder eq '{}'",
        odata_quote(rfq_number),
        odata_quote(bidder)
    )
}

// =============================================================================
// Client
// =============================================================================

impl RfqDataClient {
    pub fn new(base_url: &str, sap_client: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "RFQ data client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sap_client: sap_client.to_string(),
        })
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        debug!(url = %url, "RFQ data service read");

        let response = self
            .client
            .get(&url)
            .header("sap-client", &self.sap_client)
            .query(&[("$format", "json")])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "RFQ data service request failed");
                ApiError::upstream(format!("RFQ data service unavailable: {e}"))
            })?;

        Self::decode(response).await
    }

    async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        debug!(url = %url, "RFQ data service call");

        let response = self
            .client
            .post(&url)
            .header("sap-client", &self.sap_client)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "RFQ data service request failed");
                ApiError::upstream(format!("RFQ data service unavailable: {e}"))
            })?;

        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ApiError> {
        let status = response.status();

        if status.is_success() {
            return response.json::<R>().await.map_err(|e| {
                error!(error = %e, "Failed to parse RFQ data service response");
                ApiError::upstream(format!("Invalid RFQ data service response: {e}"))
            });
        }

        let message = response
            .json::<ODataErrorBody>()
            .await
            .map(|b| b.error.message.value)
            .unwrap_or_else(|_| format!("RFQ data service error: {status}"));

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::not_found(message)),
            StatusCode::BAD_REQUEST => Err(ApiError::bad_request(message)),
            _ => {
                error!(status = %status, message = %message, "RFQ data service error");
                Err(ApiError::upstream(message))
            }
        }
    }

    /// Check data service reachability.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/$metadata", self.base_url);

        self.client
            .get(&url)
            .header("sap-client", &self.sap_client)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("RFQ data service health check failed")?
            .error_for_status()
            .context("RFQ data service unhealthy")?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn fetch_rfq_list(&self, bidder: Option<&str>) -> Result<Vec<RfqHeader>, ApiError> {
        let filter = bidder
            .map(|b| format!("Bidder eq '{}'", odata_quote(b)))
            .unwrap_or_default();
        let query: Vec<(&str, &str)> = if filter.is_empty() {
            vec![]
        } else {
            vec![("$filter", filter.as_str())]
        };
        let list: ODataList<HeaderRecord> = self.get_json("/RfqHeaderSet", &query).await?;
        list.d
            .results
            .into_iter()
            .map(RfqHeader::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn fetch_header(&self, rfq_number: &str, bidder: &str) -> Result<RfqHeader, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<HeaderRecord> = self
            .get_json("/RfqHeaderSet", &[("$filter", filter.as_str())])
            .await?;
        list.d
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("RFQ not found"))?
            .try_into()
    }

    pub async fn fetch_items(&self, rfq_number: &str, bidder: &str) -> Result<Vec<RfqItem>, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<ItemRecord> = self
            .get_json("/RfqItemSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results.into_iter().map(Into::into).collect())
    }

    pub async fn fetch_work_header(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<WorkHeader, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<WorkHeaderRecord> = self
            .get_json(
                "/WorkHeaderSet",
                &[
                    ("$filter", filter.as_str()),
                    ("$expand", "AdditionalCharges,AdditionalAttachments"),
                ],
            )
            .await?;
        Ok(list
            .d
            .results
            .into_iter()
            .next()
            .map(Into::into)
            .unwrap_or_else(|| WorkHeader {
                rfq_number: rfq_number.to_string(),
                bidder: bidder.to_string(),
                ..WorkHeader::default()
            }))
    }

    pub async fn fetch_work_items(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<Vec<WorkItem>, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<WorkItemRecord> = self
            .get_json("/WorkItemSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results.into_iter().map(Into::into).collect())
    }

    pub async fn fetch_questions(&self, account_group: &str) -> Result<Vec<Question>, ApiError> {
        let filter = format!("VendorAccountGroup eq '{}'", odata_quote(account_group));
        let list: ODataList<QuestionRecord> = self
            .get_json("/QuestionSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results.into_iter().map(Into::into).collect())
    }

    pub async fn fetch_attachment_definitions(
        &self,
        account_group: &str,
    ) -> Result<Vec<AttachmentRequirement>, ApiError> {
        let filter = format!("VendorAccountGroup eq '{}'", odata_quote(account_group));
        let list: ODataList<AttachmentDefRecord> = self
            .get_json("/AttachmentDefSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results.into_iter().map(Into::into).collect())
    }

    pub async fn fetch_prior_responses(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<Vec<PriorResponse>, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<PriorResponse> = self
            .get_json("/ResponseSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results)
    }

    pub async fn fetch_prior_attachments(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<Vec<AttachmentRequirement>, ApiError> {
        let filter = key_filter(rfq_number, bidder);
        let list: ODataList<PriorAttachmentRecord> = self
            .get_json("/ResponseAttachmentSet", &[("$filter", filter.as_str())])
            .await?;
        Ok(list.d.results.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Function imports
    // =========================================================================

    /// Accept or reject the invitation via the set-status function
    /// import.
    #[instrument(skip(self, reason))]
    pub async fn set_status(
        &self,
        rfq_number: &str,
        bidder: &str,
        action: &str,
        reason: Option<&str>,
    ) -> Result<StatusChangeOutcome, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Request<'a> {
            rfq_number: &'a str,
            bidder: &'a str,
            action: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reason: Option<&'a str>,
        }

        let response: ODataSingle<serde_json::Value> = self
            .post_json(
                "/SetRfqStatus",
                &Request {
                    rfq_number,
                    bidder,
                    action,
                    reason,
                },
            )
            .await?;

        let raw = response
            .d
            .get("SetRfqStatus")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::upstream("Malformed set-status response"))?;

        Ok(StatusChangeOutcome::parse(raw))
    }

    /// Save the questionnaire and attachment responses in one deep
    /// insert. Both completion statuses are sent as `Completed`; a
    /// failed call leaves nothing half-saved on the remote side.
    #[instrument(skip(self, questions, attachments, remarks))]
    pub async fn save_prerequisites(
        &self,
        rfq_number: &str,
        bidder: &str,
        questions: &[Question],
        attachments: &[AttachmentRequirement],
        remarks: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = Self::prerequisites_payload(rfq_number, bidder, questions, attachments, remarks);
        let _: serde_json::Value = self.post_json("/SaveRfqResponse", &payload).await?;
        Ok(())
    }

    /// Re-save previously completed pre-requisites.
    #[instrument(skip(self, questions, attachments, remarks))]
    pub async fn edit_prerequisites(
        &self,
        rfq_number: &str,
        bidder: &str,
        questions: &[Question],
        attachments: &[AttachmentRequirement],
        remarks: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = Self::prerequisites_payload(rfq_number, bidder, questions, attachments, remarks);
        let _: serde_json::Value = self.post_json("/EditRfqResponse", &payload).await?;
        Ok(())
    }

    fn prerequisites_payload<'a>(
        rfq_number: &'a str,
        bidder: &'a str,
        questions: &'a [Question],
        attachments: &'a [AttachmentRequirement],
        remarks: Option<&'a str>,
    ) -> PrerequisitesPayload<'a> {
        PrerequisitesPayload {
            rfq_number,
            bidder,
            response_status: PrereqStatus::Completed.as_wire(),
            attachment_status: PrereqStatus::Completed.as_wire(),
            remarks,
            responses: questions
                .iter()
                .map(|q| ResponsePayload {
                    question_id: &q.question_id,
                    response: q.response.as_deref().unwrap_or_default(),
                })
                .collect(),
            attachments: attachments.iter().map(AttachmentPayload::from_domain).collect(),
        }
    }

    #[instrument(skip(self, items, charges, additional_attachments, remarks))]
    pub async fn submit_quotation(
        &self,
        rfq_number: &str,
        bidder: &str,
        items: &[WorkItem],
        charges: &[Charge],
        additional_attachments: &[AdditionalAttachment],
        remarks: Option<&str>,
    ) -> Result<StatusChangeOutcome, ApiError> {
        let payload = quotation_payload(
            rfq_number,
            bidder,
            items,
            charges,
            additional_attachments,
            remarks,
        );
        let response: ODataSingle<serde_json::Value> =
            self.post_json("/SubmitRfq", &payload).await?;
        let raw = response
            .d
            .get("SubmitRfq")
            .and_then(|v| v.as_str())
            .unwrap_or("Quotation submitted");
        Ok(StatusChangeOutcome::parse(raw))
    }

    /// Create the draft record for `(rfq_number, bidder)`.
    #[instrument(skip(self, items, charges, additional_attachments, remarks))]
    pub async fn save_draft(
        &self,
        rfq_number: &str,
        bidder: &str,
        items: &[WorkItem],
        charges: &[Charge],
        additional_attachments: &[AdditionalAttachment],
        remarks: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = quotation_payload(
            rfq_number,
            bidder,
            items,
            charges,
            additional_attachments,
            remarks,
        );
        let _: serde_json::Value = self.post_json("/DraftSet", &payload).await?;
        Ok(())
    }

    /// Refresh an existing draft record in place.
    #[instrument(skip(self, items, charges, additional_attachments, remarks))]
    pub async fn update_draft(
        &self,
        rfq_number: &str,
        bidder: &str,
        items: &[WorkItem],
        charges: &[Charge],
        additional_attachments: &[AdditionalAttachment],
        remarks: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = quotation_payload(
            rfq_number,
            bidder,
            items,
            charges,
            additional_attachments,
            remarks,
        );
        let path = format!(
            "/DraftSet(RfqNumber='{}',Bidder='{}')",
            odata_quote(rfq_number),
            odata_quote(bidder)
        );
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .put(&url)
            .header("sap-client", &self.sap_client)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "RFQ data service request failed");
                ApiError::upstream(format!("RFQ data service unavailable: {e}"))
            })?;

        if response.status() == StatusCode::NO_CONTENT || response.status().is_success() {
            return Ok(());
        }
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }

    /// Overwrite a submitted quotation after a revision.
    #[instrument(skip(self, items, charges, additional_attachments, remarks))]
    pub async fn edit_quotation(
        &self,
        rfq_number: &str,
        bidder: &str,
        items: &[WorkItem],
        charges: &[Charge],
        additional_attachments: &[AdditionalAttachment],
        remarks: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = quotation_payload(
            rfq_number,
            bidder,
            items,
            charges,
            additional_attachments,
            remarks,
        );
        let _: serde_json::Value = self.post_json("/EditRfq", &payload).await?;
        Ok(())
    }

    /// Ask the service to produce the mass-upload workbook template.
    /// Returns the file URL to hand back to the caller.
    #[instrument(skip(self))]
    pub async fn generate_mass_upload_template(
        &self,
        rfq_number: &str,
        bidder: &str,
    ) -> Result<String, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Request<'a> {
            rfq_number: &'a str,
            bidder: &'a str,
        }

        let response: ODataSingle<serde_json::Value> = self
            .post_json(
                "/GenerateMassUploadTemplate",
                &Request { rfq_number, bidder },
            )
            .await?;

        response
            .d
            .get("FileUrl")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::upstream("Malformed template response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_date_wrapper() {
        let dt = parse_odata_datetime("/Date(1754438400000)/").expect("datetime");
        assert_eq!(dt.timestamp_millis(), 1_754_438_400_000);
    }

    #[test]
    fn parses_rfc3339_datetimes() {
        let dt = parse_odata_datetime("2026-08-06T12:00:00Z").expect("datetime");
        assert_eq!(dt.date_naive().to_string(), "2026-08-06");
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_odata_date("2026-08-06").map(|d| d.to_string()),
            Some("2026-08-06".to_string())
        );
        assert!(parse_odata_date("garbage").is_none());
    }

    #[test]
    fn status_outcome_splits_message_and_quotation_number() {
        let outcome =
            StatusChangeOutcome::parse("RFQ accepted successfully | SupplierQuotation=7000000042");
        assert_eq!(outcome.message, "RFQ accepted successfully");
        assert_eq!(outcome.supplier_quotation.as_deref(), Some("7000000042"));

        let plain = StatusChangeOutcome::parse("RFQ rejected");
        assert_eq!(plain.message, "RFQ rejected");
        assert_eq!(plain.supplier_quotation, None);
    }

    #[test]
    fn presence_flag_follows_the_x_convention() {
        assert!(flag(&Some("X".to_string())));
        assert!(!flag(&Some("".to_string())));
        assert!(!flag(&None));
    }

    #[test]
    fn quotes_are_doubled_in_filters() {
        assert_eq!(odata_quote("O'Brien"), "O''Brien");
        assert_eq!(
            key_filter("4500000001", "O'Brien"),
            "RfqNumber eq '4500000001' and Bidder eq 'O''Brien'"
        );
    }
}
