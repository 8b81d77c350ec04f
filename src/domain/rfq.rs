use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// RFQ lifecycle status
///
/// `Awarded` and `Rejected` are set by the buying side and only ever
/// observed here via reload; a bidder action never produces them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RfqStatus {
    Pending,
    Accepted,
    NotAccepted,
    Submitted,
    Draft,
    Awarded,
    Rejected,
}

impl Default for RfqStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl RfqStatus {
    /// Parse the remote service's wire form.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "Accepted" => Self::Accepted,
            "Not Accepted" => Self::NotAccepted,
            "Submitted" => Self::Submitted,
            "Draft" => Self::Draft,
            "Awarded" => Self::Awarded,
            "Rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::NotAccepted => "Not Accepted",
            Self::Submitted => "Submitted",
            Self::Draft => "Draft",
            Self::Awarded => "Awarded",
            Self::Rejected => "Rejected",
        }
    }
}

/// RFQ header entity
///
/// Identifies one RFQ instance for one bidder. Immutable except
/// `status`, which only advances through confirmed remote calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqHeader {
    pub rfq_number: String,
    pub bidder: String,
    pub title: Option<String>,
    pub status: RfqStatus,
    pub deadline: DateTime<Utc>,
    pub vendor_account_group: String,
    pub buyer_name: Option<String>,
    pub currency: Option<String>,
    pub plant_address: Option<String>,
}

/// Read-only RFQ line from the item master. Pricing happens on the
/// corresponding work item, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqItem {
    pub item_number: String,
    pub material_no: String,
    pub material_desc: Option<String>,
    pub quantity: Decimal,
    pub uom: Option<String>,
    pub plant: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

/// Row for the RFQ list screens
#[derive(Debug, Clone, Serialize)]
pub struct RfqListRow {
    pub rfq_number: String,
    pub bidder: String,
    pub title: Option<String>,
    pub status: RfqStatus,
    pub deadline: DateTime<Utc>,
}

impl From<RfqHeader> for RfqListRow {
    fn from(h: RfqHeader) -> Self {
        Self {
            rfq_number: h.rfq_number,
            bidder: h.bidder,
            title: h.title,
            status: h.status,
            deadline: h.deadline,
        }
    }
}
