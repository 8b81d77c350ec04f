//! Types exchanged with the negotiation (chat) micro-service.
//!
//! Counter-offers are keyed by buyer, supplier, RFQ number, and
//! material; the service is opaque to the lifecycle core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Open,
    Accepted,
    Rejected,
}

/// One counter-offer message in a negotiation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterOffer {
    pub id: String,
    pub buyer_id: String,
    pub supplier_id: String,
    pub rfq_number: String,
    pub material_no: String,
    pub offered_price: Decimal,
    pub status: OfferStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for submitting the supplier's best offer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BestOfferRequest {
    pub price: Decimal,
    #[serde(default)]
    pub remarks: Option<String>,
}
