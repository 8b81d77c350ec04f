use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::prerequisites::AdditionalAttachment;

/// Completion state of one pre-requisite track (questionnaire or
/// attachments). Becomes `Completed` only after a successful save
/// round trip; a failed save reverts it to `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrereqStatus {
    Pending,
    Completed,
}

impl Default for PrereqStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl PrereqStatus {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "Completed" => Self::Completed,
            _ => Self::Pending,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Ad hoc additional charge added by the bidder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub name: String,
    pub price: Decimal,
    pub unit: String,
}

/// Mutable in-progress shadow of the bidder's quotation-side fields.
/// Refreshed by a full reload after every mutating action; never
/// trusted beyond the current request cycle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkHeader {
    pub rfq_number: String,
    pub bidder: String,
    pub response_status: PrereqStatus,
    pub attachment_status: PrereqStatus,
    pub remarks: Option<String>,
    pub price_unit: Option<String>,
    #[serde(default)]
    pub additional_charges: Vec<Charge>,
    #[serde(default)]
    pub additional_attachments: Vec<AdditionalAttachment>,
}

impl WorkHeader {
    pub fn prerequisites_completed(&self) -> bool {
        self.response_status.is_completed() && self.attachment_status.is_completed()
    }
}

/// One priced line of the quotation. Quantity is read-only, sourced
/// from the RFQ item master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub item_number: String,
    pub material_no: String,
    pub material_desc: Option<String>,
    pub quantity: Decimal,
    pub uom: Option<String>,
    pub plant: Option<String>,
    pub net_price: Option<Decimal>,
    pub net_worth: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
}

impl WorkItem {
    /// Apply a price edit, recomputing the line's net worth.
    pub fn set_net_price(&mut self, net_price: Decimal) {
        self.net_price = Some(net_price);
        self.net_worth = net_price * self.quantity;
    }
}

/// Running totals for the quotation screen
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuotationTotals {
    pub items_total: Decimal,
    pub charges_total: Decimal,
    pub grand_total: Decimal,
}

impl QuotationTotals {
    pub fn compute(items: &[WorkItem], charges: &[Charge]) -> Self {
        let items_total: Decimal = items.iter().map(|i| i.net_worth).sum();
        let charges_total: Decimal = charges.iter().map(|c| c.price).sum();
        Self {
            items_total,
            charges_total,
            grand_total: items_total + charges_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(number: &str, quantity: Decimal) -> WorkItem {
        WorkItem {
            item_number: number.to_string(),
            material_no: format!("MAT-{number}"),
            material_desc: None,
            quantity,
            uom: None,
            plant: None,
            net_price: None,
            net_worth: Decimal::ZERO,
            delivery_date: None,
            expected_delivery_date: None,
        }
    }

    #[test]
    fn price_edit_recomputes_net_worth() {
        let mut it = item("10", Decimal::from(5));
        it.set_net_price(Decimal::new(125, 1)); // 12.5
        assert_eq!(it.net_price, Some(Decimal::new(125, 1)));
        assert_eq!(it.net_worth, Decimal::new(625, 1)); // 62.5
    }

    #[test]
    fn totals_sum_items_and_charges() {
        let mut a = item("10", Decimal::from(2));
        a.set_net_price(Decimal::from(100));
        let mut b = item("20", Decimal::from(1));
        b.set_net_price(Decimal::from(50));
        let charges = vec![Charge {
            name: "Freight".to_string(),
            price: Decimal::from(25),
            unit: "INR".to_string(),
        }];
        let totals = QuotationTotals::compute(&[a, b], &charges);
        assert_eq!(totals.items_total, Decimal::from(250));
        assert_eq!(totals.charges_total, Decimal::from(25));
        assert_eq!(totals.grand_total, Decimal::from(275));
    }

    #[test]
    fn prerequisites_completed_requires_both_tracks() {
        let mut wh = WorkHeader::default();
        assert!(!wh.prerequisites_completed());
        wh.response_status = PrereqStatus::Completed;
        assert!(!wh.prerequisites_completed());
        wh.attachment_status = PrereqStatus::Completed;
        assert!(wh.prerequisites_completed());
    }
}
