//! Export column schemas.
//!
//! The client renders the actual workbook and PDF; this module owns
//! the fixed column layouts and flattens the priced lines into rows
//! of cells. The mass-upload template header lives with the import
//! module so the two can never drift apart.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{RfqHeader, WorkItem};

pub use crate::imports::EXPECTED_HEADER as TEMPLATE_HEADER;

/// Full item schema for the workbook export.
pub const WORKBOOK_COLUMNS: [&str; 16] = [
    "RFQ Number",
    "RFQ Title",
    "Buyer",
    "Item No",
    "Material No",
    "Material Description",
    "UOM",
    "Plant",
    "Required Quantity",
    "Net Price",
    "Net Worth",
    "Currency",
    "Delivery Date",
    "Expected Delivery Date",
    "Deadline",
    "Status",
];

/// Narrower subset for the printable PDF.
pub const PDF_COLUMNS: [&str; 5] = [
    "Item No",
    "Material Description",
    "Required Quantity",
    "Net Price",
    "Net Worth",
];

/// Column schema plus rows, ready for client-side rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn workbook_sheet(header: &RfqHeader, items: &[WorkItem]) -> ExportSheet {
    let rows = items
        .iter()
        .map(|item| {
            vec![
                header.rfq_number.clone(),
                header.title.clone().unwrap_or_default(),
                header.buyer_name.clone().unwrap_or_default(),
                item.item_number.clone(),
                item.material_no.clone(),
                item.material_desc.clone().unwrap_or_default(),
                item.uom.clone().unwrap_or_default(),
                item.plant.clone().unwrap_or_default(),
                item.quantity.to_string(),
                price_cell(item.net_price),
                item.net_worth.to_string(),
                header.currency.clone().unwrap_or_default(),
                date_cell(item.delivery_date),
                date_cell(item.expected_delivery_date),
                header.deadline.format("%Y-%m-%d %H:%M").to_string(),
                header.status.as_wire().to_string(),
            ]
        })
        .collect();
    ExportSheet {
        columns: columns(&WORKBOOK_COLUMNS),
        rows,
    }
}

pub fn pdf_sheet(items: &[WorkItem]) -> ExportSheet {
    let rows = items
        .iter()
        .map(|item| {
            vec![
                item.item_number.clone(),
                item.material_desc.clone().unwrap_or_default(),
                item.quantity.to_string(),
                price_cell(item.net_price),
                item.net_worth.to_string(),
            ]
        })
        .collect();
    ExportSheet {
        columns: columns(&PDF_COLUMNS),
        rows,
    }
}

fn columns(schema: &[&str]) -> Vec<String> {
    schema.iter().map(|s| s.to_string()).collect()
}

fn price_cell(price: Option<Decimal>) -> String {
    price.map(|p| p.to_string()).unwrap_or_default()
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RfqStatus;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn header() -> RfqHeader {
        RfqHeader {
            rfq_number: "4500000001".to_string(),
            bidder: "0000100001".to_string(),
            title: Some("Steel procurement".to_string()),
            status: RfqStatus::Accepted,
            deadline: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).single().unwrap(),
            vendor_account_group: "Z001".to_string(),
            buyer_name: Some("A. Buyer".to_string()),
            currency: Some("INR".to_string()),
            plant_address: None,
        }
    }

    fn item() -> WorkItem {
        let mut item = WorkItem {
            item_number: "10".to_string(),
            material_no: "MAT-100".to_string(),
            material_desc: Some("Steel rod".to_string()),
            quantity: Decimal::from(5),
            uom: Some("EA".to_string()),
            plant: Some("1000".to_string()),
            net_price: None,
            net_worth: Decimal::ZERO,
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 20),
            expected_delivery_date: None,
        };
        item.set_net_price(Decimal::new(125, 1));
        item
    }

    #[test]
    fn workbook_rows_line_up_with_the_schema() {
        let sheet = workbook_sheet(&header(), &[item()]);
        assert_eq!(sheet.columns.len(), WORKBOOK_COLUMNS.len());
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].len(), WORKBOOK_COLUMNS.len());
        assert_eq!(sheet.rows[0][0], "4500000001");
        assert_eq!(sheet.rows[0][9], "12.5");
        assert_eq!(sheet.rows[0][10], "62.5");
        assert_eq!(sheet.rows[0][12], "2026-08-20");
    }

    #[test]
    fn pdf_rows_use_the_narrow_subset() {
        let sheet = pdf_sheet(&[item()]);
        assert_eq!(sheet.columns.len(), PDF_COLUMNS.len());
        assert_eq!(sheet.rows[0], vec!["10", "Steel rod", "5", "12.5", "62.5"]);
    }

    #[test]
    fn unpriced_lines_export_with_empty_price_cells() {
        let mut unpriced = item();
        unpriced.net_price = None;
        unpriced.net_worth = Decimal::ZERO;
        let sheet = pdf_sheet(&[unpriced]);
        assert_eq!(sheet.rows[0][3], "");
        assert_eq!(sheet.rows[0][4], "0");
    }

    #[test]
    fn template_header_matches_the_import_contract() {
        assert_eq!(TEMPLATE_HEADER.len(), 9);
        assert_eq!(TEMPLATE_HEADER[0], "Item No");
    }
}
