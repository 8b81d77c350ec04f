//! Spreadsheet import reconciliation.
//!
//! The workbook itself is decoded client-side; this module receives
//! the sheet as rows of cells. Reconciliation is all-or-nothing: one
//! invalid row rejects the whole upload, and the caller patches work
//! items only from a fully clean result.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Expected header row of the mass-upload sheet. Rows before it, and
/// rows with a different cell count, are discarded.
pub const EXPECTED_HEADER: [&str; 9] = [
    "Item No",
    "Material No - Description",
    "UOM",
    "Plant",
    "Required Quantity",
    "Net Price - INR",
    "Total Price",
    "Delivery Date (yyyy-mm-dd)",
    "Expected Delivery Date (yyyy-mm-dd)",
];

pub const NO_HEADER_MSG: &str = "The uploaded sheet does not contain the expected header row";

/// One clean row, ready to patch the matching work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePatch {
    pub item_number: String,
    pub net_price: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Raw sheet payload as posted by the client.
#[derive(Debug, Deserialize)]
pub struct SheetUpload {
    pub rows: Vec<Vec<String>>,
}

/// Validate the uploaded rows and produce the patches to apply. Any
/// violation rejects the entire sheet, one message per violation.
pub fn reconcile(rows: &[Vec<String>], today: NaiveDate) -> Result<Vec<PricePatch>, Vec<String>> {
    let Some(header_index) = rows.iter().position(|row| is_header(row)) else {
        return Err(vec![NO_HEADER_MSG.to_string()]);
    };

    let mut patches = Vec::new();
    let mut violations = Vec::new();

    for (offset, row) in rows[header_index + 1..].iter().enumerate() {
        // Sheet row numbers are 1-based and include the preamble.
        let row_no = header_index + offset + 2;
        if row.len() != EXPECTED_HEADER.len() {
            continue;
        }
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match parse_row(row, row_no, today) {
            Ok(patch) => patches.push(patch),
            Err(mut errs) => violations.append(&mut errs),
        }
    }

    if violations.is_empty() {
        Ok(patches)
    } else {
        Err(violations)
    }
}

fn is_header(row: &[String]) -> bool {
    row.len() == EXPECTED_HEADER.len()
        && row
            .iter()
            .zip(EXPECTED_HEADER.iter())
            .all(|(cell, expected)| cell.trim() == *expected)
}

fn parse_row(row: &[String], row_no: usize, today: NaiveDate) -> Result<PricePatch, Vec<String>> {
    let mut errs = Vec::new();

    let item_number = row[0].trim();
    if item_number.is_empty() {
        errs.push(format!("Row {row_no}: Item number is missing"));
    }

    let quantity = parse_decimal(&row[4]);
    match quantity {
        Some(q) if q >= Decimal::ZERO => {}
        _ => errs.push(format!(
            "Row {row_no}: Required quantity must be a non-negative number"
        )),
    }

    let net_price = match parse_decimal(&row[5]) {
        Some(p) if p >= Decimal::ZERO => Some(p),
        _ => {
            errs.push(format!(
                "Row {row_no}: Net price must be a non-negative number"
            ));
            None
        }
    };

    let delivery_date = parse_date_cell(&row[7], "Delivery date", row_no, today, &mut errs);
    let expected_delivery_date = parse_date_cell(
        &row[8],
        "Expected delivery date",
        row_no,
        today,
        &mut errs,
    );

    if !errs.is_empty() {
        return Err(errs);
    }

    Ok(PricePatch {
        item_number: item_number.to_string(),
        // errs is empty here, so the price parsed.
        net_price: net_price.unwrap_or_default(),
        delivery_date,
        expected_delivery_date,
    })
}

fn parse_decimal(cell: &str) -> Option<Decimal> {
    cell.trim().parse::<Decimal>().ok()
}

fn parse_date_cell(
    cell: &str,
    label: &str,
    row_no: usize,
    today: NaiveDate,
    errs: &mut Vec<String>,
) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    let Some(date) = parse_sheet_date(cell) else {
        errs.push(format!("Row {row_no}: {label} is not a valid date"));
        return None;
    };
    if date < today {
        errs.push(format!("Row {row_no}: {label} cannot be in the past"));
        return None;
    }
    Some(date)
}

/// Date cells arrive either as an Excel serial number or already
/// rendered as `yyyy-mm-dd`. The 1899-12-30 base absorbs the two-day
/// offset the serial format inherited from its 1900 epoch.
fn parse_sheet_date(cell: &str) -> Option<NaiveDate> {
    if let Ok(serial) = cell.parse::<f64>() {
        if serial < 1.0 {
            return None;
        }
        let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        return base.checked_add_signed(Duration::days(serial.trunc() as i64));
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_row() -> Vec<String> {
        EXPECTED_HEADER.iter().map(|s| s.to_string()).collect()
    }

    fn data_row(item: &str, quantity: &str, price: &str, delivery: &str) -> Vec<String> {
        vec![
            item.to_string(),
            "MAT-100 - Steel rod".to_string(),
            "EA".to_string(),
            "1000".to_string(),
            quantity.to_string(),
            price.to_string(),
            String::new(),
            delivery.to_string(),
            String::new(),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn missing_header_rejects_the_sheet() {
        let rows = vec![data_row("10", "5", "12.5", "")];
        assert_eq!(
            reconcile(&rows, today()),
            Err(vec![NO_HEADER_MSG.to_string()])
        );
    }

    #[test]
    fn preamble_rows_are_discarded() {
        let rows = vec![
            vec!["RFQ 4500000001".to_string()],
            vec![String::new()],
            header_row(),
            data_row("10", "5", "12.5", ""),
        ];
        let patches = reconcile(&rows, today()).expect("clean sheet");
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].item_number, "10");
        assert_eq!(patches[0].net_price, Decimal::new(125, 1));
    }

    #[test]
    fn one_bad_row_rejects_every_row() {
        let rows = vec![
            header_row(),
            data_row("10", "5", "12.5", ""),
            data_row("20", "5", "not-a-number", ""),
        ];
        let errs = reconcile(&rows, today()).expect_err("invalid sheet");
        assert_eq!(
            errs,
            vec!["Row 3: Net price must be a non-negative number".to_string()]
        );
    }

    #[test]
    fn every_violation_is_reported_with_its_row() {
        let rows = vec![
            header_row(),
            data_row("", "x", "-1", "garbage"),
            data_row("20", "5", "10", ""),
        ];
        let errs = reconcile(&rows, today()).expect_err("invalid sheet");
        assert_eq!(
            errs,
            vec![
                "Row 2: Item number is missing".to_string(),
                "Row 2: Required quantity must be a non-negative number".to_string(),
                "Row 2: Net price must be a non-negative number".to_string(),
                "Row 2: Delivery date is not a valid date".to_string(),
            ]
        );
    }

    #[test]
    fn serial_dates_convert_and_past_dates_are_rejected() {
        // 46235 = 2026-08-01, before the fixed "today" above.
        let rows = vec![header_row(), data_row("10", "5", "12.5", "46235")];
        let errs = reconcile(&rows, today()).expect_err("past date");
        assert_eq!(
            errs,
            vec!["Row 2: Delivery date cannot be in the past".to_string()]
        );

        // 46260 = 2026-08-26.
        let rows = vec![header_row(), data_row("10", "5", "12.5", "46260")];
        let patches = reconcile(&rows, today()).expect("future date");
        assert_eq!(
            patches[0].delivery_date,
            NaiveDate::from_ymd_opt(2026, 8, 26)
        );
    }

    #[test]
    fn rendered_dates_are_accepted_too() {
        let rows = vec![header_row(), data_row("10", "5", "12.5", "2026-12-01")];
        let patches = reconcile(&rows, today()).expect("clean sheet");
        assert_eq!(
            patches[0].delivery_date,
            NaiveDate::from_ymd_opt(2026, 12, 1)
        );
    }

    #[test]
    fn short_rows_after_the_header_are_discarded() {
        let rows = vec![
            header_row(),
            vec!["Totals".to_string(), "62.5".to_string()],
            data_row("10", "5", "12.5", ""),
        ];
        let patches = reconcile(&rows, today()).expect("clean sheet");
        assert_eq!(patches.len(), 1);
    }

    #[test]
    fn serial_base_carries_the_two_day_offset() {
        assert_eq!(parse_sheet_date("2"), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(
            parse_sheet_date("36526"),
            NaiveDate::from_ymd_opt(2000, 1, 1)
        );
        assert_eq!(parse_sheet_date("0.5"), None);
    }
}
