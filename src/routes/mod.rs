pub mod health;
pub mod negotiations;
pub mod rfqs;

use axum::{routing::delete, routing::get, routing::post, routing::put, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // RFQ lists
        .route("/rfqs", get(rfqs::list_rfqs))
        .route("/rfqs/drafts", get(rfqs::list_drafts))
        // View lifecycle
        .route("/rfqs/:rfq_number/:bidder", get(rfqs::get_view))
        .route(
            "/rfqs/:rfq_number/:bidder/session",
            delete(rfqs::close_session),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/countdown",
            get(rfqs::get_countdown),
        )
        // Invitation
        .route("/rfqs/:rfq_number/:bidder/accept", post(rfqs::accept_rfq))
        .route("/rfqs/:rfq_number/:bidder/reject", post(rfqs::reject_rfq))
        // Pre-requisites
        .route(
            "/rfqs/:rfq_number/:bidder/prerequisites",
            post(rfqs::save_prerequisites),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/prerequisites",
            put(rfqs::update_prerequisites),
        )
        // Quotation
        .route(
            "/rfqs/:rfq_number/:bidder/quotation/preview",
            post(rfqs::preview_quotation),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/quotation/submit",
            post(rfqs::submit_quotation),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/quotation/draft",
            post(rfqs::draft_quotation),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/quotation",
            put(rfqs::update_quotation),
        )
        .route("/rfqs/:rfq_number/:bidder/revise", post(rfqs::revise))
        // Line edits
        .route(
            "/rfqs/:rfq_number/:bidder/items/:item_number/price",
            put(rfqs::update_price),
        )
        .route("/rfqs/:rfq_number/:bidder/charges", post(rfqs::add_charge))
        .route(
            "/rfqs/:rfq_number/:bidder/charges",
            delete(rfqs::delete_charges),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/attachments",
            post(rfqs::add_attachment),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/attachments/:index",
            delete(rfqs::delete_attachment),
        )
        // Import / export
        .route("/rfqs/:rfq_number/:bidder/import", post(rfqs::import_sheet))
        .route(
            "/rfqs/:rfq_number/:bidder/export/workbook",
            get(rfqs::export_workbook),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/export/pdf",
            get(rfqs::export_pdf),
        )
        .route(
            "/rfqs/:rfq_number/:bidder/template",
            post(rfqs::generate_template),
        )
        // Negotiations
        .route(
            "/negotiations/:rfq_number/:bidder/:material_no/latest",
            get(negotiations::latest_offer),
        )
        .route(
            "/negotiations/:rfq_number/:bidder/:material_no/best-offer",
            post(negotiations::submit_best_offer),
        )
        .route(
            "/negotiations/messages/:id/accept",
            post(negotiations::accept_offer),
        )
        .route(
            "/negotiations/messages/:id/reject",
            post(negotiations::reject_offer),
        )
}
