//! Negotiation routes
//!
//! Thin passthrough to the chat service: latest counter-offer lookup,
//! best-offer submission, and accept/reject of a standing offer. The
//! bidder path segment doubles as the chat-side supplier id.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::domain::negotiation::BestOfferRequest;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BuyerParams {
    pub buyer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BestOfferBody {
    pub buyer_id: String,
    pub price: Decimal,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// GET /negotiations/:rfq_number/:bidder/:material_no/latest
///
/// `data` is null when the thread has no offers yet.
pub async fn latest_offer(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder, material_no)): Path<(String, String, String)>,
    Query(params): Query<BuyerParams>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state
        .chat
        .latest_offer(&params.buyer_id, &bidder, &rfq_number, &material_no)
        .await?;
    Ok(DataResponse::new(offer))
}

/// POST /negotiations/:rfq_number/:bidder/:material_no/best-offer
pub async fn submit_best_offer(
    State(state): State<Arc<AppState>>,
    Path((rfq_number, bidder, material_no)): Path<(String, String, String)>,
    Json(body): Json<BestOfferBody>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        rfq_number = %rfq_number,
        bidder = %bidder,
        material_no = %material_no,
        "Submitting best offer"
    );

    let offer = state
        .chat
        .submit_best_offer(
            &body.buyer_id,
            &bidder,
            &rfq_number,
            &material_no,
            &BestOfferRequest {
                price: body.price,
                remarks: body.remarks,
            },
        )
        .await?;
    Ok(DataResponse::new(offer))
}

/// POST /negotiations/messages/:id/accept
pub async fn accept_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(offer_id = %id, "Accepting counter-offer");

    let offer = state.chat.accept_offer(&id).await?;
    Ok(DataResponse::new(offer))
}

/// POST /negotiations/messages/:id/reject
pub async fn reject_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(offer_id = %id, "Rejecting counter-offer");

    let offer = state.chat.reject_offer(&id).await?;
    Ok(DataResponse::new(offer))
}
