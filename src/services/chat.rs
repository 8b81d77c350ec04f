//! Client for the negotiation chat service.
//!
//! The chat service owns counter-offer threads between buyers and
//! suppliers. This backend only ever reads the latest offer for a
//! material and pushes the supplier's responses; thread history and
//! notification fan-out stay on the chat side.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::negotiation::{BestOfferRequest, CounterOffer};
use crate::error::ApiError;

/// Client for the chat service.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

/// Error response from the chat service.
#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    #[allow(dead_code)]
    code: String,
    message: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Chat client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        debug!(url = %url, "Chat service request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat service request failed");
                ApiError::upstream(format!("Chat service unavailable: {e}"))
            })?;

        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ApiError> {
        let status = response.status();

        if status.is_success() {
            return response.json::<R>().await.map_err(|e| {
                error!(error = %e, "Failed to parse chat service response");
                ApiError::upstream(format!("Invalid chat service response: {e}"))
            });
        }

        let message = response
            .json::<ChatErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("Chat service error: {status}"));

        match status {
            StatusCode::BAD_REQUEST => Err(ApiError::bad_request(message)),
            StatusCode::NOT_FOUND => Err(ApiError::not_found(message)),
            StatusCode::CONFLICT => Err(ApiError::conflict(message)),
            _ => {
                error!(status = %status, message = %message, "Chat service error");
                Err(ApiError::upstream(message))
            }
        }
    }

    /// Latest counter-offer for one material of one RFQ thread, or
    /// `None` when the thread has no offers yet.
    #[instrument(skip(self))]
    pub async fn latest_offer(
        &self,
        buyer_id: &str,
        supplier_id: &str,
        rfq_number: &str,
        material_no: &str,
    ) -> Result<Option<CounterOffer>, ApiError> {
        let url = format!("{}/v1/offers/latest", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("buyer_id", buyer_id),
                ("supplier_id", supplier_id),
                ("rfq_number", rfq_number),
                ("material_no", material_no),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat service request failed");
                ApiError::upstream(format!("Chat service unavailable: {e}"))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::decode(response).await.map(Some)
    }

    /// Push the supplier's best offer into the thread.
    #[instrument(skip(self, offer))]
    pub async fn submit_best_offer(
        &self,
        buyer_id: &str,
        supplier_id: &str,
        rfq_number: &str,
        material_no: &str,
        offer: &BestOfferRequest,
    ) -> Result<CounterOffer, ApiError> {
        #[derive(Serialize)]
        struct Request<'a> {
            buyer_id: &'a str,
            supplier_id: &'a str,
            rfq_number: &'a str,
            material_no: &'a str,
            price: rust_decimal::Decimal,
            #[serde(skip_serializing_if = "Option::is_none")]
            remarks: Option<&'a str>,
        }

        self.post(
            "/v1/offers/best",
            &Request {
                buyer_id,
                supplier_id,
                rfq_number,
                material_no,
                price: offer.price,
                remarks: offer.remarks.as_deref(),
            },
        )
        .await
    }

    /// Accept the buyer's standing counter-offer.
    #[instrument(skip(self))]
    pub async fn accept_offer(&self, offer_id: &str) -> Result<CounterOffer, ApiError> {
        #[derive(Serialize)]
        struct Empty {}

        self.post(&format!("/v1/offers/{offer_id}/accept"), &Empty {})
            .await
    }

    /// Reject the buyer's standing counter-offer.
    #[instrument(skip(self))]
    pub async fn reject_offer(&self, offer_id: &str) -> Result<CounterOffer, ApiError> {
        #[derive(Serialize)]
        struct Empty {}

        self.post(&format!("/v1/offers/{offer_id}/reject"), &Empty {})
            .await
    }

    /// Check chat service health.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        self.client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Chat service health check failed")?
            .error_for_status()
            .context("Chat service unhealthy")?;

        Ok(())
    }
}
