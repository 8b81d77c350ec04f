use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Remote RFQ data service (OData-style)
    pub rfq_service_url: String,
    pub rfq_service_sap_client: String,
    pub rfq_service_timeout_seconds: u64,

    // Negotiation (chat) service
    pub chat_service_url: String,
    pub chat_service_timeout_seconds: u64,

    // Pricing defaults
    pub default_currency: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Remote RFQ data service
        let rfq_service_url = env::var("RFQ_SERVICE_URL").context("RFQ_SERVICE_URL must be set")?;
        let rfq_service_sap_client =
            env::var("RFQ_SERVICE_SAP_CLIENT").unwrap_or_else(|_| "100".to_string());
        let rfq_service_timeout_seconds = env::var("RFQ_SERVICE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // Negotiation service
        let chat_service_url =
            env::var("CHAT_SERVICE_URL").context("CHAT_SERVICE_URL must be set")?;
        let chat_service_timeout_seconds = env::var("CHAT_SERVICE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        let default_currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "INR".to_string());

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            rfq_service_url,
            rfq_service_sap_client,
            rfq_service_timeout_seconds,
            chat_service_url,
            chat_service_timeout_seconds,
            default_currency,
        })
    }
}
