//! Service layer modules for external integrations.
//!
//! Contains clients for the remote RFQ data service and the
//! negotiation chat service.

pub mod chat;
pub mod rfq_data;

pub use chat::ChatClient;
pub use rfq_data::RfqDataClient;
