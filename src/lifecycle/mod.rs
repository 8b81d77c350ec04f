//! RFQ lifecycle core
//!
//! Owns the status state machine, the pure UI-state projection, the
//! pre-requisite and quotation validators, the per-view session store,
//! and the orchestrating service that sequences every user action as
//! load, validate, mutate, reload, recompute.

pub mod controller;
pub mod countdown;
pub mod projection;
pub mod session;
pub mod status;
pub mod validate;
