//! `x-request-id` assignment and propagation.

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Returns the pair of layers that stamp a UUID request id on inbound
/// requests (unless the caller already sent one) and echo it on the
/// response.
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header = HeaderName::from_static(X_REQUEST_ID);
    let set = SetRequestIdLayer::new(header.clone(), MakeRequestUuid);
    let propagate = PropagateRequestIdLayer::new(header);
    (set, propagate)
}
