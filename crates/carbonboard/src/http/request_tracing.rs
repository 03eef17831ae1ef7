//! Per-request tracing middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, Instrument};

/// Wrap each request in an `http.request` span and log how it went.
pub(crate) async fn trace_requests(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        debug!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}
