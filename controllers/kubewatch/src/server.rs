//! Metrics endpoint.
//!
//! Serves the field value gauges as Prometheus text at `GET /metrics`.

use crate::error::ControllerError;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tracing::info;
use watch_core::FieldValueGauges;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Serves `/metrics` on `address` until the task is cancelled.
pub async fn serve(address: String, gauges: Arc<FieldValueGauges>) -> Result<(), ControllerError> {
    let bind = bind_address(&address);
    let app = Router::new()
        .route("/metrics", get(metrics))
        .with_state(gauges);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Metrics server listening on {}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// `:6666` listens on every interface; anything else is used as is.
pub fn bind_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

async fn metrics(State(gauges): State<Arc<FieldValueGauges>>) -> Response {
    match gauges.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
