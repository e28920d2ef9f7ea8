// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    extract_api_handler, extract_page_handler, health_handler, index_handler, metrics_handler,
};
use crate::config::AppConfig;
use crate::error::Result;
use crate::extractor::InvoiceModel;
use axum::extract::DefaultBodyLimit;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Immutable after startup; shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub model: Arc<dyn InvoiceModel>,
}

pub fn create_router(config: AppConfig, model: Arc<dyn InvoiceModel>) -> Result<Router> {
    let max_body_bytes = config.server.max_body_bytes;
    let state = AppState { config, model };

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/extract", post(extract_page_handler))
        .route("/api/extract", post(extract_api_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Transport limit only; the model service decides what image sizes it accepts.
        // Enforced while the multipart body is read, so an oversized submit
        // reaches the handler as a field error and renders as a Failed page.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state);

    Ok(app)
}
