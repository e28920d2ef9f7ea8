//! Axum-based HTTP server hosting the invoice extractor page.
//!
//! # Components
//!
//! - `handlers`: The page, submit, JSON API, health and metrics endpoints.
//! - `page`: View states of the extractor page and their HTML rendering.
//! - `routes`: The router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
pub mod page;
mod routes;

pub use handlers::{collect_input, ExtractResponse, HealthResponse, HealthStatus, IMAGE_FIELD, PROMPT_FIELD};
pub use page::{submit, ViewState};
pub use routes::{create_router, AppState};
