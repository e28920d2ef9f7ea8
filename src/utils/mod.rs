//! Utility functions and helpers for invoice-lens.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and API key sanitization.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
