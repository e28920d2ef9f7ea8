//! Data models for the Gemini `generateContent` API.
//!
//! Only the subset of the public v1beta surface that invoice extraction
//! needs is modelled: multimodal user content in, candidate text out.

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;

pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
