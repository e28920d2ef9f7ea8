//! Invoice image handling.
//!
//! Turns an uploaded file into the request-ready [`UploadedImage`] and from
//! there into Gemini `InlineData`. Pixel data is never touched: the bytes and
//! the declared MIME type travel to the model exactly as uploaded.
//!
//! # Submodules
//!
//! - `models`: The upload sum type, the packaged image and accepted formats.
//! - `packaging`: The image packager.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod models;
pub mod packaging;

pub use models::{ImageFormat, Upload, UploadedImage};
pub use packaging::package;
