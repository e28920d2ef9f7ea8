// Vision models and types
// Author: kelexine (https://github.com/kelexine)

use crate::models::gemini::InlineData;
use base64::Engine;
use bytes::Bytes;

/// MIME type assumed when the browser does not declare one.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A file picker submission: either a file was chosen or it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Present {
        mime_type: String,
        bytes: Bytes,
        file_name: Option<String>,
    },
    Absent,
}

impl Upload {
    pub fn is_present(&self) -> bool {
        matches!(self, Upload::Present { .. })
    }
}

/// An invoice image ready to be sent to the model.
///
/// Only [`crate::vision::package`] builds one, so `bytes` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub(crate) mime_type: String,
    pub(crate) bytes: Bytes,
    pub(crate) file_name: Option<String>,
}

impl UploadedImage {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Gemini inline part: declared MIME type plus base64 of the raw bytes.
    pub fn to_inline_data(&self) -> InlineData {
        InlineData {
            mime_type: self.mime_type.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
        }
    }
}

/// Image formats offered by the file picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Value of the picker's `accept` attribute (jpg, jpeg, png).
    pub const ACCEPT: &'static str = ".jpg,.jpeg,.png,image/jpeg,image/png";

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Try to detect format from MIME type
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trip() {
        for format in [ImageFormat::Jpeg, ImageFormat::Png] {
            assert_eq!(ImageFormat::from_mime_type(format.mime_type()), Some(format));
        }
        assert_eq!(ImageFormat::from_mime_type("IMAGE/JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }
}
