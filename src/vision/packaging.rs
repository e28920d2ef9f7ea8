// Image packaging
// Author: kelexine (https://github.com/kelexine)

use super::models::{Upload, UploadedImage};
use crate::error::{ExtractorError, Result};

/// Package an upload for the inference request.
///
/// Fails with `MissingInput` when no file was chosen or the file is empty.
/// Bytes and MIME type are passed through unchanged.
pub fn package(upload: Upload) -> Result<UploadedImage> {
    match upload {
        Upload::Present {
            mime_type,
            bytes,
            file_name,
        } if !bytes.is_empty() => Ok(UploadedImage {
            mime_type,
            bytes,
            file_name,
        }),
        Upload::Present { .. } | Upload::Absent => {
            Err(ExtractorError::MissingInput("No file uploaded".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use bytes::Bytes;
    use proptest::prelude::*;

    #[test]
    fn test_absent_upload_is_missing_input() {
        let err = package(Upload::Absent).unwrap_err();
        assert!(matches!(err, ExtractorError::MissingInput(_)));
        assert_eq!(err.to_string(), "No file uploaded");
    }

    #[test]
    fn test_empty_upload_is_missing_input() {
        let upload = Upload::Present {
            mime_type: "image/png".to_string(),
            bytes: Bytes::new(),
            file_name: Some("empty.png".to_string()),
        };
        assert!(matches!(package(upload), Err(ExtractorError::MissingInput(_))));
    }

    #[test]
    fn test_unlisted_mime_type_passes_through() {
        let upload = Upload::Present {
            mime_type: "image/webp".to_string(),
            bytes: Bytes::from_static(b"RIFF"),
            file_name: None,
        };
        let image = package(upload).unwrap();
        assert_eq!(image.mime_type(), "image/webp");
    }

    proptest! {
        #[test]
        fn prop_package_passes_bytes_through(
            data in proptest::collection::vec(any::<u8>(), 1..4096),
            mime in prop_oneof![Just("image/png"), Just("image/jpeg")],
        ) {
            let upload = Upload::Present {
                mime_type: mime.to_string(),
                bytes: Bytes::from(data.clone()),
                file_name: Some("invoice".to_string()),
            };

            let image = package(upload).unwrap();
            prop_assert_eq!(image.bytes().as_ref(), data.as_slice());
            prop_assert_eq!(image.mime_type(), mime);

            let inline = image.to_inline_data();
            prop_assert_eq!(inline.mime_type.as_str(), mime);
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .unwrap();
            prop_assert_eq!(decoded, data);
        }
    }
}
