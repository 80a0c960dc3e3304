//! Image attachments offered through the widget's file control.
//!
//! Only still/animated web image formats are accepted. Files are kept as
//! base64 so they can be embedded in a turn as inline data without further
//! processing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::AttachmentError;
use crate::session::InlineData;

/// MIME types accepted as attachments.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// The single attachment waiting to go out with the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    /// Base64 payload.
    pub data: String,
    /// MIME type of the decoded payload.
    pub mime_type: String,
}

impl PendingAttachment {
    /// Validate and encode raw file bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, AttachmentError> {
        let mime_type = normalize_mime(mime_type);
        ensure_accepted(&mime_type)?;
        if bytes.is_empty() {
            return Err(AttachmentError::Empty);
        }

        Ok(Self {
            data: STANDARD.encode(bytes),
            mime_type,
        })
    }

    /// Accept a `data:<mime>;base64,<payload>` URL as produced by a file reader.
    ///
    /// The payload is everything after the first comma.
    pub fn from_data_url(url: &str) -> Result<Self, AttachmentError> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| AttachmentError::InvalidDataUrl("missing ','".to_string()))?;

        let meta = header
            .strip_prefix("data:")
            .ok_or_else(|| AttachmentError::InvalidDataUrl("missing 'data:' scheme".to_string()))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| AttachmentError::InvalidDataUrl("payload is not base64".to_string()))?;

        let mime_type = normalize_mime(mime_type);
        ensure_accepted(&mime_type)?;
        if payload.is_empty() {
            return Err(AttachmentError::Empty);
        }
        STANDARD.decode(payload)?;

        Ok(Self {
            data: payload.to_string(),
            mime_type,
        })
    }

    /// Render back to a data URL for previews.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Convert into the inline part sent to the API.
    #[must_use]
    pub fn into_inline_data(self) -> InlineData {
        InlineData {
            data: self.data,
            mime_type: self.mime_type,
        }
    }
}

/// Whether `mime_type` is one of [`ACCEPTED_IMAGE_TYPES`].
#[must_use]
pub fn is_accepted(mime_type: &str) -> bool {
    ACCEPTED_IMAGE_TYPES.contains(&normalize_mime(mime_type).as_str())
}

/// Pick the MIME type of an upload.
///
/// The declared content type wins; uploads without one (or with the generic
/// octet-stream) fall back to a guess from the file name.
#[must_use]
pub fn resolve_mime(declared: Option<&str>, file_name: Option<&str>) -> String {
    match declared.map(normalize_mime) {
        Some(m) if !m.is_empty() && m != "application/octet-stream" => m,
        _ => file_name
            .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn ensure_accepted(mime_type: &str) -> Result<(), AttachmentError> {
    if is_accepted(mime_type) {
        Ok(())
    } else {
        Err(AttachmentError::UnsupportedType(mime_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_png_is_encoded() {
        let attachment = PendingAttachment::from_bytes(PNG_HEADER, "image/png").unwrap();
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_pdf_is_rejected() {
        let err = PendingAttachment::from_bytes(b"%PDF-1.7", "application/pdf").unwrap_err();
        assert!(matches!(err, AttachmentError::UnsupportedType(m) if m == "application/pdf"));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let err = PendingAttachment::from_bytes(&[], "image/jpeg").unwrap_err();
        assert!(matches!(err, AttachmentError::Empty));
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        assert!(is_accepted("IMAGE/WEBP"));
        assert!(is_accepted("image/gif; charset=binary"));
        assert!(!is_accepted("image/svg+xml"));
    }

    #[test]
    fn test_data_url_is_split_at_comma() {
        let attachment = PendingAttachment::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(attachment.data, "iVBORw0KGgo=");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_data_url_rejects_non_image() {
        let err = PendingAttachment::from_data_url("data:application/pdf;base64,JVBERi0=").unwrap_err();
        assert!(matches!(err, AttachmentError::UnsupportedType(_)));
    }

    #[test]
    fn test_data_url_rejects_bad_base64() {
        let err = PendingAttachment::from_data_url("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, AttachmentError::Base64(_)));
    }

    #[test]
    fn test_data_url_requires_header() {
        let err = PendingAttachment::from_data_url("iVBORw0KGgo=").unwrap_err();
        assert!(matches!(err, AttachmentError::InvalidDataUrl(_)));
    }

    #[test]
    fn test_resolve_mime_prefers_declared() {
        assert_eq!(resolve_mime(Some("image/png"), Some("cake.jpg")), "image/png");
    }

    #[test]
    fn test_resolve_mime_guesses_from_name() {
        assert_eq!(resolve_mime(None, Some("cake.jpg")), "image/jpeg");
        assert_eq!(
            resolve_mime(Some("application/octet-stream"), Some("cupcake.webp")),
            "image/webp"
        );
        assert_eq!(resolve_mime(None, None), "application/octet-stream");
    }
}
