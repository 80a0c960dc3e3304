//! Error types shared across the relay.
//!
//! Every failure is local to one exchange: nothing here is fatal to the
//! process. The HTTP layer maps these onto status codes, and [`RelayError`]
//! always collapses into the fallback reply shown to the user.

use thiserror::Error;

/// Failure of one request/response cycle against the generative API.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The API answered with a non-2xx status.
    #[error("HTTP error: {status} - {message}")]
    Http {
        /// Status code returned by the API.
        status: u16,
        /// Error message from the API envelope, or the raw body.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not valid JSON for the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body parsed but carried no usable candidate text.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The configured endpoint could not be turned into a URL.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Rejection of a file offered as the pending attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// MIME type outside the accepted image set.
    #[error("Unsupported attachment type: {0}")]
    UnsupportedType(String),

    /// Zero-length upload.
    #[error("Attachment is empty")]
    Empty,

    /// A `data:` URL without a base64 image payload.
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The payload of a data URL was not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Precondition failure of `submit_message`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Neither text nor an attachment was supplied.
    #[error("Message has no text and no attachment")]
    EmptyMessage,
}
