//! Error types for the fill backend.
//!
//! Uses [`thiserror`] for ergonomic error derivation. [`BackendError`] covers
//! document-level failures and converts into the fatal [`FillError`].
//! [`FieldError`] covers a single field and maps onto a [`FillWarningCode`];
//! it never aborts a fill call.

use pdffill_core::{FillError, FillWarningCode, FormFieldKind};
use thiserror::Error;

/// Document-level error from a fill backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The bytes could not be parsed as a PDF document.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// The document is encrypted.
    #[error("document is encrypted")]
    Encrypted,

    /// The document structure is unusable (missing page box, broken page tree).
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document could not be written back out.
    #[error("failed to save document: {0}")]
    Save(String),

    /// Error reading or writing PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] FillError),
}

impl From<BackendError> for FillError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) | BackendError::Malformed(msg) => FillError::Load(msg),
            BackendError::Encrypted => FillError::Encrypted,
            BackendError::Save(msg) => FillError::Serialize(msg),
            BackendError::Io(e) => FillError::Io(e.to_string()),
            BackendError::Core(e) => e,
        }
    }
}

/// Failure to set or draw one field.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The form field kind cannot hold a value directly.
    #[error("{0} fields cannot be set directly")]
    Unsupported(FormFieldKind),

    /// No choice option matches the requested value.
    #[error("no option matches {value:?} (available: {})", .options.join(", "))]
    OptionNotFound { value: String, options: Vec<String> },

    /// The page the field lives on does not exist.
    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    /// An object the field depends on is missing or has the wrong type.
    #[error("broken object: {0}")]
    Object(String),

    /// Content-stream encoding failed.
    #[error("failed to encode drawing: {0}")]
    Draw(String),
}

impl FieldError {
    /// The warning code this failure is reported under.
    pub fn warning_code(&self) -> FillWarningCode {
        match self {
            FieldError::Unsupported(_) => FillWarningCode::UnsupportedFieldType,
            FieldError::OptionNotFound { .. } => FillWarningCode::OptionNotFound,
            FieldError::PageOutOfRange { .. } => FillWarningCode::PageOutOfRange,
            FieldError::Object(_) | FieldError::Draw(_) => FillWarningCode::FieldRenderFailed,
        }
    }
}

impl From<lopdf::Error> for FieldError {
    fn from(err: lopdf::Error) -> Self {
        FieldError::Object(err.to_string())
    }
}
