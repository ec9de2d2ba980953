//! Error, warning, and report types for pdffill-rs.
//!
//! Provides [`FillError`] for fatal errors that abort a fill call,
//! [`FillWarning`] for per-field issues that allow the call to continue, and
//! [`FillReport`] collecting what happened to every requested field.

use std::fmt;

/// Fatal error types for a fill call.
///
/// Any of these aborts the whole operation; no partial document is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum FillError {
    /// The input bytes are not a parseable PDF document.
    Load(String),
    /// The document is encrypted and cannot be modified.
    Encrypted,
    /// The modified document could not be serialized.
    Serialize(String),
    /// Fill options are inconsistent (e.g. a non-positive scale factor).
    InvalidOptions(String),
    /// I/O error reading or writing document data.
    Io(String),
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::Load(msg) => write!(f, "failed to load document: {msg}"),
            FillError::Encrypted => write!(f, "document is encrypted and cannot be filled"),
            FillError::Serialize(msg) => write!(f, "failed to serialize document: {msg}"),
            FillError::InvalidOptions(msg) => write!(f, "invalid fill options: {msg}"),
            FillError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for FillError {}

impl From<std::io::Error> for FillError {
    fn from(err: std::io::Error) -> Self {
        FillError::Io(err.to_string())
    }
}

/// Machine-readable code for a recoverable per-field issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum FillWarningCode {
    /// Neither a form field nor a positioned definition matches the name.
    FieldNotFound,
    /// The form field exists but its kind cannot be set directly.
    UnsupportedFieldType,
    /// A choice field has no option matching the value.
    OptionNotFound,
    /// Setting or drawing the field failed.
    FieldRenderFailed,
    /// The definition points at a page the document does not have.
    PageOutOfRange,
}

impl FillWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FillWarningCode::FieldNotFound => "FIELD_NOT_FOUND",
            FillWarningCode::UnsupportedFieldType => "UNSUPPORTED_FIELD_TYPE",
            FillWarningCode::OptionNotFound => "OPTION_NOT_FOUND",
            FillWarningCode::FieldRenderFailed => "FIELD_RENDER_FAILED",
            FillWarningCode::PageOutOfRange => "PAGE_OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for FillWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue with one field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillWarning {
    pub code: FillWarningCode,
    pub field_name: String,
    pub description: String,
    /// Page (0-indexed) the field was headed for, if known.
    pub page: Option<usize>,
}

impl FillWarning {
    pub fn new(
        code: FillWarningCode,
        field_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code,
            field_name: field_name.into(),
            description: description.into(),
            page: None,
        }
    }

    /// Attach page context (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

impl fmt::Display for FillWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field_name, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        Ok(())
    }
}

/// How a field ended up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FillMode {
    /// Set on the document's own form field.
    Form,
    /// Drawn onto the page.
    Overlay,
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMode::Form => f.write_str("form"),
            FillMode::Overlay => f.write_str("overlay"),
        }
    }
}

/// A field that was successfully placed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilledField {
    pub field_name: String,
    pub mode: FillMode,
    pub page: Option<usize>,
}

/// Per-call record of placed fields and recoverable issues.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillReport {
    pub filled: Vec<FilledField>,
    pub skipped_empty: Vec<String>,
    pub warnings: Vec<FillWarning>,
}

impl FillReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_filled(&mut self, field_name: &str, mode: FillMode, page: Option<usize>) {
        self.filled.push(FilledField {
            field_name: field_name.to_string(),
            mode,
            page,
        });
    }

    pub fn record_warning(&mut self, warning: FillWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if every non-empty value was placed.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Whether `field_name` was placed, in any mode.
    pub fn was_filled(&self, field_name: &str) -> bool {
        self.filled.iter().any(|f| f.field_name == field_name)
    }

    /// Number of fields placed in `mode`.
    pub fn count(&self, mode: FillMode) -> usize {
        self.filled.iter().filter(|f| f.mode == mode).count()
    }

    /// Warnings carrying `code`.
    pub fn warnings_with(&self, code: FillWarningCode) -> impl Iterator<Item = &FillWarning> {
        self.warnings.iter().filter(move |w| w.code == code)
    }
}
