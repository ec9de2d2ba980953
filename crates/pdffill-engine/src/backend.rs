//! Fill backend trait.
//!
//! Defines the [`FillBackend`] trait that abstracts the document operations a
//! fill call needs: load, page geometry, form discovery and mutation, overlay
//! drawing, and save.

use pdffill_core::{FieldValue, FillError, FormFieldInfo, PageGeometry, RenderInstruction};

use crate::error::FieldError;

/// Trait abstracting the document operations of a fill call.
///
/// # Associated Types
///
/// - `Document`: The loaded, mutable document.
/// - `Field`: A discovered form field, carrying its [`FormFieldInfo`].
/// - `Error`: Backend-specific error type, convertible to [`FillError`].
///
/// Document-level operations fail with `Self::Error`. Per-field operations
/// fail with [`FieldError`] so the caller can record them and move on.
///
/// # Usage
///
/// ```ignore
/// let mut doc = MyBackend::open(pdf_bytes)?;
/// let fields = MyBackend::form_fields(&doc)?;
/// let geometry = MyBackend::page_geometry(&doc, 0)?;
/// MyBackend::draw(&mut doc, 0, &instruction)?;
/// let bytes = MyBackend::save(&mut doc)?;
/// ```
pub trait FillBackend {
    /// The loaded document type.
    type Document;

    /// A discovered form field.
    type Field: AsRef<FormFieldInfo>;

    /// Backend-specific error type, convertible to [`FillError`].
    type Error: std::error::Error + Into<FillError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid PDF or the document is
    /// encrypted.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Return the number of pages in the document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Geometry of the visible page box for a 0-based page index.
    ///
    /// The CropBox is used when present, otherwise the (possibly inherited)
    /// MediaBox.
    fn page_geometry(doc: &Self::Document, page: usize) -> Result<PageGeometry, Self::Error>;

    /// Discover the terminal fields of the document's AcroForm.
    ///
    /// A document without an AcroForm yields an empty list.
    fn form_fields(doc: &Self::Document) -> Result<Vec<Self::Field>, Self::Error>;

    /// Set a value on a form field.
    fn apply_field_value(
        doc: &mut Self::Document,
        field: &Self::Field,
        value: &FieldValue,
    ) -> Result<(), FieldError>;

    /// Mark a form field read-only.
    fn lock_field(doc: &mut Self::Document, field: &Self::Field) -> Result<(), FieldError>;

    /// Ask viewers to regenerate field appearances.
    fn request_appearance_regeneration(doc: &mut Self::Document) -> Result<(), FieldError>;

    /// Draw an overlay instruction onto a page.
    fn draw(
        doc: &mut Self::Document,
        page: usize,
        instruction: &RenderInstruction,
    ) -> Result<(), FieldError>;

    /// Serialize the document.
    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error>;
}
