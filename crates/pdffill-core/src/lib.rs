//! pdffill-core: Backend-independent data types and algorithms.
//!
//! This crate provides the field model ([`FieldDefinition`], [`FieldValue`]),
//! the analysis-space to PDF-space transform, overlay planning with text
//! fitting, and the error/report types used by pdffill-rs. It has no required dependencies.

pub mod error;
pub mod field;
pub mod font_metrics;
pub mod form_field;
pub mod geometry;
pub mod options;
pub mod render;

pub use error::{FillError, FillMode, FillReport, FillWarning, FillWarningCode, FilledField};
pub use field::{FieldDefinition, FieldKind, FieldValue, FieldValues, index_definitions};
pub use font_metrics::{fit_text, text_width};
pub use form_field::{
    FLAG_COMBO, FLAG_EDIT, FLAG_PUSH_BUTTON, FLAG_RADIO, FLAG_READ_ONLY, FormFieldInfo,
    FormFieldKind, lookup_field, match_option,
};
pub use geometry::{
    BBox, CoordinateSpace, PageGeometry, PdfPoint, PdfRect, Point, ScaleFactor, Size,
    to_pdf_space,
};
pub use options::FillOptions;
pub use render::{OverlayStyle, RenderInstruction, plan_overlay};
