//! pdffill: Fill arbitrary PDF documents with named field values.
//!
//! This is the public API facade crate for pdffill-rs. It re-exports types from
//! pdffill-core and uses pdffill-engine for reading, modifying, and writing PDFs.
//!
//! # Architecture
//!
//! - **pdffill-core**: Backend-independent data model and placement algorithms
//! - **pdffill-engine**: lopdf backend (AcroForm filling, overlay drawing)
//! - **pdffill** (this crate): The fill orchestrator that ties everything together
//!
//! Documents with an AcroForm have their fields set directly. Values without
//! a matching form field are drawn onto the page at the position given by a
//! [`FieldDefinition`].

mod fill;

pub use fill::{FilledDocument, Filler, fill, form_fields};
pub use pdffill_core::{
    BBox, CoordinateSpace, FieldDefinition, FieldKind, FieldValue, FieldValues, FillError,
    FillMode, FillOptions, FillReport, FillWarning, FillWarningCode, FilledField, FormFieldInfo,
    FormFieldKind, OverlayStyle, PageGeometry, PdfPoint, PdfRect, Point, RenderInstruction,
    ScaleFactor, Size, to_pdf_space,
};
pub use pdffill_engine::{FillBackend, LopdfBackend};

pub use pdffill_core;
pub use pdffill_engine;
