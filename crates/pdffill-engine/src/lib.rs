//! pdffill-engine: lopdf backend for pdffill-rs.
//!
//! This crate implements the document side of a fill: loading and saving,
//! page geometry, AcroForm discovery and the form-aware filler, and overlay
//! drawing. It depends on pdffill-core for shared data types.

pub mod acroform;
pub mod backend;
pub mod error;
pub mod lopdf_backend;
pub mod overlay;

pub use acroform::{FormFieldHandle, Widget};
pub use backend::FillBackend;
pub use error::{BackendError, FieldError};
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use pdffill_core;
