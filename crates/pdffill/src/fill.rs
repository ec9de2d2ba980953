//! The fill orchestrator.
//!
//! [`Filler`] loads a document, sets values on the document's own form
//! fields where it has them, draws the rest onto the page from the supplied
//! [`FieldDefinition`]s, and serializes the result.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use pdffill_core::{
    CoordinateSpace, FieldDefinition, FieldValue, FieldValues, FillError, FillMode, FillOptions,
    FillReport, FillWarning, FillWarningCode, FormFieldInfo, index_definitions, lookup_field,
    plan_overlay,
};
use pdffill_engine::{FillBackend, LopdfBackend};

/// A filled document and the record of how it was filled.
#[derive(Debug, Clone)]
pub struct FilledDocument {
    /// Serialized PDF bytes.
    pub bytes: Vec<u8>,
    pub report: FillReport,
}

/// Fills documents with a fixed set of options.
///
/// Holds no document state, so one `Filler` can serve any number of
/// independent fill calls, including concurrently.
///
/// # Example
///
/// ```ignore
/// use pdffill::{FieldValues, FillOptions, Filler};
///
/// let filler = Filler::new(FillOptions::default());
/// let filled = filler.fill(&pdf_bytes, &values, &definitions)?;
/// std::fs::write("filled.pdf", &filled.bytes)?;
/// ```
#[derive(Debug, Clone)]
pub struct Filler<B: FillBackend = LopdfBackend> {
    options: FillOptions,
    backend: PhantomData<fn() -> B>,
}

impl Filler<LopdfBackend> {
    /// Create a filler using the lopdf backend.
    pub fn new(options: FillOptions) -> Self {
        Self::with_backend(options)
    }
}

impl Default for Filler<LopdfBackend> {
    fn default() -> Self {
        Self::new(FillOptions::default())
    }
}

/// A value that still needs to be drawn after the form pass.
struct Pending<'a> {
    name: &'a str,
    value: &'a FieldValue,
    definition: &'a FieldDefinition,
}

impl<B: FillBackend> Filler<B> {
    /// Create a filler for an explicit backend.
    pub fn with_backend(options: FillOptions) -> Self {
        Self {
            options,
            backend: PhantomData,
        }
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Fill a document.
    ///
    /// Empty values are skipped. A value whose name matches neither a form
    /// field nor a definition is reported as [`FillWarningCode::FieldNotFound`].
    /// Per-field failures are reported as warnings and never abort the call.
    ///
    /// # Errors
    ///
    /// Returns [`FillError::InvalidOptions`] for inconsistent options,
    /// [`FillError::Load`] or [`FillError::Encrypted`] if the document cannot
    /// be opened for modification, and [`FillError::Serialize`] if it cannot
    /// be written back out.
    pub fn fill(
        &self,
        bytes: &[u8],
        values: &FieldValues,
        definitions: &[FieldDefinition],
    ) -> Result<FilledDocument, FillError> {
        self.options.validate()?;
        let _span = tracing::debug_span!("fill", values = values.len()).entered();

        let mut doc = B::open(bytes).map_err(Into::<FillError>::into)?;
        let form = if self.options.use_form {
            B::form_fields(&doc).map_err(Into::<FillError>::into)?
        } else {
            Vec::new()
        };
        let definitions = index_definitions(definitions);
        let mut report = FillReport::new();
        let mut pending = Vec::new();
        let mut form_changed = false;

        for (name, value) in values {
            if value.is_empty() {
                tracing::debug!(field = %name, "skipping empty value");
                report.skipped_empty.push(name.clone());
                continue;
            }
            let definition = definitions.get(name.as_str()).copied();

            if let Some(field) = lookup_field(&form, name, self.options.case_insensitive_names) {
                let info = field.as_ref();
                match B::apply_field_value(&mut doc, field, value) {
                    Ok(()) => {
                        form_changed = true;
                        tracing::debug!(field = %name, form_field = %info.name, kind = %info.kind, "set form field");
                        if self.options.lock_filled_fields {
                            if let Err(err) = B::lock_field(&mut doc, field) {
                                tracing::warn!(field = %name, error = %err, "failed to lock form field");
                            }
                        }
                        report.record_filled(name, FillMode::Form, info.page_index);
                        continue;
                    }
                    Err(err) if definition.is_some() => {
                        tracing::debug!(field = %name, error = %err, "form fill failed, drawing instead");
                    }
                    Err(err) => {
                        tracing::warn!(field = %name, error = %err, "form fill failed");
                        let mut warning =
                            FillWarning::new(err.warning_code(), name.as_str(), err.to_string());
                        if let Some(page) = info.page_index {
                            warning = warning.on_page(page);
                        }
                        report.record_warning(warning);
                        continue;
                    }
                }
            }

            match definition {
                Some(definition) => pending.push(Pending {
                    name,
                    value,
                    definition,
                }),
                None => {
                    tracing::warn!(field = %name, "no form field or definition for value");
                    report.record_warning(FillWarning::new(
                        FillWarningCode::FieldNotFound,
                        name.as_str(),
                        "no form field or field definition with this name",
                    ));
                }
            }
        }

        let mut spaces = BTreeMap::new();
        for item in pending {
            self.draw_field(&mut doc, &item, &mut spaces, &mut report);
        }

        if form_changed {
            if let Err(err) = B::request_appearance_regeneration(&mut doc) {
                tracing::warn!(error = %err, "failed to request appearance regeneration");
            }
        }

        let bytes = B::save(&mut doc).map_err(Into::<FillError>::into)?;
        tracing::info!(
            form = report.count(FillMode::Form),
            overlay = report.count(FillMode::Overlay),
            warnings = report.warnings.len(),
            "fill complete"
        );
        Ok(FilledDocument { bytes, report })
    }

    /// Read a document from disk and fill it.
    #[cfg(feature = "std")]
    pub fn fill_file(
        &self,
        path: impl AsRef<std::path::Path>,
        values: &FieldValues,
        definitions: &[FieldDefinition],
    ) -> Result<FilledDocument, FillError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.fill(&bytes, values, definitions)
    }

    /// Draw one field in overlay mode, recording the outcome.
    fn draw_field(
        &self,
        doc: &mut B::Document,
        item: &Pending<'_>,
        spaces: &mut BTreeMap<usize, CoordinateSpace>,
        report: &mut FillReport,
    ) {
        let page = item.definition.page;
        let page_count = B::page_count(doc);
        if page >= page_count {
            tracing::warn!(field = %item.name, page, page_count, "definition points past the last page");
            report.record_warning(
                FillWarning::new(
                    FillWarningCode::PageOutOfRange,
                    item.name,
                    format!("page {page} does not exist (document has {page_count})"),
                )
                .on_page(page),
            );
            return;
        }

        let space = match spaces.get(&page) {
            Some(space) => *space,
            None => match B::page_geometry(doc, page) {
                Ok(geometry) => {
                    let space = CoordinateSpace::resolve(
                        &geometry,
                        self.options.analysis_size,
                        self.options.scale_factor(),
                    );
                    spaces.insert(page, space);
                    space
                }
                Err(err) => {
                    let err: FillError = err.into();
                    tracing::warn!(field = %item.name, page, error = %err, "cannot read page geometry");
                    report.record_warning(
                        FillWarning::new(
                            FillWarningCode::FieldRenderFailed,
                            item.name,
                            err.to_string(),
                        )
                        .on_page(page),
                    );
                    return;
                }
            },
        };

        let Some(instruction) =
            plan_overlay(item.definition, item.value, &space, &self.options.style)
        else {
            tracing::debug!(field = %item.name, "nothing to draw");
            return;
        };

        match B::draw(doc, page, &instruction) {
            Ok(()) => {
                let origin = instruction.origin();
                tracing::debug!(field = %item.name, page, x = origin.x, y = origin.y, "drew field");
                report.record_filled(item.name, FillMode::Overlay, Some(page));
            }
            Err(err) => {
                tracing::warn!(field = %item.name, page, error = %err, "failed to draw field");
                report.record_warning(
                    FillWarning::new(err.warning_code(), item.name, err.to_string()).on_page(page),
                );
            }
        }
    }

    /// List the form fields of a document.
    ///
    /// Returns an empty list for documents without an AcroForm.
    pub fn form_fields(bytes: &[u8]) -> Result<Vec<FormFieldInfo>, FillError> {
        let doc = B::open(bytes).map_err(Into::<FillError>::into)?;
        let fields = B::form_fields(&doc).map_err(Into::<FillError>::into)?;
        Ok(fields.iter().map(|f| f.as_ref().clone()).collect())
    }
}

/// Fill a document with the default options.
///
/// `scale` is an optional analysis-to-page correction factor; `None` means
/// analysis coordinates are already in page points. Without `definitions`
/// only the document's own form fields can be filled.
///
/// # Errors
///
/// See [`Filler::fill`].
pub fn fill(
    bytes: &[u8],
    values: &FieldValues,
    definitions: Option<&[FieldDefinition]>,
    scale: Option<f64>,
) -> Result<Vec<u8>, FillError> {
    let options = FillOptions {
        scale,
        ..FillOptions::default()
    };
    let filled = Filler::new(options).fill(bytes, values, definitions.unwrap_or_default())?;
    Ok(filled.bytes)
}

/// List the form fields of a document using the lopdf backend.
///
/// # Errors
///
/// Returns [`FillError::Load`] or [`FillError::Encrypted`] if the document
/// cannot be opened.
pub fn form_fields(bytes: &[u8]) -> Result<Vec<FormFieldInfo>, FillError> {
    Filler::<LopdfBackend>::form_fields(bytes)
}
