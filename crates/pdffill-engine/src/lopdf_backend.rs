//! lopdf-based fill backend.
//!
//! Implements [`FillBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate for loading, mutating, and saving PDF documents. This is the default
//! backend for pdffill-rs.

use pdffill_core::{FieldValue, PageGeometry, RenderInstruction};

use crate::acroform::{self, FormFieldHandle};
use crate::backend::FillBackend;
use crate::error::{BackendError, FieldError};
use crate::overlay::{self, OverlayState};

/// Upper bound on `/Parent` hops when resolving inherited page attributes.
const MAX_TREE_DEPTH: usize = 64;

/// A loaded PDF document backed by lopdf.
pub struct LopdfDocument {
    /// The underlying lopdf document.
    inner: lopdf::Document,
    /// Cached ordered list of page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<lopdf::ObjectId>,
    /// Fonts and page wrapping already installed for overlay drawing.
    overlay: OverlayState,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Object id of a page by 0-based index.
    pub fn page_id(&self, index: usize) -> Option<lopdf::ObjectId> {
        self.page_ids.get(index).copied()
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based fill backend.
///
/// # Example
///
/// ```ignore
/// use pdffill_engine::{FillBackend, LopdfBackend};
///
/// let mut doc = LopdfBackend::open(pdf_bytes)?;
/// let geometry = LopdfBackend::page_geometry(&doc, 0)?;
/// let bytes = LopdfBackend::save(&mut doc)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(*f as f64),
        _ => Err(BackendError::Malformed(format!("expected number, got {obj:?}"))),
    }
}

/// Follow a reference to the object it points at. Non-references and
/// dangling references are returned unchanged.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Read a `[llx lly urx ury]` box array, resolving indirect entries.
pub(crate) fn box_from_object(
    doc: &lopdf::Document,
    obj: &lopdf::Object,
) -> Result<[f64; 4], BackendError> {
    let array = resolve(doc, obj)
        .as_array()
        .map_err(|e| BackendError::Malformed(format!("box is not an array: {e}")))?;
    if array.len() != 4 {
        return Err(BackendError::Malformed(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    let mut out = [0.0; 4];
    for (slot, item) in out.iter_mut().zip(array) {
        *slot = object_to_f64(resolve(doc, item))?;
    }
    Ok(out)
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
///
/// Returns `None` if the key is not found anywhere in the tree.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Malformed(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj.as_reference().map_err(|e| {
                    BackendError::Malformed(format!("invalid /Parent reference: {e}"))
                })?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Malformed(
        "page tree /Parent chain too deep".to_string(),
    ))
}

/// Visible page box of a page object: CropBox if present, else MediaBox.
pub(crate) fn page_box(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<PageGeometry, BackendError> {
    let obj = match resolve_inherited(doc, page_id, b"CropBox")? {
        Some(crop) => crop,
        None => resolve_inherited(doc, page_id, b"MediaBox")?.ok_or_else(|| {
            BackendError::Malformed("MediaBox not found on page or ancestors".into())
        })?,
    };
    let [llx, lly, urx, ury] = box_from_object(doc, obj)?;
    Ok(PageGeometry::from_box(llx, lly, urx, ury))
}

/// Decode a PDF text string, handling UTF-16 BE BOM and single-byte text.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&chars)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Encode a PDF text string. ASCII stays a literal string; anything else is
/// written as UTF-16 BE with a byte order mark.
pub(crate) fn encode_pdf_string(text: &str) -> lopdf::Object {
    if text.is_ascii() {
        return lopdf::Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    lopdf::Object::String(bytes, lopdf::StringFormat::Hexadecimal)
}

/// Text form of a string or name object.
pub(crate) fn object_to_text(obj: &lopdf::Object) -> Option<String> {
    match obj {
        lopdf::Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

impl FillBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Field = FormFieldHandle;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Encrypted);
        }

        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();
        if page_ids.is_empty() {
            return Err(BackendError::Malformed("document has no pages".to_string()));
        }

        tracing::debug!(pages = page_ids.len(), "loaded document");
        Ok(LopdfDocument {
            inner,
            page_ids,
            overlay: OverlayState::default(),
        })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_geometry(doc: &Self::Document, page: usize) -> Result<PageGeometry, Self::Error> {
        let page_id = doc.page_id(page).ok_or_else(|| {
            BackendError::Malformed(format!(
                "page index {page} out of range (0..{})",
                doc.page_ids.len()
            ))
        })?;
        page_box(&doc.inner, page_id)
    }

    fn form_fields(doc: &Self::Document) -> Result<Vec<Self::Field>, Self::Error> {
        Ok(acroform::discover(&doc.inner, &doc.page_ids))
    }

    fn apply_field_value(
        doc: &mut Self::Document,
        field: &Self::Field,
        value: &FieldValue,
    ) -> Result<(), FieldError> {
        acroform::apply(&mut doc.inner, field, value)
    }

    fn lock_field(doc: &mut Self::Document, field: &Self::Field) -> Result<(), FieldError> {
        acroform::lock(&mut doc.inner, field)
    }

    fn request_appearance_regeneration(doc: &mut Self::Document) -> Result<(), FieldError> {
        acroform::set_need_appearances(&mut doc.inner)
    }

    fn draw(
        doc: &mut Self::Document,
        page: usize,
        instruction: &RenderInstruction,
    ) -> Result<(), FieldError> {
        let page_id = doc.page_id(page).ok_or(FieldError::PageOutOfRange {
            page,
            count: doc.page_ids.len(),
        })?;
        overlay::draw(&mut doc.inner, &mut doc.overlay, page_id, instruction)
    }

    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error> {
        let mut buf = Vec::new();
        doc.inner
            .save_to(&mut buf)
            .map_err(|e| BackendError::Save(e.to_string()))?;
        Ok(buf)
    }
}
