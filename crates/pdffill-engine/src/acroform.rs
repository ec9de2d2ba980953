//! AcroForm discovery and the form-aware filler.
//!
//! [`discover`] walks `/AcroForm /Fields` into [`FormFieldHandle`]s.
//! [`apply`] sets a value on one field according to its [`FormFieldKind`].

use std::collections::BTreeMap;

use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pdffill_core::{
    BBox, FieldValue, FormFieldInfo, FormFieldKind, FLAG_READ_ONLY, fit_text, match_option,
};

use crate::error::FieldError;
use crate::lopdf_backend::{
    box_from_object, encode_pdf_string, object_to_text, page_box, resolve,
};
use crate::overlay::{encode, encode_win_ansi, real};

/// Guards against circular `/Kids` references.
const MAX_FIELD_DEPTH: usize = 64;

/// Appearance state name of an unchecked button.
const OFF_STATE: &str = "Off";
/// On-state assumed when a button widget carries no appearance dictionary.
const DEFAULT_ON_STATE: &str = "Yes";

/// Font resource name inside generated appearance streams.
const APPEARANCE_FONT: &str = "Helv";
/// Largest font size used in a generated appearance.
const APPEARANCE_FONT_SIZE: f64 = 10.0;
/// Horizontal padding between the widget border and its text.
const APPEARANCE_PADDING: f64 = 2.0;

/// One widget annotation of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: ObjectId,
    /// Name of the widget's "on" appearance state, for buttons.
    pub on_state: Option<String>,
}

/// A terminal form field and the objects needed to change it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldHandle {
    pub info: FormFieldInfo,
    /// The field dictionary holding `/V` and `/Ff`.
    pub field_id: ObjectId,
    /// Widget annotations. For merged field/widget objects this is the field itself.
    pub widgets: Vec<Widget>,
    /// Values written to `/V`, parallel to `info.options`.
    export_values: Vec<String>,
}

impl AsRef<FormFieldInfo> for FormFieldHandle {
    fn as_ref(&self) -> &FormFieldInfo {
        &self.info
    }
}

impl FormFieldHandle {
    /// On-state of a single-widget checkbox, or of its first widget.
    pub fn on_state(&self) -> &str {
        self.widgets
            .iter()
            .find_map(|w| w.on_state.as_deref())
            .unwrap_or(DEFAULT_ON_STATE)
    }
}

/// Inheritable attributes passed down the field tree.
#[derive(Clone, Copy, Default)]
struct Inherited<'a> {
    ft: Option<&'a [u8]>,
    flags: Option<u32>,
}

/// Walk the document's AcroForm and collect its terminal fields.
///
/// Returns an empty list when the document has no AcroForm. Broken
/// entries are skipped.
pub fn discover(doc: &Document, page_ids: &[ObjectId]) -> Vec<FormFieldHandle> {
    let Some(fields_array) = acroform_dict(doc)
        .and_then(|form| form.get(b"Fields").ok())
        .and_then(|obj| resolve(doc, obj).as_array().ok())
    else {
        return Vec::new();
    };

    let widget_pages = widget_page_map(doc, page_ids);
    let mut fields = Vec::new();
    for entry in fields_array {
        if let Object::Reference(id) = entry {
            walk_field_tree(
                doc,
                *id,
                None,
                Inherited::default(),
                0,
                page_ids,
                &widget_pages,
                &mut fields,
            );
        }
    }
    tracing::debug!(count = fields.len(), "discovered form fields");
    fields
}

fn catalog_id(doc: &Document) -> Option<ObjectId> {
    doc.trailer.get(b"Root").ok()?.as_reference().ok()
}

fn acroform_dict(doc: &Document) -> Option<&lopdf::Dictionary> {
    let catalog = doc.get_object(catalog_id(doc)?).ok()?.as_dict().ok()?;
    resolve(doc, catalog.get(b"AcroForm").ok()?).as_dict().ok()
}

/// Map each annotation id listed in a page's `/Annots` to that page's index.
fn widget_page_map(doc: &Document, page_ids: &[ObjectId]) -> BTreeMap<ObjectId, usize> {
    let mut map = BTreeMap::new();
    for (index, page_id) in page_ids.iter().enumerate() {
        let Some(annots) = doc
            .get_object(*page_id)
            .and_then(|o| o.as_dict())
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
            .and_then(|obj| resolve(doc, obj).as_array().ok())
        else {
            continue;
        };
        for annot in annots {
            if let Object::Reference(id) = annot {
                map.entry(*id).or_insert(index);
            }
        }
    }
    map
}

#[allow(clippy::too_many_arguments)]
fn walk_field_tree<'a>(
    doc: &'a Document,
    field_id: ObjectId,
    parent_name: Option<&str>,
    inherited: Inherited<'a>,
    depth: usize,
    page_ids: &[ObjectId],
    widget_pages: &BTreeMap<ObjectId, usize>,
    fields: &mut Vec<FormFieldHandle>,
) {
    if depth >= MAX_FIELD_DEPTH {
        return;
    }
    let Ok(dict) = doc.get_object(field_id).and_then(|o| o.as_dict()) else {
        return;
    };

    let partial_name = dict.get(b"T").ok().and_then(|t| object_to_text(resolve(doc, t)));
    let full_name = match (parent_name, partial_name) {
        (Some(parent), Some(name)) => format!("{parent}.{name}"),
        (Some(parent), None) => parent.to_string(),
        (None, Some(name)) => name,
        (None, None) => String::new(),
    };

    let inherited = Inherited {
        ft: match dict.get(b"FT") {
            Ok(Object::Name(name)) => Some(name.as_slice()),
            _ => inherited.ft,
        },
        flags: match dict.get(b"Ff") {
            Ok(Object::Integer(n)) => Some(*n as u32),
            _ => inherited.flags,
        },
    };

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
        .map(|arr| arr.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();

    // A kid with /T is a child field; kids without /T are widget annotations.
    let has_child_fields = kids.iter().any(|kid| {
        doc.get_object(*kid)
            .and_then(|o| o.as_dict())
            .is_ok_and(|d| d.has(b"T"))
    });
    if has_child_fields {
        for kid in kids {
            walk_field_tree(
                doc,
                kid,
                Some(&full_name),
                inherited,
                depth + 1,
                page_ids,
                widget_pages,
                fields,
            );
        }
        return;
    }

    let Some(ft) = inherited.ft else {
        return;
    };
    let flags = inherited.flags.unwrap_or(0);
    let Some(kind) = FormFieldKind::from_pdf(&String::from_utf8_lossy(ft), flags) else {
        return;
    };

    let widget_ids = if kids.is_empty() { vec![field_id] } else { kids };
    let widgets: Vec<Widget> = widget_ids
        .iter()
        .map(|id| Widget {
            id: *id,
            on_state: widget_on_state(doc, *id),
        })
        .collect();

    let page_index = widget_ids
        .iter()
        .find_map(|id| widget_page(doc, *id, page_ids, widget_pages));
    let bbox = widget_ids.first().and_then(|id| {
        let page = page_index.and_then(|p| page_ids.get(p))?;
        widget_bbox(doc, *id, *page)
    });

    let (options, export_values) = match kind {
        FormFieldKind::Dropdown => choice_options(doc, dict),
        FormFieldKind::RadioGroup => radio_options(doc, dict, &widgets),
        _ => (Vec::new(), Vec::new()),
    };

    let value = dict.get(b"V").ok().and_then(|v| match resolve(doc, v) {
        Object::Array(items) => {
            let vals: Vec<String> = items.iter().filter_map(object_to_text).collect();
            (!vals.is_empty()).then(|| vals.join(", "))
        }
        other => object_to_text(other),
    });

    fields.push(FormFieldHandle {
        info: FormFieldInfo {
            name: full_name,
            kind,
            value,
            options,
            flags,
            bbox,
            page_index,
        },
        field_id,
        widgets,
        export_values,
    });
}

/// First non-`Off` key of the widget's normal (or down) appearance dictionary.
fn widget_on_state(doc: &Document, widget_id: ObjectId) -> Option<String> {
    let dict = doc.get_object(widget_id).and_then(|o| o.as_dict()).ok()?;
    let ap = resolve(doc, dict.get(b"AP").ok()?).as_dict().ok()?;
    [b"N".as_slice(), b"D".as_slice()].iter().find_map(|key| {
        let states = resolve(doc, ap.get(key).ok()?).as_dict().ok()?;
        states
            .iter()
            .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
            .find(|name| name != OFF_STATE)
    })
}

fn widget_page(
    doc: &Document,
    widget_id: ObjectId,
    page_ids: &[ObjectId],
    widget_pages: &BTreeMap<ObjectId, usize>,
) -> Option<usize> {
    let from_p = doc
        .get_object(widget_id)
        .and_then(|o| o.as_dict())
        .ok()
        .and_then(|d| d.get(b"P").ok())
        .and_then(|p| p.as_reference().ok())
        .and_then(|page_ref| page_ids.iter().position(|id| *id == page_ref));
    from_p.or_else(|| widget_pages.get(&widget_id).copied())
}

fn widget_bbox(doc: &Document, widget_id: ObjectId, page_id: ObjectId) -> Option<BBox> {
    let dict = doc.get_object(widget_id).and_then(|o| o.as_dict()).ok()?;
    let [llx, lly, urx, ury] = box_from_object(doc, dict.get(b"Rect").ok()?).ok()?;
    let geometry = page_box(doc, page_id).ok()?;
    Some(geometry.to_top_left(llx, lly, urx, ury))
}

/// Display labels and export values from a choice field's `/Opt`.
///
/// An entry is either a single string or an `[export, display]` pair.
fn choice_options(doc: &Document, dict: &lopdf::Dictionary) -> (Vec<String>, Vec<String>) {
    let Some(items) = dict
        .get(b"Opt")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
    else {
        return (Vec::new(), Vec::new());
    };

    items
        .iter()
        .filter_map(|item| match resolve(doc, item) {
            Object::Array(pair) if pair.len() >= 2 => {
                let export = object_to_text(resolve(doc, &pair[0]))?;
                let display = object_to_text(resolve(doc, &pair[1]))?;
                Some((display, export))
            }
            other => {
                let text = object_to_text(other)?;
                Some((text.clone(), text))
            }
        })
        .unzip()
}

/// Labels and on-states of a radio group's widgets, one per widget.
///
/// When the field carries an `/Opt` array with one entry per widget, those
/// entries label the buttons; otherwise the on-state names do.
fn radio_options(
    doc: &Document,
    dict: &lopdf::Dictionary,
    widgets: &[Widget],
) -> (Vec<String>, Vec<String>) {
    let states: Vec<String> = widgets
        .iter()
        .map(|w| w.on_state.clone().unwrap_or_else(|| DEFAULT_ON_STATE.to_string()))
        .collect();
    let (labels, _) = choice_options(doc, dict);
    if labels.len() == states.len() {
        (labels, states)
    } else {
        (states.clone(), states)
    }
}

fn dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut lopdf::Dictionary, FieldError> {
    Ok(doc.get_object_mut(id).and_then(|o| o.as_dict_mut())?)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Set a value on a form field.
///
/// Text fields take the value coerced to a string. Checkboxes are checked
/// when the value is in the truthy set and unchecked otherwise. Radio groups
/// and dropdowns select the matching option. Push buttons and signature
/// fields are rejected with [`FieldError::Unsupported`].
pub fn apply(
    doc: &mut Document,
    field: &FormFieldHandle,
    value: &FieldValue,
) -> Result<(), FieldError> {
    match field.info.kind {
        FormFieldKind::Text => set_text(doc, field, &value.as_text()),
        FormFieldKind::Checkbox => {
            if value.is_checked() {
                check(doc, field)
            } else {
                uncheck(doc, field)
            }
        }
        FormFieldKind::RadioGroup => select_radio(doc, field, &value.as_text()),
        FormFieldKind::Dropdown => select_choice(doc, field, &value.as_text()),
        kind @ (FormFieldKind::PushButton | FormFieldKind::Signature) => {
            Err(FieldError::Unsupported(kind))
        }
    }
}

fn set_text(doc: &mut Document, field: &FormFieldHandle, text: &str) -> Result<(), FieldError> {
    dict_mut(doc, field.field_id)?.set("V", encode_pdf_string(text));
    write_appearances(doc, field, text)
}

/// Replace each widget's appearance with a plain Helvetica rendering of
/// `text`, so viewers that ignore `/NeedAppearances` still show the value.
///
/// A widget without a usable `/Rect` only loses its stale appearance.
fn write_appearances(
    doc: &mut Document,
    field: &FormFieldHandle,
    text: &str,
) -> Result<(), FieldError> {
    for widget in &field.widgets {
        let rect = doc
            .get_object(widget.id)
            .and_then(|o| o.as_dict())
            .ok()
            .and_then(|dict| dict.get(b"Rect").ok())
            .and_then(|obj| box_from_object(doc, obj).ok());
        let appearance = match rect {
            Some([llx, lly, urx, ury]) => {
                let stream = appearance_stream(text, (urx - llx).abs(), (ury - lly).abs())?;
                Some(doc.add_object(stream))
            }
            None => None,
        };
        let dict = dict_mut(doc, widget.id)?;
        match appearance {
            Some(id) => dict.set("AP", dictionary! { "N" => Object::Reference(id) }),
            None => {
                dict.remove(b"AP");
            }
        }
    }
    Ok(())
}

/// A form XObject of size `width` x `height` showing `text` on one line.
fn appearance_stream(text: &str, width: f64, height: f64) -> Result<Stream, FieldError> {
    let font_size = APPEARANCE_FONT_SIZE.min(height * 0.7).max(1.0);
    let baseline = ((height - font_size) / 2.0).max(0.0) + font_size * 0.22;
    let shown = fit_text(text, font_size, width - 2.0 * APPEARANCE_PADDING);

    let operations = vec![
        Operation::new("BMC", vec![Object::Name(b"Tx".to_vec())]),
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new(
            "Tf",
            vec![Object::Name(APPEARANCE_FONT.as_bytes().to_vec()), real(font_size)],
        ),
        Operation::new("Td", vec![real(APPEARANCE_PADDING), real(baseline)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&shown), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("EMC", vec![]),
    ];
    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    };
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![real(0.0), real(0.0), real(width), real(height)],
        "Resources" => dictionary! {
            "Font" => dictionary! { APPEARANCE_FONT => Object::Dictionary(font) },
        },
    };
    Ok(Stream::new(dict, encode(operations)?))
}

fn check(doc: &mut Document, field: &FormFieldHandle) -> Result<(), FieldError> {
    let field_on = field.on_state().to_string();
    dict_mut(doc, field.field_id)?.set("V", name(&field_on));
    for widget in &field.widgets {
        let on = widget.on_state.as_deref().unwrap_or(&field_on);
        dict_mut(doc, widget.id)?.set("AS", name(on));
    }
    Ok(())
}

fn uncheck(doc: &mut Document, field: &FormFieldHandle) -> Result<(), FieldError> {
    dict_mut(doc, field.field_id)?.set("V", name(OFF_STATE));
    for widget in &field.widgets {
        dict_mut(doc, widget.id)?.set("AS", name(OFF_STATE));
    }
    Ok(())
}

fn option_not_found(field: &FormFieldHandle, value: &str) -> FieldError {
    FieldError::OptionNotFound {
        value: value.to_string(),
        options: field.info.options.clone(),
    }
}

fn select_radio(
    doc: &mut Document,
    field: &FormFieldHandle,
    value: &str,
) -> Result<(), FieldError> {
    let index = match_option(&field.info.options, value)
        .and_then(|hit| field.info.options.iter().position(|o| o == hit))
        .or_else(|| {
            let hit = match_option(&field.export_values, value)?;
            field.export_values.iter().position(|o| o == hit)
        })
        .ok_or_else(|| option_not_found(field, value))?;
    let selected = field.export_values[index].clone();

    dict_mut(doc, field.field_id)?.set("V", name(&selected));
    for (i, widget) in field.widgets.iter().enumerate() {
        let state = if i == index { selected.as_str() } else { OFF_STATE };
        dict_mut(doc, widget.id)?.set("AS", name(state));
    }
    Ok(())
}

fn select_choice(
    doc: &mut Document,
    field: &FormFieldHandle,
    value: &str,
) -> Result<(), FieldError> {
    let index = match_option(&field.info.options, value)
        .and_then(|hit| field.info.options.iter().position(|o| o == hit))
        .or_else(|| {
            let hit = match_option(&field.export_values, value)?;
            field.export_values.iter().position(|o| o == hit)
        });

    // Export value goes to /V, the display label to the appearance.
    let (chosen, label) = match index {
        Some(i) => (field.export_values[i].clone(), field.info.options[i].clone()),
        None if field.info.is_editable_choice() || field.info.options.is_empty() => {
            (value.to_string(), value.to_string())
        }
        None => return Err(option_not_found(field, value)),
    };

    dict_mut(doc, field.field_id)?.set("V", encode_pdf_string(&chosen));
    write_appearances(doc, field, &label)
}

/// Set the ReadOnly flag on a field.
pub fn lock(doc: &mut Document, field: &FormFieldHandle) -> Result<(), FieldError> {
    let flags = field.info.flags | FLAG_READ_ONLY;
    dict_mut(doc, field.field_id)?.set("Ff", Object::Integer(i64::from(flags)));
    Ok(())
}

/// Set `/NeedAppearances true` on the document's AcroForm.
pub fn set_need_appearances(doc: &mut Document) -> Result<(), FieldError> {
    let root = catalog_id(doc).ok_or_else(|| FieldError::Object("missing /Root".to_string()))?;
    let form_ref = dict_mut(doc, root)?
        .get(b"AcroForm")
        .ok()
        .and_then(|o| o.as_reference().ok());

    let form = match form_ref {
        Some(id) => dict_mut(doc, id)?,
        None => dict_mut(doc, root)?
            .get_mut(b"AcroForm")
            .and_then(|o| o.as_dict_mut())?,
    };
    form.set("NeedAppearances", Object::Boolean(true));
    Ok(())
}
