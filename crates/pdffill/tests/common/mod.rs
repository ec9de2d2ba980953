//! Shared fixtures and inspection helpers for the integration tests.
//!
//! Test PDFs are created programmatically using lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, dictionary};

/// A document with `page_count` empty pages of the given size.
pub fn blank_pdf(page_count: usize, width: i64, height: i64) -> Vec<u8> {
    save(blank_doc(page_count, width, height))
}

fn blank_doc(page_count: usize, width: i64, height: i64) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id: ObjectId = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A one-page A4 form with a text field `vorname`, a checkbox `hasKids`
/// (on-state `Yes`), a dropdown `land` (CH / DE), and a push button
/// `drucken`.
pub fn form_pdf() -> Vec<u8> {
    let mut doc = blank_doc(1, 595, 842);
    let page_id = *doc.get_pages().values().next().unwrap();

    let name_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "T" => Object::string_literal("vorname"),
        "FT" => "Tx",
        "Rect" => vec![150.into(), 157.into(), 350.into(), 177.into()],
        "P" => Object::Reference(page_id),
    });
    let kids_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "T" => Object::string_literal("hasKids"),
        "FT" => "Btn",
        "V" => "Off",
        "AS" => "Off",
        "AP" => dictionary! {
            "N" => dictionary! { "Yes" => Object::Null, "Off" => Object::Null },
        },
        "Rect" => vec![50.into(), 650.into(), 60.into(), 660.into()],
        "P" => Object::Reference(page_id),
    });
    let land_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "T" => Object::string_literal("land"),
        "FT" => "Ch",
        "Ff" => Object::Integer(1 << 17),
        "Opt" => vec![Object::string_literal("CH"), Object::string_literal("DE")],
        "Rect" => vec![50.into(), 550.into(), 200.into(), 570.into()],
        "P" => Object::Reference(page_id),
    });
    let button_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "T" => Object::string_literal("drucken"),
        "FT" => "Btn",
        "Ff" => Object::Integer(1 << 16),
        "Rect" => vec![50.into(), 500.into(), 100.into(), 520.into()],
        "P" => Object::Reference(page_id),
    });

    let acroform_id = doc.add_object(dictionary! {
        "Fields" => vec![
            Object::Reference(name_id),
            Object::Reference(kids_id),
            Object::Reference(land_id),
            Object::Reference(button_id),
        ],
    });
    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    doc.get_object_mut(root)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("AcroForm", Object::Reference(acroform_id));
    save(doc)
}

/// Decoded content-stream operations of a page.
pub fn page_operations(bytes: &[u8], page: usize) -> Vec<Operation> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().values().nth(page).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

/// Numeric operand as f64. Whole reals may come back as integers after a save.
pub fn num(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("expected number, got {other:?}"),
    }
}

/// Operands of every `Td` on a page, as (x, y).
pub fn text_positions(bytes: &[u8], page: usize) -> Vec<(f64, f64)> {
    page_operations(bytes, page)
        .iter()
        .filter(|op| op.operator == "Td")
        .map(|op| (num(&op.operands[0]), num(&op.operands[1])))
        .collect()
}

/// Strings shown with `Tj` on a page.
pub fn shown_text(bytes: &[u8], page: usize) -> Vec<Vec<u8>> {
    page_operations(bytes, page)
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(s, _)) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

/// A top-level AcroForm field dictionary by name.
pub fn form_field(bytes: &[u8], name: &str) -> lopdf::Dictionary {
    let doc = Document::load_mem(bytes).unwrap();
    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_object(root).unwrap().as_dict().unwrap();
    let form_id = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
    let form = doc.get_object(form_id).unwrap().as_dict().unwrap();
    form.get(b"Fields")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            doc.get_object(f.as_reference().unwrap())
                .unwrap()
                .as_dict()
                .unwrap()
                .clone()
        })
        .find(|d| match d.get(b"T") {
            Ok(Object::String(t, _)) => t.as_slice() == name.as_bytes(),
            _ => false,
        })
        .unwrap()
}

/// The document's AcroForm dictionary.
pub fn acroform(bytes: &[u8]) -> lopdf::Dictionary {
    let doc = Document::load_mem(bytes).unwrap();
    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_object(root).unwrap().as_dict().unwrap();
    let form_id = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
    doc.get_object(form_id).unwrap().as_dict().unwrap().clone()
}

pub fn name_value(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::Name(n)) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

pub fn string_value(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(s, _)) => Some(String::from_utf8_lossy(s).into_owned()),
        _ => None,
    }
}

/// String shown by the normal appearance stream of a merged field/widget.
pub fn appearance_text(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    let doc = Document::load_mem(bytes).unwrap();
    let field = form_field(bytes, name);
    let ap = field.get(b"AP").ok()?.as_dict().ok()?;
    let stream_id = ap.get(b"N").ok()?.as_reference().ok()?;
    let stream = doc.get_object(stream_id).ok()?.as_stream().ok()?;
    Content::decode(&stream.content)
        .unwrap()
        .operations
        .iter()
        .find(|op| op.operator == "Tj")
        .and_then(|op| match op.operands.first() {
            Some(Object::String(s, _)) => Some(s.clone()),
            _ => None,
        })
}
