//! Overlay drawing: render instructions as page content.
//!
//! Each instruction becomes its own content stream appended to the page's
//! `/Contents`. The page's original content is wrapped in `q`/`Q` once so its
//! graphics state cannot leak into the overlay.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pdffill_core::{PdfPoint, RenderInstruction};

use crate::error::FieldError;
use crate::lopdf_backend::{resolve, resolve_inherited};

/// Resource name of the Helvetica text font.
pub const TEXT_FONT: &str = "PdfFillHelv";
/// Resource name of the ZapfDingbats symbol font.
pub const SYMBOL_FONT: &str = "PdfFillZaDb";
/// ZapfDingbats code for a check mark.
const CHECK_GLYPH: &[u8] = b"4";
/// Stroke width of the rule under a signature.
const RULE_WIDTH: f64 = 0.5;

/// Per-document drawing state.
#[derive(Debug, Default)]
pub(crate) struct OverlayState {
    /// Object ids of the text and symbol font dictionaries, once added.
    fonts: Option<(ObjectId, ObjectId)>,
    /// Pages whose content is already wrapped and whose resources name our fonts.
    prepared: BTreeSet<ObjectId>,
}

pub(crate) fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn point(p: PdfPoint) -> Vec<Object> {
    vec![real(p.x), real(p.y)]
}

/// Encode text for a WinAnsi-encoded standard font.
///
/// Characters outside Windows-1252 become `?`; line breaks and tabs become
/// spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let c = if c.is_control() { ' ' } else { c };
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors || bytes.len() != 1 {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

fn text_operations(ops: &mut Vec<Operation>, text: &str, font_size: f64, origin: PdfPoint) {
    ops.extend([
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(TEXT_FONT.as_bytes().to_vec()), real(font_size)],
        ),
        Operation::new("Td", point(origin)),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]);
}

/// Content-stream operations for one instruction.
pub fn operations(instruction: &RenderInstruction) -> Vec<Operation> {
    let mut ops = Vec::new();
    match instruction {
        RenderInstruction::Text {
            text,
            font_size,
            origin,
        } => text_operations(&mut ops, text, *font_size, *origin),
        RenderInstruction::Checkbox {
            rect,
            border_width,
            check_origin,
            check_size,
        } => {
            ops.extend([
                Operation::new("q", vec![]),
                Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]),
                Operation::new("w", vec![real(*border_width)]),
                Operation::new(
                    "re",
                    vec![
                        real(rect.origin.x),
                        real(rect.origin.y),
                        real(rect.width),
                        real(rect.height),
                    ],
                ),
                Operation::new("S", vec![]),
                Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(SYMBOL_FONT.as_bytes().to_vec()), real(*check_size)],
                ),
                Operation::new("Td", point(*check_origin)),
                Operation::new(
                    "Tj",
                    vec![Object::String(CHECK_GLYPH.to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ]);
        }
        RenderInstruction::Signature {
            text,
            font_size,
            origin,
            rule_from,
            rule_to,
        } => {
            text_operations(&mut ops, text, *font_size, *origin);
            ops.extend([
                Operation::new("q", vec![]),
                Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]),
                Operation::new("w", vec![real(RULE_WIDTH)]),
                Operation::new("m", point(*rule_from)),
                Operation::new("l", point(*rule_to)),
                Operation::new("S", vec![]),
                Operation::new("Q", vec![]),
            ]);
        }
    }
    ops
}

pub(crate) fn encode(operations: Vec<Operation>) -> Result<Vec<u8>, FieldError> {
    Content { operations }
        .encode()
        .map_err(|e| FieldError::Draw(e.to_string()))
}

/// Draw one instruction onto a page.
pub(crate) fn draw(
    doc: &mut Document,
    state: &mut OverlayState,
    page_id: ObjectId,
    instruction: &RenderInstruction,
) -> Result<(), FieldError> {
    let bytes = encode(operations(instruction))?;
    if !state.prepared.contains(&page_id) {
        prepare_page(doc, state, page_id)?;
        state.prepared.insert(page_id);
    }
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
    append_contents(doc, page_id, None, stream_id)
}

fn ensure_fonts(doc: &mut Document, state: &mut OverlayState) -> (ObjectId, ObjectId) {
    if let Some(fonts) = state.fonts {
        return fonts;
    }
    let text = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let symbol = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "ZapfDingbats",
    });
    state.fonts = Some((text, symbol));
    (text, symbol)
}

/// Install font resources on the page and isolate its existing content.
fn prepare_page(
    doc: &mut Document,
    state: &mut OverlayState,
    page_id: ObjectId,
) -> Result<(), FieldError> {
    let (text_font, symbol_font) = ensure_fonts(doc, state);

    // Resources may be shared or inherited; the page gets its own copy.
    let mut resources = resolve_inherited(doc, page_id, b"Resources")
        .map_err(|e| FieldError::Object(e.to_string()))?
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default();
    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default();
    fonts.set(TEXT_FONT, Object::Reference(text_font));
    fonts.set(SYMBOL_FONT, Object::Reference(symbol_font));
    resources.set("Font", Object::Dictionary(fonts));

    let has_content = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())?
        .has(b"Contents");
    let page = doc.get_object_mut(page_id).and_then(|o| o.as_dict_mut())?;
    page.set("Resources", Object::Dictionary(resources));

    if has_content {
        let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        append_contents(doc, page_id, Some(open), close)?;
    }
    Ok(())
}

/// Append a stream to the page's `/Contents`, optionally prepending another.
fn append_contents(
    doc: &mut Document,
    page_id: ObjectId,
    prepend: Option<ObjectId>,
    stream_id: ObjectId,
) -> Result<(), FieldError> {
    let existing = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())?
        .get(b"Contents")
        .ok()
        .cloned();

    let mut contents: Vec<Object> = prepend.map(Object::Reference).into_iter().collect();
    match existing {
        Some(Object::Reference(id)) => match doc.get_object(id) {
            // An indirect array of streams.
            Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
            _ => contents.push(Object::Reference(id)),
        },
        Some(Object::Array(items)) => contents.extend(items),
        _ => {}
    }
    contents.push(Object::Reference(stream_id));

    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())?
        .set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lopdf_backend::test_pdfs;
    use pdffill_core::PdfRect;

    fn page_content(doc: &Document, page_id: ObjectId) -> String {
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    fn maria() -> RenderInstruction {
        RenderInstruction::Text {
            text: "Maria".to_string(),
            font_size: 10.0,
            origin: PdfPoint::new(150.0, 157.0),
        }
    }

    #[test]
    fn win_ansi_maps_latin1_and_replaces_the_rest() {
        assert_eq!(encode_win_ansi("Zürich"), b"Z\xfcrich".to_vec());
        assert_eq!(encode_win_ansi("€"), vec![0x80]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("a\nb"), b"a b".to_vec());
    }

    #[test]
    fn text_operations_place_text_at_origin() {
        let ops = operations(&maria());
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands, vec![Object::Real(150.0), Object::Real(157.0)]);
        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert_eq!(tf.operands[1], Object::Real(10.0));
        let tj = ops.iter().find(|op| op.operator == "Tj").unwrap();
        assert_eq!(
            tj.operands,
            vec![Object::String(b"Maria".to_vec(), StringFormat::Literal)]
        );
    }

    #[test]
    fn checkbox_operations_draw_box_and_check() {
        let instr = RenderInstruction::Checkbox {
            rect: PdfRect::new(PdfPoint::new(150.0, 157.0), 10.0, 10.0),
            border_width: 1.0,
            check_origin: PdfPoint::new(152.0, 159.0),
            check_size: 8.0,
        };
        let ops = operations(&instr);
        let re = ops.iter().find(|op| op.operator == "re").unwrap();
        assert_eq!(
            re.operands,
            vec![
                Object::Real(150.0),
                Object::Real(157.0),
                Object::Real(10.0),
                Object::Real(10.0)
            ]
        );
        assert!(ops.iter().any(|op| op.operator == "S"));
        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert_eq!(tf.operands[0], Object::Name(SYMBOL_FONT.as_bytes().to_vec()));
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands, vec![Object::Real(152.0), Object::Real(159.0)]);
    }

    #[test]
    fn signature_operations_draw_rule() {
        let instr = RenderInstruction::Signature {
            text: "M. Muster".to_string(),
            font_size: 10.0,
            origin: PdfPoint::new(150.0, 157.0),
            rule_from: PdfPoint::new(150.0, 157.0),
            rule_to: PdfPoint::new(350.0, 157.0),
        };
        let ops = operations(&instr);
        let l = ops.iter().find(|op| op.operator == "l").unwrap();
        assert_eq!(l.operands, vec![Object::Real(350.0), Object::Real(157.0)]);
        assert!(ops.iter().any(|op| op.operator == "Tj"));
    }

    #[test]
    fn draw_appends_stream_and_fonts() {
        let mut doc = test_pdfs::blank(1, 595, 842);
        let page_id = test_pdfs::first_page(&doc);
        let mut state = OverlayState::default();
        draw(&mut doc, &mut state, page_id, &maria()).unwrap();

        let content = page_content(&doc, page_id);
        assert!(content.contains("(Maria) Tj"));
        assert!(content.contains("/PdfFillHelv 10 Tf"));

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(TEXT_FONT.as_bytes()));
        assert!(fonts.has(SYMBOL_FONT.as_bytes()));
    }

    #[test]
    fn draw_wraps_existing_content_once() {
        let mut doc = test_pdfs::blank(1, 595, 842);
        let page_id = test_pdfs::first_page(&doc);
        let original = doc.add_object(Stream::new(Dictionary::new(), b"2 w".to_vec()));
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Contents", Object::Reference(original));

        let mut state = OverlayState::default();
        draw(&mut doc, &mut state, page_id, &maria()).unwrap();
        draw(&mut doc, &mut state, page_id, &maria()).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        // q, original, Q, first overlay, second overlay
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[1], Object::Reference(original));
    }

    #[test]
    fn draw_keeps_existing_fonts() {
        let mut doc = test_pdfs::blank(1, 595, 842);
        let page_id = test_pdfs::first_page(&doc);
        let f1 = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set(
                "Resources",
                dictionary! { "Font" => dictionary! { "F1" => Object::Reference(f1) } },
            );

        let mut state = OverlayState::default();
        draw(&mut doc, &mut state, page_id, &maria()).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let fonts = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(TEXT_FONT.as_bytes()));
    }

    #[test]
    fn fonts_are_shared_across_pages() {
        let mut doc = test_pdfs::blank(2, 595, 842);
        let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        let mut state = OverlayState::default();
        draw(&mut doc, &mut state, pages[0], &maria()).unwrap();
        let first = state.fonts;
        draw(&mut doc, &mut state, pages[1], &maria()).unwrap();
        assert_eq!(state.fonts, first);
        assert_eq!(state.prepared.len(), 2);
    }
}
