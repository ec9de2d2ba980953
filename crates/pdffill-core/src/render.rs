//! Overlay planning: turn a field and a value into a drawing instruction.
//!
//! Planning is pure. A backend consumes the resulting [`RenderInstruction`]
//! and emits the actual page content.

use crate::field::{FieldDefinition, FieldKind, FieldValue};
use crate::font_metrics::fit_text;
use crate::geometry::{CoordinateSpace, PdfPoint, PdfRect};

/// Fixed drawing parameters for overlay mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayStyle {
    /// Font size for text values, in points (default: 10).
    pub font_size: f64,
    /// Side of the drawn checkbox square, in points (default: 10).
    pub checkbox_size: f64,
    /// Stroke width of the checkbox border (default: 1).
    pub border_width: f64,
    /// Distance from the box corner to the check glyph origin (default: 2).
    pub check_inset: f64,
    /// Font size of the check glyph (default: 8).
    pub check_size: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            checkbox_size: 10.0,
            border_width: 1.0,
            check_inset: 2.0,
            check_size: 8.0,
        }
    }
}

/// A single drawing operation in PDF space.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Black text with its baseline origin at `origin`.
    Text {
        text: String,
        font_size: f64,
        origin: PdfPoint,
    },
    /// A bordered square with a check glyph inside.
    Checkbox {
        rect: PdfRect,
        border_width: f64,
        check_origin: PdfPoint,
        check_size: f64,
    },
    /// Typed signature: the text plus a rule under the field.
    Signature {
        text: String,
        font_size: f64,
        origin: PdfPoint,
        rule_from: PdfPoint,
        rule_to: PdfPoint,
    },
}

impl RenderInstruction {
    /// The point the instruction is anchored at.
    pub fn origin(&self) -> PdfPoint {
        match self {
            RenderInstruction::Text { origin, .. } => *origin,
            RenderInstruction::Checkbox { rect, .. } => rect.origin,
            RenderInstruction::Signature { origin, .. } => *origin,
        }
    }
}

/// Plan the overlay drawing for one field.
///
/// Returns `None` when nothing should be drawn: an empty value, or a checkbox
/// whose value is not in the truthy set. Overlay mode never draws an empty box.
///
/// Text and signature values wider than the field are cut to the field width
/// and end in `...`.
pub fn plan_overlay(
    definition: &FieldDefinition,
    value: &FieldValue,
    space: &CoordinateSpace,
    style: &OverlayStyle,
) -> Option<RenderInstruction> {
    if value.is_empty() {
        return None;
    }
    let rect = space.to_pdf_rect(definition.position, definition.size);

    match definition.field_type {
        FieldKind::Checkbox => {
            if !value.is_checked() {
                return None;
            }
            let side = style.checkbox_size;
            Some(RenderInstruction::Checkbox {
                rect: PdfRect::new(rect.origin, side, side),
                border_width: style.border_width,
                check_origin: rect.origin.offset(style.check_inset, style.check_inset),
                check_size: style.check_size,
            })
        }
        FieldKind::Signature => Some(RenderInstruction::Signature {
            text: fit_text(&value.as_text(), style.font_size, rect.width),
            font_size: style.font_size,
            origin: rect.origin,
            rule_from: rect.origin,
            rule_to: rect.origin.offset(rect.width, 0.0),
        }),
        FieldKind::Text | FieldKind::Radio | FieldKind::Dropdown | FieldKind::Date => {
            Some(RenderInstruction::Text {
                text: fit_text(&value.as_text(), style.font_size, rect.width),
                font_size: style.font_size,
                origin: rect.origin,
            })
        }
    }
}
