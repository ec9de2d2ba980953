//! AcroForm field metadata.
//!
//! Provides [`FormFieldKind`], resolved from a field's `/FT` and `/Ff`
//! entries, and [`FormFieldInfo`], the backend-independent description of a
//! discovered field.

use crate::geometry::BBox;

/// `/Ff` bit 1: the field may not be changed by the user.
pub const FLAG_READ_ONLY: u32 = 1;
/// `/Ff` bit 16 on button fields: radio group.
pub const FLAG_RADIO: u32 = 1 << 15;
/// `/Ff` bit 17 on button fields: push button.
pub const FLAG_PUSH_BUTTON: u32 = 1 << 16;
/// `/Ff` bit 18 on choice fields: combo box rather than list box.
pub const FLAG_COMBO: u32 = 1 << 17;

/// The kind of an AcroForm field, as the form itself declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FormFieldKind {
    /// `/FT /Tx`.
    Text,
    /// `/FT /Btn` with neither the radio nor the push-button flag.
    Checkbox,
    /// `/FT /Btn` with the radio flag.
    #[cfg_attr(feature = "serde", serde(rename = "radio"))]
    RadioGroup,
    /// `/FT /Ch`, combo box or list box.
    Dropdown,
    /// `/FT /Btn` with the push-button flag.
    #[cfg_attr(feature = "serde", serde(rename = "button"))]
    PushButton,
    /// `/FT /Sig`.
    Signature,
}

impl FormFieldKind {
    /// Resolve the kind from a `/FT` name and `/Ff` flags.
    ///
    /// Returns `None` if the `/FT` name is not a recognized field type.
    pub fn from_pdf(ft: &str, flags: u32) -> Option<Self> {
        match ft {
            "Tx" => Some(Self::Text),
            "Btn" if flags & FLAG_PUSH_BUTTON != 0 => Some(Self::PushButton),
            "Btn" if flags & FLAG_RADIO != 0 => Some(Self::RadioGroup),
            "Btn" => Some(Self::Checkbox),
            "Ch" => Some(Self::Dropdown),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Whether a value can be set on this kind directly.
    ///
    /// Push buttons and signature fields fall back to overlay drawing.
    pub fn is_fillable(&self) -> bool {
        !matches!(self, Self::PushButton | Self::Signature)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::RadioGroup => "radio",
            Self::Dropdown => "dropdown",
            Self::PushButton => "button",
            Self::Signature => "signature",
        }
    }
}

impl std::fmt::Display for FormFieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A form field discovered in the document's AcroForm dictionary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormFieldInfo {
    /// Fully qualified name. Hierarchical fields join names with `.`.
    pub name: String,
    pub kind: FormFieldKind,
    /// Current value from `/V`.
    pub value: Option<String>,
    /// Choice options from `/Opt`, or the on-states of a radio group's widgets.
    pub options: Vec<String>,
    /// Field flags from `/Ff` (bitmask).
    pub flags: u32,
    /// Top-left-origin bounds of the first widget, if it has a `/Rect`.
    pub bbox: Option<BBox>,
    /// The 0-based page index of the first widget, if determinable.
    pub page_index: Option<usize>,
}

impl FormFieldInfo {
    pub fn is_read_only(&self) -> bool {
        self.flags & FLAG_READ_ONLY != 0
    }

    /// Combo box that also accepts free text.
    pub fn is_editable_choice(&self) -> bool {
        self.kind == FormFieldKind::Dropdown
            && self.flags & FLAG_COMBO != 0
            && self.flags & FLAG_EDIT != 0
    }
}

/// `/Ff` bit 19 on choice fields: combo box with an editable text box.
pub const FLAG_EDIT: u32 = 1 << 18;

/// Find the option a value refers to.
///
/// Tries an exact match, then a case-insensitive match, then a
/// case-insensitive substring match in either direction. The first option
/// satisfying the strongest rule wins.
pub fn match_option<'a>(options: &'a [String], value: &str) -> Option<&'a str> {
    let wanted = value.trim();
    if wanted.is_empty() {
        return None;
    }
    if let Some(opt) = options.iter().find(|o| o.as_str() == wanted) {
        return Some(opt);
    }
    let lower = wanted.to_lowercase();
    if let Some(opt) = options.iter().find(|o| o.to_lowercase() == lower) {
        return Some(opt);
    }
    options
        .iter()
        .find(|o| {
            let o = o.to_lowercase();
            !o.is_empty() && (o.contains(&lower) || lower.contains(&o))
        })
        .map(String::as_str)
}

/// Find a form field by name.
///
/// An exact match always wins. With `case_insensitive`, a field whose name
/// differs only in case is accepted when there is no exact match. Case is
/// folded with Unicode lowercasing, the same rule [`match_option`] uses.
pub fn lookup_field<'a, F: AsRef<FormFieldInfo>>(
    fields: &'a [F],
    name: &str,
    case_insensitive: bool,
) -> Option<&'a F> {
    fields
        .iter()
        .find(|f| f.as_ref().name == name)
        .or_else(|| {
            if !case_insensitive {
                return None;
            }
            let lower = name.to_lowercase();
            fields
                .iter()
                .find(|f| f.as_ref().name.to_lowercase() == lower)
        })
}

impl AsRef<FormFieldInfo> for FormFieldInfo {
    fn as_ref(&self) -> &FormFieldInfo {
        self
    }
}
