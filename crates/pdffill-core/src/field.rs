//! Field definitions and field values supplied to a fill call.
//!
//! Provides [`FieldDefinition`] (where a fillable region sits, as reported by
//! an upstream analysis step), [`FieldKind`], and [`FieldValue`] (what the
//! caller wants placed there).

use std::collections::BTreeMap;

use crate::geometry::{Point, Size};

/// The declared type of a fillable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FieldKind {
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Date,
    Signature,
}

impl FieldKind {
    /// Parse a kind from its lowercase name.
    ///
    /// Returns `None` if the name is not a recognized kind.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "checkbox" => Some(Self::Checkbox),
            "radio" => Some(Self::Radio),
            "dropdown" => Some(Self::Dropdown),
            "date" => Some(Self::Date),
            "signature" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Return the lowercase name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Dropdown => "dropdown",
            Self::Date => "date",
            Self::Signature => "signature",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fillable region reported by the analysis step.
///
/// `position` is the top-left corner of the region in analysis space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FieldDefinition {
    /// Unique within a document.
    pub field_name: String,
    pub field_type: FieldKind,
    pub position: Point,
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Size,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: Vec<String>,
    /// 0-based page index the region lives on.
    #[cfg_attr(feature = "serde", serde(default))]
    pub page: usize,
}

impl FieldDefinition {
    /// Create a definition on the first page with no options.
    pub fn new(
        field_name: impl Into<String>,
        field_type: FieldKind,
        position: Point,
        size: Size,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            position,
            size,
            required: false,
            options: Vec::new(),
            page: 0,
        }
    }

    /// Place the definition on another page (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Attach selectable options (builder pattern).
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A scalar value for one field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// True when there is nothing to place for this value.
    ///
    /// `Null` and whitespace-only text are empty. Whitespace-only text is
    /// treated as empty on purpose: a blank entry from a form UI is skipped
    /// rather than written as invisible characters, in overlay and form mode
    /// alike. `false` and `0` are not empty: they are meaningful for
    /// checkboxes and text fields.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Checkbox truthiness.
    ///
    /// Intentionally loose but closed: exactly `true`, `"true"` and `"yes"`
    /// count as checked. Everything else, including `"TRUE"`, `1` and `"on"`,
    /// is unchecked.
    pub fn is_checked(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => matches!(s.as_str(), "true" | "yes"),
            FieldValue::Null | FieldValue::Number(_) => false,
        }
    }

    /// Coerce to the string a text-like field receives.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// Field values keyed by field name.
///
/// Ordered so that every fill call visits fields in the same sequence.
pub type FieldValues = BTreeMap<String, FieldValue>;

/// Index definitions by name. Later duplicates replace earlier ones.
pub fn index_definitions(definitions: &[FieldDefinition]) -> BTreeMap<&str, &FieldDefinition> {
    definitions
        .iter()
        .map(|def| (def.field_name.as_str(), def))
        .collect()
}
