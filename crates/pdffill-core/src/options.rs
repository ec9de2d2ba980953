//! Options controlling a fill call.

use crate::error::FillError;
use crate::geometry::{ScaleFactor, Size};
use crate::render::OverlayStyle;

/// Options controlling fill behavior.
///
/// Defaults draw at a 1:1 scale with the standard [`OverlayStyle`], set form
/// fields directly when the document has a form, and leave set fields editable.
#[derive(Debug, Clone, PartialEq)]
pub struct FillOptions {
    /// Explicit analysis-to-page scale (default: None = 1.0).
    ///
    /// Ignored when `analysis_size` is set, since the scale is then derived.
    pub scale: Option<f64>,
    /// Page dimensions the analysis step worked in (default: None).
    pub analysis_size: Option<Size>,
    /// Overlay drawing parameters.
    pub style: OverlayStyle,
    /// Set AcroForm fields directly when the document has a form (default: true).
    ///
    /// When false every field is drawn in overlay mode.
    pub use_form: bool,
    /// Fall back to case-insensitive name matching against form fields (default: true).
    pub case_insensitive_names: bool,
    /// Mark form fields read-only after setting them (default: false).
    pub lock_filled_fields: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            scale: None,
            analysis_size: None,
            style: OverlayStyle::default(),
            use_form: true,
            case_insensitive_names: true,
            lock_filled_fields: false,
        }
    }
}

impl FillOptions {
    /// Set an explicit scale factor (builder pattern).
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Declare the analysis-space page dimensions (builder pattern).
    pub fn with_analysis_size(mut self, width: f64, height: f64) -> Self {
        self.analysis_size = Some(Size::new(width, height));
        self
    }

    /// Override the overlay style (builder pattern).
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Draw every field, even when the document has a form (builder pattern).
    pub fn overlay_only(mut self) -> Self {
        self.use_form = false;
        self
    }

    /// Lock form fields after setting them (builder pattern).
    pub fn lock_filled_fields(mut self, lock: bool) -> Self {
        self.lock_filled_fields = lock;
        self
    }

    /// The validated scale factor, if one was given.
    pub fn scale_factor(&self) -> Option<ScaleFactor> {
        self.scale.and_then(ScaleFactor::new)
    }

    /// Check the options for values that cannot produce a sane placement.
    pub fn validate(&self) -> Result<(), FillError> {
        if let Some(scale) = self.scale {
            if ScaleFactor::new(scale).is_none() {
                return Err(FillError::InvalidOptions(format!(
                    "scale factor must be a positive finite number, got {scale}"
                )));
            }
        }
        if let Some(size) = self.analysis_size {
            let ok = |v: f64| v.is_finite() && v > 0.0;
            if !ok(size.width) || !ok(size.height) {
                return Err(FillError::InvalidOptions(format!(
                    "analysis size must be positive, got {}x{}",
                    size.width, size.height
                )));
            }
        }
        let style = &self.style;
        for (name, v) in [
            ("font size", style.font_size),
            ("checkbox size", style.checkbox_size),
            ("check size", style.check_size),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(FillError::InvalidOptions(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}
