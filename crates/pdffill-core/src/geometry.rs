//! Geometry primitives and the analysis-space to PDF-space transform.
//!
//! Field definitions arrive in *analysis space*: origin at the top-left
//! corner, y growing downward, in whatever unit the upstream analysis step
//! worked in. Drawing happens in *PDF space*: origin at the bottom-left of the
//! page box, y growing upward, in points. [`to_pdf_space`] bridges the two.

/// A point in analysis space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a box, in the unit of the space it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    /// Box size assumed when the analysis step reports a position only.
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 25.0,
        }
    }
}

/// A point in PDF native space (bottom-left origin, points).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

impl PdfPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by `dx`, `dy`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned rectangle in PDF native space.
///
/// `origin` is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfRect {
    pub origin: PdfPoint,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn new(origin: PdfPoint, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }
}

/// Bounding box with top-left origin coordinate system.
///
/// Used to report where an existing form widget sits on its page in the
/// same convention the analysis step uses for [`Point`]:
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Dimensions of the target page box, read from the loaded document.
///
/// This is the authoritative drawing space. `origin` is the lower-left corner
/// of the page box, which is not always `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    pub width_pt: f64,
    pub height_pt: f64,
    pub origin: PdfPoint,
}

impl PageGeometry {
    /// A page box anchored at `(0, 0)`.
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_pt,
            height_pt,
            origin: PdfPoint::default(),
        }
    }

    /// Build from a raw PDF box array `[llx, lly, urx, ury]`.
    ///
    /// Corners may be given in any order.
    pub fn from_box(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        let (x0, x1) = (llx.min(urx), llx.max(urx));
        let (y0, y1) = (lly.min(ury), lly.max(ury));
        Self {
            width_pt: x1 - x0,
            height_pt: y1 - y0,
            origin: PdfPoint::new(x0, y0),
        }
    }

    /// Convert a native-space rectangle into a top-left origin [`BBox`].
    pub fn to_top_left(&self, llx: f64, lly: f64, urx: f64, ury: f64) -> BBox {
        let (x0, x1) = (llx.min(urx), llx.max(urx));
        let (y0, y1) = (lly.min(ury), lly.max(ury));
        let top_edge = self.origin.y + self.height_pt;
        BBox::new(
            x0 - self.origin.x,
            top_edge - y1,
            x1 - self.origin.x,
            top_edge - y0,
        )
    }
}

/// Multiplicative correction between analysis units and page points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Identity scale: analysis units are page points.
    pub const IDENTITY: ScaleFactor = ScaleFactor(1.0);

    /// Wrap a raw factor. Returns `None` unless it is finite and positive.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Derive the factor from the dimensions the analysis step worked in and
    /// the dimensions of the page actually being drawn on.
    ///
    /// Uses the height ratio, since the y-flip depends on it. Returns `None`
    /// when the analysis height is not a positive finite number.
    pub fn from_dimensions(analysis: Size, page: &PageGeometry) -> Option<Self> {
        if !(analysis.height.is_finite() && analysis.height > 0.0) {
            return None;
        }
        Self::new(page.height_pt / analysis.height)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Map an analysis-space box position into PDF space.
///
/// Returns the box's lower-left corner:
/// `(x * scale, (page_height - y - field_height) * scale)`.
///
/// `page_height` is the height the vertical flip is taken against, in the
/// same units as `y` and `field_height`.
pub fn to_pdf_space(
    x: f64,
    y: f64,
    field_height: f64,
    page_height: f64,
    scale: ScaleFactor,
) -> PdfPoint {
    let s = scale.value();
    PdfPoint::new(x * s, (page_height - y - field_height) * s)
}

/// The analysis space a fill call works in, resolved against one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    /// Height the vertical flip is taken against: the declared analysis
    /// height, or the native page height.
    pub page_height: f64,
    pub scale: ScaleFactor,
    /// Lower-left corner of the target page box in PDF space.
    pub origin: PdfPoint,
}

impl CoordinateSpace {
    /// Resolve the analysis space for `page`.
    ///
    /// Declared analysis dimensions take precedence and determine the scale.
    /// Otherwise the native page height is the flip height and the explicit
    /// scale (default 1.0) is applied to the flipped result, so
    /// `y_pdf = (page_height - y - field_height) * scale`.
    pub fn resolve(
        page: &PageGeometry,
        analysis_size: Option<Size>,
        scale: Option<ScaleFactor>,
    ) -> Self {
        if let Some(size) = analysis_size {
            if let Some(derived) = ScaleFactor::from_dimensions(size, page) {
                return Self {
                    page_height: size.height,
                    scale: derived,
                    origin: page.origin,
                };
            }
        }
        let scale = scale.unwrap_or_default();
        Self {
            page_height: page.height_pt,
            scale,
            origin: page.origin,
        }
    }

    /// Transform an analysis-space box into a PDF-space rectangle.
    pub fn to_pdf_rect(&self, position: Point, size: Size) -> PdfRect {
        let s = self.scale.value();
        let corner = to_pdf_space(position.x, position.y, size.height, self.page_height, self.scale)
            .offset(self.origin.x, self.origin.y);
        PdfRect::new(corner, size.width * s, size.height * s)
    }
}
