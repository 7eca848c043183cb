//! Page boxes and placement transforms
//!
//! PDF user space has its origin at the bottom-left corner with Y
//! increasing upward. Composited pages are drawn by placing a Form
//! XObject through a `cm` matrix that maps the source page's visible
//! box, after its `/Rotate`, onto the target rectangle.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{PageSize, ScalingMode};
use lopdf::{Document, Object};

// =============================================================================
// Page Box
// =============================================================================

/// A rectangle in default user space, as stored in `/MediaBox` or `/CropBox`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// Create a box from two opposite corners, in any order
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            llx: x0.min(x1),
            lly: y0.min(y1),
            urx: x0.max(x1),
            ury: y0.max(y1),
        }
    }

    /// US Letter at the origin
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1)
    }

    /// Box at the origin with the given size
    pub fn from_size(size: PageSize) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Overlapping area of two boxes, if any
    pub fn intersect(&self, other: &PageBox) -> Option<PageBox> {
        let clipped = PageBox {
            llx: self.llx.max(other.llx),
            lly: self.lly.max(other.lly),
            urx: self.urx.min(other.urx),
            ury: self.ury.min(other.ury),
        };
        if clipped.is_empty() { None } else { Some(clipped) }
    }

    /// Parse a box array, following indirect references.
    ///
    /// Returns `None` unless the array holds four numbers spanning a non-empty area.
    pub fn from_object(doc: &Document, obj: &Object) -> Option<Self> {
        let arr = resolve(doc, obj)?.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, item) in coords.iter_mut().zip(arr) {
            *slot = extract_number(resolve(doc, item)?)?;
        }
        let page_box = Self::new(coords[0], coords[1], coords[2], coords[3]);
        if page_box.is_empty() { None } else { Some(page_box) }
    }

    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

// =============================================================================
// Page Geometry
// =============================================================================

/// What a viewer shows of a page: its visible box and its clockwise rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub visible: PageBox,
    /// One of 0, 90, 180, 270
    pub rotation: u16,
}

impl PageGeometry {
    /// Size as displayed, with width and height swapped for quarter turns
    pub fn displayed_size(&self) -> PageSize {
        let (w, h) = (self.visible.width(), self.visible.height());
        if self.rotation % 180 == 90 {
            PageSize::new(h, w)
        } else {
            PageSize::new(w, h)
        }
    }
}

/// Normalize a `/Rotate` value to 0, 90, 180 or 270.
///
/// Values that aren't a multiple of 90 are invalid and read as 0.
pub fn normalize_rotation(degrees: i64) -> u16 {
    let normalized = degrees.rem_euclid(360);
    if normalized % 90 == 0 {
        normalized as u16
    } else {
        log::warn!("Ignoring invalid page rotation of {} degrees", degrees);
        0
    }
}

// =============================================================================
// Transformation Matrix
// =============================================================================

/// A PDF affine transform `[a b c d e f]`.
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Matrix {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise quarter-turn rotation of a `width` × `height` area,
    /// re-anchored so the result stays in the positive quadrant.
    pub fn page_rotation(rotation: u16, width: f32, height: f32) -> Self {
        match rotation {
            90 => Matrix {
                a: 0.0,
                b: -1.0,
                c: 1.0,
                d: 0.0,
                e: 0.0,
                f: width,
            },
            180 => Matrix {
                a: -1.0,
                b: 0.0,
                c: 0.0,
                d: -1.0,
                e: width,
                f: height,
            },
            270 => Matrix {
                a: 0.0,
                b: 1.0,
                c: -1.0,
                d: 0.0,
                e: height,
                f: 0.0,
            },
            _ => Self::IDENTITY,
        }
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Compute the matrix that draws a page with `geometry` into `target`.
///
/// The visible box is moved to the origin, turned by the page rotation,
/// scaled per `mode` and centered in `target`.
pub fn placement_matrix(geometry: &PageGeometry, target: &PageBox, mode: ScalingMode) -> Matrix {
    let visible = &geometry.visible;
    let displayed = geometry.displayed_size();

    let (sx, sy) = match mode {
        ScalingMode::Fit => {
            let scale = (target.width() / displayed.width).min(target.height() / displayed.height);
            (scale, scale)
        }
        ScalingMode::Stretch => (
            target.width() / displayed.width,
            target.height() / displayed.height,
        ),
    };

    let offset_x = target.llx + (target.width() - displayed.width * sx) / 2.0;
    let offset_y = target.lly + (target.height() - displayed.height * sy) / 2.0;

    Matrix::translate(-visible.llx, -visible.lly)
        .then(&Matrix::page_rotation(
            geometry.rotation,
            visible.width(),
            visible.height(),
        ))
        .then(&Matrix::scale(sx, sy))
        .then(&Matrix::translate(offset_x, offset_y))
}

/// Generate the content stream command that draws an XObject through `matrix`.
pub fn placement_command(xobject_name: &str, matrix: &Matrix) -> String {
    format!(
        "q {} {} {} {} {} {} cm /{} Do Q\n",
        matrix.a, matrix.b, matrix.c, matrix.d, matrix.e, matrix.f, xobject_name
    )
}

// =============================================================================
// Helpers
// =============================================================================

/// Follow an indirect reference, leaving direct objects untouched.
///
/// Returns `None` for a dangling reference, which the PDF format reads as `null`.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        _ => Some(obj),
    }
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
