//! Axis-aligned boxes derived from shape geometry.
//!
//! Boxes are held as named pixel edges, x along image columns and y along
//! rows. Consumers that need a different layout convert at their own
//! boundary (see `visualize::pixel_rect`).

/// Pixel box with `xmin <= xmax` and `ymin <= ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BndBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl BndBox {
    /// Box spanned by two opposite corners, in either order.
    pub fn from_corners(a: (i64, i64), b: (i64, i64)) -> Self {
        Self {
            xmin: a.0.min(b.0),
            ymin: a.1.min(b.1),
            xmax: a.0.max(b.0),
            ymax: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> i64 {
        self.ymax - self.ymin
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Box of a four-point rectangle polygon whose first and third points are
/// opposite corners. Coordinates are rounded to whole pixels.
///
/// Returns `None` for anything else: a point count other than four,
/// coordinates that are non-finite or outside the `i32` pixel range, or a
/// box with no width or height.
pub fn extract_bbox(points: &[(f64, f64)]) -> Option<BndBox> {
    let [a, _, b, _] = points else {
        return None;
    };
    let bbox = BndBox::from_corners(to_pixel(*a)?, to_pixel(*b)?);
    (!bbox.is_degenerate()).then_some(bbox)
}

fn to_pixel((x, y): (f64, f64)) -> Option<(i64, i64)> {
    Some((round_coord(x)?, round_coord(y)?))
}

// Edges stay within i32 so `width`/`height` cannot overflow.
fn round_coord(value: f64) -> Option<i64> {
    let rounded = value.round();
    let range = f64::from(i32::MIN)..=f64::from(i32::MAX);
    range.contains(&rounded).then_some(rounded as i64)
}
