//! Axis-aligned rectangle overlap used by region queries.

use crate::error::WidgetResult;
use crate::layout::check_coordinate;
use kurbo::{Point, Rect};

/// Check whether two rectangles share interior area.
///
/// Intervals are open: rectangles that only touch along an edge or a corner
/// do not overlap. A zero-width query still hits widgets it passes through.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let a = a.abs();
    let b = b.abs();
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Build a query region from two opposite corners given in any order.
pub fn query_region(x1: f64, y1: f64, x2: f64, y2: f64) -> WidgetResult<Rect> {
    check_coordinate("x1", x1)?;
    check_coordinate("y1", y1)?;
    check_coordinate("x2", x2)?;
    check_coordinate("y2", y2)?;
    Ok(Rect::from_points(Point::new(x1, y1), Point::new(x2, y2)))
}
