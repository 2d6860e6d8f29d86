use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::region::Rect;

/// A vertex in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Clockwise quadrilateral for an axis-aligned box.
pub fn box_polygon(left: f32, top: f32, width: f32, height: f32) -> Vec<Point> {
    vec![
        Point::new(left, top),
        Point::new(left + width, top),
        Point::new(left + width, top + height),
        Point::new(left, top + height),
    ]
}

/// Check that a polygon can be read as point coordinates.
pub fn validate_polygon(polygon: &[Point]) -> Result<(), RegionError> {
    if polygon.len() < 3 {
        return Err(RegionError::InvalidGeometry(format!(
            "polygon has {} vertices, need at least 3",
            polygon.len()
        )));
    }
    if let Some(p) = polygon
        .iter()
        .find(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(RegionError::InvalidGeometry(format!(
            "non-finite vertex ({}, {})",
            p.x, p.y
        )));
    }
    Ok(())
}

/// Returns true iff at least one vertex of `polygon` lies in the closed `rect`.
///
/// Only vertices are tested. A box that encloses the rectangle without any
/// vertex inside it does not match.
pub fn touches_rect(polygon: &[Point], rect: &Rect) -> Result<bool, RegionError> {
    validate_polygon(polygon)?;
    Ok(polygon.iter().any(|p| rect.contains(p)))
}

/// Smallest y over all vertices, i.e. the top edge in image coordinates.
pub fn top_y(polygon: &[Point]) -> f32 {
    polygon.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(10, 10, 100, 50)
    }

    fn quad_at(x: f32, y: f32) -> Vec<Point> {
        // Only the first vertex varies; the others sit far outside the rect.
        vec![
            Point::new(x, y),
            Point::new(500.0, 500.0),
            Point::new(600.0, 500.0),
            Point::new(600.0, 600.0),
        ]
    }

    #[test]
    fn vertex_inside_matches() {
        assert!(touches_rect(&quad_at(20.0, 20.0), &rect()).unwrap());
    }

    #[test]
    fn vertices_on_each_boundary_are_inclusive() {
        for (x, y) in [(10.0, 30.0), (100.0, 30.0), (50.0, 10.0), (50.0, 50.0)] {
            assert!(touches_rect(&quad_at(x, y), &rect()).unwrap(), "({x}, {y})");
        }
    }

    #[test]
    fn vertices_just_outside_are_excluded() {
        for (x, y) in [(9.99, 30.0), (100.01, 30.0), (50.0, 9.99), (50.0, 50.01)] {
            assert!(!touches_rect(&quad_at(x, y), &rect()).unwrap(), "({x}, {y})");
        }
    }

    #[test]
    fn enclosing_box_without_vertex_inside_is_not_matched() {
        let big = box_polygon(0.0, 0.0, 1000.0, 1000.0);
        assert!(!touches_rect(&big, &rect()).unwrap());
    }

    #[test]
    fn crossing_edge_without_vertex_inside_is_not_matched() {
        // Horizontal bar passing through the rectangle, corners left and right of it.
        let bar = box_polygon(0.0, 20.0, 200.0, 10.0);
        assert!(!touches_rect(&bar, &rect()).unwrap());
    }

    #[test]
    fn too_few_vertices_is_invalid() {
        let line = vec![Point::new(20.0, 20.0), Point::new(30.0, 20.0)];
        assert!(matches!(
            touches_rect(&line, &rect()),
            Err(RegionError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn nan_vertex_is_invalid() {
        let mut poly = box_polygon(20.0, 20.0, 5.0, 5.0);
        poly[2].x = f32::NAN;
        assert!(touches_rect(&poly, &rect()).is_err());
    }

    #[test]
    fn top_y_is_minimum() {
        assert_eq!(top_y(&box_polygon(3.0, 42.0, 10.0, 8.0)), 42.0);
    }
}
