// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry primitives: points, document quadrilaterals, axis-aligned boxes,
// and the aspect and ordering helpers shared by detection and rectification.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Both coordinates multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Cross product of `o->a` and `o->b`. Positive for a counter-clockwise turn
/// in a y-up frame (clockwise on screen).
pub fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Area of a triangle given by three points.
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    cross(a, b, c).abs() / 2.0
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Smallest box containing every point. `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Width divided by height. Zero-height boxes report `f64::INFINITY`.
    pub fn aspect_ratio(&self) -> f64 {
        let h = self.height();
        if h <= 0.0 {
            return f64::INFINITY;
        }
        self.width() / h
    }
}

/// Four corners of a (candidate) document boundary.
///
/// The labels are hypotheses. Raw detector output and user-dragged corners
/// may carry rotated or swapped roles; use [`DocumentCorners::ordered`] to
/// obtain true roles before relying on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl DocumentCorners {
    /// Build from points in `[top_left, top_right, bottom_right, bottom_left]`
    /// label order. No reordering happens here.
    pub fn from_points(points: [Point; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = points;
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners covering an entire `width` x `height` frame.
    pub fn full_frame(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::from_points([
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ])
    }

    /// Corners in label order.
    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Canonical ordering derived purely from coordinates.
    ///
    /// Sorts by `y` (ties broken by `x`); the two upper points become the top
    /// pair ordered left to right, the two lower points the bottom pair
    /// ordered left to right. The input labels are ignored, so any relabeling
    /// of the same four points yields the same result.
    pub fn ordered(&self) -> Self {
        let mut pts = self.points();
        pts.sort_by(|a, b| cmp_f64(a.y, b.y).then_with(|| cmp_f64(a.x, b.x)));

        let (mut top, mut bottom) = ([pts[0], pts[1]], [pts[2], pts[3]]);
        top.sort_by(|a, b| cmp_f64(a.x, b.x));
        bottom.sort_by(|a, b| cmp_f64(a.x, b.x));

        Self {
            top_left: top[0],
            top_right: top[1],
            bottom_right: bottom[1],
            bottom_left: bottom[0],
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let pts = self.points();
        BoundingBox {
            min_x: pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
            min_y: pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
            max_x: pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
            max_y: pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Every corner multiplied by `factor` (used when mapping between a
    /// downscaled working image and the source).
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_points(self.points().map(|p| p.scaled(factor)))
    }

    /// Smallest triangle formed by any three of the four corners.
    ///
    /// A value near zero means at least three corners are (nearly) collinear.
    pub fn min_corner_triangle_area(&self) -> f64 {
        let p = self.points();
        (0..4)
            .map(|skip| {
                let tri: Vec<Point> = (0..4).filter(|&i| i != skip).map(|i| p[i]).collect();
                triangle_area(tri[0], tri[1], tri[2])
            })
            .fold(f64::INFINITY, f64::min)
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
