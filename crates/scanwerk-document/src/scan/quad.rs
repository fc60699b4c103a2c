// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral approximation — reduces a closed contour to four corners.
//
// Tries polygon simplification at increasing tolerances, then the same sweep
// on the convex hull, and finally the minimum-area rotated bounding
// rectangle, which always has four corners.

use imageproc::geometry::{
    approximate_polygon_dp, arc_length, contour_area, convex_hull, min_area_rect,
    oriented_contour_area,
};
use imageproc::point::Point as PixelPoint;
use scanwerk_core::geometry::Point;
use tracing::trace;

use super::contours::Contour;

/// Which step of the fallback chain produced a quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadSource {
    /// Simplification of the contour itself.
    Polygon,
    /// Simplification of the contour's convex hull.
    Hull,
    /// Minimum-area rotated bounding rectangle.
    MinAreaRect,
}

/// Four corners from one contour, in contour traversal order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [Point; 4],
    pub source: QuadSource,
}

impl Quad {
    /// Enclosed area.
    pub fn area(&self) -> f64 {
        quad_area(&self.points)
    }

    /// The same quad with every edge moved `radius` pixels inward.
    pub fn inset(self, radius: f64) -> Self {
        Self {
            points: inset_quad(self.points, radius),
            ..self
        }
    }
}

/// Area enclosed by four corners taken in label order.
pub fn quad_area(points: &[Point; 4]) -> f64 {
    contour_area(&points.map(to_pixel_point))
}

/// Reduce `contour` to exactly four corners.
///
/// `epsilon_fractions` are tolerances relative to the perimeter, tried in
/// order. Returns `None` only for an empty contour.
pub fn approximate_quad(contour: &Contour, epsilon_fractions: &[f64]) -> Option<Quad> {
    if contour.is_empty() {
        return None;
    }

    if let Some(points) = sweep(contour.points(), epsilon_fractions) {
        return Some(Quad {
            points,
            source: QuadSource::Polygon,
        });
    }

    let hull = convex_hull(contour.points());
    if let Some(points) = sweep(&hull, epsilon_fractions) {
        trace!("Quadrilateral recovered from convex hull");
        return Some(Quad {
            points,
            source: QuadSource::Hull,
        });
    }

    trace!("Falling back to minimum-area rectangle");
    Some(Quad {
        points: min_area_rect(contour.points()).map(to_point),
        source: QuadSource::MinAreaRect,
    })
}

/// First simplification in the sweep that yields exactly four vertices.
fn sweep(ring: &[PixelPoint<i32>], fractions: &[f64]) -> Option<[Point; 4]> {
    let perimeter = arc_length(ring, true);
    if ring.len() < 4 || perimeter <= 0.0 {
        return None;
    }
    fractions
        .iter()
        .filter(|&&fraction| fraction > 0.0)
        .find_map(|&fraction| {
            let simplified = simplify_ring(ring, fraction * perimeter);
            <[PixelPoint<i32>; 4]>::try_from(simplified)
                .ok()
                .map(|quad| quad.map(to_point))
        })
}

/// Douglas–Peucker simplification of a closed ring.
///
/// The ring is cut at two mutually distant points into open chains that
/// share their endpoints, so the result does not depend on where tracing
/// started. Both cut points are extreme points and always survive.
fn simplify_ring(ring: &[PixelPoint<i32>], epsilon: f64) -> Vec<PixelPoint<i32>> {
    let a = farthest_from(ring, ring[0]);
    let b = farthest_from(ring, ring[a]);
    if ring[a] == ring[b] {
        return vec![ring[a]];
    }
    let (start, end) = (a.min(b), a.max(b));

    let wrapped: Vec<PixelPoint<i32>> = ring[end..]
        .iter()
        .chain(&ring[..=start])
        .copied()
        .collect();

    let mut simplified = approximate_polygon_dp(&ring[start..=end], epsilon, false);
    simplified.pop();
    let mut tail = approximate_polygon_dp(&wrapped, epsilon, false);
    tail.pop();
    simplified.extend(tail);
    simplified
}

fn farthest_from(ring: &[PixelPoint<i32>], origin: PixelPoint<i32>) -> usize {
    ring.iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let (dx, dy) = ((p.x - origin.x) as i64, (p.y - origin.y) as i64);
            dx * dx + dy * dy
        })
        .map_or(0, |(i, _)| i)
}

/// Shift every edge of a convex quad `radius` pixels inward, measured with
/// the L-infinity norm, and return the intersections of the shifted edges.
///
/// This undoes the growth of a square dilation of the same radius. Quads
/// with a zero-length edge or no area, and corners between parallel edges,
/// are left where they are.
pub fn inset_quad(points: [Point; 4], radius: f64) -> [Point; 4] {
    let signed_area = oriented_contour_area(&points.map(to_pixel_point));
    if radius <= 0.0 || signed_area == 0.0 {
        return points;
    }
    // Positive area is clockwise on screen, so the interior lies to the
    // right of each edge.
    let side = signed_area.signum();

    let mut shifted = [(Point::default(), (0.0, 0.0)); 4];
    for (i, edge) in shifted.iter_mut().enumerate() {
        let (a, b) = (points[i], points[(i + 1) % 4]);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = dx.hypot(dy);
        if len < f64::EPSILON {
            return points;
        }
        let (nx, ny) = (-dy / len * side, dx / len * side);
        let offset = radius * (nx.abs() + ny.abs());
        *edge = (Point::new(a.x + nx * offset, a.y + ny * offset), (dx, dy));
    }

    std::array::from_fn(|i| {
        let (p, d) = shifted[(i + 3) % 4];
        let (q, e) = shifted[i];
        let denom = d.0 * e.1 - d.1 * e.0;
        if denom.abs() < f64::EPSILON {
            return points[i];
        }
        let t = ((q.x - p.x) * e.1 - (q.y - p.y) * e.0) / denom;
        Point::new(p.x + d.0 * t, p.y + d.1 * t)
    })
}

fn to_point(p: PixelPoint<i32>) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

fn to_pixel_point(p: Point) -> PixelPoint<f64> {
    PixelPoint::new(p.x, p.y)
}
