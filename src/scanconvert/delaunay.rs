use delaunator::{triangulate, Point, EMPTY};
use nalgebra::Point2;

use crate::error::ConvertError;

/// Planar Delaunay mesh with half-edge connectivity.
///
/// Answers the two queries the weight builder needs: which triangle contains
/// a given point, and what the barycentric coordinates of that point are
/// within the triangle. Built once per configuration over the flattened
/// sample grid and reused for every output pixel.
pub struct TriangleMesh {
    points: Vec<Point2<f64>>,
    /// Vertex indices, three per triangle.
    triangles: Vec<usize>,
    /// Opposite half-edge per edge, `EMPTY` on the convex hull.
    halfedges: Vec<usize>,
}

/// Result of a point-location query.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    /// Containing triangle for in-hull queries; for queries outside the
    /// convex hull, the last triangle visited before the walk left the hull.
    pub triangle: usize,
    pub inside: bool,
}

impl TriangleMesh {
    /// Triangulates `points`. Fails when no triangle can be formed, e.g.
    /// fewer than three points or all points collinear.
    pub fn build(points: Vec<Point2<f64>>) -> Result<Self, ConvertError> {
        let input: Vec<Point> = points.iter().map(|p| Point { x: p.x, y: p.y }).collect();
        let triangulation = triangulate(&input);
        if triangulation.triangles.is_empty() {
            return Err(ConvertError::DegenerateGeometry(format!(
                "triangulation of {} sample points produced no triangles",
                points.len()
            )));
        }
        Ok(Self {
            points,
            triangles: triangulation.triangles,
            halfedges: triangulation.halfedges,
        })
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Point index of the given corner (0..3) of a triangle.
    #[inline]
    pub fn vertex(&self, triangle: usize, corner: usize) -> usize {
        self.triangles[3 * triangle + corner]
    }

    #[inline]
    fn corner(&self, triangle: usize, corner: usize) -> &Point2<f64> {
        &self.points[self.vertex(triangle, corner)]
    }

    /// Twice the signed area of (a, b, c).
    #[inline]
    fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    fn contains(&self, triangle: usize, query: &Point2<f64>) -> bool {
        let a = self.corner(triangle, 0);
        let b = self.corner(triangle, 1);
        let c = self.corner(triangle, 2);
        let sign = Self::orient(a, b, c);
        Self::orient(a, b, query) * sign >= 0.0
            && Self::orient(b, c, query) * sign >= 0.0
            && Self::orient(c, a, query) * sign >= 0.0
    }

    /// Walks from `hint` toward `query`, crossing one edge per step.
    ///
    /// Consecutive queries along an image row are spatially coherent, so
    /// passing the previous result as the hint makes each step O(1) in
    /// practice. If the walk leaves the convex hull the exit triangle is
    /// reported with `inside = false`; degenerate walks fall back to a full
    /// scan.
    pub fn locate(&self, query: &Point2<f64>, hint: usize) -> Location {
        let num_triangles = self.num_triangles();
        let mut triangle = hint.min(num_triangles - 1);

        // One crossing per step; a walk longer than the triangle count is
        // cycling on a degenerate configuration.
        for _ in 0..2 * num_triangles {
            let a = self.corner(triangle, 0);
            let b = self.corner(triangle, 1);
            let c = self.corner(triangle, 2);
            let sign = Self::orient(a, b, c);
            if sign == 0.0 {
                break;
            }

            let mut crossed = false;
            for edge in 0..3 {
                let p = self.corner(triangle, edge);
                let q = self.corner(triangle, (edge + 1) % 3);
                if Self::orient(p, q, query) * sign < 0.0 {
                    let opposite = self.halfedges[3 * triangle + edge];
                    if opposite == EMPTY {
                        // left the hull through this edge
                        return Location {
                            triangle,
                            inside: false,
                        };
                    }
                    triangle = opposite / 3;
                    crossed = true;
                    break;
                }
            }
            if !crossed {
                return Location {
                    triangle,
                    inside: true,
                };
            }
        }

        for triangle in 0..num_triangles {
            if self.contains(triangle, query) {
                return Location {
                    triangle,
                    inside: true,
                };
            }
        }
        Location {
            triangle,
            inside: false,
        }
    }

    /// Barycentric coordinates of `query` in `triangle`.
    ///
    /// The first two coefficients are solved from the triangle's edge
    /// transform, the third is derived as one minus their sum, so the row
    /// always sums to 1 — including for queries outside the triangle, where
    /// individual coefficients go negative (extrapolation).
    pub fn barycentric(&self, triangle: usize, query: &Point2<f64>) -> [f64; 3] {
        let a = self.corner(triangle, 0);
        let b = self.corner(triangle, 1);
        let c = self.corner(triangle, 2);
        let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
        let w0 = ((b.y - c.y) * (query.x - c.x) + (c.x - b.x) * (query.y - c.y)) / det;
        let w1 = ((c.y - a.y) * (query.x - c.x) + (a.x - c.x) * (query.y - c.y)) / det;
        [w0, w1, 1.0 - w0 - w1]
    }
}
