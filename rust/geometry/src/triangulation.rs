// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face triangulation
//!
//! Planar faces are projected onto their own plane and handed to earcutr.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes)
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    let total_points: usize = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);

    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Orthonormal 2D frame lying in a plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
}

impl PlaneBasis {
    /// Build a basis for the plane through `origin` with the given normal
    pub fn new(origin: Point3<f64>, normal: &Vector3<f64>) -> Self {
        // Use the axis least parallel to the normal for a stable cross product
        let abs_x = normal.x.abs();
        let abs_y = normal.y.abs();
        let abs_z = normal.z.abs();

        let reference = if abs_x <= abs_y && abs_x <= abs_z {
            Vector3::new(1.0, 0.0, 0.0)
        } else if abs_y <= abs_z {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u_axis = normal.cross(&reference).normalize();
        let v_axis = normal.cross(&u_axis).normalize();

        Self {
            origin,
            u_axis,
            v_axis,
        }
    }

    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        let v = p - self.origin;
        Point2::new(v.dot(&self.u_axis), v.dot(&self.v_axis))
    }

    pub fn project_all(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

/// Calculate the normal of a polygon from its vertices (Newell's method)
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();

    if n < 3 {
        return Vector3::new(0.0, 0.0, 1.0);
    }

    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    if len > 1e-10 {
        normal / len
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    }
}

/// Triangulate a planar face given in 3D.
///
/// Returns index triples into the concatenation of `outer` and every hole
/// with at least 3 points (holes with fewer are dropped before indexing).
pub fn triangulate_face(
    outer: &[Point3<f64>],
    holes: &[Vec<Point3<f64>>],
) -> Result<(Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(format!(
            "Face outer loop has {} points",
            outer.len()
        )));
    }

    let normal = calculate_polygon_normal(outer);
    let basis = PlaneBasis::new(outer[0], &normal);

    let valid_holes: Vec<&Vec<Point3<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();

    let outer_2d = basis.project_all(outer);
    let holes_2d: Vec<Vec<Point2<f64>>> = valid_holes.iter().map(|h| basis.project_all(h)).collect();

    let indices = triangulate_polygon_with_holes(&outer_2d, &holes_2d)?;

    let mut points = Vec::with_capacity(outer.len() + holes_2d.iter().map(|h| h.len()).sum::<usize>());
    points.extend_from_slice(outer);
    for hole in valid_holes {
        points.extend_from_slice(hole);
    }

    let triangles = indices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    Ok((points, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_triangulate_concave_l_shape() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        // n - 2 triangles for a simple polygon
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_triangulate_square_with_hole() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let hole = vec![
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 7.0),
            Point2::new(7.0, 7.0),
            Point2::new(7.0, 3.0),
        ];

        let indices = triangulate_polygon_with_holes(&outer, &[hole]).unwrap();
        assert!(indices.len() > 6);
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_calculate_polygon_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        let normal = calculate_polygon_normal(&points);
        assert!((normal.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_vertical_face() {
        // Wall face in the XZ plane
        let outer = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(0.0, 0.0, 3.0),
        ];

        let (points, triangles) = triangulate_face(&outer, &[]).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn test_triangulate_face_drops_short_holes() {
        let outer = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let holes = vec![vec![Point3::new(0.2, 0.2, 0.0)]];

        let (points, triangles) = triangulate_face(&outer, &holes).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(triangles, vec![[0, 1, 2]]);
    }
}
