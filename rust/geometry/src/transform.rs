// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement and coordinate-system conversions
//!
//! Source models are right-handed Z-up in double precision. glTF is Y-up with
//! single-precision buffers.

use crate::error::{Error, Result};
use bim2gltf_core::{Placement, Xyz};
use nalgebra::{Matrix4, Point3, Vector3};

#[inline]
pub fn point(p: &Xyz) -> Point3<f64> {
    Point3::new(p[0], p[1], p[2])
}

#[inline]
fn vector(v: &Xyz) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

/// Build the 4x4 matrix of a placement.
///
/// Columns are the world-space images of the local axes; the last column is
/// the origin. The basis is used as given (no re-orthogonalization) so mirrored
/// and scaled instances keep their shape.
pub fn placement_matrix(placement: &Placement) -> Result<Matrix4<f64>> {
    let mut values = placement
        .origin
        .iter()
        .chain(&placement.basis_x)
        .chain(&placement.basis_y)
        .chain(&placement.basis_z);
    if values.any(|v| !v.is_finite()) {
        return Err(Error::InvalidPlacement(format!(
            "non-finite component in {:?}",
            placement
        )));
    }

    let x_axis = vector(&placement.basis_x);
    let y_axis = vector(&placement.basis_y);
    let z_axis = vector(&placement.basis_z);
    if x_axis.cross(&y_axis).dot(&z_axis).abs() < 1e-12 {
        return Err(Error::InvalidPlacement(
            "basis vectors are linearly dependent".to_string(),
        ));
    }

    let mut transform = Matrix4::identity();
    transform[(0, 0)] = x_axis.x;
    transform[(1, 0)] = x_axis.y;
    transform[(2, 0)] = x_axis.z;
    transform[(0, 1)] = y_axis.x;
    transform[(1, 1)] = y_axis.y;
    transform[(2, 1)] = y_axis.z;
    transform[(0, 2)] = z_axis.x;
    transform[(1, 2)] = z_axis.y;
    transform[(2, 2)] = z_axis.z;
    transform[(0, 3)] = placement.origin[0];
    transform[(1, 3)] = placement.origin[1];
    transform[(2, 3)] = placement.origin[2];

    Ok(transform)
}

/// Convert a source-space point to glTF space: `(x, y, z)` becomes `(x, z, y)`,
/// narrowed to `f32`.
#[inline]
pub fn source_to_target(p: &Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.z as f32, p.y as f32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_placement() {
        let m = placement_matrix(&Placement::IDENTITY).unwrap();
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn test_rotated_placement() {
        // 90 degrees about Z, then moved to (10, 0, 0)
        let placement = Placement {
            origin: [10.0, 0.0, 0.0],
            basis_x: [0.0, 1.0, 0.0],
            basis_y: [-1.0, 0.0, 0.0],
            basis_z: [0.0, 0.0, 1.0],
        };
        let m = placement_matrix(&placement).unwrap();
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn test_degenerate_placement() {
        let placement = Placement {
            basis_y: [1.0, 0.0, 0.0],
            ..Placement::IDENTITY
        };
        assert!(placement_matrix(&placement).is_err());

        let placement = Placement {
            origin: [f64::NAN, 0.0, 0.0],
            ..Placement::IDENTITY
        };
        assert!(placement_matrix(&placement).is_err());
    }

    #[test]
    fn test_source_to_target_swaps_y_and_z() {
        let target = source_to_target(&Point3::new(1.5, -2.25, 3.125));
        assert_eq!(target, [1.5f32, 3.125f32, -2.25f32]);
    }
}
