use cgmath::{InnerSpace, Vector3};
use ordered_float::OrderedFloat;
use rapier3d::parry::query::PointQuery;
use rapier3d::parry::shape::Triangle;

use super::{AreaMask, WalkableMesh};
use crate::physics::util::{npoint_to_cgvec, vec_to_npoint};

/// Nearest walkable position found by a [`ProximitySampler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavSample {
    pub position: Vector3<f32>,
    pub area: u8,
}

/// Nearest-point-on-navmesh query used to confirm a landing.
pub trait ProximitySampler {
    /// Closest walkable point within `radius` of `point` whose area tag is in
    /// `area_mask`, if any.
    fn sample_position(
        &self,
        point: Vector3<f32>,
        radius: f32,
        area_mask: AreaMask,
    ) -> Option<NavSample>;
}

impl ProximitySampler for WalkableMesh {
    fn sample_position(
        &self,
        point: Vector3<f32>,
        radius: f32,
        area_mask: AreaMask,
    ) -> Option<NavSample> {
        let query = vec_to_npoint(point);

        (0..self.triangle_count())
            .filter(|&tri| area_mask.contains_area(self.areas[tri]))
            .filter_map(|tri| {
                let [a, b, c] = self.triangle(tri);
                if !within_bounds(point, radius, [a, b, c]) {
                    return None;
                }

                let triangle = Triangle::new(vec_to_npoint(a), vec_to_npoint(b), vec_to_npoint(c));
                let position = npoint_to_cgvec(triangle.project_local_point(&query, true).point);
                let distance = (position - point).magnitude();
                (distance <= radius).then_some((tri, position, distance))
            })
            .min_by_key(|&(_, _, distance)| OrderedFloat(distance))
            .map(|(tri, position, _)| NavSample {
                position,
                area: self.areas[tri],
            })
    }
}

/// Cheap reject: is `point` within `radius` of the triangle's bounding box?
fn within_bounds(point: Vector3<f32>, radius: f32, corners: [Vector3<f32>; 3]) -> bool {
    (0..3).all(|axis| {
        let lo = corners.iter().map(|c| c[axis]).fold(f32::INFINITY, f32::min);
        let hi = corners.iter().map(|c| c[axis]).fold(f32::NEG_INFINITY, f32::max);
        point[axis] >= lo - radius && point[axis] <= hi + radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::test_util::{grid, unit_square};
    use crate::navmesh::{AreaMask, reduce};
    use cgmath::vec3;

    #[test]
    fn test_point_above_mesh_projects_straight_down() {
        let mesh = reduce(&grid(2, 2, 0.0, 0), AreaMask::ALL);
        let sample = mesh
            .sample_position(vec3(0.75, 0.2, 1.25), 0.5, AreaMask::ALL)
            .expect("point is above the mesh");

        assert!((sample.position.x - 0.75).abs() < 1e-5);
        assert!(sample.position.y.abs() < 1e-5);
        assert!((sample.position.z - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_point_beside_mesh_snaps_to_edge() {
        let mesh = reduce(&unit_square(0), AreaMask::ALL);
        let sample = mesh
            .sample_position(vec3(1.3, 0.0, 0.5), 0.5, AreaMask::ALL)
            .expect("edge is within radius");

        assert!((sample.position.x - 1.0).abs() < 1e-5);
        assert!((sample.position.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_point_outside_radius_is_rejected() {
        let mesh = reduce(&unit_square(0), AreaMask::ALL);
        assert!(
            mesh.sample_position(vec3(3.0, 0.0, 0.5), 0.5, AreaMask::ALL)
                .is_none()
        );
        assert!(
            mesh.sample_position(vec3(0.5, 2.0, 0.5), 0.5, AreaMask::ALL)
                .is_none()
        );
    }

    #[test]
    fn test_area_mask_filters_samples() {
        let mesh = reduce(&unit_square(3), AreaMask::ALL);
        assert!(
            mesh.sample_position(vec3(0.5, 0.0, 0.5), 0.5, AreaMask::from_area(2))
                .is_none()
        );
        let sample = mesh
            .sample_position(vec3(0.5, 0.0, 0.5), 0.5, AreaMask::from_area(3))
            .unwrap();
        assert_eq!(sample.area, 3);
    }
}
