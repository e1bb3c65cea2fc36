use cgmath::{InnerSpace, Vector3};
use rapier3d::parry::query::{Ray, RayCast};
use rapier3d::parry::shape::Triangle;

use super::util::{npoint_to_cgvec, nvec_to_cgmath, vec_to_npoint, vec_to_nvec};
use super::{LayerMask, LineHit, LineQuery};
use crate::navmesh::Triangulation;

struct Surface {
    triangle: Triangle,
    normal: Vector3<f32>,
    layer: u8,
    area: u8,
    snap_anchor: Option<Vector3<f32>>,
}

/// Static triangle soup answering [`LineQuery`] casts.
///
/// Stands in for a host engine's collider set in tools and tests: every
/// surface is a single triangle tagged with a collision layer, a navigation
/// area and optionally a snap anchor.
#[derive(Default)]
pub struct CollisionWorld {
    surfaces: Vec<Surface>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns false (and adds nothing) for a degenerate triangle.
    pub fn add_triangle(&mut self, corners: [Vector3<f32>; 3], layer: u8, area: u8) -> bool {
        self.push_surface(corners, layer, area, None)
    }

    /// Add every triangle of `triangulation` on `layer`, keeping its area tag.
    pub fn add_triangulation(&mut self, triangulation: &Triangulation, layer: u8) -> usize {
        let mut added = 0;
        for (tri, corners) in triangulation.indices.chunks_exact(3).enumerate() {
            let corners = [
                triangulation.vertices[corners[0] as usize],
                triangulation.vertices[corners[1] as usize],
                triangulation.vertices[corners[2] as usize],
            ];
            let area = triangulation.areas.get(tri).copied().unwrap_or(0);
            if self.push_surface(corners, layer, area, None) {
                added += 1;
            }
        }

        crate::physics_log!(
            debug,
            "Added {} of {} triangles to collision layer {}",
            added,
            triangulation.triangle_count(),
            layer
        );
        added
    }

    /// Add a quad (corners in order around the rim) that snaps any arc
    /// hitting it to `anchor`.
    pub fn add_snap_target(&mut self, corners: [Vector3<f32>; 4], anchor: Vector3<f32>, layer: u8) {
        let [a, b, c, d] = corners;
        self.push_surface([a, b, c], layer, 0, Some(anchor));
        self.push_surface([a, c, d], layer, 0, Some(anchor));
    }

    fn push_surface(
        &mut self,
        corners: [Vector3<f32>; 3],
        layer: u8,
        area: u8,
        snap_anchor: Option<Vector3<f32>>,
    ) -> bool {
        let [a, b, c] = corners;
        let triangle = Triangle::new(vec_to_npoint(a), vec_to_npoint(b), vec_to_npoint(c));

        let Some(normal) = triangle.normal() else {
            crate::physics_log!(trace, "Skipping degenerate collision triangle {:?}", corners);
            return false;
        };

        self.surfaces.push(Surface {
            triangle,
            normal: nvec_to_cgmath(normal.into_inner()),
            layer,
            area,
            snap_anchor,
        });
        true
    }
}

impl LineQuery for CollisionWorld {
    fn line_cast(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        layers: LayerMask,
    ) -> Option<LineHit> {
        let delta = to - from;
        if delta.magnitude2() <= f32::EPSILON * f32::EPSILON {
            return None;
        }

        // Direction is left unnormalised so time of impact is a fraction of
        // the segment.
        let ray = Ray::new(vec_to_npoint(from), vec_to_nvec(delta));

        let (toi, surface) = self
            .surfaces
            .iter()
            .filter(|surface| layers.contains_layer(surface.layer))
            .filter_map(|surface| {
                surface
                    .triangle
                    .cast_local_ray(&ray, 1.0, true)
                    .map(|toi| (toi, surface))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))?;

        let normal = if surface.normal.dot(delta) > 0.0 {
            -surface.normal
        } else {
            surface.normal
        };

        Some(LineHit {
            point: npoint_to_cgvec(ray.point_at(toi)),
            normal,
            area: surface.area,
            snap_anchor: surface.snap_anchor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::test_util::grid;
    use cgmath::vec3;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_triangulation(&grid(4, 4, 0.0, 2), 0);
        world
    }

    #[test]
    fn test_segment_through_floor_hits() {
        let world = floor_world();
        let hit = world
            .line_cast(vec3(1.3, 1.0, 1.4), vec3(1.3, -1.0, 1.4), LayerMask::ALL)
            .expect("segment crosses the floor");

        assert!(hit.point.y.abs() < 1e-5);
        assert!((hit.point.x - 1.3).abs() < 1e-5);
        assert!((hit.normal.y - 1.0).abs() < 1e-5);
        assert_eq!(hit.area, 2);
        assert!(!hit.is_snap_target());
    }

    #[test]
    fn test_normal_faces_the_caster() {
        let world = floor_world();
        let hit = world
            .line_cast(vec3(1.3, -1.0, 1.4), vec3(1.3, 1.0, 1.4), LayerMask::ALL)
            .unwrap();
        assert!((hit.normal.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_short_of_floor_misses() {
        let world = floor_world();
        assert!(
            world
                .line_cast(vec3(1.3, 2.0, 1.4), vec3(1.3, 0.5, 1.4), LayerMask::ALL)
                .is_none()
        );
    }

    #[test]
    fn test_layer_mask_filters_surfaces() {
        let world = floor_world();
        assert!(
            world
                .line_cast(vec3(1.3, 1.0, 1.4), vec3(1.3, -1.0, 1.4), LayerMask(0b10))
                .is_none()
        );
    }

    #[test]
    fn test_nearest_surface_wins() {
        let mut world = floor_world();
        world.add_triangle(
            [vec3(0.0, 0.5, 0.0), vec3(0.0, 0.5, 4.0), vec3(4.0, 0.5, 0.0)],
            0,
            7,
        );

        let hit = world
            .line_cast(vec3(1.0, 1.0, 1.0), vec3(1.0, -1.0, 1.0), LayerMask::ALL)
            .unwrap();
        assert!((hit.point.y - 0.5).abs() < 1e-5);
        assert_eq!(hit.area, 7);
    }

    #[test]
    fn test_snap_target_reports_anchor() {
        let mut world = CollisionWorld::new();
        let anchor = vec3(5.0, 0.0, 5.0);
        world.add_snap_target(
            [
                vec3(4.0, 0.2, 4.0),
                vec3(4.0, 0.2, 6.0),
                vec3(6.0, 0.2, 6.0),
                vec3(6.0, 0.2, 4.0),
            ],
            anchor,
            3,
        );
        assert_eq!(world.surface_count(), 2);

        let hit = world
            .line_cast(vec3(4.5, 1.0, 5.5), vec3(4.5, -1.0, 5.5), LayerMask::ALL)
            .unwrap();
        assert!(hit.is_snap_target());
        assert_eq!(hit.snap_anchor, Some(anchor));
    }

    #[test]
    fn test_degenerate_triangles_are_skipped() {
        let mut world = CollisionWorld::new();
        assert!(!world.add_triangle(
            [vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(2.0, 0.0, 0.0)],
            0,
            0
        ));
        assert_eq!(world.surface_count(), 0);
    }
}
