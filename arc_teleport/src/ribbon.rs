use cgmath::{InnerSpace, Vector2, Vector3, vec2};

/// Double-sided triangle strip following a polyline.
///
/// Two vertices per input point; each quad between consecutive points is
/// emitted in both windings so it shows from either side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibbonMesh {
    pub vertices: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub indices: Vec<u32>,
}

impl RibbonMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 12
    }

    /// Flat ribbon of `width` lying across `forward`, following `points`.
    ///
    /// `uv_offset` scrolls the texture along the ribbon; pass a value that
    /// wraps in `0..1` over time to animate it. The last segment is usually
    /// shorter than the others, so its v coordinate is shifted to keep the
    /// texture from stretching.
    pub fn along_path(
        points: &[Vector3<f32>],
        forward: Vector3<f32>,
        width: f32,
        uv_offset: f32,
    ) -> RibbonMesh {
        if points.len() < 2 {
            return RibbonMesh::default();
        }

        let right = ribbon_right(forward);
        let half = right * (width / 2.0);
        let last = points.len() - 1;

        let mut vertices = Vec::with_capacity(points.len() * 2);
        let mut uvs = Vec::with_capacity(points.len() * 2);

        for (x, point) in points.iter().enumerate() {
            vertices.push(*point - half);
            vertices.push(*point + half);

            let mut offset = uv_offset;
            if x == last && x > 1 {
                let dist_last = (points[x - 2] - points[x - 1]).magnitude();
                let dist_cur = (points[x] - points[x - 1]).magnitude();
                if dist_last > 0.0 {
                    offset += 1.0 - dist_cur / dist_last;
                }
            }

            let v = x as f32 - offset;
            uvs.push(vec2(0.0, v));
            uvs.push(vec2(1.0, v));
        }

        RibbonMesh {
            vertices,
            uvs,
            indices: double_sided_strip(points.len()),
        }
    }

    /// Upright wall of `height` standing on a border polyline.
    pub fn border_wall(points: &[Vector3<f32>], height: f32) -> RibbonMesh {
        if points.len() < 2 {
            return RibbonMesh::default();
        }

        let raise = Vector3::unit_y() * height;
        let mut vertices = Vec::with_capacity(points.len() * 2);
        let mut uvs = Vec::with_capacity(points.len() * 2);

        for (x, point) in points.iter().enumerate() {
            let u = (x % 2) as f32;
            vertices.push(*point);
            vertices.push(*point + raise);
            uvs.push(vec2(u, 0.0));
            uvs.push(vec2(u, 1.0));
        }

        RibbonMesh {
            vertices,
            uvs,
            indices: double_sided_strip(points.len()),
        }
    }
}

/// Arc ribbon with no texture scroll.
pub fn build_ribbon(points: &[Vector3<f32>], forward: Vector3<f32>, width: f32) -> RibbonMesh {
    RibbonMesh::along_path(points, forward, width, 0.0)
}

fn ribbon_right(forward: Vector3<f32>) -> Vector3<f32> {
    let right = forward.cross(Vector3::unit_y());
    if right.magnitude2() > f32::EPSILON {
        right.normalize()
    } else {
        // Pointing straight up or down; any horizontal axis will do.
        Vector3::unit_x()
    }
}

fn double_sided_strip(point_count: usize) -> Vec<u32> {
    let quads = point_count.saturating_sub(1);
    let mut indices = Vec::with_capacity(quads * 12);

    for x in 0..quads as u32 {
        let p1 = 2 * x;
        let p2 = p1 + 1;
        let p3 = p1 + 2;
        let p4 = p1 + 3;
        indices.extend_from_slice(&[p1, p2, p3, p3, p2, p4, p3, p2, p1, p4, p2, p3]);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    fn straight_line(count: usize) -> Vec<Vector3<f32>> {
        (0..count).map(|i| vec3(0.0, 0.0, i as f32)).collect()
    }

    #[test]
    fn test_too_few_points_give_empty_mesh() {
        let forward = vec3(0.0, 0.0, 1.0);
        assert!(build_ribbon(&[], forward, 0.1).is_empty());
        assert!(build_ribbon(&[vec3(1.0, 2.0, 3.0)], forward, 0.1).is_empty());
        assert!(RibbonMesh::border_wall(&[vec3(1.0, 2.0, 3.0)], 1.0).vertices.is_empty());
    }

    #[test]
    fn test_ribbon_layout() {
        let points = straight_line(4);
        let ribbon = build_ribbon(&points, vec3(0.0, 0.0, 1.0), 0.2);

        assert_eq!(ribbon.vertices.len(), 8);
        assert_eq!(ribbon.uvs.len(), 8);
        assert_eq!(ribbon.quad_count(), 3);
        assert_eq!(ribbon.indices.len(), 36);
        assert!(ribbon.indices.iter().all(|&i| (i as usize) < ribbon.vertices.len()));
        assert_eq!(&ribbon.indices[..12], &[0, 1, 2, 2, 1, 3, 2, 1, 0, 3, 1, 2]);
    }

    #[test]
    fn test_ribbon_spans_width_across_forward() {
        let points = straight_line(3);
        let ribbon = build_ribbon(&points, vec3(0.0, 0.0, 1.0), 0.2);

        // forward x up for +z forward is -x.
        assert!((ribbon.vertices[0] - vec3(0.1, 0.0, 0.0)).magnitude() < 1e-6);
        assert!((ribbon.vertices[1] - vec3(-0.1, 0.0, 0.0)).magnitude() < 1e-6);
        for pair in ribbon.vertices.chunks_exact(2) {
            assert!(((pair[1] - pair[0]).magnitude() - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uv_advances_per_point_with_offset() {
        let points = straight_line(3);
        let ribbon = RibbonMesh::along_path(&points, vec3(0.0, 0.0, 1.0), 0.2, 0.25);

        assert_eq!(ribbon.uvs[0], vec2(0.0, -0.25));
        assert_eq!(ribbon.uvs[1], vec2(1.0, -0.25));
        assert_eq!(ribbon.uvs[2], vec2(0.0, 0.75));
        // Equal segment lengths need no correction on the last point.
        assert_eq!(ribbon.uvs[4], vec2(0.0, 1.75));
    }

    #[test]
    fn test_short_last_segment_shifts_uv() {
        let points = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 0.0, 1.0),
            vec3(0.0, 0.0, 2.0),
            vec3(0.0, 0.0, 2.5),
        ];
        let ribbon = build_ribbon(&points, vec3(0.0, 0.0, 1.0), 0.1);

        // Half-length final segment: v = 3 - (1 - 0.5).
        assert!((ribbon.uvs[6].y - 2.5).abs() < 1e-6);
        assert!((ribbon.uvs[7].y - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_forward_falls_back_to_x_axis() {
        let points = straight_line(2);
        let ribbon = build_ribbon(&points, vec3(0.0, 1.0, 0.0), 2.0);
        assert!((ribbon.vertices[0] - vec3(-1.0, 0.0, 0.0)).magnitude() < 1e-6);
        assert!(ribbon.vertices.iter().all(|v| v.x.is_finite()));
    }

    #[test]
    fn test_border_wall_stands_on_points() {
        let points = vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(1.0, 0.0, 1.0)];
        let wall = RibbonMesh::border_wall(&points, 0.5);

        assert_eq!(wall.vertices.len(), 6);
        assert_eq!(wall.vertices[2], vec3(1.0, 0.0, 0.0));
        assert_eq!(wall.vertices[3], vec3(1.0, 0.5, 0.0));
        assert_eq!(wall.uvs[2], vec2(1.0, 0.0));
        assert_eq!(wall.uvs[3], vec2(1.0, 1.0));
        assert_eq!(wall.uvs[4], vec2(0.0, 0.0));
        assert_eq!(wall.quad_count(), 2);
    }
}
