use cgmath::{InnerSpace, Vector3};

use super::trajectory::{MIN_SPEED, parabolic_position, parabolic_velocity};

const ROOT_EPSILON: f32 = 1e-6;

/// Time at which a body launched from height `origin_y` with vertical speed
/// `velocity_y` under vertical acceleration `acceleration_y` reaches
/// `target_y` on the way down.
///
/// Takes the later positive root. Returns `None` if the height is never
/// reached at a positive time.
pub fn snap_landing_time(
    origin_y: f32,
    target_y: f32,
    velocity_y: f32,
    acceleration_y: f32,
) -> Option<f32> {
    let drop = origin_y - target_y;

    if acceleration_y.abs() < ROOT_EPSILON {
        if velocity_y.abs() < ROOT_EPSILON {
            return None;
        }
        let t = -drop / velocity_y;
        return (t > ROOT_EPSILON).then_some(t);
    }

    // ½a·t² + v·t + drop = 0
    let discriminant = velocity_y * velocity_y - 2.0 * acceleration_y * drop;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-velocity_y + root) / acceleration_y;
    let t2 = (-velocity_y - root) / acceleration_y;

    [t1, t2]
        .into_iter()
        .filter(|t| t.is_finite() && *t > ROOT_EPSILON)
        .reduce(f32::max)
}

/// Re-aim the arc so that it ends exactly at `anchor`.
///
/// The vertical launch speed is kept; horizontal speed is solved so the body
/// arrives above the anchor at the moment it reaches the anchor's height.
/// When that height is unreachable the path degenerates to a straight
/// segment. The returned points always start at `origin` and end at `anchor`.
pub fn snap_arc(
    origin: Vector3<f32>,
    anchor: Vector3<f32>,
    velocity: Vector3<f32>,
    acceleration: Vector3<f32>,
    point_spacing: f32,
    max_points: usize,
) -> Vec<Vector3<f32>> {
    let Some(landing_time) = snap_landing_time(origin.y, anchor.y, velocity.y, acceleration.y)
    else {
        crate::teleport_log!(
            debug,
            "Snap anchor {:?} unreachable from {:?}, using a straight path",
            anchor,
            origin
        );
        return vec![origin, anchor];
    };

    let t2 = landing_time * landing_time;
    let velocity = Vector3::new(
        (anchor.x - origin.x - 0.5 * acceleration.x * t2) / landing_time,
        velocity.y,
        (anchor.z - origin.z - 0.5 * acceleration.z * t2) / landing_time,
    );

    let mut points = Vec::with_capacity(max_points + 2);
    points.push(origin);

    let mut t = 0.0;
    for _ in 0..max_points {
        let speed = parabolic_velocity(velocity, acceleration, t).magnitude();
        if !speed.is_finite() || speed <= MIN_SPEED {
            break;
        }

        t += point_spacing / speed;
        if t >= landing_time {
            break;
        }
        points.push(parabolic_position(origin, velocity, acceleration, t));
    }

    points.push(anchor);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    fn gravity() -> Vector3<f32> {
        vec3(0.0, -9.8, 0.0)
    }

    #[test]
    fn test_landing_time_for_drop() {
        // 4.9 m fall from rest takes one second.
        let t = snap_landing_time(4.9, 0.0, 0.0, -9.8).unwrap();
        assert!((t - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_landing_time_takes_descending_crossing() {
        // Thrown upward through a target above the origin: the target is
        // crossed twice and the later crossing is the landing.
        let t = snap_landing_time(0.0, 1.0, 9.8, -9.8).unwrap();
        let rising = (9.8 - (9.8f32 * 9.8 - 2.0 * 9.8).sqrt()) / 9.8;
        assert!(t > rising + 0.1);
        let height = 9.8 * t - 4.9 * t * t;
        assert!((height - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_unreachable_height_has_no_landing_time() {
        assert!(snap_landing_time(0.0, 10.0, 1.0, -9.8).is_none());
        assert!(snap_landing_time(0.0, -1.0, 0.0, 0.0).is_none());
        assert!(snap_landing_time(0.0, 1.0, -2.0, 0.0).is_none());
    }

    #[test]
    fn test_linear_landing_time_without_gravity() {
        let t = snap_landing_time(2.0, 0.0, -4.0, 0.0).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_snap_arc_ends_exactly_on_anchor() {
        let origin = vec3(0.0, 1.5, 0.0);
        let anchor = vec3(0.7, 0.0, 5.0);
        let points = snap_arc(origin, anchor, vec3(0.0, 0.0, 10.0), gravity(), 0.3, 40);

        assert_eq!(points.first(), Some(&origin));
        assert_eq!(points.last(), Some(&anchor));
        assert!(points.len() > 2);

        // Every intermediate sample is above the anchor height and heads
        // toward it.
        for pair in points.windows(2) {
            assert!(pair[1].z >= pair[0].z);
        }
        for point in &points[1..points.len() - 1] {
            assert!(point.y > anchor.y);
        }
    }

    #[test]
    fn test_snap_arc_truncated_sampling_still_ends_on_anchor() {
        let origin = vec3(0.0, 1.5, 0.0);
        let anchor = vec3(0.0, 0.0, 5.0);
        let points = snap_arc(origin, anchor, vec3(0.0, 0.0, 10.0), gravity(), 0.3, 3);

        assert_eq!(points.len(), 5);
        assert_eq!(points.last(), Some(&anchor));
    }

    #[test]
    fn test_unreachable_anchor_falls_back_to_segment() {
        let origin = vec3(0.0, 0.0, 0.0);
        let anchor = vec3(0.0, 20.0, 2.0);
        let points = snap_arc(origin, anchor, vec3(0.0, 1.0, 1.0), gravity(), 0.3, 10);
        assert_eq!(points, vec![origin, anchor]);
    }
}
