use cgmath::{Deg, InnerSpace, Vector3};

/// Steepest launch angle above the horizontal. 45° gives the longest throw.
pub const MAX_LAUNCH_ANGLE: Deg<f32> = Deg(45.0);

const HORIZONTAL_EPSILON: f32 = 1e-6;

/// An initial velocity after the launch-angle clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedVelocity {
    pub velocity: Vector3<f32>,
    /// Unit vector along `velocity`
    pub direction: Vector3<f32>,
    /// Signed angle above the horizontal plane; negative when aiming down.
    pub angle: Deg<f32>,
}

/// Limit `velocity` to at most [`MAX_LAUNCH_ANGLE`] above the horizontal,
/// keeping its heading and speed.
///
/// Velocities with no horizontal component (straight up or down) have no
/// heading to tilt toward and are returned unchanged.
pub fn clamp_initial_velocity(velocity: Vector3<f32>) -> ClampedVelocity {
    let speed = velocity.magnitude();
    if !(speed > 0.0) {
        return ClampedVelocity {
            velocity,
            direction: velocity,
            angle: Deg(0.0),
        };
    }

    let up = Vector3::unit_y();
    let forward = velocity - up * velocity.dot(up);
    let direction = velocity / speed;

    if forward.magnitude2() <= HORIZONTAL_EPSILON * speed * speed {
        let angle = if velocity.y > 0.0 { Deg(90.0) } else { Deg(-90.0) };
        return ClampedVelocity {
            velocity,
            direction,
            angle,
        };
    }

    let mut angle: Deg<f32> = forward.angle(velocity).into();

    // Below the horizontal, forward x velocity points the same way as right.
    let right = up.cross(forward);
    if right.dot(forward.cross(velocity)) > 0.0 {
        angle = -angle;
    }

    if angle > MAX_LAUNCH_ANGLE {
        let (sin, cos) = MAX_LAUNCH_ANGLE.0.to_radians().sin_cos();
        let direction = (forward.normalize() * cos + up * sin).normalize();
        return ClampedVelocity {
            velocity: direction * speed,
            direction,
            angle: MAX_LAUNCH_ANGLE,
        };
    }

    ClampedVelocity {
        velocity,
        direction,
        angle,
    }
}
