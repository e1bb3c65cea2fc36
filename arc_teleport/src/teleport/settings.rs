use cgmath::{Quaternion, Vector3, vec3};
use serde::{Deserialize, Serialize};

use super::aim::{ClampedVelocity, clamp_initial_velocity};
use super::trajectory::{ArcParams, DEFAULT_SAMPLE_RADIUS};
use crate::navmesh::AreaMask;
use crate::physics::LayerMask;

/// Tunables for the arc pointer, navmesh display and teleport behaviour.
///
/// Every field has a default, so a settings file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportSettings {
    pub enabled: bool,
    /// Navmesh areas a landing may sample
    pub nav_area_mask: AreaMask,
    /// Collider layers the arc is cast against
    pub collision_layers: LayerMask,
    /// Launch velocity in the emitter's local frame
    pub initial_velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
    pub point_count: usize,
    pub point_spacing: f32,
    /// Width of the arc ribbon
    pub graphic_thickness: f32,
    pub border_height: f32,
    pub sample_radius: f32,
    /// Show the selectable area's border walls while aiming
    pub display_navmesh: bool,
}

impl Default for TeleportSettings {
    fn default() -> Self {
        TeleportSettings {
            enabled: true,
            nav_area_mask: AreaMask::ALL,
            collision_layers: LayerMask::ALL,
            initial_velocity: vec3(0.0, 0.0, 10.0),
            acceleration: vec3(0.0, -9.8, 0.0),
            point_count: 10,
            point_spacing: 0.3,
            graphic_thickness: 0.05,
            border_height: 0.1,
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            display_navmesh: true,
        }
    }
}

/// World-space position and orientation of the arc emitter (usually a
/// tracked controller).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterPose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl EmitterPose {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        EmitterPose { position, rotation }
    }
}

impl Default for EmitterPose {
    fn default() -> Self {
        EmitterPose {
            position: vec3(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl TeleportSettings {
    /// World-space launch velocity for `pose`, after the launch-angle clamp.
    pub fn launch_velocity(&self, pose: &EmitterPose) -> ClampedVelocity {
        clamp_initial_velocity(pose.rotation * self.initial_velocity)
    }

    pub fn arc_params(&self, pose: &EmitterPose) -> ArcParams {
        self.arc_params_for(pose.position, self.launch_velocity(pose).velocity)
    }

    /// Simulator input for an already clamped launch velocity.
    pub fn arc_params_for(&self, origin: Vector3<f32>, velocity: Vector3<f32>) -> ArcParams {
        ArcParams {
            origin,
            velocity,
            acceleration: self.acceleration,
            point_spacing: self.point_spacing,
            max_points: self.point_count,
            area_mask: self.nav_area_mask,
            collision_layers: self.collision_layers,
            sample_radius: self.sample_radius,
        }
    }
}
