use cgmath::Vector3;

use super::settings::{EmitterPose, TeleportSettings};
use super::trajectory::ArcTrajectory;
use crate::navmesh::{ProximitySampler, SelectableArea};
use crate::physics::LineQuery;
use crate::ribbon::RibbonMesh;

/// A confirmed teleport, produced when the user releases over a valid target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportRequest {
    /// Landing point the arc selected
    pub destination: Vector3<f32>,
    /// New position for the centre of the tracked play area
    pub play_area_position: Vector3<f32>,
    pub did_snap: bool,
}

/// State of the current aim session
#[derive(Clone, Debug, Default)]
pub struct AimState {
    pub is_aiming: bool,
    pub trajectory: Option<ArcTrajectory>,
    /// Launch direction of the current arc, used to orient its ribbon
    pub launch_direction: Option<Vector3<f32>>,
    /// Launch angle above the horizontal, in degrees
    pub arc_angle: f32,
}

impl AimState {
    pub fn has_valid_target(&self) -> bool {
        self.trajectory.as_ref().is_some_and(|t| t.is_valid())
    }
}

/// Drives one arc pointer from button press to teleport.
///
/// Call [`begin_aim`](Self::begin_aim) when the teleport button goes down,
/// [`update_aim`](Self::update_aim) every frame while it is held, and
/// [`release`](Self::release) or [`cancel`](Self::cancel) when it comes up.
pub struct TeleportSystem {
    settings: TeleportSettings,
    state: AimState,
}

impl TeleportSystem {
    pub fn new(settings: TeleportSettings) -> Self {
        TeleportSystem {
            settings,
            state: AimState::default(),
        }
    }

    pub fn with_default_settings() -> Self {
        Self::new(TeleportSettings::default())
    }

    /// Start aiming. Returns false (and stays idle) when teleporting is
    /// disabled.
    pub fn begin_aim(&mut self) -> bool {
        if !self.settings.enabled {
            return false;
        }

        self.state = AimState {
            is_aiming: true,
            ..AimState::default()
        };
        crate::teleport_log!(debug, "Teleport aim started");
        true
    }

    /// Re-simulate the arc from the emitter's current pose.
    pub fn update_aim(
        &mut self,
        pose: &EmitterPose,
        line_query: &dyn LineQuery,
        sampler: &dyn ProximitySampler,
    ) -> Option<&ArcTrajectory> {
        if !self.state.is_aiming {
            return None;
        }

        let launch = self.settings.launch_velocity(pose);
        let params = self.settings.arc_params_for(pose.position, launch.velocity);
        let trajectory = ArcTrajectory::simulate(&params, line_query, sampler);

        self.state.arc_angle = launch.angle.0;
        self.state.launch_direction = Some(launch.direction);
        self.state.trajectory = Some(trajectory);
        self.state.trajectory.as_ref()
    }

    pub fn cancel(&mut self) {
        if self.state.is_aiming {
            crate::teleport_log!(debug, "Teleport aim cancelled");
        }
        self.state = AimState::default();
    }

    /// End the aim session. Yields a request only if the last simulated arc
    /// landed somewhere valid.
    ///
    /// `head` and `play_area_center` are the current world positions of the
    /// user's head and of the tracked space it moves in.
    pub fn release(
        &mut self,
        head: Vector3<f32>,
        play_area_center: Vector3<f32>,
    ) -> Option<TeleportRequest> {
        let state = std::mem::take(&mut self.state);
        if !state.is_aiming {
            return None;
        }

        let trajectory = state.trajectory?;
        if !trajectory.is_valid() {
            crate::teleport_log!(debug, "Teleport released over invalid target");
            return None;
        }

        let destination = trajectory.final_point();
        let request = TeleportRequest {
            destination,
            play_area_position: play_area_destination(destination, head, play_area_center),
            did_snap: trajectory.landing.did_snap,
        };
        crate::teleport_log!(
            info,
            "Teleporting to {:?} (snap: {})",
            destination,
            request.did_snap
        );
        Some(request)
    }

    /// Ribbon mesh for the current arc, or `None` when not aiming.
    pub fn arc_ribbon(&self, uv_offset: f32) -> Option<RibbonMesh> {
        let trajectory = self.state.trajectory.as_ref()?;
        let forward = self.state.launch_direction?;
        Some(RibbonMesh::along_path(
            &trajectory.points,
            forward,
            self.settings.graphic_thickness,
            uv_offset,
        ))
    }

    /// Border walls to draw for `area`: empty unless aiming with
    /// `display_navmesh` set.
    pub fn visible_borders<'a>(&self, area: &'a SelectableArea) -> &'a [RibbonMesh] {
        if self.state.is_aiming && self.settings.display_navmesh {
            area.border_meshes()
        } else {
            &[]
        }
    }

    pub fn state(&self) -> &AimState {
        &self.state
    }

    pub fn settings(&self) -> &TeleportSettings {
        &self.settings
    }

    /// Replace the settings. Disabling teleport ends any aim in progress.
    pub fn set_settings(&mut self, settings: TeleportSettings) {
        self.settings = settings;
        if !self.settings.enabled {
            self.state = AimState::default();
        }
    }
}

/// Where the play area centre must move so the user's head ends up above
/// `selected`.
///
/// The horizontal offset between head and centre is preserved; height is
/// taken from the selected point.
pub fn play_area_destination(
    selected: Vector3<f32>,
    head: Vector3<f32>,
    play_area_center: Vector3<f32>,
) -> Vector3<f32> {
    if head == play_area_center {
        return selected;
    }

    let mut offset = play_area_center - head;
    offset.y = 0.0;
    selected + offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::test_util::grid;
    use crate::navmesh::{AreaMask, SelectableArea};
    use crate::physics::CollisionWorld;
    use cgmath::{Quaternion, Rotation3, vec3};

    fn scene() -> (CollisionWorld, SelectableArea) {
        let triangulation = grid(20, 20, 0.0, 0);
        let mut world = CollisionWorld::new();
        world.add_triangulation(&triangulation, 0);
        let mut area = SelectableArea::new(0.1);
        area.rebuild(&triangulation, AreaMask::ALL);
        (world, area)
    }

    fn settings() -> TeleportSettings {
        TeleportSettings {
            point_count: 40,
            ..TeleportSettings::default()
        }
    }

    fn pose() -> EmitterPose {
        EmitterPose::new(vec3(10.25, 1.5, 2.0), Quaternion::new(1.0, 0.0, 0.0, 0.0))
    }

    #[test]
    fn test_update_without_aim_does_nothing() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());

        assert!(system.update_aim(&pose(), &world, &area).is_none());
        assert!(system.release(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_aim_and_release_teleports() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());

        assert!(system.begin_aim());
        let trajectory = system.update_aim(&pose(), &world, &area).unwrap();
        assert!(trajectory.is_valid());
        assert!(system.state().has_valid_target());
        assert!(system.arc_ribbon(0.0).is_some_and(|r| !r.is_empty()));

        let head = vec3(1.0, 1.7, 1.0);
        let request = system.release(head, head).unwrap();
        assert_eq!(request.play_area_position, request.destination);
        assert!(!request.did_snap);
        assert!(request.destination.y.abs() < 1e-4);

        assert!(!system.state().is_aiming);
        assert!(system.arc_ribbon(0.0).is_none());
    }

    #[test]
    fn test_release_over_invalid_target_is_ignored() {
        let world = CollisionWorld::new();
        let area = SelectableArea::new(0.1);
        let mut system = TeleportSystem::new(settings());

        system.begin_aim();
        let trajectory = system.update_aim(&pose(), &world, &area).unwrap();
        assert!(!trajectory.is_valid());
        assert!(system.release(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_cancel_discards_target() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());

        system.begin_aim();
        system.update_aim(&pose(), &world, &area);
        system.cancel();

        assert!(system.state().trajectory.is_none());
        assert!(system.release(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_disabled_system_never_aims() {
        let mut system = TeleportSystem::new(TeleportSettings {
            enabled: false,
            ..settings()
        });
        assert!(!system.begin_aim());
        assert!(!system.state().is_aiming);

        let mut enabled = TeleportSystem::new(settings());
        enabled.begin_aim();
        enabled.set_settings(TeleportSettings {
            enabled: false,
            ..settings()
        });
        assert!(!enabled.state().is_aiming);
    }

    #[test]
    fn test_arc_angle_tracks_pose() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());
        system.begin_aim();

        system.update_aim(&pose(), &world, &area);
        assert!(system.state().arc_angle.abs() < 1e-4);
    }

    #[test]
    fn test_border_walls_show_only_while_aiming() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());
        assert!(system.visible_borders(&area).is_empty());

        system.begin_aim();
        system.update_aim(&pose(), &world, &area);
        assert_eq!(system.visible_borders(&area).len(), area.border_meshes().len());
        assert!(!system.visible_borders(&area).is_empty());

        system.set_settings(TeleportSettings {
            display_navmesh: false,
            ..settings()
        });
        assert!(system.visible_borders(&area).is_empty());

        system.cancel();
        assert!(system.visible_borders(&area).is_empty());
    }

    #[test]
    fn test_arc_starts_from_clamped_launch() {
        let (world, area) = scene();
        let mut system = TeleportSystem::new(settings());
        system.begin_aim();

        // Pitched 60 degrees up: clamped to 45.
        let steep = EmitterPose::new(
            vec3(10.25, 1.5, 2.0),
            Quaternion::from_angle_x(cgmath::Deg(-60.0)),
        );
        let trajectory = system.update_aim(&steep, &world, &area).unwrap();
        let first_step = trajectory.points[1] - trajectory.points[0];
        assert!(first_step.y > 0.0 && first_step.z > 0.0);
        assert!(first_step.y <= first_step.z);
        assert!((system.state().arc_angle - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_play_area_keeps_head_offset() {
        let selected = vec3(5.0, 1.0, 5.0);
        let head = vec3(1.0, 1.7, 2.0);
        let center = vec3(0.5, 0.0, 1.0);

        let destination = play_area_destination(selected, head, center);
        assert_eq!(destination, vec3(4.5, 1.0, 4.0));

        // Head now sits above the selected point.
        let new_head = destination + (head - center);
        assert!((new_head.x - selected.x).abs() < 1e-6);
        assert!((new_head.z - selected.z).abs() < 1e-6);
    }

    #[test]
    fn test_head_at_centre_moves_centre_to_target() {
        let selected = vec3(5.0, 1.0, 5.0);
        let head = vec3(2.0, 0.0, 2.0);
        assert_eq!(play_area_destination(selected, head, head), selected);
    }
}
