// Arc teleport targeting
//
// A parabolic pointer is thrown from the controller every frame. Where it
// first touches collidable geometry decides the landing: flat ground over the
// walkable mesh is valid, walls and off-mesh ground are not, and snap targets
// pull the arc onto a fixed anchor.

pub mod aim;
pub mod settings;
pub mod snap;
pub mod teleport_system;
pub mod trajectory;

pub use aim::{ClampedVelocity, MAX_LAUNCH_ANGLE, clamp_initial_velocity};
pub use settings::{EmitterPose, TeleportSettings};
pub use snap::{snap_arc, snap_landing_time};
pub use teleport_system::{AimState, TeleportRequest, TeleportSystem, play_area_destination};
pub use trajectory::{ArcParams, ArcTrajectory, LandingResult, classify_hit};
