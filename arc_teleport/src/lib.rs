pub mod logging;
pub mod navmesh;
pub mod physics;
pub mod ribbon;
pub mod teleport;

pub use logging::{LogConfig, init_logging};
pub use navmesh::{
    AreaMask, BorderPointSet, NavMeshError, ProximitySampler, SelectableArea, Triangulation,
    WalkableMesh, extract_borders, reduce,
};
pub use physics::{CollisionWorld, LayerMask, LineHit, LineQuery};
pub use ribbon::{RibbonMesh, build_ribbon};
pub use teleport::{
    ArcParams, ArcTrajectory, EmitterPose, LandingResult, TeleportRequest, TeleportSettings,
    TeleportSystem,
};
