//! Collision queries the trajectory simulator makes against host geometry.
pub mod collision_world;
pub mod util;

pub use collision_world::CollisionWorld;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// Bitset of collision layers. Bit `n` selects layer `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(!0);

    pub fn contains_layer(self, layer: u8) -> bool {
        match 1u32.checked_shl(layer as u32) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// First intersection of a segment with collidable geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    pub point: Vector3<f32>,
    /// Surface normal, facing back along the segment
    pub normal: Vector3<f32>,
    pub area: u8,
    /// Set when the surface is a snap target; the arc lands exactly here.
    pub snap_anchor: Option<Vector3<f32>>,
}

impl LineHit {
    pub fn is_snap_target(&self) -> bool {
        self.snap_anchor.is_some()
    }
}

/// Segment intersection oracle against host-engine colliders.
pub trait LineQuery {
    /// Nearest hit on the segment `from -> to` among colliders on `layers`.
    fn line_cast(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        layers: LayerMask,
    ) -> Option<LineHit>;
}

impl<F> LineQuery for F
where
    F: Fn(Vector3<f32>, Vector3<f32>, LayerMask) -> Option<LineHit>,
{
    fn line_cast(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        layers: LayerMask,
    ) -> Option<LineHit> {
        self(from, to, layers)
    }
}
