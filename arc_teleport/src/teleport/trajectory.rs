use cgmath::{InnerSpace, Vector3};

use super::snap::snap_arc;
use crate::navmesh::{AreaMask, ProximitySampler};
use crate::physics::{LayerMask, LineHit, LineQuery};

/// Minimum `normal · up` for a hit surface to count as floor.
pub const WALKABLE_NORMAL_THRESHOLD: f32 = 0.99;

/// Search radius for confirming a landing against the walkable mesh.
pub const DEFAULT_SAMPLE_RADIUS: f32 = 0.5;

/// How far the nearest navmesh point may drift horizontally from the hit
/// point before the hit is treated as beside the mesh rather than on it.
pub const HORIZONTAL_MATCH_TOLERANCE: f32 = 1e-3;

pub(crate) const MIN_SPEED: f32 = 1e-6;

/// Position at time `t` of a body starting at `p0` with velocity `v0` under
/// constant acceleration `a`.
pub fn parabolic_position(
    p0: Vector3<f32>,
    v0: Vector3<f32>,
    a: Vector3<f32>,
    t: f32,
) -> Vector3<f32> {
    p0 + v0 * t + a * (0.5 * t * t)
}

pub fn parabolic_velocity(v0: Vector3<f32>, a: Vector3<f32>, t: f32) -> Vector3<f32> {
    v0 + a * t
}

/// Inputs for one simulated arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub origin: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
    /// Arc length between consecutive samples
    pub point_spacing: f32,
    pub max_points: usize,
    pub area_mask: AreaMask,
    pub collision_layers: LayerMask,
    pub sample_radius: f32,
}

/// Where an arc ended and whether the user may teleport there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingResult {
    pub final_point: Vector3<f32>,
    pub on_walkable_mesh: bool,
    pub did_snap: bool,
    pub snap_anchor: Option<Vector3<f32>>,
}

impl LandingResult {
    fn invalid(final_point: Vector3<f32>) -> Self {
        LandingResult {
            final_point,
            on_walkable_mesh: false,
            did_snap: false,
            snap_anchor: None,
        }
    }
}

/// Sampled teleport arc and its landing classification.
#[derive(Clone, Debug)]
pub struct ArcTrajectory {
    /// Points along the arc, starting at the origin and ending at
    /// `landing.final_point`
    pub points: Vec<Vector3<f32>>,
    pub landing: LandingResult,
}

impl ArcTrajectory {
    /// Sample a parabola until it hits something or runs out of points.
    ///
    /// Steps are spaced by arc length, so the time step shrinks as the body
    /// speeds up. Each step casts a segment from the previous sample; the
    /// first hit ends the arc.
    pub fn simulate(
        params: &ArcParams,
        line_query: &dyn LineQuery,
        sampler: &dyn ProximitySampler,
    ) -> Self {
        let origin = params.origin;
        let mut points = Vec::with_capacity(params.max_points + 1);
        points.push(origin);

        if !(params.point_spacing > 0.0) || !params.point_spacing.is_finite() {
            crate::teleport_log!(
                warn,
                "Refusing to simulate arc with point spacing {}",
                params.point_spacing
            );
            return ArcTrajectory {
                points,
                landing: LandingResult::invalid(origin),
            };
        }

        let mut last = origin;
        let mut t = 0.0;

        for _ in 0..params.max_points {
            let speed = parabolic_velocity(params.velocity, params.acceleration, t).magnitude();
            if !speed.is_finite() {
                break;
            }

            t += if speed > MIN_SPEED {
                params.point_spacing / speed
            } else {
                // At rest: step until the body has fallen one spacing.
                let accel = params.acceleration.magnitude();
                if accel <= MIN_SPEED {
                    crate::teleport_log!(trace, "Arc stalled at t = {}", t);
                    break;
                }
                (2.0 * params.point_spacing / accel).sqrt()
            };
            let next = parabolic_position(origin, params.velocity, params.acceleration, t);

            if let Some(hit) = line_query.line_cast(last, next, params.collision_layers) {
                return Self::land(params, points, hit, sampler);
            }

            points.push(next);
            last = next;
        }

        let final_point = points.last().copied().unwrap_or(origin);
        crate::teleport_log!(trace, "Arc ended after {} points without a hit", points.len());
        ArcTrajectory {
            points,
            landing: LandingResult::invalid(final_point),
        }
    }

    fn land(
        params: &ArcParams,
        mut points: Vec<Vector3<f32>>,
        hit: LineHit,
        sampler: &dyn ProximitySampler,
    ) -> Self {
        if let Some(anchor) = hit.snap_anchor {
            let points = snap_arc(
                params.origin,
                anchor,
                params.velocity,
                params.acceleration,
                params.point_spacing,
                params.max_points,
            );
            return ArcTrajectory {
                points,
                landing: LandingResult {
                    final_point: anchor,
                    on_walkable_mesh: true,
                    did_snap: true,
                    snap_anchor: Some(anchor),
                },
            };
        }

        points.push(hit.point);
        let on_walkable_mesh = classify_hit(&hit, sampler, params.area_mask, params.sample_radius);

        ArcTrajectory {
            points,
            landing: LandingResult {
                final_point: hit.point,
                on_walkable_mesh,
                did_snap: false,
                snap_anchor: None,
            },
        }
    }

    pub fn final_point(&self) -> Vector3<f32> {
        self.landing.final_point
    }

    pub fn is_valid(&self) -> bool {
        self.landing.on_walkable_mesh
    }

    pub fn arc_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).magnitude())
            .sum()
    }

    /// Point at fraction `t` (clamped to 0..=1) of the way through the
    /// samples, interpolating linearly between neighbours.
    pub fn point_at_normalized_position(&self, t: f32) -> Option<Vector3<f32>> {
        let last = self.points.len().checked_sub(1)?;
        if last == 0 {
            return self.points.first().copied();
        }

        let scaled = t.clamp(0.0, 1.0) * last as f32;
        let index = (scaled as usize).min(last - 1);
        let t_local = scaled - index as f32;

        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        Some(p1 + (p2 - p1) * t_local)
    }
}

/// Decide whether a non-snap hit is a valid place to stand.
///
/// The surface must face up, and the nearest navmesh point within `radius`
/// must sit directly under or over the hit. A hit just beside the mesh
/// samples to the mesh edge, which moves it horizontally.
pub fn classify_hit(
    hit: &LineHit,
    sampler: &dyn ProximitySampler,
    area_mask: AreaMask,
    radius: f32,
) -> bool {
    let length = hit.normal.magnitude();
    if !(length > f32::EPSILON) {
        return false;
    }
    if Vector3::unit_y().dot(hit.normal / length) < WALKABLE_NORMAL_THRESHOLD {
        return false;
    }

    match sampler.sample_position(hit.point, radius, area_mask) {
        Some(sample) => {
            (sample.position.x - hit.point.x).abs() <= HORIZONTAL_MATCH_TOLERANCE
                && (sample.position.z - hit.point.z).abs() <= HORIZONTAL_MATCH_TOLERANCE
        }
        None => false,
    }
}
