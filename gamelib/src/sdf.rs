//! Signed-distance geometry over axis-aligned boxes.
//!
//! Every query here is pure: a box is a `(center, half-extent)` pair and the
//! tolerances live in [`SdfParams`], so the same inputs always give the same
//! answer. Surface points are found by sphere tracing, which is approximate;
//! accuracy is bounded by `epsilon` and `max_steps`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Default surface tolerance for ray marching and gradient offsets.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// Default step budget for a single ray march.
pub const DEFAULT_MAX_STEPS: u32 = 64;

/// Tunable tolerances for the SDF queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfParams {
    /// A march stops once the distance drops below this value.
    pub epsilon: f32,
    /// Maximum number of sphere-tracing iterations.
    pub max_steps: u32,
}

impl Default for SdfParams {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// How a ray march ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarchOutcome {
    /// The distance fell below epsilon.
    Hit,
    /// Travel reached `t_max` before a hit.
    OutOfRange,
    /// The step budget ran out; the point is the ray origin.
    StepBudget,
}

/// Trace of one ray march.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct March {
    pub point: Vec2,
    pub steps: u32,
    pub outcome: MarchOutcome,
}

/// Axis-aligned box in the xy plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxShape {
    pub center: Vec2,
    pub half: Vec2,
}

impl BoxShape {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self {
            center,
            half: half.max(Vec2::ZERO),
        }
    }

    /// Box covering `size` (full extents) around `center`.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size * 0.5)
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Full extents of the box.
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Distance from `p` to the boundary, negative inside, with the boundary
    /// inflated outward by `radius`.
    pub fn signed_distance(&self, p: Vec2, radius: f32) -> f32 {
        let q = (p - self.center).abs() - self.half;
        let outside = q.max(Vec2::ZERO).length();
        let inside = q.max_element().min(0.0);
        outside + inside - radius
    }

    /// Sphere-traces from `origin + t_start * dir` along `dir`, returning the full trace.
    pub fn march(&self, origin: Vec2, dir: Vec2, t_start: f32, t_max: f32, params: &SdfParams) -> March {
        let mut t = t_start;
        for step in 0..params.max_steps {
            let p = origin + dir * t;
            let distance = self.signed_distance(p, 0.0);
            if distance < params.epsilon {
                return March {
                    point: p,
                    steps: step + 1,
                    outcome: MarchOutcome::Hit,
                };
            }
            t += distance;
            if t >= t_max {
                return March {
                    point: origin + dir * t_max,
                    steps: step + 1,
                    outcome: MarchOutcome::OutOfRange,
                };
            }
        }
        March {
            point: origin,
            steps: params.max_steps,
            outcome: MarchOutcome::StepBudget,
        }
    }

    /// Point where a ray first comes within epsilon of the surface.
    pub fn ray_march(&self, origin: Vec2, dir: Vec2, t_start: f32, t_max: f32, params: &SdfParams) -> Vec2 {
        self.march(origin, dir, t_start, t_max, params).point
    }

    /// Surface point met by a ray cast from `p` toward the center.
    ///
    /// Returns `p` unchanged when it is already inside the box or the march
    /// does not converge.
    pub fn support(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        let dir = self.center - p;
        let t_max = dir.length() + self.size().length();
        self.ray_march(p, dir.normalized(), 0.0, t_max, params)
    }

    /// Outward unit normal from the central-difference gradient at `p`.
    pub fn normal(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        self.gradient(p, params.epsilon).normalized()
    }

    /// The normal with its components swapped; only meaningful near faces and corners.
    pub fn tangent(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        self.gradient(p, params.epsilon).swapped().normalized()
    }

    fn gradient(&self, p: Vec2, e: f32) -> Vec2 {
        Vec2::new(
            self.signed_distance(Vec2::new(p.x + e, p.y), 0.0)
                - self.signed_distance(Vec2::new(p.x - e, p.y), 0.0),
            self.signed_distance(Vec2::new(p.x, p.y + e), 0.0)
                - self.signed_distance(Vec2::new(p.x, p.y - e), 0.0),
        )
    }
}

/// Signed gap between two boxes measured between their support points.
///
/// Positive values are an approximate separation; negative values mean the
/// boxes interpenetrate and the magnitude approximates the penetration depth.
pub fn touching(a: &BoxShape, b: &BoxShape, params: &SdfParams) -> f32 {
    let pa = a.support(b.center, params);
    let pb = b.support(a.center, params);
    let gap = pa.distance(pb);
    if a.signed_distance(pb, 0.0) < 0.0 || b.signed_distance(pa, 0.0) < 0.0 {
        -gap
    } else {
        gap
    }
}

/// Inclusive overlap test between two 3D boxes given as min/max corners.
pub fn aabb_overlap(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    a_min.x <= b_max.x
        && a_max.x >= b_min.x
        && a_min.y <= b_max.y
        && a_max.y >= b_min.y
        && a_min.z <= b_max.z
        && a_max.z >= b_min.z
}
