//! Joint angle geometry.
//!
//! All angles are measured on the image plane: depth and visibility never
//! participate, matching how the pose estimator's 2-D coordinates are
//! calibrated.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{JointId, Landmark, LimbSide, PoseSnapshot};

/// Segments shorter than this are treated as zero-length.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Angle in degrees at vertex `b` formed by segments `b→a` and `b→c`.
///
/// Returns a value in [0, 180]. The cosine is clamped before `acos` so that
/// floating-point drift on (anti-)parallel segments cannot leave the domain.
/// Zero-length segments and non-finite coordinates (including overflow of
/// the segment lengths) are `DegenerateGeometry`; the result is never NaN.
pub fn angle_at(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Result<f64> {
    let ba: Vector2<f64> = a - b;
    let bc: Vector2<f64> = c - b;

    let degenerate = || Error::DegenerateGeometry {
        vertex: format!("({:.4}, {:.4})", b.x, b.y),
    };

    let norm_ba = ba.norm();
    let norm_bc = bc.norm();
    // NaN compares false against everything, so reject it before the length test
    if !norm_ba.is_finite() || !norm_bc.is_finite() {
        return Err(degenerate());
    }
    if norm_ba < DEGENERATE_EPSILON || norm_bc < DEGENERATE_EPSILON {
        return Err(degenerate());
    }

    let cosine = ba.dot(&bc) / (norm_ba * norm_bc);
    if !cosine.is_finite() {
        return Err(degenerate());
    }
    Ok(cosine.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Angle at landmark `b` between `a` and `c`.
pub fn angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Result<f64> {
    angle_at(a.to_point2(), b.to_point2(), c.to_point2())
}

/// Three joints describing an angle, vertex in the middle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointTriple {
    pub from: JointId,
    pub vertex: JointId,
    pub to: JointId,
}

impl JointTriple {
    pub const fn new(from: JointId, vertex: JointId, to: JointId) -> Self {
        Self { from, vertex, to }
    }

    /// Shoulder-elbow-wrist
    pub fn elbow(side: LimbSide) -> Self {
        Self::new(
            JointId::shoulder(side),
            JointId::elbow(side),
            JointId::wrist(side),
        )
    }

    /// Hip-knee-ankle
    pub fn knee(side: LimbSide) -> Self {
        Self::new(JointId::hip(side), JointId::knee(side), JointId::ankle(side))
    }

    /// Shoulder-hip-knee (torso against thigh)
    pub fn hip(side: LimbSide) -> Self {
        Self::new(
            JointId::shoulder(side),
            JointId::hip(side),
            JointId::knee(side),
        )
    }

    /// Shoulder-hip-ankle (whole-body line)
    pub fn body_line(side: LimbSide) -> Self {
        Self::new(
            JointId::shoulder(side),
            JointId::hip(side),
            JointId::ankle(side),
        )
    }

    pub fn mirrored(&self) -> Self {
        Self::new(
            self.from.mirrored(),
            self.vertex.mirrored(),
            self.to.mirrored(),
        )
    }

    pub fn joints(&self) -> [JointId; 3] {
        [self.from, self.vertex, self.to]
    }

    /// Measure this angle on a snapshot
    pub fn measure(&self, snapshot: &PoseSnapshot) -> Result<f64> {
        angle(
            snapshot.joint(self.from),
            snapshot.joint(self.vertex),
            snapshot.joint(self.to),
        )
        .map_err(|_| Error::degenerate_at(self.vertex))
    }
}
