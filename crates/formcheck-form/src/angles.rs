//! Joint angles for on-screen overlays.

use formcheck_core::{JointTriple, LimbSide, PoseSnapshot};
use serde::{Deserialize, Serialize};

/// Display angles for both limbs, in degrees.
///
/// Unmeasurable angles are `None`; overlays are informational and must not
/// fail a frame that validation already accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub left_elbow: Option<f64>,
    pub right_elbow: Option<f64>,
    pub left_knee: Option<f64>,
    pub right_knee: Option<f64>,
    pub left_hip: Option<f64>,
    pub right_hip: Option<f64>,
}

impl JointAngles {
    pub fn measure(snapshot: &PoseSnapshot) -> Self {
        let at = |triple: JointTriple| triple.measure(snapshot).ok();
        Self {
            left_elbow: at(JointTriple::elbow(LimbSide::Left)),
            right_elbow: at(JointTriple::elbow(LimbSide::Right)),
            left_knee: at(JointTriple::knee(LimbSide::Left)),
            right_knee: at(JointTriple::knee(LimbSide::Right)),
            left_hip: at(JointTriple::hip(LimbSide::Left)),
            right_hip: at(JointTriple::hip(LimbSide::Right)),
        }
    }

    /// Labelled angles that could be measured, in display order
    pub fn labelled(&self) -> Vec<(&'static str, f64)> {
        [
            ("left_elbow", self.left_elbow),
            ("right_elbow", self.right_elbow),
            ("left_knee", self.left_knee),
            ("right_knee", self.right_knee),
            ("left_hip", self.left_hip),
            ("right_hip", self.right_hip),
        ]
        .into_iter()
        .filter_map(|(label, angle)| angle.map(|a| (label, a)))
        .collect()
    }
}
