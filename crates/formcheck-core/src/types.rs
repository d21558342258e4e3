//! Fundamental types for the FormCheck system.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of landmarks produced by the pose estimator for one person.
pub const LANDMARK_COUNT: usize = 33;

/// A single tracked body point (normalized image coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0-1 across the frame
    pub x: f64,
    /// Vertical position, 0-1 down the frame
    pub y: f64,
    /// Relative depth (smaller is closer to the camera)
    #[serde(default)]
    pub z: f64,
    /// Confidence that the point is correctly located, 0-1
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Fully visible landmark on the image plane.
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Whether both image-plane coordinates are usable numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Body side for symmetric joints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbSide {
    Left,
    Right,
}

impl Default for LimbSide {
    fn default() -> Self {
        LimbSide::Left
    }
}

/// 33-landmark body joint definition (BlazePose topology)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JointId {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl JointId {
    pub const COUNT: usize = LANDMARK_COUNT;

    /// All joints in landmark order
    pub const ALL: [JointId; LANDMARK_COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Same joint on the opposite side of the body; midline joints map to themselves.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Nose => Self::Nose,
            Self::LeftEyeInner => Self::RightEyeInner,
            Self::LeftEye => Self::RightEye,
            Self::LeftEyeOuter => Self::RightEyeOuter,
            Self::RightEyeInner => Self::LeftEyeInner,
            Self::RightEye => Self::LeftEye,
            Self::RightEyeOuter => Self::LeftEyeOuter,
            Self::LeftEar => Self::RightEar,
            Self::RightEar => Self::LeftEar,
            Self::MouthLeft => Self::MouthRight,
            Self::MouthRight => Self::MouthLeft,
            // Paired joints alternate left/right from index 11 onwards
            other => {
                let idx = other.index();
                let twin = if idx % 2 == 1 { idx + 1 } else { idx - 1 };
                Self::ALL[twin]
            }
        }
    }

    pub fn shoulder(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftShoulder,
            LimbSide::Right => Self::RightShoulder,
        }
    }

    pub fn elbow(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftElbow,
            LimbSide::Right => Self::RightElbow,
        }
    }

    pub fn wrist(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftWrist,
            LimbSide::Right => Self::RightWrist,
        }
    }

    pub fn hip(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftHip,
            LimbSide::Right => Self::RightHip,
        }
    }

    pub fn knee(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftKnee,
            LimbSide::Right => Self::RightKnee,
        }
    }

    pub fn ankle(side: LimbSide) -> Self {
        match side {
            LimbSide::Left => Self::LeftAnkle,
            LimbSide::Right => Self::RightAnkle,
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|joint| joint.name() == s)
            .ok_or_else(|| Error::UnknownJoint(s.to_string()))
    }
}

/// Look up one joint in a raw landmark list, enforcing the 33-slot schema
pub fn joint(landmarks: &[Landmark], id: JointId) -> Result<Landmark> {
    if landmarks.len() != LANDMARK_COUNT {
        return Err(Error::InvalidSnapshot {
            expected: LANDMARK_COUNT,
            actual: landmarks.len(),
        });
    }
    Ok(landmarks[id.index()])
}

/// Complete body pose for one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct PoseSnapshot {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl PoseSnapshot {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Validate and wrap a landmark list coming from the pose estimator
    pub fn from_landmarks(landmarks: &[Landmark]) -> Result<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks
                .try_into()
                .map_err(|_| Error::InvalidSnapshot {
                    expected: LANDMARK_COUNT,
                    actual: landmarks.len(),
                })?;
        Ok(Self { landmarks })
    }

    pub fn joint(&self, id: JointId) -> &Landmark {
        &self.landmarks[id.index()]
    }

    /// Replace one joint, returning the modified snapshot
    pub fn with_joint(mut self, id: JointId, landmark: Landmark) -> Self {
        self.landmarks[id.index()] = landmark;
        self
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn shoulder(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::shoulder(side))
    }

    pub fn elbow(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::elbow(side))
    }

    pub fn wrist(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::wrist(side))
    }

    pub fn hip(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::hip(side))
    }

    pub fn knee(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::knee(side))
    }

    pub fn ankle(&self, side: LimbSide) -> &Landmark {
        self.joint(JointId::ankle(side))
    }

    /// Joint whose position feeds a coordinate comparison. A non-finite
    /// coordinate would make every comparison false, so it is rejected.
    pub fn position(&self, id: JointId) -> Result<&Landmark> {
        let landmark = self.joint(id);
        if landmark.is_finite() {
            Ok(landmark)
        } else {
            Err(Error::degenerate_at(id))
        }
    }
}

impl Default for PoseSnapshot {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LANDMARK_COUNT],
        }
    }
}

impl TryFrom<Vec<Landmark>> for PoseSnapshot {
    type Error = Error;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self> {
        Self::from_landmarks(&landmarks)
    }
}

impl From<PoseSnapshot> for Vec<Landmark> {
    fn from(snapshot: PoseSnapshot) -> Self {
        snapshot.landmarks.to_vec()
    }
}

/// Exercises the classifier can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    Plank,
    Unknown,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Plank => "plank",
            ExerciseKind::Unknown => "unknown",
        }
    }

    /// Map a free-form exercise name; anything unrecognised is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "squat" => ExerciseKind::Squat,
            "plank" => ExerciseKind::Plank,
            _ => ExerciseKind::Unknown,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const GOOD_FORM: &str = "Good form!";
pub const UNSUPPORTED_EXERCISE: &str = "Exercise type not supported";
pub const NO_POSE_DETECTED: &str = "No pose detected. Please make sure your full body is visible.";

/// Outcome of evaluating one frame against a form standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    /// Corrective messages in check order
    pub feedback: Vec<String>,
    /// Joints at fault, in the order they were first flagged
    pub incorrect_points: Vec<JointId>,
    pub is_correct: bool,
}

impl FeedbackResult {
    /// Build a result from accumulated findings. No findings means good form.
    pub fn from_findings(feedback: Vec<String>, incorrect_points: Vec<JointId>) -> Self {
        if feedback.is_empty() {
            return Self::good_form();
        }

        let mut unique = Vec::with_capacity(incorrect_points.len());
        for joint in incorrect_points {
            if !unique.contains(&joint) {
                unique.push(joint);
            }
        }

        Self {
            feedback,
            incorrect_points: unique,
            is_correct: false,
        }
    }

    pub fn good_form() -> Self {
        Self {
            feedback: vec![GOOD_FORM.to_string()],
            incorrect_points: Vec::new(),
            is_correct: true,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            feedback: vec![UNSUPPORTED_EXERCISE.to_string()],
            incorrect_points: Vec::new(),
            is_correct: false,
        }
    }

    pub fn no_pose() -> Self {
        Self {
            feedback: vec![NO_POSE_DETECTED.to_string()],
            incorrect_points: Vec::new(),
            is_correct: false,
        }
    }

    /// Resolve flagged joints to image coordinates from the evaluated snapshot
    pub fn resolve_points(&self, snapshot: &PoseSnapshot) -> Vec<[f64; 2]> {
        self.incorrect_points
            .iter()
            .map(|&id| {
                let landmark = snapshot.joint(id);
                [landmark.x, landmark.y]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index_table() {
        assert_eq!(JointId::LeftShoulder.index(), 11);
        assert_eq!(JointId::RightShoulder.index(), 12);
        assert_eq!(JointId::LeftElbow.index(), 13);
        assert_eq!(JointId::LeftWrist.index(), 15);
        assert_eq!(JointId::LeftHip.index(), 23);
        assert_eq!(JointId::LeftKnee.index(), 25);
        assert_eq!(JointId::RightAnkle.index(), 28);

        for (i, joint) in JointId::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
            assert_eq!(JointId::from_index(i), Some(*joint));
        }
        assert_eq!(JointId::from_index(33), None);
    }

    #[test]
    fn test_joint_names_roundtrip() {
        for joint in JointId::ALL {
            assert_eq!(joint.name().parse::<JointId>().unwrap(), joint);
        }
        assert!("left_tail".parse::<JointId>().is_err());
    }

    #[test]
    fn test_joint_mirroring() {
        assert_eq!(JointId::LeftKnee.mirrored(), JointId::RightKnee);
        assert_eq!(JointId::RightShoulder.mirrored(), JointId::LeftShoulder);
        assert_eq!(JointId::LeftEye.mirrored(), JointId::RightEye);
        assert_eq!(JointId::Nose.mirrored(), JointId::Nose);
        for joint in JointId::ALL {
            assert_eq!(joint.mirrored().mirrored(), joint);
        }
    }

    #[test]
    fn test_snapshot_requires_33_landmarks() {
        let short = vec![Landmark::at(0.5, 0.5); 17];
        let err = PoseSnapshot::from_landmarks(&short).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSnapshot {
                expected: 33,
                actual: 17
            }
        );

        let long = vec![Landmark::at(0.5, 0.5); 34];
        assert!(PoseSnapshot::from_landmarks(&long).is_err());

        let exact = vec![Landmark::at(0.5, 0.5); 33];
        assert!(PoseSnapshot::from_landmarks(&exact).is_ok());
    }

    #[test]
    fn test_position_rejects_non_finite() {
        let snapshot = PoseSnapshot::default()
            .with_joint(JointId::LeftHip, Landmark::at(f64::NAN, 0.5))
            .with_joint(JointId::LeftKnee, Landmark::at(0.4, 0.7));
        assert_eq!(
            snapshot.position(JointId::LeftHip).unwrap_err(),
            Error::degenerate_at(JointId::LeftHip)
        );
        assert_eq!(snapshot.position(JointId::LeftKnee).unwrap().y, 0.7);
    }

    #[test]
    fn test_raw_joint_lookup() {
        let mut landmarks = vec![Landmark::default(); 33];
        landmarks[25] = Landmark::at(0.4, 0.7);
        let knee = joint(&landmarks, JointId::LeftKnee).unwrap();
        assert_eq!(knee.x, 0.4);

        assert!(joint(&landmarks[..32], JointId::LeftKnee).is_err());
    }

    #[test]
    fn test_snapshot_side_accessors() {
        let snapshot = PoseSnapshot::default()
            .with_joint(JointId::LeftHip, Landmark::at(0.3, 0.5))
            .with_joint(JointId::RightHip, Landmark::at(0.6, 0.5));
        assert_eq!(snapshot.hip(LimbSide::Left).x, 0.3);
        assert_eq!(snapshot.hip(LimbSide::Right).x, 0.6);
    }

    #[test]
    fn test_snapshot_json_enforces_length() {
        let json = serde_json::to_string(&vec![Landmark::at(0.1, 0.2); 33]).unwrap();
        let snapshot: PoseSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.joint(JointId::Nose).y, 0.2);

        let json = serde_json::to_string(&vec![Landmark::at(0.1, 0.2); 5]).unwrap();
        assert!(serde_json::from_str::<PoseSnapshot>(&json).is_err());
    }

    #[test]
    fn test_landmark_defaults_from_json() {
        let lm: Landmark = serde_json::from_str(r#"{"x": 0.5, "y": 0.25}"#).unwrap();
        assert_eq!(lm.z, 0.0);
        assert_eq!(lm.visibility, 1.0);
    }

    #[test]
    fn test_exercise_kind_names() {
        assert_eq!(ExerciseKind::from_name("Squat"), ExerciseKind::Squat);
        assert_eq!(ExerciseKind::from_name("plank "), ExerciseKind::Plank);
        assert_eq!(
            ExerciseKind::from_name("made-up-exercise"),
            ExerciseKind::Unknown
        );
        assert_eq!(ExerciseKind::Plank.to_string(), "plank");
    }

    #[test]
    fn test_feedback_dedupes_points() {
        let result = FeedbackResult::from_findings(
            vec!["a".into(), "b".into()],
            vec![JointId::LeftKnee, JointId::LeftAnkle, JointId::LeftKnee],
        );
        assert!(!result.is_correct);
        assert_eq!(
            result.incorrect_points,
            vec![JointId::LeftKnee, JointId::LeftAnkle]
        );

        let good = FeedbackResult::from_findings(Vec::new(), Vec::new());
        assert!(good.is_correct);
        assert_eq!(good.feedback, vec![GOOD_FORM.to_string()]);
    }

    #[test]
    fn test_resolve_points() {
        let snapshot =
            PoseSnapshot::default().with_joint(JointId::LeftHip, Landmark::at(0.25, 0.75));
        let result = FeedbackResult::from_findings(vec!["x".into()], vec![JointId::LeftHip]);
        assert_eq!(result.resolve_points(&snapshot), vec![[0.25, 0.75]]);
    }
}
