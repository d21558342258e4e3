//! Form standards: the data table describing correct technique per exercise.
//!
//! A standard is an optional coarse posture gate followed by independent
//! checks. Everything here is plain serde data so new exercises can be loaded
//! from a file without touching the validator.

use formcheck_core::{Error, JointId, JointTriple, LimbSide, PoseSnapshot, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single rule failure: what to tell the user and which joints to highlight
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub message: String,
    pub joints: Vec<JointId>,
}

/// One bound of the coarse posture gate. Comparisons are strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRule {
    pub angle: JointTriple,
    /// Angle must be strictly greater than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    /// Angle must be strictly less than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
}

impl GateRule {
    pub fn above(angle: JointTriple, degrees: f64) -> Self {
        Self {
            angle,
            above: Some(degrees),
            below: None,
        }
    }

    pub fn below(angle: JointTriple, degrees: f64) -> Self {
        Self {
            angle,
            above: None,
            below: Some(degrees),
        }
    }

    pub fn admits(&self, degrees: f64) -> bool {
        self.above.map_or(true, |min| degrees > min) && self.below.map_or(true, |max| degrees < max)
    }
}

/// Cheap whole-posture check run before any fine-grained rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureGate {
    pub message: String,
    pub rules: Vec<GateRule>,
}

impl PostureGate {
    /// `None` when every rule admits the snapshot, otherwise a single finding
    /// flagging the vertex of each rejecting rule.
    pub fn check(&self, snapshot: &PoseSnapshot) -> Result<Option<Finding>> {
        let mut rejected = Vec::new();
        for rule in &self.rules {
            let degrees = rule.angle.measure(snapshot)?;
            if !rule.admits(degrees) {
                rejected.push(rule.angle.vertex);
            }
        }

        if rejected.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Finding {
                message: self.message.clone(),
                joints: rejected,
            }))
        }
    }
}

/// Fine-grained rule evaluated after the gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormCheck {
    /// Joint angle must lie in [min, max]
    AngleRange {
        name: String,
        angle: JointTriple,
        min: f64,
        max: f64,
        message: String,
        #[serde(default)]
        flags: Vec<JointId>,
    },
    /// `joint` must not be further along +x than `reference`
    AheadOf {
        name: String,
        joint: JointId,
        reference: JointId,
        message: String,
        #[serde(default)]
        flags: Vec<JointId>,
    },
    /// `joint.y` must stay within `tolerance` of `reference.y`.
    /// Image y grows downwards, so "too low" means a larger y.
    VerticalBand {
        name: String,
        joint: JointId,
        reference: JointId,
        tolerance: f64,
        too_low_message: String,
        too_high_message: String,
        #[serde(default)]
        flags: Vec<JointId>,
    },
}

impl FormCheck {
    pub fn name(&self) -> &str {
        match self {
            FormCheck::AngleRange { name, .. }
            | FormCheck::AheadOf { name, .. }
            | FormCheck::VerticalBand { name, .. } => name,
        }
    }

    /// Joints highlighted when this check fails; falls back to the joints the
    /// check reads.
    pub fn flagged(&self) -> Vec<JointId> {
        match self {
            FormCheck::AngleRange { angle, flags, .. } => {
                if flags.is_empty() {
                    angle.joints().to_vec()
                } else {
                    flags.clone()
                }
            }
            FormCheck::AheadOf {
                joint,
                reference,
                flags,
                ..
            } => {
                if flags.is_empty() {
                    vec![*joint, *reference]
                } else {
                    flags.clone()
                }
            }
            FormCheck::VerticalBand { joint, flags, .. } => {
                if flags.is_empty() {
                    vec![*joint]
                } else {
                    flags.clone()
                }
            }
        }
    }

    pub fn evaluate(&self, snapshot: &PoseSnapshot) -> Result<Option<Finding>> {
        let message = match self {
            FormCheck::AngleRange {
                angle,
                min,
                max,
                message,
                ..
            } => {
                let degrees = angle.measure(snapshot)?;
                if degrees < *min || degrees > *max {
                    Some(message.clone())
                } else {
                    None
                }
            }
            FormCheck::AheadOf {
                joint,
                reference,
                message,
                ..
            } => {
                if snapshot.position(*joint)?.x > snapshot.position(*reference)?.x {
                    Some(message.clone())
                } else {
                    None
                }
            }
            FormCheck::VerticalBand {
                joint,
                reference,
                tolerance,
                too_low_message,
                too_high_message,
                ..
            } => {
                let y = snapshot.position(*joint)?.y;
                let reference_y = snapshot.position(*reference)?.y;
                if y > reference_y + tolerance {
                    Some(too_low_message.clone())
                } else if y < reference_y - tolerance {
                    Some(too_high_message.clone())
                } else {
                    None
                }
            }
        };

        Ok(message.map(|message| Finding {
            message,
            joints: self.flagged(),
        }))
    }
}

/// Correct technique for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormStandard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<PostureGate>,
    pub checks: Vec<FormCheck>,
}

impl FormStandard {
    /// Built-in squat standard, left side authoritative
    pub fn squat() -> Self {
        let side = LimbSide::Left;
        Self {
            gate: Some(PostureGate {
                message: "Not in squat position".to_string(),
                rules: vec![
                    GateRule::below(JointTriple::knee(side), 150.0),
                    GateRule::above(JointTriple::elbow(side), 150.0),
                    GateRule::above(JointTriple::hip(side), 30.0),
                ],
            }),
            checks: vec![
                FormCheck::AngleRange {
                    name: "knee_depth".to_string(),
                    angle: JointTriple::knee(side),
                    min: 60.0,
                    max: 100.0,
                    message: "Bend your knees between 60-100 degrees".to_string(),
                    flags: vec![JointId::knee(side), JointId::ankle(side)],
                },
                FormCheck::AheadOf {
                    name: "knee_over_toes".to_string(),
                    joint: JointId::knee(side),
                    reference: JointId::ankle(side),
                    message: "Keep your knees behind your toes".to_string(),
                    flags: vec![JointId::knee(side), JointId::ankle(side)],
                },
                FormCheck::AngleRange {
                    name: "back_angle".to_string(),
                    angle: JointTriple::hip(side),
                    min: 45.0,
                    max: 90.0,
                    message: "Keep your back straight".to_string(),
                    flags: vec![JointId::shoulder(side), JointId::hip(side)],
                },
            ],
        }
    }

    /// Built-in forearm plank standard, left side authoritative
    pub fn plank() -> Self {
        let side = LimbSide::Left;
        Self {
            gate: None,
            checks: vec![
                // Upper bound above 180 is slack for landmark noise
                FormCheck::AngleRange {
                    name: "body_line".to_string(),
                    angle: JointTriple::body_line(side),
                    min: 160.0,
                    max: 200.0,
                    message: "Keep your body in a straight line".to_string(),
                    flags: vec![
                        JointId::shoulder(side),
                        JointId::hip(side),
                        JointId::ankle(side),
                    ],
                },
                FormCheck::VerticalBand {
                    name: "hip_height".to_string(),
                    joint: JointId::hip(side),
                    reference: JointId::shoulder(side),
                    tolerance: 0.1,
                    too_low_message: "Raise your hips".to_string(),
                    too_high_message: "Lower your hips".to_string(),
                    flags: vec![JointId::hip(side)],
                },
                FormCheck::AngleRange {
                    name: "elbow_angle".to_string(),
                    angle: JointTriple::elbow(side),
                    min: 80.0,
                    max: 100.0,
                    message: "Keep your elbows at 90 degrees".to_string(),
                    flags: vec![
                        JointId::shoulder(side),
                        JointId::elbow(side),
                        JointId::wrist(side),
                    ],
                },
            ],
        }
    }

    /// Reject bands that can never pass
    pub fn check_consistency(&self, exercise: &str) -> Result<()> {
        if let Some(gate) = &self.gate {
            for rule in &gate.rules {
                if let (Some(above), Some(below)) = (rule.above, rule.below) {
                    if above >= below {
                        return Err(Error::InvalidStandard(format!(
                            "{exercise}.gate: rule at {} needs above {above} < below {below}",
                            rule.angle.vertex
                        )));
                    }
                }
            }
        }
        for check in &self.checks {
            match check {
                FormCheck::AngleRange { name, min, max, .. } if min > max => {
                    return Err(Error::InvalidStandard(format!(
                        "{exercise}.{name}: min {min} exceeds max {max}"
                    )));
                }
                FormCheck::VerticalBand {
                    name, tolerance, ..
                } if *tolerance < 0.0 => {
                    return Err(Error::InvalidStandard(format!(
                        "{exercise}.{name}: negative tolerance {tolerance}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Re-centre every angle band on the angle measured in `baseline`,
    /// keeping each band's width. The gate and positional checks are left
    /// as they are.
    pub fn personalize(&self, baseline: &PoseSnapshot) -> Result<FormStandard> {
        let mut checks = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let adjusted = match check {
                FormCheck::AngleRange {
                    name,
                    angle,
                    min,
                    max,
                    message,
                    flags,
                } => {
                    let reference = angle.measure(baseline)?;
                    let half_width = (max - min) / 2.0;
                    FormCheck::AngleRange {
                        name: name.clone(),
                        angle: *angle,
                        min: reference - half_width,
                        max: reference + half_width,
                        message: message.clone(),
                        flags: flags.clone(),
                    }
                }
                other => other.clone(),
            };
            checks.push(adjusted);
        }

        Ok(FormStandard {
            gate: self.gate.clone(),
            checks,
        })
    }
}

/// Loadable table of form standards keyed by exercise name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormStandards {
    exercises: BTreeMap<String, FormStandard>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl FormStandards {
    pub fn empty() -> Self {
        Self {
            exercises: BTreeMap::new(),
        }
    }

    /// Squat and plank
    pub fn builtin() -> Self {
        let mut standards = Self::empty();
        standards.insert("squat", FormStandard::squat());
        standards.insert("plank", FormStandard::plank());
        standards
    }

    /// Parse a JSON table (`{"squat": {...}, "plank": {...}}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: FormStandards = serde_json::from_str(json)?;
        parsed.validated()
    }

    /// Normalize keys and reject inconsistent standards
    pub fn validated(self) -> Result<Self> {
        let mut standards = Self::empty();
        for (name, standard) in self.exercises {
            standard.check_consistency(&name)?;
            if standards.insert(&name, standard).is_some() {
                return Err(Error::InvalidStandard(format!(
                    "exercise {:?} is defined more than once",
                    normalize_name(&name)
                )));
            }
        }
        Ok(standards)
    }

    /// Add or replace the standard for an exercise
    pub fn insert(&mut self, exercise: &str, standard: FormStandard) -> Option<FormStandard> {
        self.exercises.insert(normalize_name(exercise), standard)
    }

    pub fn get(&self, exercise: &str) -> Option<&FormStandard> {
        self.exercises.get(&normalize_name(exercise))
    }

    pub fn contains(&self, exercise: &str) -> bool {
        self.get(exercise).is_some()
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

impl Default for FormStandards {
    fn default() -> Self {
        Self::builtin()
    }
}
