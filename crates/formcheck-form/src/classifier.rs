//! Rule-based exercise classification.
//!
//! A plank holds the shoulder-hip-knee-ankle chain nearly straight; a squat
//! folds it at both hip and knee. Angles between the two thresholds are left
//! as `Unknown` so transition frames do not flap between labels.

use formcheck_core::{Error, ExerciseKind, JointTriple, LimbSide, PoseSnapshot, Result};
use serde::{Deserialize, Serialize};

/// Classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Both angles must exceed this (degrees) for a plank
    pub plank_threshold: f64,
    /// Both angles must be below this (degrees) for a squat
    pub squat_threshold: f64,
    /// Confidence reported for a plank or squat match
    pub decisive_confidence: f64,
    /// Confidence reported for `Unknown`
    pub ambiguous_confidence: f64,
    /// Limb the angles are measured on
    pub side: LimbSide,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            plank_threshold: 150.0,
            squat_threshold: 120.0,
            decisive_confidence: 0.95,
            ambiguous_confidence: 0.5,
            side: LimbSide::Left,
        }
    }
}

impl ClassifierConfig {
    /// Thresholds must be angles with the squat band below the plank band;
    /// confidences must lie in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, degrees) in [
            ("plank_threshold", self.plank_threshold),
            ("squat_threshold", self.squat_threshold),
        ] {
            if !(0.0..=180.0).contains(&degrees) {
                return Err(Error::InvalidConfig(format!(
                    "classifier.{name} {degrees} is outside [0, 180]"
                )));
            }
        }
        if self.squat_threshold > self.plank_threshold {
            return Err(Error::InvalidConfig(format!(
                "classifier.squat_threshold {} exceeds plank_threshold {}",
                self.squat_threshold, self.plank_threshold
            )));
        }
        for (name, confidence) in [
            ("decisive_confidence", self.decisive_confidence),
            ("ambiguous_confidence", self.ambiguous_confidence),
        ] {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(Error::InvalidConfig(format!(
                    "classifier.{name} {confidence} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Classification outcome with the angles that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub exercise: ExerciseKind,
    pub confidence: f64,
    /// Shoulder-hip-knee angle (degrees)
    pub hip_angle: f64,
    /// Hip-knee-ankle angle (degrees)
    pub knee_angle: f64,
}

impl From<Classification> for (ExerciseKind, f64) {
    fn from(c: Classification) -> Self {
        (c.exercise, c.confidence)
    }
}

/// Infers which exercise a snapshot shows
#[derive(Debug, Clone, Default)]
pub struct ExerciseClassifier {
    config: ClassifierConfig,
}

impl ExerciseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, snapshot: &PoseSnapshot) -> Result<Classification> {
        let hip_angle = JointTriple::hip(self.config.side).measure(snapshot)?;
        let knee_angle = JointTriple::knee(self.config.side).measure(snapshot)?;

        let classification = self.decide(hip_angle, knee_angle);
        tracing::debug!(
            "Classified {} (confidence {:.2}, hip {:.1}, knee {:.1})",
            classification.exercise,
            classification.confidence,
            hip_angle,
            knee_angle
        );
        Ok(classification)
    }

    /// Decision table over precomputed angles. First match wins.
    pub fn decide(&self, hip_angle: f64, knee_angle: f64) -> Classification {
        let c = &self.config;
        let (exercise, confidence) =
            if hip_angle > c.plank_threshold && knee_angle > c.plank_threshold {
                (ExerciseKind::Plank, c.decisive_confidence)
            } else if hip_angle < c.squat_threshold && knee_angle < c.squat_threshold {
                (ExerciseKind::Squat, c.decisive_confidence)
            } else {
                (ExerciseKind::Unknown, c.ambiguous_confidence)
            };

        Classification {
            exercise,
            confidence,
            hip_angle,
            knee_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{Error, JointId, Landmark};

    fn leg_chain(shoulder: (f64, f64), hip: (f64, f64), knee: (f64, f64), ankle: (f64, f64)) -> PoseSnapshot {
        PoseSnapshot::default()
            .with_joint(JointId::LeftShoulder, Landmark::at(shoulder.0, shoulder.1))
            .with_joint(JointId::LeftHip, Landmark::at(hip.0, hip.1))
            .with_joint(JointId::LeftKnee, Landmark::at(knee.0, knee.1))
            .with_joint(JointId::LeftAnkle, Landmark::at(ankle.0, ankle.1))
    }

    #[test]
    fn test_plank_detected() {
        let snapshot = leg_chain((0.2, 0.5), (0.45, 0.52), (0.65, 0.53), (0.85, 0.55));
        let result = ExerciseClassifier::default().classify(&snapshot).unwrap();
        assert_eq!(result.exercise, ExerciseKind::Plank);
        assert_eq!(result.confidence, 0.95);
        assert!(result.hip_angle > 150.0);
        assert!(result.knee_angle > 150.0);
    }

    #[test]
    fn test_squat_detected() {
        // Torso leaning forward, thighs near horizontal, shins vertical
        let snapshot = leg_chain((0.55, 0.35), (0.4, 0.6), (0.6, 0.65), (0.6, 0.9));
        let result = ExerciseClassifier::default().classify(&snapshot).unwrap();
        assert_eq!(result.exercise, ExerciseKind::Squat);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_mixed_angles_are_unknown() {
        // Straight legs but torso bent 90 degrees at the hip
        let snapshot = leg_chain((0.2, 0.5), (0.5, 0.5), (0.5, 0.7), (0.5, 0.9));
        let result = ExerciseClassifier::default().classify(&snapshot).unwrap();
        assert_eq!(result.exercise, ExerciseKind::Unknown);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_threshold_boundaries_are_strict() {
        let classifier = ExerciseClassifier::default();
        assert_eq!(classifier.decide(150.0, 150.0).exercise, ExerciseKind::Unknown);
        assert_eq!(classifier.decide(150.001, 150.001).exercise, ExerciseKind::Plank);
        assert_eq!(classifier.decide(120.0, 100.0).exercise, ExerciseKind::Unknown);
        assert_eq!(classifier.decide(100.0, 120.0).exercise, ExerciseKind::Unknown);
        assert_eq!(classifier.decide(119.999, 90.0).exercise, ExerciseKind::Squat);
    }

    #[test]
    fn test_dead_zone_is_unknown() {
        let classifier = ExerciseClassifier::default();
        for hip in [121.0, 135.0, 149.0] {
            for knee in [121.0, 135.0, 149.0, 170.0, 90.0] {
                let result = classifier.decide(hip, knee);
                assert_eq!(result.exercise, ExerciseKind::Unknown, "hip {hip} knee {knee}");
            }
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let snapshot = leg_chain((0.55, 0.35), (0.4, 0.6), (0.6, 0.65), (0.6, 0.9));
        let classifier = ExerciseClassifier::default();
        let first = classifier.classify(&snapshot).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.classify(&snapshot).unwrap(), first);
        }
        let (kind, confidence): (ExerciseKind, f64) = first.into();
        assert_eq!(kind, ExerciseKind::Squat);
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn test_degenerate_snapshot_errors() {
        let err = ExerciseClassifier::default()
            .classify(&PoseSnapshot::default())
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_config_validation() {
        assert!(ClassifierConfig::default().validate().is_ok());

        let overlapping = ClassifierConfig {
            squat_threshold: 160.0,
            ..ClassifierConfig::default()
        };
        assert!(matches!(overlapping.validate(), Err(Error::InvalidConfig(_))));

        let overconfident = ClassifierConfig {
            decisive_confidence: 1.5,
            ..ClassifierConfig::default()
        };
        assert!(matches!(overconfident.validate(), Err(Error::InvalidConfig(_))));

        let not_a_number = ClassifierConfig {
            ambiguous_confidence: f64::NAN,
            ..ClassifierConfig::default()
        };
        assert!(not_a_number.validate().is_err());

        let beyond_straight = ClassifierConfig {
            plank_threshold: 200.0,
            ..ClassifierConfig::default()
        };
        assert!(beyond_straight.validate().is_err());
    }

    #[test]
    fn test_right_side_configuration() {
        let config = ClassifierConfig {
            side: LimbSide::Right,
            ..ClassifierConfig::default()
        };
        let snapshot = PoseSnapshot::default()
            .with_joint(JointId::RightShoulder, Landmark::at(0.2, 0.5))
            .with_joint(JointId::RightHip, Landmark::at(0.45, 0.5))
            .with_joint(JointId::RightKnee, Landmark::at(0.65, 0.5))
            .with_joint(JointId::RightAnkle, Landmark::at(0.85, 0.5));
        let result = ExerciseClassifier::new(config).classify(&snapshot).unwrap();
        assert_eq!(result.exercise, ExerciseKind::Plank);
    }
}
