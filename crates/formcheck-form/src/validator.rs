//! Form validation against the standards table.

use formcheck_core::{ExerciseKind, FeedbackResult, PoseSnapshot, Result};

use crate::standards::{FormStandard, FormStandards};

/// Evaluates snapshots against exercise form standards
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    standards: FormStandards,
}

impl FormValidator {
    pub fn new(standards: FormStandards) -> Self {
        Self { standards }
    }

    pub fn standards(&self) -> &FormStandards {
        &self.standards
    }

    /// Validate one frame for the named exercise.
    ///
    /// An exercise with no standard yields the structured "not supported"
    /// result, never an error. Errors are reserved for frames whose geometry
    /// cannot be measured.
    pub fn validate(&self, snapshot: &PoseSnapshot, exercise: &str) -> Result<FeedbackResult> {
        self.validate_with(snapshot, exercise, None)
    }

    pub fn validate_kind(
        &self,
        snapshot: &PoseSnapshot,
        exercise: ExerciseKind,
    ) -> Result<FeedbackResult> {
        self.validate(snapshot, exercise.as_str())
    }

    /// Validate, personalizing angle bands around a calibration baseline when
    /// one is supplied. A baseline that cannot be measured is ignored.
    pub fn validate_with(
        &self,
        snapshot: &PoseSnapshot,
        exercise: &str,
        baseline: Option<&PoseSnapshot>,
    ) -> Result<FeedbackResult> {
        let Some(standard) = self.standards.get(exercise) else {
            tracing::debug!("No form standard for exercise {:?}", exercise);
            return Ok(FeedbackResult::unsupported());
        };

        let personalized;
        let standard = match baseline {
            Some(baseline) => match standard.personalize(baseline) {
                Ok(adjusted) => {
                    personalized = adjusted;
                    &personalized
                }
                Err(e) => {
                    tracing::warn!("Ignoring calibration baseline for {}: {}", exercise, e);
                    standard
                }
            },
            None => standard,
        };

        let result = evaluate(standard, snapshot)?;
        tracing::debug!(
            "Validated {}: correct={} feedback={:?}",
            exercise,
            result.is_correct,
            result.feedback
        );
        Ok(result)
    }
}

/// Run a standard: coarse gate first, then every check independently.
pub fn evaluate(standard: &FormStandard, snapshot: &PoseSnapshot) -> Result<FeedbackResult> {
    if let Some(gate) = &standard.gate {
        if let Some(rejection) = gate.check(snapshot)? {
            return Ok(FeedbackResult::from_findings(
                vec![rejection.message],
                rejection.joints,
            ));
        }
    }

    let mut feedback = Vec::new();
    let mut incorrect_points = Vec::new();
    for check in &standard.checks {
        if let Some(finding) = check.evaluate(snapshot)? {
            feedback.push(finding.message);
            incorrect_points.extend(finding.joints);
        }
    }

    Ok(FeedbackResult::from_findings(feedback, incorrect_points))
}
