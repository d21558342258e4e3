//! Boundary operations over serde request/response types.
//!
//! `FormService` owns everything a deployment shares between requests: the
//! standards table, classifier, calibration baselines and instruction
//! catalog. Transport is left to the caller.

use formcheck_core::{ExerciseKind, FeedbackResult, Landmark, PoseSnapshot};
use formcheck_form::{
    CalibrationStore, ExerciseClassifier, FormSession, FormValidator, FrameUpdate,
    InstructionCatalog, Instructions,
};
use serde::{Deserialize, Serialize};

use crate::config::{FormCheckConfig, TrackingConfig};
use crate::error::{ApiError, ApiResult};

pub const CALIBRATION_SUCCESSFUL: &str = "Calibration successful";

/// Frame to analyze. `landmarks` is `None` when the estimator found nobody.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub exercise_type: Option<String>,
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Echo of the analyzed landmarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Landmark>>,
    pub feedback: Vec<String>,
    /// `[x, y]` of each flagged joint
    pub incorrect_points: Vec<[f64; 2]>,
    pub is_correct: bool,
}

/// Landmarks already extracted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub exercise_type: Option<String>,
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub feedback: Vec<String>,
    pub incorrect_points: Vec<[f64; 2]>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrateRequest {
    pub exercise_type: Option<String>,
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub exercise: ExerciseKind,
    pub confidence: f64,
}

impl From<FeedbackResult> for FeedbackResponse {
    fn from(result: FeedbackResult) -> Self {
        Self {
            feedback: result.feedback,
            incorrect_points: Vec::new(),
            is_correct: result.is_correct,
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> ApiResult<T> {
    value.ok_or(ApiError::MissingField(field))
}

fn exercise_name(value: Option<String>) -> ApiResult<String> {
    match value {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ApiError::MissingField("exercise_type")),
    }
}

/// Shared form analysis service
#[derive(Debug, Default)]
pub struct FormService {
    validator: FormValidator,
    classifier: ExerciseClassifier,
    calibration: CalibrationStore,
    catalog: InstructionCatalog,
    tracking: TrackingConfig,
}

impl FormService {
    pub fn new(
        validator: FormValidator,
        classifier: ExerciseClassifier,
        catalog: InstructionCatalog,
        tracking: TrackingConfig,
    ) -> Self {
        Self {
            validator,
            classifier,
            calibration: CalibrationStore::new(),
            catalog,
            tracking,
        }
    }

    pub fn from_config(config: &FormCheckConfig) -> ApiResult<Self> {
        config.classifier.validate()?;
        let standards = config.load_standards()?;
        tracing::info!(
            "Form service ready: exercises {:?}, calibration {}",
            standards.exercise_names().collect::<Vec<_>>(),
            if config.tracking.use_calibration { "on" } else { "off" }
        );
        Ok(Self::new(
            FormValidator::new(standards),
            ExerciseClassifier::new(config.classifier.clone()),
            InstructionCatalog::builtin(),
            config.tracking.clone(),
        ))
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    pub fn calibration(&self) -> &CalibrationStore {
        &self.calibration
    }

    pub fn tracking(&self) -> &TrackingConfig {
        &self.tracking
    }

    /// Validate landmarks and echo them back with flagged joint positions.
    pub fn analyze(&self, request: AnalyzeRequest) -> ApiResult<AnalyzeResponse> {
        let exercise = exercise_name(request.exercise_type)?;
        let Some(landmarks) = request.landmarks else {
            let result = FeedbackResult::no_pose();
            return Ok(AnalyzeResponse {
                landmarks: None,
                feedback: result.feedback,
                incorrect_points: Vec::new(),
                is_correct: result.is_correct,
            });
        };

        let snapshot = PoseSnapshot::from_landmarks(&landmarks)?;
        let result = self.evaluate(&snapshot, &exercise)?;
        Ok(AnalyzeResponse {
            incorrect_points: result.resolve_points(&snapshot),
            landmarks: Some(landmarks),
            feedback: result.feedback,
            is_correct: result.is_correct,
        })
    }

    pub fn feedback(&self, request: FeedbackRequest) -> ApiResult<FeedbackResponse> {
        let exercise = exercise_name(request.exercise_type)?;
        let landmarks = required(request.landmarks, "landmarks")?;

        let snapshot = PoseSnapshot::from_landmarks(&landmarks)?;
        let result = self.evaluate(&snapshot, &exercise)?;
        let incorrect_points = result.resolve_points(&snapshot);
        Ok(FeedbackResponse {
            incorrect_points,
            ..result.into()
        })
    }

    /// Store the request's landmarks as the exercise's calibration baseline.
    pub fn calibrate(&self, request: CalibrateRequest) -> ApiResult<CalibrateResponse> {
        let exercise = exercise_name(request.exercise_type)?;
        let landmarks = required(request.landmarks, "landmarks")?;

        let snapshot = PoseSnapshot::from_landmarks(&landmarks)?;
        self.calibration.store(&exercise, snapshot);
        Ok(CalibrateResponse {
            message: CALIBRATION_SUCCESSFUL.to_string(),
        })
    }

    pub fn instructions(&self, exercise: &str) -> ApiResult<&Instructions> {
        Ok(self.catalog.get(exercise)?)
    }

    pub fn classify(&self, landmarks: &[Landmark]) -> ApiResult<ClassifyResponse> {
        let snapshot = PoseSnapshot::from_landmarks(landmarks)?;
        let (exercise, confidence): (ExerciseKind, f64) =
            self.classifier.classify(&snapshot)?.into();
        Ok(ClassifyResponse {
            exercise,
            confidence,
        })
    }

    /// Session configured from the tracking section
    pub fn new_session(&self) -> FormSession {
        FormSession::new(&self.tracking.default_exercise).with_fps_window(self.tracking.fps_window())
    }

    /// Feed one frame of a real-time session
    pub fn process_frame(
        &self,
        session: &mut FormSession,
        frame: Option<&PoseSnapshot>,
    ) -> ApiResult<FrameUpdate> {
        let baseline = self.baseline_for(session.current_exercise());
        Ok(session.process(&self.validator, frame, baseline.as_ref())?)
    }

    fn evaluate(&self, snapshot: &PoseSnapshot, exercise: &str) -> ApiResult<FeedbackResult> {
        let baseline = self.baseline_for(exercise);
        Ok(self
            .validator
            .validate_with(snapshot, exercise, baseline.as_ref())?)
    }

    fn baseline_for(&self, exercise: &str) -> Option<PoseSnapshot> {
        if self.tracking.use_calibration {
            self.calibration.get(exercise)
        } else {
            None
        }
    }
}
