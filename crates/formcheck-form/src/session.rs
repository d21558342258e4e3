//! Session-level feedback aggregation for continuous frame feeds.
//!
//! One `FormSession` belongs to one tracking session. It owns exercise
//! selection, the caller-driven repetition counter and frame-rate
//! bookkeeping; per-frame correctness comes from the validator.

use formcheck_core::{FeedbackResult, PoseSnapshot, Result};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::angles::JointAngles;
use crate::validator::FormValidator;

pub const DEFAULT_EXERCISE: &str = "squat";
pub const DEFAULT_FPS_WINDOW: Duration = Duration::from_secs(1);

/// Mutable state of one tracking session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_exercise: String,
    pub rep_count: u32,
    /// Frames seen since the last FPS rollover
    pub frame_count: u32,
    pub last_fps_timestamp: Instant,
    /// Frames counted in the last complete window
    pub fps: u32,
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameUpdate {
    pub exercise: String,
    pub feedback: FeedbackResult,
    /// `None` when no pose was detected
    pub angles: Option<JointAngles>,
    pub fps: u32,
    pub rep_count: u32,
}

/// Stateful driver for a real-time feed
#[derive(Debug, Clone)]
pub struct FormSession {
    state: SessionState,
    fps_window: Duration,
}

impl FormSession {
    pub fn new(exercise: &str) -> Self {
        Self::starting_at(exercise, Instant::now())
    }

    /// Start a session whose FPS clock begins at `now`
    pub fn starting_at(exercise: &str, now: Instant) -> Self {
        Self {
            state: SessionState {
                current_exercise: exercise.to_string(),
                rep_count: 0,
                frame_count: 0,
                last_fps_timestamp: now,
                fps: 0,
            },
            fps_window: DEFAULT_FPS_WINDOW,
        }
    }

    pub fn with_fps_window(mut self, window: Duration) -> Self {
        self.fps_window = window;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_exercise(&self) -> &str {
        &self.state.current_exercise
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    pub fn fps(&self) -> u32 {
        self.state.fps
    }

    /// Switch exercise; the repetition count restarts.
    pub fn set_exercise(&mut self, exercise: &str) {
        tracing::info!(
            "Switching exercise {} -> {}",
            self.state.current_exercise,
            exercise
        );
        self.state.current_exercise = exercise.to_string();
        self.state.rep_count = 0;
    }

    /// Count a repetition detected by the caller
    pub fn complete_rep(&mut self) -> u32 {
        self.state.rep_count += 1;
        self.state.rep_count
    }

    /// Count one frame. Once a full window has elapsed since the last
    /// rollover, the count (including this frame) becomes the reported FPS.
    pub fn record_frame_at(&mut self, now: Instant) -> u32 {
        self.state.frame_count += 1;
        if now.saturating_duration_since(self.state.last_fps_timestamp) >= self.fps_window {
            self.state.fps = self.state.frame_count;
            self.state.frame_count = 0;
            self.state.last_fps_timestamp = now;
        }
        self.state.fps
    }

    pub fn process(
        &mut self,
        validator: &FormValidator,
        frame: Option<&PoseSnapshot>,
        baseline: Option<&PoseSnapshot>,
    ) -> Result<FrameUpdate> {
        self.process_at(validator, frame, baseline, Instant::now())
    }

    /// Process one frame from the feed. `None` means the pose estimator
    /// found nobody, which is reported rather than treated as an error.
    /// The frame counts towards FPS even if its geometry is unusable.
    pub fn process_at(
        &mut self,
        validator: &FormValidator,
        frame: Option<&PoseSnapshot>,
        baseline: Option<&PoseSnapshot>,
        now: Instant,
    ) -> Result<FrameUpdate> {
        self.record_frame_at(now);

        let (feedback, angles) = match frame {
            Some(snapshot) => {
                let feedback =
                    validator.validate_with(snapshot, &self.state.current_exercise, baseline)?;
                (feedback, Some(JointAngles::measure(snapshot)))
            }
            None => (FeedbackResult::no_pose(), None),
        };

        Ok(FrameUpdate {
            exercise: self.state.current_exercise.clone(),
            feedback,
            angles,
            fps: self.state.fps,
            rep_count: self.state.rep_count,
        })
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(DEFAULT_EXERCISE)
    }
}
