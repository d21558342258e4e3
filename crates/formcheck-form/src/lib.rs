//! # FormCheck-Form
//!
//! Exercise form analysis over 33-landmark pose snapshots.
//!
//! ## Pipeline
//!
//! 1. **Classify** - infer squat or plank from hip and knee angles
//! 2. **Validate** - run the exercise's Form Standard: a coarse posture gate,
//!    then every angle and position check independently
//! 3. **Personalize** - optionally re-centre angle bands on a stored
//!    calibration baseline
//! 4. **Aggregate** - a per-session driver tracks the active exercise,
//!    repetitions and frame rate for real-time feeds

pub mod angles;
pub mod calibration;
pub mod classifier;
pub mod instructions;
pub mod session;
pub mod standards;
pub mod validator;

pub use angles::*;
pub use calibration::*;
pub use classifier::*;
pub use instructions::*;
pub use session::*;
pub use standards::*;
pub use validator::*;
