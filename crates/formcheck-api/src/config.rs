//! FormCheck configuration.

use formcheck_form::{ClassifierConfig, FormStandards, DEFAULT_EXERCISE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

const ENV_PREFIX: &str = "FORMCHECK";

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormCheckConfig {
    /// Real-time tracking configuration
    pub tracking: TrackingConfig,

    /// Exercise classifier thresholds
    pub classifier: ClassifierConfig,

    /// JSON file holding the Form Standards table; built-in table when unset
    pub standards_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Exercise a new session starts with
    pub default_exercise: String,

    /// Personalize validation with stored calibration baselines
    pub use_calibration: bool,

    /// FPS measurement window (milliseconds)
    pub fps_window_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_exercise: DEFAULT_EXERCISE.to_string(),
            use_calibration: false,
            fps_window_ms: 1000,
        }
    }
}

impl TrackingConfig {
    pub fn fps_window(&self) -> Duration {
        Duration::from_millis(self.fps_window_ms)
    }
}

impl FormCheckConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Form Standards table named by `standards_path`, or the built-in one.
    pub fn load_standards(&self) -> ApiResult<FormStandards> {
        let Some(path) = &self.standards_path else {
            return Ok(FormStandards::builtin());
        };

        let json = std::fs::read_to_string(path)?;
        let standards = FormStandards::from_json(&json)?;
        if standards.is_empty() {
            return Err(ApiError::Config(config::ConfigError::Message(format!(
                "{} defines no form standards",
                path.display()
            ))));
        }
        tracing::info!(
            "Loaded {} form standards from {}",
            standards.len(),
            path.display()
        );
        Ok(standards)
    }
}

/// `FORMCHECK_TRACKING__USE_CALIBRATION=true` style overrides
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
