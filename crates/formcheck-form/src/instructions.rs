//! Coaching text for each supported exercise.

use formcheck_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to perform one exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    pub steps: Vec<String>,
    pub tips: Vec<String>,
    pub common_mistakes: Vec<String>,
}

impl Instructions {
    pub fn new(steps: &[&str], tips: &[&str], common_mistakes: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            steps: owned(steps),
            tips: owned(tips),
            common_mistakes: owned(common_mistakes),
        }
    }
}

/// Instructions keyed by lowercase exercise name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionCatalog {
    entries: BTreeMap<String, Instructions>,
}

impl InstructionCatalog {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            "push-up",
            Instructions::new(
                &["Start in plank position", "Lower your body", "Push back up"],
                &["Keep your back straight", "Elbows at 45 degrees"],
                &["Sagging hips", "Flaring elbows"],
            ),
        );
        catalog.insert(
            "squat",
            Instructions::new(
                &[
                    "Stand with feet shoulder-width apart",
                    "Push your hips back and bend your knees",
                    "Lower until your knees reach 60-100 degrees",
                    "Drive through your heels to stand up",
                ],
                &["Keep your back straight", "Keep your knees behind your toes"],
                &["Knees caving inward", "Rounding the lower back", "Heels lifting"],
            ),
        );
        catalog.insert(
            "plank",
            Instructions::new(
                &[
                    "Rest on your forearms with elbows under your shoulders",
                    "Extend your legs behind you",
                    "Hold your body in a straight line",
                ],
                &["Keep your elbows at 90 degrees", "Brace your core"],
                &["Sagging hips", "Hips raised too high"],
            ),
        );
        catalog
    }

    pub fn insert(&mut self, exercise: &str, instructions: Instructions) -> Option<Instructions> {
        self.entries
            .insert(exercise.trim().to_ascii_lowercase(), instructions)
    }

    pub fn get(&self, exercise: &str) -> Result<&Instructions> {
        self.entries
            .get(&exercise.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::NoInstructions(exercise.to_string()))
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for InstructionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
