//! Per-exercise calibration baselines.

use formcheck_core::PoseSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory store of one baseline snapshot per exercise.
///
/// Last write wins; entries live as long as the store. Writes are serialized
/// by the internal lock so one store may be shared between a session's
/// capture and validation paths.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    baselines: RwLock<HashMap<String, PoseSnapshot>>,
}

fn key(exercise: &str) -> String {
    exercise.trim().to_ascii_lowercase()
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `snapshot` as the baseline for `exercise`, returning the
    /// baseline it replaced.
    pub fn store(&self, exercise: &str, snapshot: PoseSnapshot) -> Option<PoseSnapshot> {
        let previous = self.baselines.write().insert(key(exercise), snapshot);
        tracing::info!(
            "Stored calibration baseline for {} (replaced: {})",
            exercise,
            previous.is_some()
        );
        previous
    }

    pub fn get(&self, exercise: &str) -> Option<PoseSnapshot> {
        self.baselines.read().get(&key(exercise)).cloned()
    }

    pub fn contains(&self, exercise: &str) -> bool {
        self.baselines.read().contains_key(&key(exercise))
    }

    pub fn remove(&self, exercise: &str) -> Option<PoseSnapshot> {
        self.baselines.write().remove(&key(exercise))
    }

    /// Exercises with a stored baseline, sorted
    pub fn exercises(&self) -> Vec<String> {
        let mut names: Vec<String> = self.baselines.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.baselines.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{JointId, Landmark};
    use std::sync::Arc;

    fn snapshot(x: f64) -> PoseSnapshot {
        PoseSnapshot::default().with_joint(JointId::LeftHip, Landmark::at(x, 0.5))
    }

    #[test]
    fn test_store_and_get() {
        let store = CalibrationStore::new();
        assert!(store.get("squat").is_none());

        assert!(store.store("plank", snapshot(0.3)).is_none());
        assert_eq!(store.get("plank"), Some(snapshot(0.3)));
        assert!(store.get("squat").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = CalibrationStore::new();
        store.store("squat", snapshot(0.1));
        let previous = store.store("Squat", snapshot(0.2));
        assert_eq!(previous, Some(snapshot(0.1)));
        assert_eq!(store.get("squat"), Some(snapshot(0.2)));
        assert_eq!(store.exercises(), vec!["squat".to_string()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = CalibrationStore::new();
        store.store("squat", snapshot(0.1));
        store.store("plank", snapshot(0.2));
        assert_eq!(store.remove("squat"), Some(snapshot(0.1)));
        assert!(!store.contains("squat"));
        store.clear();
        assert!(store.exercises().is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(CalibrationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.store(&format!("exercise-{}", i % 4), snapshot(i as f64 / 10.0));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.exercises().len(), 4);
    }
}
