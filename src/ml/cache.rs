//! Shared handles to trained artifacts.
//!
//! Artifacts are never mutated after training, so readers get an `Arc` and keep using it
//! even if a retrain swaps in a replacement while they run.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::ml::artifact::ClassifierArtifact;

/// Holds the artifact currently used for inference and swaps it atomically.
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    current: RwLock<Option<Arc<ClassifierArtifact>>>,
}

impl ArtifactSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(artifact: ClassifierArtifact) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(artifact))),
        }
    }

    pub fn current(&self) -> Option<Arc<ClassifierArtifact>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a freshly trained artifact, returning the one it replaced.
    pub fn replace(&self, artifact: ClassifierArtifact) -> Option<Arc<ClassifierArtifact>> {
        let next = Arc::new(artifact);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(next)
    }

    pub fn clear(&self) -> Option<Arc<ClassifierArtifact>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Artifacts keyed by model id, loaded on first use.
///
/// Every `replace`, `invalidate` or `clear` bumps a generation counter. A load that was
/// started before such a change still returns its artifact to the caller but does not
/// put it back into the cache.
#[derive(Debug, Default)]
pub struct ClassifierCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Arc<ClassifierArtifact>>,
    generation: u64,
}

impl ClassifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<ClassifierArtifact>> {
        self.read().entries.get(model_id).cloned()
    }

    /// Return the cached artifact or run `load` and cache its result.
    ///
    /// Loader errors are returned untouched and nothing is cached.
    pub fn get_or_load<E>(
        &self,
        model_id: &str,
        load: impl FnOnce() -> Result<ClassifierArtifact, E>,
    ) -> Result<Arc<ClassifierArtifact>, E> {
        let started_at = {
            let state = self.read();
            if let Some(hit) = state.entries.get(model_id) {
                return Ok(hit.clone());
            }
            state.generation
        };
        let loaded = Arc::new(load()?);
        let mut state = self.write();
        if state.generation != started_at {
            debug!("Classifier {model_id} changed while loading; not caching");
            return Ok(loaded);
        }
        let entry = state
            .entries
            .entry(model_id.to_string())
            .or_insert_with(|| loaded.clone());
        debug!("Cached classifier {model_id}");
        Ok(entry.clone())
    }

    /// Store the output of a retrain for `model_id`, replacing any cached artifact.
    pub fn replace(&self, model_id: &str, artifact: ClassifierArtifact) -> Arc<ClassifierArtifact> {
        let artifact = Arc::new(artifact);
        let mut state = self.write();
        state.generation += 1;
        state.entries.insert(model_id.to_string(), artifact.clone());
        artifact
    }

    /// Drop the cached artifact for `model_id`; returns whether one was present.
    pub fn invalidate(&self, model_id: &str) -> bool {
        let mut state = self.write();
        state.generation += 1;
        state.entries.remove(model_id).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.generation += 1;
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::FEATURE_VECTOR_LEN;
    use crate::ml::artifact::{ARTIFACT_VERSION, TrainingStats};
    use crate::ml::mlp::MlpNetwork;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn artifact(seed: u64) -> ClassifierArtifact {
        let mut rng = StdRng::seed_from_u64(seed);
        ClassifierArtifact {
            artifact_version: ARTIFACT_VERSION,
            feature_len: FEATURE_VECTOR_LEN,
            labels: vec!["A".into(), "B".into()],
            network: MlpNetwork::random(&[FEATURE_VECTOR_LEN, 2], &mut rng),
            stats: TrainingStats {
                iterations: seed as usize,
                final_error: 0.1,
                final_accuracy: 0.5,
                samples: 4,
            },
        }
    }

    #[test]
    fn slot_replace_keeps_old_handle_alive() {
        let slot = ArtifactSlot::with_artifact(artifact(1));
        let before = slot.current().unwrap();
        let previous = slot.replace(artifact(2)).unwrap();
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.stats.iterations, 1);
        assert_eq!(slot.current().unwrap().stats.iterations, 2);
        assert!(slot.clear().is_some());
        assert!(slot.current().is_none());
    }

    #[test]
    fn loads_once_per_model_id() {
        let cache = ClassifierCache::new();
        let mut loads = 0;
        for _ in 0..3 {
            cache
                .get_or_load::<()>("letters", || {
                    loads += 1;
                    Ok(artifact(3))
                })
                .unwrap();
        }
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn loader_errors_are_not_cached() {
        let cache = ClassifierCache::new();
        let result = cache.get_or_load("digits", || Err("missing file"));
        assert_eq!(result.unwrap_err(), "missing file");
        assert!(cache.is_empty());
    }

    #[test]
    fn retrain_replaces_and_invalidate_forgets() {
        let cache = ClassifierCache::new();
        cache.get_or_load::<()>("letters", || Ok(artifact(1))).unwrap();
        cache.replace("letters", artifact(7));
        assert_eq!(cache.get("letters").unwrap().stats.iterations, 7);
        assert!(cache.invalidate("letters"));
        assert!(!cache.invalidate("letters"));
        assert!(cache.get("letters").is_none());
    }

    #[test]
    fn invalidate_during_load_is_not_undone() {
        let cache = ClassifierCache::new();
        cache.get_or_load::<()>("letters", || Ok(artifact(1))).unwrap();
        cache.invalidate("letters");

        let loaded = cache
            .get_or_load::<()>("letters", || {
                cache.invalidate("letters");
                Ok(artifact(2))
            })
            .unwrap();
        assert_eq!(loaded.stats.iterations, 2);
        assert!(cache.get("letters").is_none());

        let fresh = cache.get_or_load::<()>("letters", || Ok(artifact(3))).unwrap();
        assert_eq!(fresh.stats.iterations, 3);
        assert!(Arc::ptr_eq(&fresh, &cache.get("letters").unwrap()));
    }

    #[test]
    fn replace_during_load_wins() {
        let cache = ClassifierCache::new();
        let loaded = cache
            .get_or_load::<()>("letters", || {
                cache.replace("letters", artifact(9));
                Ok(artifact(4))
            })
            .unwrap();
        assert_eq!(loaded.stats.iterations, 4);
        assert_eq!(cache.get("letters").unwrap().stats.iterations, 9);
    }
}
