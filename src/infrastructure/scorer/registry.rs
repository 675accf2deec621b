//! Scorer resolution by (backend, modality) pair
//!
//! Resolution distinguishes "no such backend at all" from "backend exists
//! but does not handle this modality" so callers can report precise errors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::scorer::{Modality, Scorer};

use super::{TabularScorer, VisionScorer};

/// Backend key of the built-in stub scorers
pub const DUMMY_BACKEND: &str = "dummy";

#[derive(Default)]
pub struct ScorerRegistry {
    scorers: HashMap<(String, Modality), Arc<dyn Scorer>>,
}

impl ScorerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in `dummy` backend.
    ///
    /// Mixed datasets route to the vision scorer, which skips any files
    /// it does not recognize as images.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let vision = Arc::new(VisionScorer::new());

        registry.register(DUMMY_BACKEND, Modality::Vision, vision.clone());
        registry.register(DUMMY_BACKEND, Modality::Mixed, vision);
        registry.register(DUMMY_BACKEND, Modality::Timeseries, Arc::new(TabularScorer::new()));

        registry
    }

    pub fn register(
        &mut self,
        backend: impl Into<String>,
        modality: Modality,
        scorer: Arc<dyn Scorer>,
    ) {
        self.scorers.insert((backend.into(), modality), scorer);
    }

    pub fn resolve(
        &self,
        backend: &str,
        modality: Modality,
    ) -> Result<Arc<dyn Scorer>, DomainError> {
        if let Some(scorer) = self.scorers.get(&(backend.to_string(), modality)) {
            return Ok(scorer.clone());
        }

        if self.scorers.keys().any(|(b, _)| b == backend) {
            return Err(DomainError::unsupported_modality(backend, modality.to_string()));
        }

        Err(DomainError::unsupported_backend(backend))
    }
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .scorers
            .keys()
            .map(|(backend, modality)| format!("{}/{}", backend, modality))
            .collect();
        keys.sort();

        f.debug_struct("ScorerRegistry").field("scorers", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_cover_all_modalities() {
        let registry = ScorerRegistry::with_builtins();

        for modality in [Modality::Vision, Modality::Timeseries, Modality::Mixed] {
            assert!(registry.resolve(DUMMY_BACKEND, modality).is_ok());
        }
    }

    #[test]
    fn test_mixed_routes_to_vision_scorer() {
        let registry = ScorerRegistry::with_builtins();
        let scorer = registry.resolve(DUMMY_BACKEND, Modality::Mixed).unwrap();

        assert_eq!(scorer.name(), "dummy_vision");
    }

    #[test]
    fn test_unknown_backend() {
        let registry = ScorerRegistry::with_builtins();
        let err = registry.resolve("onnx", Modality::Vision).unwrap_err();

        assert!(matches!(err, DomainError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_known_backend_unknown_modality() {
        let mut registry = ScorerRegistry::new();
        registry.register("dummy", Modality::Vision, Arc::new(VisionScorer::new()));

        let err = registry.resolve("dummy", Modality::Timeseries).unwrap_err();

        assert!(matches!(err, DomainError::UnsupportedModality { .. }));
    }
}
