use std::sync::Arc;

use crate::orchestrator::GenerationOrchestrator;
use crate::registry::ModelRegistry;
use crate::types::{GeneratedImage, GenerationSession, ImageSize, ModelDescriptor, ModelTiming};

/// Render props for one selected model: the descriptor joined with that
/// model's entry in the current session, all-absent when no session has
/// been started or the id has no entry.
#[derive(Debug, Clone)]
pub struct ModelSlot {
    pub model_id: String,
    pub descriptor: Option<ModelDescriptor>,
    pub image: Option<GeneratedImage>,
    pub timing: Option<ModelTiming>,
    pub failed: bool,
    pub error: Option<String>,
}

/// Owns the ordered set of selected model ids (no duplicates) and wires
/// user actions to the orchestrator.
pub struct Playground {
    registry: Arc<ModelRegistry>,
    orchestrator: GenerationOrchestrator,
    selected: Vec<String>,
}

impl Playground {
    pub fn new(registry: Arc<ModelRegistry>, orchestrator: GenerationOrchestrator) -> Self {
        Self {
            registry,
            orchestrator,
            selected: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    /// Startup default: select the registry's first model. No-op when the
    /// registry is empty or something is already selected.
    pub fn select_first_model(&mut self) -> Option<String> {
        if !self.selected.is_empty() {
            return None;
        }
        let first = self.registry.all_ids().into_iter().next()?;
        self.selected.push(first.clone());
        Some(first)
    }

    /// Selects the first registry model not already selected, in registry
    /// order. No-op (None) when the registry is empty, still loading, or
    /// every model is already selected.
    pub fn add_model(&mut self) -> Option<String> {
        let next = self
            .registry
            .all_ids()
            .into_iter()
            .find(|id| !self.selected.contains(id))?;
        self.selected.push(next.clone());
        Some(next)
    }

    /// Removes `model_id` from the selection; no-op if absent. Results
    /// already in the session for other ids are untouched.
    pub fn remove_model(&mut self, model_id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| id != model_id);
        self.selected.len() != before
    }

    /// Replaces `old_id` with `new_id` in place, preserving order. No-op
    /// when `old_id` is not selected or `new_id` already is. Results
    /// already fetched for `old_id` are not retroactively re-keyed.
    pub fn change_model(&mut self, old_id: &str, new_id: &str) -> bool {
        if self.selected.iter().any(|id| id == new_id) {
            return false;
        }
        match self.selected.iter_mut().find(|id| *id == old_id) {
            Some(slot) => {
                *slot = new_id.to_string();
                true
            }
            None => false,
        }
    }

    /// Delegates to the orchestrator; None when nothing is selected.
    pub async fn submit_prompt(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Option<GenerationSession> {
        if self.selected.is_empty() {
            return None;
        }
        self.orchestrator
            .start_generation(prompt, &self.selected, size)
            .await
            .ok()
    }

    pub async fn active_prompt(&self) -> String {
        self.orchestrator.active_prompt().await
    }

    pub async fn is_loading(&self) -> bool {
        self.orchestrator.session().await.is_loading
    }

    /// Per-slot view props: selection order joined against the current
    /// session's results.
    pub async fn slots(&self) -> Vec<ModelSlot> {
        let session = self.orchestrator.session().await;
        self.selected
            .iter()
            .map(|model_id| {
                let result = session.result_for(model_id);
                ModelSlot {
                    model_id: model_id.clone(),
                    descriptor: self.registry.get_by_id(model_id),
                    image: result.and_then(|r| r.image.clone()),
                    timing: result.map(|r| r.timing),
                    failed: result.is_some_and(|r| r.failed),
                    error: result.and_then(|r| r.error.clone()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ImageGenerator;
    use crate::{MosaicError, Result};
    use async_trait::async_trait;

    struct FailEverything;

    #[async_trait]
    impl ImageGenerator for FailEverything {
        async fn generate(
            &self,
            _model_id: &str,
            _prompt: &str,
            _size: ImageSize,
        ) -> Result<GeneratedImage> {
            Err(MosaicError::InvalidResponse("unused".to_string()))
        }
    }

    fn playground_with(ids: &[&str]) -> Playground {
        let models = ids
            .iter()
            .map(|id| ModelDescriptor::new(id.to_string()))
            .collect();
        let registry =
            Arc::new(ModelRegistry::new("http://localhost:8000/v1").with_models(models));
        Playground::new(registry, GenerationOrchestrator::new(Arc::new(FailEverything)))
    }

    #[test]
    fn add_model_walks_registry_order_without_duplicates() {
        let mut playground = playground_with(&["m1", "m2", "m3"]);
        assert_eq!(playground.add_model().as_deref(), Some("m1"));
        assert_eq!(playground.add_model().as_deref(), Some("m2"));
        assert_eq!(playground.add_model().as_deref(), Some("m3"));
        assert_eq!(playground.add_model(), None);
        assert_eq!(playground.selected_ids(), ["m1", "m2", "m3"]);
    }

    #[test]
    fn add_model_is_noop_on_empty_registry() {
        let mut playground = playground_with(&[]);
        assert_eq!(playground.add_model(), None);
        assert!(playground.selected_ids().is_empty());
    }

    #[test]
    fn remove_then_add_reselects_by_registry_order_not_history() {
        let mut playground = playground_with(&["m1", "m2", "m3"]);
        playground.add_model();
        assert_eq!(playground.selected_ids(), ["m1"]);
        assert!(playground.remove_model("m1"));
        assert!(playground.selected_ids().is_empty());
        assert_eq!(playground.add_model().as_deref(), Some("m1"));
    }

    #[test]
    fn remove_model_is_noop_when_absent() {
        let mut playground = playground_with(&["m1"]);
        playground.add_model();
        assert!(!playground.remove_model("m2"));
        assert_eq!(playground.selected_ids(), ["m1"]);
    }

    #[test]
    fn change_model_preserves_position_and_rejects_duplicates() {
        let mut playground = playground_with(&["m1", "m2", "m3"]);
        playground.add_model();
        playground.add_model();
        assert_eq!(playground.selected_ids(), ["m1", "m2"]);

        assert!(playground.change_model("m1", "m3"));
        assert_eq!(playground.selected_ids(), ["m3", "m2"]);

        assert!(!playground.change_model("m3", "m2"));
        assert!(!playground.change_model("missing", "m1"));
        assert_eq!(playground.selected_ids(), ["m3", "m2"]);
    }

    #[test]
    fn select_first_model_only_applies_to_empty_selection() {
        let mut playground = playground_with(&["m1", "m2"]);
        assert_eq!(playground.select_first_model().as_deref(), Some("m1"));
        assert_eq!(playground.select_first_model(), None);
        assert_eq!(playground.selected_ids(), ["m1"]);
    }

    #[tokio::test]
    async fn submit_prompt_is_noop_without_selection() {
        let playground = playground_with(&["m1"]);
        let outcome = playground.submit_prompt("hi", ImageSize::Size512).await;
        assert!(outcome.is_none());
        assert!(playground.slots().await.is_empty());
    }

    #[tokio::test]
    async fn slots_are_absent_before_any_session() {
        let mut playground = playground_with(&["m1", "m2"]);
        playground.add_model();
        playground.add_model();

        let slots = playground.slots().await;
        assert_eq!(slots.len(), 2);
        for slot in &slots {
            assert!(slot.descriptor.is_some());
            assert!(slot.image.is_none());
            assert!(slot.timing.is_none());
            assert!(!slot.failed);
            assert!(slot.error.is_none());
        }
    }
}
