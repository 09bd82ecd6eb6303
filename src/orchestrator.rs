use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::failure_message;
use crate::generator::ImageGenerator;
use crate::types::{GenerationOutcome, GenerationSession, ImageSize, ModelTiming};
use crate::utils::epoch_ms;
use crate::{MosaicError, Result};

struct SessionState {
    /// Bumped on every `start_generation` and `reset`. Each in-flight unit
    /// carries the token of the session it was spawned under; a unit whose
    /// token no longer matches drops its outcome instead of writing into a
    /// newer session.
    token: u64,
    session: GenerationSession,
}

/// Fans one prompt out to N model endpoints concurrently and reconciles
/// the per-model outcomes into a single observable session.
///
/// Each model's unit of work resolves or fails independently; one model's
/// failure never cancels or affects a sibling. The session settles
/// (`is_loading` flips false) only once all N units have applied a
/// terminal outcome, an unordered join with no short-circuit.
pub struct GenerationOrchestrator {
    generator: Arc<dyn ImageGenerator>,
    state: Arc<Mutex<SessionState>>,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            state: Arc::new(Mutex::new(SessionState {
                token: 0,
                session: GenerationSession::default(),
            })),
        }
    }

    /// Starts a new generation session over `model_ids`, discarding the
    /// previous session entirely, and resolves once every model has reached
    /// a terminal state. Per-model failures are captured in the session,
    /// never returned as errors; the only error is an empty `model_ids`.
    ///
    /// Overlapping calls are safe: the newer call installs a fresh session
    /// and outstanding units of the older one drop their late outcomes.
    /// The returned snapshot is always the caller's own session.
    pub async fn start_generation(
        &self,
        prompt: &str,
        model_ids: &[String],
        size: ImageSize,
    ) -> Result<GenerationSession> {
        if model_ids.is_empty() {
            return Err(MosaicError::InvalidResponse(
                "start_generation requires at least one model id".to_string(),
            ));
        }

        let started_at_ms = epoch_ms();
        let started = Instant::now();
        let token = {
            let mut state = self.state.lock().await;
            state.token += 1;
            state.session = GenerationSession::begin(prompt, model_ids, started_at_ms);
            state.token
        };

        let units = model_ids.iter().map(|model_id| {
            let generator = Arc::clone(&self.generator);
            let state = Arc::clone(&self.state);
            let model_id = model_id.clone();
            let prompt = prompt.to_string();
            async move {
                debug!(model_id = %model_id, "generate image request");
                let result = generator.generate(&model_id, &prompt, size).await;
                let outcome = match result {
                    Ok(image) => {
                        let completed_at_ms = epoch_ms();
                        let elapsed_ms = started.elapsed().as_millis() as u64;
                        debug!(model_id = %model_id, elapsed_ms, "successful image response");
                        GenerationOutcome {
                            model_id,
                            image: Some(image),
                            timing: ModelTiming {
                                started_at_ms,
                                completed_at_ms: Some(completed_at_ms),
                                elapsed_ms: Some(elapsed_ms),
                            },
                            failed: false,
                            error: None,
                        }
                    }
                    Err(err) => {
                        let message = failure_message(&err);
                        warn!(model_id = %model_id, error = %message, "image generation failed");
                        GenerationOutcome {
                            model_id,
                            image: None,
                            timing: ModelTiming {
                                started_at_ms,
                                completed_at_ms: None,
                                elapsed_ms: None,
                            },
                            failed: true,
                            error: Some(message),
                        }
                    }
                };

                let mut state = state.lock().await;
                if state.token == token {
                    if let Some(entry) = state
                        .session
                        .results
                        .iter_mut()
                        .find(|r| r.model_id == outcome.model_id)
                    {
                        // At most one pending -> terminal transition per entry.
                        if entry.is_pending() {
                            *entry = outcome.clone();
                        }
                    }
                } else {
                    debug!(model_id = %outcome.model_id, "dropping outcome from a superseded session");
                }
                outcome
            }
        });

        let results = join_all(units).await;

        {
            let mut state = self.state.lock().await;
            if state.token == token {
                state.session.is_loading = false;
            }
        }

        Ok(GenerationSession {
            prompt: prompt.to_string(),
            results,
            is_loading: false,
        })
    }

    /// Snapshot of the current session as observed right now; pending
    /// entries of an in-flight session show up as neither success nor
    /// failure.
    pub async fn session(&self) -> GenerationSession {
        self.state.lock().await.session.clone()
    }

    pub async fn active_prompt(&self) -> String {
        self.state.lock().await.session.prompt.clone()
    }

    /// Clears all session state. Outstanding units of the cleared session
    /// drop their outcomes when they resume.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.token += 1;
        state.session = GenerationSession::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeneratedImage;
    use async_trait::async_trait;

    struct NeverCalled;

    #[async_trait]
    impl ImageGenerator for NeverCalled {
        async fn generate(
            &self,
            model_id: &str,
            _prompt: &str,
            _size: ImageSize,
        ) -> Result<GeneratedImage> {
            panic!("generator should not be invoked for model {model_id}");
        }
    }

    #[tokio::test]
    async fn rejects_empty_model_list_without_touching_state() {
        let orchestrator = GenerationOrchestrator::new(Arc::new(NeverCalled));
        let err = orchestrator
            .start_generation("a red fox", &[], ImageSize::Size512)
            .await
            .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidResponse(_)));

        let session = orchestrator.session().await;
        assert!(session.results.is_empty());
        assert!(!session.is_loading);
        assert!(session.prompt.is_empty());
    }

    #[tokio::test]
    async fn reset_clears_the_session() {
        struct Ok1;

        #[async_trait]
        impl ImageGenerator for Ok1 {
            async fn generate(
                &self,
                _model_id: &str,
                _prompt: &str,
                _size: ImageSize,
            ) -> Result<GeneratedImage> {
                Ok(GeneratedImage {
                    b64_json: "eA==".to_string(),
                })
            }
        }

        let orchestrator = GenerationOrchestrator::new(Arc::new(Ok1));
        let ids = vec!["m1".to_string()];
        orchestrator
            .start_generation("hi", &ids, ImageSize::Size256)
            .await
            .unwrap();
        assert_eq!(orchestrator.session().await.results.len(), 1);

        orchestrator.reset().await;
        let session = orchestrator.session().await;
        assert!(session.results.is_empty());
        assert!(session.prompt.is_empty());
        assert!(!session.is_loading);
    }
}
