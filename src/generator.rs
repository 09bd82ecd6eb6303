use async_trait::async_trait;

use crate::Result;
use crate::types::{GeneratedImage, ImageSize};

/// Seam between the orchestrator and the transport. One call produces one
/// image (or an error) for one model; the orchestrator fans these out.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        size: ImageSize,
    ) -> Result<GeneratedImage>;
}
