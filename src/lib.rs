mod client;
mod error;
mod generator;
mod orchestrator;
mod playground;
mod registry;

pub mod suggestions;
pub mod types;
pub mod utils;

pub use client::ImagesClient;
pub use error::{MosaicError, Result};
pub use generator::ImageGenerator;
pub use orchestrator::GenerationOrchestrator;
pub use playground::{ModelSlot, Playground};
pub use registry::ModelRegistry;
pub use types::{
    GeneratedImage, GenerationOutcome, GenerationSession, ImageSize, ModelDescriptor, ModelTiming,
};
