//! Generation provider abstraction.
//!
//! The pipeline is vendor-agnostic: it talks to a [`GenerationProvider`]
//! trait object resolved from configuration at the start of each run.
//! [`rest::RestProvider`] is the production implementation, speaking to
//! the configured AI gateway over HTTP.

pub mod error;
pub mod rest;
pub mod settings;

pub use error::ProviderError;
pub use settings::ProviderSettings;

use async_trait::async_trait;
use kolorit_core::aspect::AspectRatio;

/// Request for one image generation call.
#[derive(Debug, Clone)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Ordered grounding images, at most the selector capacity (14).
    pub reference_images: Vec<Vec<u8>>,
    pub aspect_ratio: AspectRatio,
    /// Optional explicit pixel dimensions forwarded as a size hint.
    pub size_hint: Option<(i32, i32)>,
    /// When set, the provider edits this image instead of generating
    /// from scratch (refinement passes).
    pub source_image: Option<Vec<u8>>,
}

/// A generated image plus the provider's cost estimate for the call.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub cost_estimate: f64,
}

/// The three capabilities the pipeline needs from a generation backend.
///
/// `analyze_consistency` is advisory: callers absorb its errors into a
/// neutral verification result instead of failing the generation.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Expand a scene description into a richer prompt. May return an
    /// empty string; the caller falls back to the raw description.
    async fn enrich(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, ProviderError>;

    /// Generate (or edit) a product photograph.
    async fn generate_image(
        &self,
        request: &GenerateImageRequest,
    ) -> Result<GeneratedImage, ProviderError>;

    /// Compare a rendered image against material ground truth, returning
    /// the raw textual report for the verifier to parse.
    async fn analyze_consistency(
        &self,
        image: &[u8],
        instruction: &str,
    ) -> Result<String, ProviderError>;
}
