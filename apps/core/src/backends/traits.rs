use crate::error::AppError;
use async_trait::async_trait;

/// Defines the public interface for an external text generator.
///
/// This trait abstracts the specific backend (a hosted generative API, a local
/// llama.cpp server, or a test double) so the responder can chain them without
/// knowing which is which.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Short backend name used in logs and health output.
    fn name(&self) -> &'static str;

    /// Generates a complete text response for a prompt.
    ///
    /// An empty or whitespace-only answer is reported as an error, never as `Ok("")`.
    async fn generate(&self, prompt: String) -> Result<String, AppError>;
}
