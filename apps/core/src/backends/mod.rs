//! External text generators: the hosted expansion service and the local fallback model.

pub mod gemini;
pub mod llama;
pub mod traits;

pub use gemini::GeminiClient;
pub use llama::LlamaClient;
pub use traits::TextGenerator;
