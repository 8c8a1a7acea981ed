use crate::brain::Topic;
use crate::responder::{Capabilities, ResponseSource};
use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/respond`. A missing `text` field is an empty message.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RespondRequest {
    #[serde(default)]
    pub text: String,
}

/// Reply of `POST /api/respond`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RespondResponse {
    pub response: String,
}

/// Body of `POST /api/sessions/{id}/messages`. Messages are capped at 4000 characters.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MessageRequest {
    #[validate(length(max = 4000))]
    pub text: String,
}

/// Reply of `POST /api/sessions/{id}/messages`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub response: String,
    pub topic: Topic,
    pub source: ResponseSource,
    pub session: SessionSnapshot,
}

/// Body of `POST /api/sessions/{id}/moods`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MoodRequest {
    #[validate(range(min = 1, max = 5))]
    pub mood: u8,
}

/// Reply of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub capabilities: Capabilities,
    pub sessions: usize,
}

/// Body of every non-2xx session route reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
