//! The response decision procedure.
//!
//! Classify the message, pick the topic guide (with crisis resources where
//! needed), try to enrich it through the hosted generator, and for messages
//! without a guide fall through hosted answer → local fallback → apology.
//! Every external call is bounded by a timeout and every failure degrades to
//! the next link of the chain; `respond` itself cannot fail.

use crate::backends::TextGenerator;
use crate::brain::{compose_guide, guide_for, ClassificationResult, ClassifierKind, Topic, TopicClassifier};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

pub const APOLOGY: &str = "Sorry, I couldn’t generate advice right now.";

/// Separates a static guide from the generated extra tips
pub const EXPANSION_HEADER: &str = "✨ A few more ideas:";

/// Which link of the chain produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Guide,
    GuideWithExpansion,
    Generated,
    Fallback,
    Apology,
}

/// A reply plus the metadata needed for logging and the session API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub topic: Topic,
    pub source: ResponseSource,
}

/// What this process can do, reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    pub classifier: ClassifierKind,
    pub generator: Option<String>,
    pub fallback: Option<String>,
}

pub struct Responder {
    classifier: TopicClassifier,
    generator: Option<Arc<dyn TextGenerator>>,
    fallback: Option<Arc<dyn TextGenerator>>,
    call_timeout: Duration,
}

impl Responder {
    /// A responder with no external collaborators: guides or apology only.
    pub fn new(classifier: TopicClassifier, call_timeout: Duration) -> Self {
        Self {
            classifier,
            generator: None,
            fallback: None,
            call_timeout,
        }
    }

    /// Enables the hosted generator used for expansion and direct answers.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Enables the local fallback model.
    pub fn with_fallback(mut self, fallback: Arc<dyn TextGenerator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            classifier: self.classifier.kind(),
            generator: self.generator.as_ref().map(|g| g.name().to_string()),
            fallback: self.fallback.as_ref().map(|f| f.name().to_string()),
        }
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    /// Produces the reply text for a user message. Never fails.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn respond(&self, text: &str) -> Reply {
        let classification = self.classify(text);
        let topic = classification.topic;
        info!(
            "Classifier prediction: {} ({:.2}, matched {:?})",
            topic, classification.confidence, classification.matched
        );

        if let (Some(guide), Some(raw_guide)) = (compose_guide(topic), guide_for(topic)) {
            if let Some(generator) = &self.generator {
                let prompt = expansion_prompt(text, raw_guide);
                if let Some(extra) = self.try_generate(generator.as_ref(), prompt).await {
                    return Reply {
                        text: format!("{}\n\n{}\n{}", guide, EXPANSION_HEADER, extra),
                        topic,
                        source: ResponseSource::GuideWithExpansion,
                    };
                }
            }
            return Reply {
                text: guide,
                topic,
                source: ResponseSource::Guide,
            };
        }

        if let Some(generator) = &self.generator {
            if let Some(answer) = self.try_generate(generator.as_ref(), direct_prompt(text)).await {
                return Reply {
                    text: answer,
                    topic,
                    source: ResponseSource::Generated,
                };
            }
        }

        if let Some(fallback) = &self.fallback {
            if let Some(answer) = self.try_generate(fallback.as_ref(), fallback_prompt(text)).await {
                return Reply {
                    text: answer,
                    topic,
                    source: ResponseSource::Fallback,
                };
            }
        }

        warn!("No source produced a reply, answering with the apology");
        Reply {
            text: APOLOGY.to_string(),
            topic,
            source: ResponseSource::Apology,
        }
    }

    /// One bounded call. Errors, empty answers and timeouts all become `None`.
    async fn try_generate(&self, backend: &dyn TextGenerator, prompt: String) -> Option<String> {
        let result = timeout(self.call_timeout, backend.generate(prompt))
            .await
            .map_err(AppError::from)
            .and_then(|answer| answer);

        match result {
            Ok(answer) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    warn!("{} returned an empty answer", backend.name());
                    None
                } else {
                    Some(answer.to_string())
                }
            }
            Err(e @ AppError::Timeout(_)) => {
                warn!("{} gave up after {:?}: {}", backend.name(), self.call_timeout, e);
                None
            }
            Err(e) => {
                warn!("{} generation failed: {}", backend.name(), e);
                None
            }
        }
    }
}

/// Prompt asking the hosted model to add tips to a static guide.
pub fn expansion_prompt(user_text: &str, guide: &str) -> String {
    format!(
        "You are a warm, empathetic mental health companion.\n\
         The user said: \"{}\"\n\n\
         They are being shown this guide:\n{}\n\n\
         Add 2-3 extra practical, supportive tips that are not already in the guide.\n\
         Use simple language and keep it under 80 words. Do not repeat the guide.",
        user_text.trim(),
        guide
    )
}

/// Prompt asking the hosted model to answer a message that has no guide.
pub fn direct_prompt(user_text: &str) -> String {
    format!(
        "You are a warm, empathetic mental health companion.\n\
         The user said: \"{}\"\n\n\
         Based on this, provide 3-5 practical, supportive coping tips.\n\
         Use simple language and keep the answer under 120 words.",
        user_text.trim()
    )
}

/// Completion-style prompt for the local fallback model.
pub fn fallback_prompt(user_text: &str) -> String {
    format!(
        "A kind and supportive friend replies to someone who said: \"{}\"\nReply:",
        user_text.trim()
    )
}
