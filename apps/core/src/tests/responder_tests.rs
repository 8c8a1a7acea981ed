//! Responder Tests
//!
//! The reply chain end to end, with mock generators standing in for the
//! hosted service and the local model.

use super::support::MockGenerator;
use crate::brain::guides::{
    CRISIS_RESOURCES, DEPRESSION_GUIDE, PANIC_GUIDE, SLEEP_GUIDE, STRESS_GUIDE,
};
use crate::brain::{ClassifierKind, Topic, TopicClassifier};
use crate::responder::{Responder, ResponseSource, APOLOGY, EXPANSION_HEADER};
use std::sync::Arc;
use std::time::Duration;

fn offline() -> Responder {
    Responder::new(TopicClassifier::default(), Duration::from_secs(1))
}

#[cfg(test)]
mod offline_tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_message_gets_exact_guide() {
        let reply = offline().respond("I can't sleep").await;
        assert_eq!(reply.text, SLEEP_GUIDE);
        assert_eq!(reply.topic, Topic::Sleep);
        assert_eq!(reply.source, ResponseSource::Guide);
    }

    #[tokio::test]
    async fn test_crisis_resources_follow_panic_and_depression_guides() {
        let responder = offline();

        let panic = responder.respond("I'm having a panic attack").await;
        assert_eq!(panic.text, format!("{}\n\n{}", PANIC_GUIDE, CRISIS_RESOURCES));

        let low = responder.respond("I feel so hopeless").await;
        assert_eq!(low.text, format!("{}\n\n{}", DEPRESSION_GUIDE, CRISIS_RESOURCES));

        let stress = responder.respond("Too much stress").await;
        assert_eq!(stress.text, STRESS_GUIDE);
        assert!(!stress.text.contains(CRISIS_RESOURCES));
    }

    #[tokio::test]
    async fn test_general_message_gets_apology() {
        let reply = offline().respond("What should I cook tonight?").await;
        assert_eq!(reply.text, APOLOGY);
        assert_eq!(reply.topic, Topic::General);
    }

    #[tokio::test]
    async fn test_empty_message_gets_apology() {
        assert_eq!(offline().respond("").await.text, APOLOGY);
        assert_eq!(offline().respond("   ").await.text, APOLOGY);
    }

    #[tokio::test]
    async fn test_idempotent_without_services() {
        for kind in [ClassifierKind::Keyword, ClassifierKind::Learned] {
            let responder = Responder::new(TopicClassifier::new(kind), Duration::from_secs(1));
            for text in ["I can't sleep", "I am panicking", "Just need some advice"] {
                let first = responder.respond(text).await;
                let second = responder.respond(text).await;
                assert_eq!(first.text, second.text, "Replies differ for '{}'", text);
            }
        }
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;

    #[tokio::test]
    async fn test_guide_is_expanded_by_generator() {
        let generator = Arc::new(MockGenerator::answering("gemini", "  Try a short walk.  "));
        let responder = offline().with_generator(generator.clone());

        let reply = responder.respond("I'm so stressed").await;
        assert_eq!(reply.source, ResponseSource::GuideWithExpansion);
        assert_eq!(
            reply.text,
            format!("{}\n\n{}\nTry a short walk.", STRESS_GUIDE, EXPANSION_HEADER)
        );
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("I'm so stressed"));
        assert!(prompt.contains(STRESS_GUIDE));
    }

    #[tokio::test]
    async fn test_expansion_follows_crisis_block() {
        let generator = Arc::new(MockGenerator::answering("gemini", "Breathe slowly."));
        let responder = offline().with_generator(generator);

        let reply = responder.respond("panic").await;
        let crisis_at = reply.text.find(CRISIS_RESOURCES).unwrap();
        let extra_at = reply.text.find(EXPANSION_HEADER).unwrap();
        assert!(reply.text.starts_with(PANIC_GUIDE));
        assert!(crisis_at < extra_at);
    }

    #[tokio::test]
    async fn test_failed_expansion_keeps_plain_guide() {
        let generator = Arc::new(MockGenerator::failing("gemini"));
        let fallback = Arc::new(MockGenerator::answering("llama", "unused"));
        let responder = offline()
            .with_generator(generator.clone())
            .with_fallback(fallback.clone());

        let reply = responder.respond("I can't sleep").await;
        assert_eq!(reply.text, SLEEP_GUIDE);
        assert_eq!(reply.source, ResponseSource::Guide);
        assert_eq!(generator.calls(), 1);
        // guided topics never reach the local model
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_general_uses_generator_first() {
        let generator = Arc::new(MockGenerator::answering("gemini", "Here are some ideas."));
        let fallback = Arc::new(MockGenerator::answering("llama", "unused"));
        let responder = offline()
            .with_generator(generator)
            .with_fallback(fallback.clone());

        let reply = responder.respond("Just need some advice").await;
        assert_eq!(reply.text, "Here are some ideas.");
        assert_eq!(reply.source, ResponseSource::Generated);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_general_falls_back_to_local_model() {
        let generator = Arc::new(MockGenerator::failing("gemini"));
        let fallback = Arc::new(MockGenerator::answering("llama", "I'm here for you."));
        let responder = offline()
            .with_generator(generator)
            .with_fallback(fallback.clone());

        let reply = responder.respond("Just need some advice").await;
        assert_eq!(reply.text, "I'm here for you.");
        assert_eq!(reply.source, ResponseSource::Fallback);
        assert!(fallback.last_prompt().unwrap().ends_with("Reply:"));
    }

    #[tokio::test]
    async fn test_empty_answers_fall_through_to_apology() {
        let responder = offline()
            .with_generator(Arc::new(MockGenerator::answering("gemini", "   ")))
            .with_fallback(Arc::new(MockGenerator::answering("llama", "")));

        let reply = responder.respond("Just need some advice").await;
        assert_eq!(reply.text, APOLOGY);
        assert_eq!(reply.source, ResponseSource::Apology);
    }
}

#[cfg(test)]
mod timeout_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hung_generator_is_cut_off() {
        let generator = Arc::new(MockGenerator::hanging("gemini", Duration::from_secs(600)));
        let fallback = Arc::new(MockGenerator::answering("llama", "Take a breath."));
        let responder = Responder::new(TopicClassifier::default(), Duration::from_secs(5))
            .with_generator(generator.clone())
            .with_fallback(fallback);

        let reply = responder.respond("Just need some advice").await;
        assert_eq!(reply.text, "Take a breath.");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_expansion_still_returns_guide() {
        let generator = Arc::new(MockGenerator::hanging("gemini", Duration::from_secs(600)));
        let responder = Responder::new(TopicClassifier::default(), Duration::from_secs(5))
            .with_generator(generator);

        let reply = responder.respond("I can't sleep").await;
        assert_eq!(reply.text, SLEEP_GUIDE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_everything_hung_is_apology() {
        let responder = Responder::new(TopicClassifier::default(), Duration::from_secs(5))
            .with_generator(Arc::new(MockGenerator::hanging("gemini", Duration::from_secs(600))))
            .with_fallback(Arc::new(MockGenerator::hanging("llama", Duration::from_secs(600))));

        let reply = responder.respond("Just need some advice").await;
        assert_eq!(reply.text, APOLOGY);
    }
}
