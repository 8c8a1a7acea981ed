//! Keyword topic classification.
//!
//! Lower-cases the message and tests substring containment against a fixed
//! keyword list per topic. Topics are checked in [`TOPIC_PRIORITY`] order and
//! the first topic with any hit wins, so a message mentioning both a panic
//! attack and stress is a panic message.

use super::topic::{ClassificationResult, Topic};

/// Keyword list for a single topic
pub struct TopicKeywords {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

/// Topics in the order they are checked.
pub const TOPIC_PRIORITY: &[TopicKeywords] = &[
    TopicKeywords {
        topic: Topic::Panic,
        keywords: &["panic", "anxiety", "attack"],
    },
    TopicKeywords {
        topic: Topic::Stress,
        keywords: &["stress", "stressed", "pressure"],
    },
    TopicKeywords {
        topic: Topic::Depression,
        keywords: &["depressed", "sad", "low", "hopeless"],
    },
    TopicKeywords {
        topic: Topic::Sleep,
        keywords: &["sleep", "insomnia", "tired"],
    },
];

/// Topic classifier using keyword containment
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify the topic of a text
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return ClassificationResult::general();
        }

        for group in TOPIC_PRIORITY {
            let matched: Vec<String> = group
                .keywords
                .iter()
                .filter(|kw| lower.contains(**kw))
                .map(|kw| kw.to_string())
                .collect();

            if !matched.is_empty() {
                let confidence = (matched.len() as f32 / group.keywords.len() as f32 + 0.5).min(1.0);
                return ClassificationResult {
                    topic: group.topic,
                    confidence,
                    matched,
                };
            }
        }

        ClassificationResult::general()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_topic_detection() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify("I feel so stressed").topic, Topic::Stress);
        assert_eq!(classifier.classify("I can't sleep").topic, Topic::Sleep);
        assert_eq!(classifier.classify("Everything feels hopeless").topic, Topic::Depression);
        assert_eq!(classifier.classify("My ANXIETY is back").topic, Topic::Panic);
    }

    #[test]
    fn test_panic_wins_over_stress() {
        let classifier = KeywordClassifier::new();

        let result = classifier.classify("I'm stressed and having a panic attack");
        assert_eq!(result.topic, Topic::Panic);
        assert_eq!(result.matched, vec!["panic".to_string(), "attack".to_string()]);
    }

    #[test]
    fn test_depression_wins_over_sleep() {
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.classify("sad and tired").topic, Topic::Depression);
    }

    #[test]
    fn test_general_fallback() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify("").topic, Topic::General);
        assert_eq!(classifier.classify("   ").topic, Topic::General);
        assert_eq!(classifier.classify("Just need some advice").topic, Topic::General);
    }

    #[test]
    fn test_priority_order_is_fixed() {
        let order: Vec<Topic> = TOPIC_PRIORITY.iter().map(|g| g.topic).collect();
        assert_eq!(
            order,
            vec![Topic::Panic, Topic::Stress, Topic::Depression, Topic::Sleep]
        );
    }
}
