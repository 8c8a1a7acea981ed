//! Topic taxonomy shared by both classification strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detected topic of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Work, exam or life pressure
    Stress,
    /// Panic attacks and acute anxiety
    Panic,
    /// Low mood, sadness, hopelessness
    Depression,
    /// Insomnia and tiredness
    Sleep,
    /// Anything else
    General,
}

/// Every topic, in the label order used by the learned classifier.
pub const ALL_TOPICS: [Topic; 5] = [
    Topic::Stress,
    Topic::Panic,
    Topic::Depression,
    Topic::Sleep,
    Topic::General,
];

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Topic {
    /// Returns the lower-case label for the topic
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Stress => "stress",
            Topic::Panic => "panic",
            Topic::Depression => "depression",
            Topic::Sleep => "sleep",
            Topic::General => "general",
        }
    }

    /// Panic and depression answers always carry crisis resources.
    pub fn needs_crisis_resources(&self) -> bool {
        matches!(self, Topic::Panic | Topic::Depression)
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TOPICS
            .iter()
            .copied()
            .find(|topic| topic.label() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown topic '{}'", s))
    }
}

/// Result of topic classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Detected topic
    pub topic: Topic,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Keywords (or vocabulary terms) that drove the decision
    pub matched: Vec<String>,
}

impl ClassificationResult {
    pub(crate) fn general() -> Self {
        Self {
            topic: Topic::General,
            confidence: 0.0,
            matched: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for topic in ALL_TOPICS {
            assert_eq!(topic.label().parse::<Topic>().unwrap(), topic);
        }
        assert!("anger".parse::<Topic>().is_err());
    }

    #[test]
    fn test_crisis_topics() {
        assert!(Topic::Panic.needs_crisis_resources());
        assert!(Topic::Depression.needs_crisis_resources());
        assert!(!Topic::Stress.needs_crisis_resources());
        assert!(!Topic::Sleep.needs_crisis_resources());
        assert!(!Topic::General.needs_crisis_resources());
    }

    #[test]
    fn test_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Topic::Depression).unwrap(), "\"depression\"");
    }
}
