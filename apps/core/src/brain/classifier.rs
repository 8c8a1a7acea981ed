//! Strategy selection for topic classification.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use super::keywords::KeywordClassifier;
use super::learned::LearnedClassifier;
use super::topic::ClassificationResult;

/// Which classification strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Keyword,
    Learned,
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(ClassifierKind::Keyword),
            "learned" | "model" => Ok(ClassifierKind::Learned),
            other => Err(format!(
                "unknown classifier '{}', expected 'keyword' or 'learned'",
                other
            )),
        }
    }
}

/// Topic classifier, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub enum TopicClassifier {
    Keyword(KeywordClassifier),
    Learned(LearnedClassifier),
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(ClassifierKind::default())
    }
}

impl TopicClassifier {
    pub fn new(kind: ClassifierKind) -> Self {
        info!("Initializing {:?} topic classifier...", kind);
        match kind {
            ClassifierKind::Keyword => TopicClassifier::Keyword(KeywordClassifier::new()),
            ClassifierKind::Learned => TopicClassifier::Learned(LearnedClassifier::new()),
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            TopicClassifier::Keyword(_) => ClassifierKind::Keyword,
            TopicClassifier::Learned(_) => ClassifierKind::Learned,
        }
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        match self {
            TopicClassifier::Keyword(c) => c.classify(text),
            TopicClassifier::Learned(c) => c.classify(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("keyword".parse::<ClassifierKind>().unwrap(), ClassifierKind::Keyword);
        assert_eq!(" Learned ".parse::<ClassifierKind>().unwrap(), ClassifierKind::Learned);
        assert!("bayes".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [ClassifierKind::Keyword, ClassifierKind::Learned] {
            assert_eq!(TopicClassifier::new(kind).kind(), kind);
        }
    }
}
