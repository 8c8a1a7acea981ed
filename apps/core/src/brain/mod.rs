//! # Brain Module
//!
//! Fast, local analysis of a user message before any external model is called.
//!
//! ## Components
//! - `topic`: the closed topic taxonomy
//! - `keywords`: keyword containment with a fixed priority list
//! - `learned`: TF-IDF + logistic regression fitted at startup
//! - `classifier`: strategy selection
//! - `guides`: static guides and crisis resources

pub mod classifier;
pub mod guides;
pub mod keywords;
pub mod learned;
pub mod topic;

pub use classifier::{ClassifierKind, TopicClassifier};
pub use guides::{compose_guide, guide_for};
pub use topic::{ClassificationResult, Topic};
