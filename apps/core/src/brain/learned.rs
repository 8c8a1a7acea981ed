//! Learned topic classification.
//!
//! A TF-IDF vectorizer and a multinomial logistic regression, both fitted
//! once at construction on a fixed ten-sentence corpus. Training is plain
//! full-batch gradient descent from zero weights, so two classifiers built
//! from the same corpus are identical.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

use super::topic::{ClassificationResult, Topic, ALL_TOPICS};

/// Labeled training corpus
pub const TRAINING_CORPUS: &[(&str, Topic)] = &[
    ("I am stressed with exams", Topic::Stress),
    ("Too much pressure at work", Topic::Stress),
    ("I am panicking", Topic::Panic),
    ("Having an anxiety attack", Topic::Panic),
    ("I feel very sad and hopeless", Topic::Depression),
    ("I think I’m depressed", Topic::Depression),
    ("I can’t sleep at night", Topic::Sleep),
    ("Suffering from insomnia", Topic::Sleep),
    ("Just need some advice", Topic::General),
    ("What can I do to feel better?", Topic::General),
];

const L2_PENALTY: f64 = 0.01;
const LEARNING_RATE: f64 = 1.0;
const EPOCHS: usize = 2000;

// Words of two or more word characters
// NOTE: expect() is acceptable here, the pattern is a compile-time constant
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid regex: token pattern"));

/// Tokenize text into lower-case words
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// TF-IDF vectorizer with a vocabulary frozen at fit time
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Learn the vocabulary and smoothed idf weights from a corpus
    pub fn fit<'a>(documents: impl IntoIterator<Item = &'a str>) -> Self {
        let tokenized: Vec<BTreeSet<String>> = documents
            .into_iter()
            .map(|doc| tokenize(doc).into_iter().collect())
            .collect();

        let terms: BTreeSet<&String> = tokenized.iter().flatten().collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.clone(), index))
            .collect();

        let n_docs = tokenized.len() as f64;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &index) in &vocabulary {
            let df = tokenized.iter().filter(|doc| doc.contains(term)).count() as f64;
            idf[index] = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary terms present in a text, in order of appearance
    pub fn known_terms(&self, text: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        tokenize(text)
            .into_iter()
            .filter(|t| self.vocabulary.contains_key(t) && seen.insert(t.clone()))
            .collect()
    }

    /// L2-normalized TF-IDF vector for a text. Out-of-vocabulary words are ignored.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                vector[index] += self.idf[index];
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

/// Multinomial logistic regression with L2 penalty on the weights
#[derive(Debug, Clone)]
pub struct SoftmaxRegression {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl SoftmaxRegression {
    pub fn fit(samples: &[Vec<f64>], labels: &[usize], n_classes: usize) -> Self {
        let n_features = samples.first().map(|s| s.len()).unwrap_or(0);
        let mut model = Self {
            weights: vec![vec![0.0; n_features]; n_classes],
            bias: vec![0.0; n_classes],
        };
        if samples.is_empty() {
            return model;
        }

        let n = samples.len() as f64;
        for _ in 0..EPOCHS {
            let mut grad_w = vec![vec![0.0; n_features]; n_classes];
            let mut grad_b = vec![0.0; n_classes];

            for (x, &label) in samples.iter().zip(labels) {
                let probs = model.predict_proba(x);
                for class in 0..n_classes {
                    let err = probs[class] - if class == label { 1.0 } else { 0.0 };
                    grad_b[class] += err;
                    for (g, xj) in grad_w[class].iter_mut().zip(x) {
                        *g += err * xj;
                    }
                }
            }

            for class in 0..n_classes {
                model.bias[class] -= LEARNING_RATE * grad_b[class] / n;
                for (w, g) in model.weights[class].iter_mut().zip(&grad_w[class]) {
                    *w -= LEARNING_RATE * (g / n + L2_PENALTY * *w);
                }
            }
        }

        model
    }

    /// Class probabilities for a feature vector
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f64>() + b)
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }
}

/// Topic classifier backed by TF-IDF features and logistic regression
#[derive(Debug, Clone)]
pub struct LearnedClassifier {
    vectorizer: TfIdfVectorizer,
    model: SoftmaxRegression,
}

impl Default for LearnedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LearnedClassifier {
    /// Fit on the built-in corpus
    pub fn new() -> Self {
        Self::train(TRAINING_CORPUS)
    }

    /// Fit on an arbitrary labeled corpus
    pub fn train(corpus: &[(&str, Topic)]) -> Self {
        let vectorizer = TfIdfVectorizer::fit(corpus.iter().map(|(text, _)| *text));
        let samples: Vec<Vec<f64>> = corpus
            .iter()
            .map(|(text, _)| vectorizer.transform(text))
            .collect();
        let labels: Vec<usize> = corpus.iter().map(|(_, topic)| label_index(*topic)).collect();

        let model = SoftmaxRegression::fit(&samples, &labels, ALL_TOPICS.len());
        debug!(
            "Learned classifier fitted on {} sentences, vocabulary of {} terms",
            corpus.len(),
            vectorizer.vocabulary_size()
        );

        Self { vectorizer, model }
    }

    /// Classify the topic of a text
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let matched = self.vectorizer.known_terms(text);
        if matched.is_empty() {
            return ClassificationResult::general();
        }

        let probs = self.model.predict_proba(&self.vectorizer.transform(text));
        // First maximum wins, so ties resolve in label order.
        let (best, confidence) = probs
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, &p)| {
                if p > bp {
                    (i, p)
                } else {
                    (bi, bp)
                }
            });

        ClassificationResult {
            topic: ALL_TOPICS[best],
            confidence: confidence as f32,
            matched,
        }
    }
}

fn label_index(topic: Topic) -> usize {
    ALL_TOPICS
        .iter()
        .position(|t| *t == topic)
        .unwrap_or(ALL_TOPICS.len() - 1)
}
