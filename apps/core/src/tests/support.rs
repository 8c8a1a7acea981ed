//! Mock generators shared by the responder and server tests.

use crate::backends::TextGenerator;
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How a mock generator behaves on each call
pub enum Behavior {
    Answer(&'static str),
    Fail,
    Hang(Duration),
}

pub struct MockGenerator {
    name: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(name: &'static str, text: &'static str) -> Self {
        Self::new(name, Behavior::Answer(text))
    }

    pub fn failing(name: &'static str) -> Self {
        Self::new(name, Behavior::Fail)
    }

    pub fn hanging(name: &'static str, delay: Duration) -> Self {
        Self::new(name, Behavior::Hang(delay))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(&self, prompt: String) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt);
        match &self.behavior {
            Behavior::Answer(text) => Ok(text.to_string()),
            Behavior::Fail => Err(AppError::Backend("mock failure".to_string())),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }
}
