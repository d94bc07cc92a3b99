/*!
 * Mock translator for tests and dry runs.
 *
 * This module provides a translator that never leaves the process:
 * - `MockTranslator::echo()` - returns the input unchanged
 * - `MockTranslator::tagged()` - prefixes the input with the target language
 * - `MockTranslator::empty()` - answers without a usable translation
 * - `MockTranslator::failing()` - always fails with a connection error
 *
 * Every call is recorded so tests can assert on what was sent and when.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::ProviderError;
use crate::providers::Translator;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the text unchanged
    Echo,
    /// Returns `[<target>] <text>`
    Tagged,
    /// Returns `Ok(None)`
    Empty,
    /// Always fails with an error
    Failing,
    /// Fails every Nth call, echoes otherwise
    Intermittent { fail_every: usize },
    /// Echoes after a delay
    Slow { delay_ms: u64 },
    /// Echoes with every occurrence of `pattern` removed
    Strip { pattern: &'static str },
}

/// A call received by the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Text that was sent
    pub text: String,
    /// Requested target language
    pub target_language: String,
    /// When the call arrived
    pub at: Instant,
}

/// Scripted translator that records its calls
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Identity translator
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Translator that tags text with the target language
    pub fn tagged() -> Self {
        Self::new(MockBehavior::Tagged)
    }

    /// Translator that never produces a translation
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Option<String>, ProviderError> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(MockCall {
                text: text.to_string(),
                target_language: target_language.to_string(),
                at: Instant::now(),
            });
            calls.len()
        };

        match self.behavior {
            MockBehavior::Echo => Ok(Some(text.to_string())),
            MockBehavior::Tagged => Ok(Some(format!("[{}] {}", target_language, text))),
            MockBehavior::Empty => Ok(None),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock translator is offline".to_string(),
            )),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && call_number % fail_every == 0 {
                    Err(ProviderError::RequestFailed(format!(
                        "mock failure on call {}",
                        call_number
                    )))
                } else {
                    Ok(Some(text.to_string()))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Some(text.to_string()))
            }
            MockBehavior::Strip { pattern } => Ok(Some(text.replace(pattern, ""))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
