//! Speech-to-text capability
//!
//! Recognition lives outside this crate. Callers hold a
//! [`SpeechTranscriber`] and fall back to typed input when it reports itself
//! unavailable.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{RememberMeError, Result};

/// Default recognition language
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// One recognized utterance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Single-utterance speech recognition
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Whether recognition can run on this platform
    fn is_available(&self) -> bool;

    /// Listen for one utterance and return its final transcript
    async fn transcribe(&self, language: &str) -> Result<Transcript>;
}

/// Transcriber for platforms without speech recognition
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTranscriber;

#[async_trait]
impl SpeechTranscriber for UnavailableTranscriber {
    fn is_available(&self) -> bool {
        false
    }

    async fn transcribe(&self, _language: &str) -> Result<Transcript> {
        Err(RememberMeError::SpeechUnavailable)
    }
}

/// Transcriber that plays back queued utterances in order
#[derive(Debug, Default)]
pub struct ScriptedTranscriber {
    utterances: Mutex<VecDeque<String>>,
}

impl ScriptedTranscriber {
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: Mutex::new(utterances.into_iter().map(Into::into).collect()),
        }
    }

    /// Queue another utterance
    pub fn push(&self, utterance: impl Into<String>) {
        if let Ok(mut queue) = self.utterances.lock() {
            queue.push_back(utterance.into());
        }
    }

    /// Utterances not yet played back
    pub fn remaining(&self) -> usize {
        self.utterances.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SpeechTranscriber for ScriptedTranscriber {
    fn is_available(&self) -> bool {
        true
    }

    async fn transcribe(&self, language: &str) -> Result<Transcript> {
        let next = self
            .utterances
            .lock()
            .map_err(|_| RememberMeError::Speech("transcriber state poisoned".to_string()))?
            .pop_front();

        match next {
            Some(text) => {
                tracing::debug!(language, "Scripted transcript: {}", text);
                Ok(Transcript::new(text))
            }
            None => Err(RememberMeError::Speech("No speech was detected".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_transcriber() {
        let transcriber = UnavailableTranscriber;
        assert!(!transcriber.is_available());
        assert!(matches!(
            transcriber.transcribe(DEFAULT_LANGUAGE).await,
            Err(RememberMeError::SpeechUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_scripted_transcriber_plays_in_order() {
        let transcriber = ScriptedTranscriber::new(["Who is my daughter?"]);
        transcriber.push("Tell me about Bob");
        assert_eq!(transcriber.remaining(), 2);

        let first = transcriber.transcribe(DEFAULT_LANGUAGE).await.unwrap();
        let second = transcriber.transcribe(DEFAULT_LANGUAGE).await.unwrap();
        assert_eq!(first.text, "Who is my daughter?");
        assert_eq!(second.text, "Tell me about Bob");

        assert!(matches!(
            transcriber.transcribe(DEFAULT_LANGUAGE).await,
            Err(RememberMeError::Speech(_))
        ));
    }
}
