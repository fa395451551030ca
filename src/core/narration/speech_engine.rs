use async_trait::async_trait;
use thiserror::Error;

use super::narration_models::{NarrationEventSender, Utterance, Voice};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("Nothing to speak")]
    EmptyUtterance,
}

/// Text-to-speech backend.
///
/// `speak` returns as soon as the utterance is queued; progress arrives on the
/// event channel tagged with the utterance's session. Only one utterance plays at
/// a time: `cancel` silences whatever is playing and its session never reports again.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn voices(&self) -> Vec<Voice>;

    fn speak(&self, utterance: Utterance, events: NarrationEventSender) -> Result<(), SpeechError>;

    fn pause(&self);

    fn resume(&self);

    fn cancel(&self);
}

/// Id of the preferred voice if the engine offers it (case-insensitive, by id or
/// display name), otherwise `None` so the engine default is used.
pub fn select_voice(voices: &[Voice], preferred: Option<&str>) -> Option<String> {
    let preferred = preferred?.trim();
    if preferred.is_empty() {
        return None;
    }

    voices
        .iter()
        .find(|voice| {
            voice.id.eq_ignore_ascii_case(preferred) || voice.name.eq_ignore_ascii_case(preferred)
        })
        .map(|voice| voice.id.clone())
}
