use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::narration_models::{NarrationEvent, NarrationEventSender, Utterance, Voice};
use super::speech_engine::{SpeechEngine, SpeechError};

#[derive(Default)]
struct FakeLog {
    calls: Vec<String>,
    spoken: Vec<Utterance>,
}

/// Speech engine for tests: records every call and reports events immediately.
#[derive(Clone, Default)]
pub struct FakeSpeechEngine {
    voices: Vec<Voice>,
    report_failure: Option<String>,
    reject_speak: bool,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeSpeechEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voice(mut self, id: &str, name: &str) -> Self {
        self.voices.push(Voice {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Every utterance reports `Failed` instead of `Started`.
    pub fn failing(mut self, message: &str) -> Self {
        self.report_failure = Some(message.to_string());
        self
    }

    /// `speak` itself returns an error.
    pub fn unavailable(mut self) -> Self {
        self.reject_speak = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.log.lock().unwrap().spoken.clone()
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().calls.push(call.to_string());
    }
}

#[async_trait]
impl SpeechEngine for FakeSpeechEngine {
    async fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance, events: NarrationEventSender) -> Result<(), SpeechError> {
        self.record("speak");
        if self.reject_speak {
            return Err(SpeechError::Unavailable("no audio device".to_string()));
        }

        let session = utterance.session;
        self.log.lock().unwrap().spoken.push(utterance);
        let event = match &self.report_failure {
            Some(message) => NarrationEvent::failed(session, message.clone()),
            None => NarrationEvent::started(session),
        };
        let _ = events.send(event);
        Ok(())
    }

    fn pause(&self) {
        self.record("pause");
    }

    fn resume(&self) {
        self.record("resume");
    }

    fn cancel(&self) {
        self.record("cancel");
    }
}
