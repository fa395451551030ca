pub mod companion;
pub mod narration_models;
pub mod narrator;
pub mod pacing;
pub mod speech_engine;

#[cfg(test)]
pub mod fake_engine;

pub use companion::CompanionLocator;
pub use narration_models::{
    NarrationEvent, NarrationEventKind, NarrationEventReceiver, NarrationEventSender,
    NarrationScript, NarrationState, NarrationTarget, TriggerControl, Utterance, Voice,
};
pub use narrator::{NarrationError, Narrator};
pub use speech_engine::{SpeechEngine, SpeechError};
