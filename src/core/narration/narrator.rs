use std::collections::{HashMap, HashSet};
use std::time::Duration;

use thiserror::Error;

use super::narration_models::{
    NarrationEvent, NarrationEventKind, NarrationEventSender, NarrationState, NarrationTarget,
    TriggerControl, Utterance,
};
use super::pacing::add_pauses;
use super::speech_engine::{select_voice, SpeechEngine, SpeechError};

/// How long a failed control shows its error before returning to idle.
pub const ERROR_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("Cannot {action} the {target} while it is {state}")]
    InvalidTransition {
        action: &'static str,
        target: NarrationTarget,
        state: NarrationState,
    },
    #[error("Narration session {0} is no longer active")]
    Superseded(u64),
    #[error("Nothing to narrate")]
    NothingToRead,
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

struct ActiveNarration {
    target: NarrationTarget,
    session: u64,
}

/// Read-aloud state machine shared by every trigger control.
///
/// At most one narration is active. Each narration gets a fresh session id;
/// engine events for any other session are stale and ignored.
pub struct Narrator<E: SpeechEngine> {
    engine: E,
    preferred_voice: Option<String>,
    controls: HashMap<NarrationTarget, TriggerControl>,
    active: Option<ActiveNarration>,
    next_session: u64,
    events: NarrationEventSender,
    error_reset_delay: Duration,
}

impl<E: SpeechEngine> Narrator<E> {
    pub fn new(engine: E, preferred_voice: Option<String>, events: NarrationEventSender) -> Self {
        Self {
            engine,
            preferred_voice,
            controls: HashMap::new(),
            active: None,
            next_session: 0,
            events,
            error_reset_delay: ERROR_RESET_DELAY,
        }
    }

    #[cfg(test)]
    pub fn with_error_reset_delay(mut self, delay: Duration) -> Self {
        self.error_reset_delay = delay;
        self
    }

    pub fn control(&self, target: &NarrationTarget) -> TriggerControl {
        self.controls
            .get(target)
            .cloned()
            .unwrap_or_else(|| TriggerControl::for_target(target))
    }

    pub fn state(&self, target: &NarrationTarget) -> NarrationState {
        self.controls
            .get(target)
            .map(|control| control.state)
            .unwrap_or(NarrationState::Idle)
    }

    pub fn active_target(&self) -> Option<&NarrationTarget> {
        self.active.as_ref().map(|active| &active.target)
    }

    /// Cancel whatever is playing and put `target` into `loading`.
    ///
    /// Returns the session the caller passes to [`Narrator::speak`] once the text is ready.
    pub fn begin(&mut self, target: NarrationTarget) -> u64 {
        self.cancel_active();

        self.next_session += 1;
        let session = self.next_session;
        self.control_mut(&target).show_loading(session);
        tracing::debug!(%target, session, "Narration loading");

        self.active = Some(ActiveNarration { target, session });
        session
    }

    /// Pace the text and hand it to the engine. The control stays in `loading`
    /// until the engine reports that playback started.
    pub async fn speak(&mut self, session: u64, text: &str) -> Result<(), NarrationError> {
        let target = match &self.active {
            Some(active) if active.session == session => active.target.clone(),
            _ => return Err(NarrationError::Superseded(session)),
        };

        let paced = add_pauses(text);
        if paced.is_empty() {
            self.fail(session, "the report is empty");
            return Err(NarrationError::NothingToRead);
        }

        let voices = self.engine.voices().await;
        let voice = select_voice(&voices, self.preferred_voice.as_deref());
        if voice.is_none() && self.preferred_voice.is_some() {
            tracing::debug!("Preferred voice not offered, using engine default");
        }

        let utterance = Utterance {
            session,
            text: paced,
            voice,
        };
        if let Err(err) = self.engine.speak(utterance, self.events.clone()) {
            self.fail(session, &err.to_string());
            return Err(err.into());
        }

        tracing::info!(%target, session, "Narration queued");
        Ok(())
    }

    pub fn handle_event(&mut self, event: NarrationEvent) {
        let session = event.session;
        match event.kind {
            NarrationEventKind::Started => {
                if let Some(target) = self.active_target_for(session) {
                    let control = self.control_mut(&target);
                    if control.state == NarrationState::Loading {
                        control.show_speaking();
                    }
                }
            }
            NarrationEventKind::Finished => {
                if let Some(target) = self.active_target_for(session) {
                    self.active = None;
                    self.control_mut(&target).reset();
                    tracing::info!(%target, session, "Narration finished");
                }
            }
            NarrationEventKind::Failed(message) => self.fail(session, &message),
            NarrationEventKind::ErrorExpired => {
                for control in self.controls.values_mut() {
                    if control.state == NarrationState::Error && control.session == Some(session) {
                        control.reset();
                    }
                }
            }
        }
    }

    pub fn pause(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        self.require_state(target, "pause", NarrationState::Speaking)?;
        self.engine.pause();
        self.control_mut(target).show_paused();
        Ok(())
    }

    pub fn resume(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        self.require_state(target, "resume", NarrationState::Paused)?;
        self.engine.resume();
        self.control_mut(target).show_speaking();
        Ok(())
    }

    /// Valid from every state except `idle`; always ends in `idle`.
    pub fn stop(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        let state = self.state(target);
        if state == NarrationState::Idle {
            return Err(NarrationError::InvalidTransition {
                action: "stop",
                target: target.clone(),
                state,
            });
        }

        if self
            .active
            .as_ref()
            .is_some_and(|active| &active.target == target)
        {
            self.active = None;
            self.engine.cancel();
        }
        self.control_mut(target).reset();
        tracing::debug!(%target, "Narration stopped");
        Ok(())
    }

    /// Drop idle card controls whose reports left the working set.
    pub fn retain_cards(&mut self, names: &HashSet<&str>) {
        self.controls.retain(|target, control| match target {
            NarrationTarget::Main => true,
            NarrationTarget::Card(name) => {
                control.state != NarrationState::Idle || names.contains(name.as_str())
            }
        });
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.engine.cancel();
            self.control_mut(&active.target).reset();
            tracing::debug!(target = %active.target, session = active.session, "Cancelled narration");
        }
    }

    fn fail(&mut self, session: u64, message: &str) {
        let target = match self.active.take() {
            Some(active) if active.session == session => active.target,
            other => {
                self.active = other;
                return;
            }
        };

        tracing::warn!(%target, session, error = message, "Narration failed");
        self.control_mut(&target).show_error(message);

        let events = self.events.clone();
        let delay = self.error_reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(NarrationEvent {
                session,
                kind: NarrationEventKind::ErrorExpired,
            });
        });
    }

    fn require_state(
        &self,
        target: &NarrationTarget,
        action: &'static str,
        expected: NarrationState,
    ) -> Result<(), NarrationError> {
        let state = self.state(target);
        if state != expected {
            return Err(NarrationError::InvalidTransition {
                action,
                target: target.clone(),
                state,
            });
        }
        Ok(())
    }

    fn active_target_for(&self, session: u64) -> Option<NarrationTarget> {
        self.active
            .as_ref()
            .filter(|active| active.session == session)
            .map(|active| active.target.clone())
    }

    fn control_mut(&mut self, target: &NarrationTarget) -> &mut TriggerControl {
        self.controls
            .entry(target.clone())
            .or_insert_with(|| TriggerControl::for_target(target))
    }
}
